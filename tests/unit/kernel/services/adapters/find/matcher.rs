use super::*;

fn filter(regex_search: bool, case_sensitive: bool, whole_words_only: bool) -> FilterOptions {
    FilterOptions {
        regex_search,
        case_sensitive,
        whole_words_only,
    }
}

fn scan_all(config: &SearchConfig, content: &str, f: FilterOptions) -> Vec<(usize, usize)> {
    config
        .scan(content, &f, SelectionBounds::UNBOUNDED)
        .map(|m| (m.offset, m.length))
        .collect()
}

fn naive_count(content: &str, pattern: &str) -> usize {
    let mut count = 0;
    let mut idx = 0;
    while let Some(pos) = content[idx..].find(pattern) {
        count += 1;
        idx += pos + pattern.len();
    }
    count
}

#[test]
fn test_literal_search() {
    let f = filter(false, true, false);
    let config = SearchConfig::new("hello", &f).unwrap();
    let matches = scan_all(&config, "hello world hello", f);

    assert_eq!(matches, vec![(0, 5), (12, 5)]);
}

#[test]
fn test_literal_matches_do_not_overlap() {
    let f = filter(false, true, false);
    for (content, pattern) in [
        ("aaaa", "aa"),
        ("abababab", "aba"),
        ("xyz", "xyzw"),
        ("the cat sat on the mat", "at"),
    ] {
        let config = SearchConfig::new(pattern, &f).unwrap();
        assert_eq!(
            config.scan(content, &f, SelectionBounds::UNBOUNDED).count(),
            naive_count(content, pattern),
            "{pattern:?} in {content:?}"
        );
    }
}

#[test]
fn test_case_insensitive_literal() {
    let f = filter(false, false, false);
    let config = SearchConfig::new("hello", &f).unwrap();
    let matches = scan_all(&config, "Hello HELLO hello", f);

    assert_eq!(matches.len(), 3);
}

#[test]
fn test_case_insensitive_literal_escapes_metacharacters() {
    let f = filter(false, false, false);
    let config = SearchConfig::new("a.b", &f).unwrap();
    let matches = scan_all(&config, "axb A.B", f);

    assert_eq!(matches, vec![(4, 3)]);
}

#[test]
fn test_case_insensitive_literal_non_ascii() {
    let f = filter(false, false, false);
    let config = SearchConfig::new("ÉTÉ", &f).unwrap();
    let matches = scan_all(&config, "un été chaud", f);

    assert_eq!(matches, vec![(3, "été".len())]);
}

#[test]
fn test_whole_word_literal() {
    let f = filter(false, true, true);
    let config = SearchConfig::new("cat", &f).unwrap();
    let matches = scan_all(&config, "concatenate cat category", f);

    assert_eq!(matches, vec![(12, 3)]);
}

#[test]
fn test_whole_word_regex() {
    let f = filter(true, true, true);
    let config = SearchConfig::new("cat", &f).unwrap();
    let matches = scan_all(&config, "concatenate cat category", f);

    assert_eq!(matches, vec![(12, 3)]);
}

#[test]
fn test_whole_word_at_content_edges() {
    let f = filter(false, true, true);
    let config = SearchConfig::new("cat", &f).unwrap();
    let matches = scan_all(&config, "cat_x cat", f);

    assert_eq!(matches, vec![(6, 3)]);
}

#[test]
fn test_selection_bounds_literal() {
    let f = filter(false, true, false);
    let config = SearchConfig::new("a", &f).unwrap();
    let matches: Vec<_> = config
        .scan("aaa", &f, SelectionBounds::new(Some(1), Some(2)))
        .collect();

    assert_eq!(matches, vec![MatchSpan::new(1, 1)]);
}

#[test]
fn test_selection_bounds_regex_requires_full_containment() {
    let f = filter(true, true, false);
    let config = SearchConfig::new(r"\d+", &f).unwrap();
    let matches: Vec<_> = config
        .scan("12 345 6789", &f, SelectionBounds::new(Some(1), Some(8)))
        .collect();

    // "12" 起点在选区外，"6789" 终点在选区外
    assert_eq!(matches, vec![MatchSpan::new(3, 3)]);
}

#[test]
fn test_selection_bounds_reversed_are_normalized() {
    let bounds = SelectionBounds::new(Some(5), Some(2));
    assert_eq!(bounds.start, Some(2));
    assert_eq!(bounds.end, Some(5));
}

#[test]
fn test_selection_bounds_mid_char_are_clamped() {
    let f = filter(false, true, false);
    let config = SearchConfig::new("é", &f).unwrap();
    // "é" 占两个字节：offset 1 落在字符中间
    let matches: Vec<_> = config
        .scan("éxé", &f, SelectionBounds::new(Some(1), None))
        .collect();

    assert_eq!(matches, vec![MatchSpan::new(3, 2)]);
}

#[test]
fn test_bounds_are_applied_before_whole_word() {
    // 选区切开了单词，但整词判断仍然看完整内容
    let f = filter(false, true, true);
    let config = SearchConfig::new("cat", &f).unwrap();
    let matches: Vec<_> = config
        .scan("cats", &f, SelectionBounds::new(Some(0), Some(3)))
        .collect();

    assert!(matches.is_empty());
}

#[test]
fn test_regex_search() {
    let f = filter(true, true, false);
    let config = SearchConfig::new(r"\w+\d+", &f).unwrap();
    let matches = scan_all(&config, "hello123 world456", f);

    assert_eq!(matches.len(), 2);
}

#[test]
fn test_regex_case_insensitive() {
    let f = filter(true, false, false);
    let config = SearchConfig::new("h.llo", &f).unwrap();
    let matches = scan_all(&config, "HELLO hallo", f);

    assert_eq!(matches, vec![(0, 5), (6, 5)]);
}

#[test]
fn test_invalid_regex() {
    let f = filter(true, true, false);
    assert!(SearchConfig::new("(unclosed", &f).is_err());
    assert!(SearchConfig::validate("(unclosed", &f).is_err());
    // Literal 模式下任何字符串都合法
    assert!(SearchConfig::validate("(unclosed", &filter(false, true, false)).is_ok());
}

#[test]
fn test_empty_pattern() {
    for f in [filter(false, true, false), filter(true, true, false)] {
        let config = SearchConfig::new("", &f).unwrap();
        assert!(scan_all(&config, "hello", f).is_empty());
    }
}

#[test]
fn test_empty_content() {
    let f = filter(false, true, false);
    let config = SearchConfig::new("hello", &f).unwrap();
    assert!(scan_all(&config, "", f).is_empty());
}

#[test]
fn test_expand_back_references() {
    let f = filter(true, true, false);
    let config = SearchConfig::new(r"(\w+) (\w+)", &f).unwrap();
    let content = "John Smith";
    let span = config
        .scan(content, &f, SelectionBounds::UNBOUNDED)
        .next()
        .unwrap();

    assert_eq!(config.expand(content, span, "$2 $1"), "Smith John");
    assert_eq!(config.expand(content, span, "${2}_x"), "Smith_x");
}

#[test]
fn test_expand_literal_is_verbatim() {
    let f = filter(false, true, false);
    let config = SearchConfig::new("a", &f).unwrap();

    assert_eq!(config.expand("a", MatchSpan::new(0, 1), "$1b"), "$1b");
}

#[test]
fn test_is_whole_word_at() {
    let content = "foo_bar baz";
    assert!(!is_whole_word_at(content, MatchSpan::new(0, 3)));
    assert!(is_whole_word_at(content, MatchSpan::new(0, 7)));
    assert!(is_whole_word_at(content, MatchSpan::new(8, 3)));
}
