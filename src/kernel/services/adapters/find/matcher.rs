//! 模式匹配
//!
//! - Literal 模式：memchr Finder 正向扫描（大小写不敏感时用转义后的 regex 做 Unicode case folding）
//! - Regex 模式：全文 find_iter，再按选区过滤
//!
//! 两种模式都是先按选区过滤、再做整词过滤。

use crate::kernel::services::ports::find::{FilterOptions, MatchSpan, Result, SelectionBounds};
use memchr::memmem::Finder;
use regex::{Regex, RegexBuilder};

/// 编译好的搜索配置，每次调用只编译一次，之后只读地被所有 worker 共享
pub enum SearchConfig {
    Literal {
        pattern: String,
        finder: LiteralFinder,
    },
    Regex {
        regex: Regex,
    },
}

pub enum LiteralFinder {
    Exact(Finder<'static>),
    Folded(Regex),
}

impl LiteralFinder {
    /// 返回 (相对 offset, 匹配长度)
    fn find(&self, haystack: &str) -> Option<(usize, usize)> {
        match self {
            Self::Exact(finder) => finder
                .find(haystack.as_bytes())
                .map(|pos| (pos, finder.needle().len())),
            Self::Folded(regex) => regex.find(haystack).map(|m| (m.start(), m.len())),
        }
    }
}

impl SearchConfig {
    pub fn new(pattern: &str, filter: &FilterOptions) -> Result<Self> {
        if filter.regex_search {
            Self::regex(pattern, filter.case_sensitive)
        } else {
            Ok(Self::literal(pattern, filter.case_sensitive))
        }
    }

    pub fn literal(pattern: &str, case_sensitive: bool) -> Self {
        let exact = || LiteralFinder::Exact(Finder::new(pattern.as_bytes()).into_owned());
        let finder = if case_sensitive || pattern.is_empty() {
            exact()
        } else {
            RegexBuilder::new(&regex::escape(pattern))
                .case_insensitive(true)
                .build()
                .map(LiteralFinder::Folded)
                .unwrap_or_else(|_| exact())
        };

        Self::Literal {
            pattern: pattern.to_string(),
            finder,
        }
    }

    pub fn regex(pattern: &str, case_sensitive: bool) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .build()?;
        Ok(Self::Regex { regex })
    }

    /// 只校验，不保留编译结果
    pub fn validate(pattern: &str, filter: &FilterOptions) -> Result<()> {
        if filter.regex_search {
            Regex::new(pattern)?;
        }
        Ok(())
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, Self::Regex { .. })
    }

    pub fn is_empty_pattern(&self) -> bool {
        match self {
            Self::Literal { pattern, .. } => pattern.is_empty(),
            Self::Regex { regex } => regex.as_str().is_empty(),
        }
    }

    /// 惰性扫描，不修改任何内容
    pub fn scan<'a>(
        &'a self,
        content: &'a str,
        filter: &FilterOptions,
        bounds: SelectionBounds,
    ) -> Matches<'a> {
        if content.is_empty() || self.is_empty_pattern() {
            return Matches::Empty;
        }

        let whole_word = filter.whole_words_only;
        match self {
            Self::Literal { finder, .. } => {
                let (cursor, end) = clamp_bounds(content, bounds);
                Matches::Literal(LiteralMatches {
                    content,
                    finder,
                    cursor,
                    end,
                    whole_word,
                })
            }
            Self::Regex { regex } => Matches::Regex(RegexMatches {
                content,
                inner: regex.find_iter(content),
                bounds,
                whole_word,
            }),
        }
    }

    /// 展开替换模板：Regex 支持 `$1` / `${name}` 反向引用，Literal 原样替换
    pub fn expand(&self, content: &str, span: MatchSpan, template: &str) -> String {
        let Self::Regex { regex } = self else {
            return template.to_string();
        };

        match regex.captures_at(content, span.offset) {
            Some(caps) if caps.get(0).is_some_and(|m| m.start() == span.offset) => {
                let mut dst = String::with_capacity(template.len());
                caps.expand(template, &mut dst);
                dst
            }
            _ => template.to_string(),
        }
    }
}

pub enum Matches<'a> {
    Empty,
    Literal(LiteralMatches<'a>),
    Regex(RegexMatches<'a>),
}

impl Iterator for Matches<'_> {
    type Item = MatchSpan;

    fn next(&mut self) -> Option<MatchSpan> {
        match self {
            Self::Empty => None,
            Self::Literal(it) => it.next(),
            Self::Regex(it) => it.next(),
        }
    }
}

pub struct LiteralMatches<'a> {
    content: &'a str,
    finder: &'a LiteralFinder,
    cursor: usize,
    end: usize,
    whole_word: bool,
}

impl Iterator for LiteralMatches<'_> {
    type Item = MatchSpan;

    fn next(&mut self) -> Option<MatchSpan> {
        while self.cursor < self.end {
            let window = &self.content[self.cursor..self.end];
            let (pos, len) = self.finder.find(window)?;
            let span = MatchSpan::new(self.cursor + pos, len);

            // 跳过整个匹配长度，不产生重叠匹配
            self.cursor = span.end().max(self.cursor + 1);
            while !self.content.is_char_boundary(self.cursor) {
                self.cursor += 1;
            }

            if !self.whole_word || is_whole_word_at(self.content, span) {
                return Some(span);
            }
        }
        None
    }
}

pub struct RegexMatches<'a> {
    content: &'a str,
    inner: regex::Matches<'a, 'a>,
    bounds: SelectionBounds,
    whole_word: bool,
}

impl Iterator for RegexMatches<'_> {
    type Item = MatchSpan;

    fn next(&mut self) -> Option<MatchSpan> {
        for m in self.inner.by_ref() {
            let span = MatchSpan::new(m.start(), m.len());
            if self.bounds.end.is_some_and(|end| span.offset > end) {
                return None;
            }
            if !self.bounds.contains(span) {
                continue;
            }
            if !self.whole_word || is_whole_word_at(self.content, span) {
                return Some(span);
            }
        }
        None
    }
}

#[inline]
pub fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

/// `[offset, offset+length)` 两侧（若存在）都不是单词字符；内容边界视为满足
pub fn is_whole_word_at(content: &str, span: MatchSpan) -> bool {
    let before = content
        .get(..span.offset)
        .and_then(|s| s.chars().next_back());
    let after = content.get(span.end()..).and_then(|s| s.chars().next());

    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// 把选区收敛到合法的 char 边界：start 向后取整，end 向前取整
fn clamp_bounds(content: &str, bounds: SelectionBounds) -> (usize, usize) {
    let len = content.len();

    let mut start = bounds.start.unwrap_or(0).min(len);
    while !content.is_char_boundary(start) {
        start += 1;
    }

    let mut end = bounds.end.unwrap_or(len).min(len);
    while !content.is_char_boundary(end) {
        end -= 1;
    }

    (start, end.max(start))
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/find/matcher.rs"]
mod tests;
