//! Service ports: traits + data contracts.

pub mod find;
pub mod settings;

pub use find::{
    ErrorSink, FileProvider, FilterOptions, FindError, FindMessage, FindRequest, MatchSpan,
    ProgressMonitor, Result as FindResult, Scope, SearchResult, SelectionBounds,
};
pub use settings::{FindSettings, DEFAULT_PROGRESS_STEPS};
