use std::path::PathBuf;

/// Reasons an icon could not be produced for a path.
///
/// None of these ever reach the caller of `IconResolver::resolve`. They are
/// logged and the resolver moves on to the next strategy or the placeholder.
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("path does not exist: {}", .0.display())]
    PathMissing(PathBuf),

    #[error("{0} strategy produced no icon")]
    StrategyUnavailable(&'static str),

    #[error("decode mismatch: expected {expected} {what}, got {actual}")]
    DecodeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("rasterize failed: {0}")]
    Rasterize(String),
}
