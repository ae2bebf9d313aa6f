use thiserror::Error;

/// Reasons a pixel format could not be chosen.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum SelectError {
    /// The platform offered nothing, or nothing it offered can render to a window.
    ///
    /// Enumeration is deterministic, so asking again with the same inputs cannot succeed. The surface
    /// has to be given up on.
    #[error("no compatible pixel format among {candidates} candidate(s)")]
    NoCompatibleFormat { candidates: usize },
}
