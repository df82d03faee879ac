use thiserror::Error;

/// Failures reported by the guarded `try_*` entry points of [`crate::Observable`].
///
/// The plain operations (`set`, `signal`, `observe`, ...) never produce these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ObservableError {
    #[error("observable is already delivering a value; nested delivery refused")]
    Reentrant,
}

pub type Result<T, E = ObservableError> = std::result::Result<T, E>;
