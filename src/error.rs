use thiserror::Error;

/// Why a computation finished without a value
///
/// A failure raised by the computation itself is carried unchanged in
/// `Failed`. Drivers never wrap it a second time, so the error a caller sees
/// from [run](crate::executor::run) is the one the innermost computation
/// produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Error<E> {
    #[error("computation failed: {0}")]
    Failed(E),
    /// The computation was cancelled before it finished
    #[error("computation was cancelled")]
    Cancelled,
}

impl<E> Error<E> {
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// The error raised by the computation, or `None` for a cancellation
    pub fn into_failure(self) -> Option<E> {
        match self {
            Error::Failed(error) => Some(error),
            Error::Cancelled => None,
        }
    }
}

/// An integer range was defined with a step of zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("range step cannot be zero")]
pub struct ZeroStepError;
