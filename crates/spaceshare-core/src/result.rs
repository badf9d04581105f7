//! Convenience result type alias for SpaceShare.

use crate::error::AppError;

/// A specialized `Result` type for SpaceShare operations.
pub type AppResult<T> = Result<T, AppError>;
