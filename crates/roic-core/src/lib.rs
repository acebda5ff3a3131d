pub mod error;
pub mod roic;
pub mod types;

#[cfg(feature = "statements")]
pub mod statements;

#[cfg(feature = "batch")]
pub mod batch;

#[cfg(feature = "scenarios")]
pub mod scenarios;

pub use error::RoicError;
pub use types::*;

/// Standard result type for all fallible ROIC operations
pub type CoreResult<T> = Result<T, RoicError>;
