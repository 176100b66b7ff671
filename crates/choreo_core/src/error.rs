//! Resolution error types

use thiserror::Error;

/// Errors raised while resolving an observation target into element handles.
///
/// Resolution failure is the only hard failure in the engine: it surfaces
/// synchronously from `observe` and aborts that registration. Everything
/// downstream (detached elements, missing geometry) degrades to silent
/// suppression instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A selector matched no elements in the host document
    #[error("selector `{0}` matched no elements")]
    NoMatch(String),

    /// The target resolved to an empty element list
    #[error("target resolved to an empty element list")]
    Empty,

    /// The host could not perform the query
    #[error("host resolution failed: {0}")]
    Host(String),
}

/// Result type for resolution operations
pub type Result<T> = std::result::Result<T, ResolveError>;
