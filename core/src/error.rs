//! Error types for route dispatch.
//!
//! # Design
//! Errors are layered by pipeline stage. `FormatError` covers the path
//! template, `BuildError` wraps it together with URL validation, and
//! `Error<E>` adds the executor's own error type and the JSON decode failure.
//! The executor error is kept as-is so callers can match on whatever their
//! transport reports.
//!
//! A payload argument of the wrong kind is not represented here: it is a
//! mismatch between a route's template and its call site, and panics.

use thiserror::Error;

/// Failure while formatting a path template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The template has more conversion specifiers than supplied values.
    #[error("missing value for {spec} (argument {index})")]
    MissingArgument { index: usize, spec: String },

    /// More values were supplied than the template consumes.
    #[error("template consumes {expected} argument(s) but {supplied} were supplied")]
    ExtraArguments { expected: usize, supplied: usize },

    /// The verb cannot render a value of this kind, e.g. `%d` with a string.
    #[error("{spec} cannot format {kind} value (argument {index})")]
    Mismatch {
        index: usize,
        spec: String,
        kind: &'static str,
    },

    #[error("unsupported verb %{verb} at byte {offset}")]
    UnsupportedVerb { verb: char, offset: usize },

    /// A `%` not followed by a conversion verb.
    #[error("missing verb after % at byte {offset}")]
    NoVerb { offset: usize },

    /// A body or header collection was placed where a path value belongs.
    #[error("argument {index} is a {kind}, which cannot be formatted into a path")]
    NotFormattable { index: usize, kind: &'static str },
}

/// Failure while turning a route invocation into an `HttpRequest`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("formatting route path: {0}")]
    Format(#[from] FormatError),

    #[error("invalid request URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Errors returned by [`Route::call`](crate::Route::call) and friends.
#[derive(Debug, Error)]
pub enum Error<E>
where
    E: std::error::Error + 'static,
{
    /// The request could not be constructed; nothing was sent.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The executor failed. The value is exactly what the executor returned.
    #[error(transparent)]
    Execute(E),

    /// The response body is not valid JSON for the declared response type.
    #[error("decoding response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl<E> Error<E>
where
    E: std::error::Error + 'static,
{
    /// The executor's error, if that is what failed.
    pub fn into_execute(self) -> Option<E> {
        match self {
            Error::Execute(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode(_))
    }
}
