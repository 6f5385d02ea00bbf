//! Pluggable error handling.
//!
//! Every parse error is reported to the configured [`ErrorHandler`]. For alias
//! circular references the returned [`Disposition`] decides whether the parse
//! aborts or continues with the unexpanded tokens; validation errors always end
//! the parse, the handler only observes them.

use std::sync::Mutex;

use crate::error::ParseError;

/// What the caller of an [`ErrorHandler`] should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Recover where the failing layer allows it.
    Continue,
    /// Stop and surface the error.
    Abort,
}

/// Receives parse errors.
///
/// Implemented for plain closures:
///
/// ```
/// use cmdtree_core::{Disposition, ErrorHandler, ParseError};
///
/// let lenient = |_: &ParseError| Disposition::Continue;
/// assert_eq!(lenient.handle(&ParseError::CommandMissing), Disposition::Continue);
/// ```
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, error: &ParseError) -> Disposition;
}

impl<F> ErrorHandler for F
where
    F: Fn(&ParseError) -> Disposition + Send + Sync,
{
    fn handle(&self, error: &ParseError) -> Disposition {
        self(error)
    }
}

/// Aborts on every error. The default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailFast;

impl ErrorHandler for FailFast {
    fn handle(&self, _error: &ParseError) -> Disposition {
        Disposition::Abort
    }
}

/// Records every error and asks to continue.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{CollectAll, Disposition, ErrorHandler, ParseError};
///
/// let handler = CollectAll::new();
/// assert_eq!(handler.handle(&ParseError::CommandMissing), Disposition::Continue);
/// assert_eq!(handler.take_errors(), vec![ParseError::CommandMissing]);
/// assert!(handler.errors().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct CollectAll {
    errors: Mutex<Vec<ParseError>>,
}

impl CollectAll {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the errors recorded so far.
    pub fn errors(&self) -> Vec<ParseError> {
        match self.errors.lock() {
            Ok(errors) => errors.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Removes and returns the errors recorded so far.
    pub fn take_errors(&self) -> Vec<ParseError> {
        match self.errors.lock() {
            Ok(mut errors) => std::mem::take(&mut *errors),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl ErrorHandler for CollectAll {
    fn handle(&self, error: &ParseError) -> Disposition {
        match self.errors.lock() {
            Ok(mut errors) => errors.push(error.clone()),
            Err(poisoned) => poisoned.into_inner().push(error.clone()),
        }
        Disposition::Continue
    }
}
