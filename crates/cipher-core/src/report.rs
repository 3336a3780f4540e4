//! Failure reporting for the `Option`-returning entry points

use std::fmt;
use std::panic::Location;

use tracing::error;

use crate::error::CipherError;

/// Which public operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Keygen,
    Encrypt,
    Decrypt,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Keygen => "keygen",
            Self::Encrypt => "encrypt",
            Self::Decrypt => "decrypt",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A failure handed to an [`ErrorReporter`]
#[derive(Debug)]
pub struct Failure<'a> {
    pub operation: Operation,
    pub error: &'a CipherError,
    /// Call site of the failing operation
    pub location: &'static Location<'static>,
}

impl fmt::Display for Failure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "An error occurred while performing this operation because of {} in function \"{}\" at {}:{}",
            self.error,
            self.operation,
            self.location.file(),
            self.location.line()
        )
    }
}

/// Sink for failures that are not returned to the caller
pub trait ErrorReporter: Send + Sync {
    fn report(&self, failure: &Failure<'_>);
}

impl<R: ErrorReporter + ?Sized> ErrorReporter for &R {
    fn report(&self, failure: &Failure<'_>) {
        (**self).report(failure)
    }
}

/// Reports through `tracing` at error level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, failure: &Failure<'_>) {
        error!(
            operation = failure.operation.name(),
            stage = ?failure.error.stage(),
            file = failure.location.file(),
            line = failure.location.line(),
            "{}",
            failure
        );
    }
}
