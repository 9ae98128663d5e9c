//! The tri-state fill result and its combination rules.
//!
//! Filling a form yields one of three states: a parsed output, a structured
//! error set, or no determination at all. The third state is how empty
//! optional sections and decorative content opt out of both success and
//! failure; it must never be conflated with success when combined with a
//! sibling error.

use crate::error::ErrorSet;

/// The outcome of filling a form or field against current dirty values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FillResult<O> {
    /// Every field validated; here is the parsed output.
    Ok(O),
    /// At least one field failed. The set always carries a designated first
    /// error in composition order.
    Err(ErrorSet),
    /// No determination was made. Produced by degenerate forms and custom
    /// content; a well-formed top-level form never resolves to this.
    Undetermined,
}

impl<O> FillResult<O> {
    /// Map the success value, passing errors and non-determination through.
    pub fn map<T>(self, f: impl FnOnce(O) -> T) -> FillResult<T> {
        match self {
            FillResult::Ok(o) => FillResult::Ok(f(o)),
            FillResult::Err(e) => FillResult::Err(e),
            FillResult::Undetermined => FillResult::Undetermined,
        }
    }

    /// Combine with a later-composed result.
    ///
    /// Errors dominate and accumulate (this side's first error stays
    /// first); non-determination dominates success but loses to errors; the
    /// combiner runs only when both sides succeeded.
    pub fn zip_with<B, T>(
        self,
        later: FillResult<B>,
        f: impl FnOnce(O, B) -> T,
    ) -> FillResult<T> {
        match (self, later) {
            (FillResult::Err(e1), FillResult::Err(e2)) => FillResult::Err(e1.join(e2)),
            (FillResult::Err(e), _) => FillResult::Err(e),
            (_, FillResult::Err(e)) => FillResult::Err(e),
            (FillResult::Undetermined, _) | (_, FillResult::Undetermined) => {
                FillResult::Undetermined
            }
            (FillResult::Ok(a), FillResult::Ok(b)) => FillResult::Ok(f(a, b)),
        }
    }

    /// Three-way combination with the same accumulation rules as
    /// [`zip_with`].
    ///
    /// [`zip_with`]: FillResult::zip_with
    pub fn zip3_with<B, C, T>(
        self,
        b: FillResult<B>,
        c: FillResult<C>,
        f: impl FnOnce(O, B, C) -> T,
    ) -> FillResult<T> {
        self.zip_with(b, |a, b| (a, b))
            .zip_with(c, |(a, b), c| f(a, b, c))
    }

    /// Whether this is a success.
    pub fn is_ok(&self) -> bool {
        matches!(self, FillResult::Ok(_))
    }

    /// Whether this is an error.
    pub fn is_err(&self) -> bool {
        matches!(self, FillResult::Err(_))
    }

    /// Whether no determination was made.
    pub fn is_undetermined(&self) -> bool {
        matches!(self, FillResult::Undetermined)
    }

    /// The success value, if any.
    pub fn ok(self) -> Option<O> {
        match self {
            FillResult::Ok(o) => Some(o),
            _ => None,
        }
    }

    /// The error set, if this is an error.
    pub fn errors(&self) -> Option<&ErrorSet> {
        match self {
            FillResult::Err(e) => Some(e),
            _ => None,
        }
    }
}
