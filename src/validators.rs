//! Reusable validation helpers for field parsers.
//!
//! Two shapes are provided. The chainable [`Validator`] checks one raw
//! string through a sequence of rules, first failure wins:
//!
//! ```
//! use formkit::validators::validate;
//!
//! let result = validate("alice")
//!     .required("Required")
//!     .min_length(2, "Too short")
//!     .alphanumeric("Letters and digits only")
//!     .finish();
//! assert!(result.is_ok());
//! ```
//!
//! The free functions below it build complete parsers ready to drop into a
//! [`FieldConfig`](crate::FieldConfig) parser slot.

/// A chain of checks over one raw string. First failing rule wins; later
/// rules are skipped once an error is recorded.
pub struct Validator<'a> {
    value: &'a str,
    error: Option<String>,
}

/// Start a validation chain over a raw string.
pub fn validate(value: &str) -> Validator<'_> {
    Validator { value, error: None }
}

impl<'a> Validator<'a> {
    fn check(mut self, ok: bool, message: &str) -> Self {
        if self.error.is_none() && !ok {
            self.error = Some(message.to_string());
        }
        self
    }

    /// Fail when the trimmed value is empty.
    pub fn required(self, message: &str) -> Self {
        let ok = !self.value.trim().is_empty();
        self.check(ok, message)
    }

    /// Fail when the value has fewer than `min` characters.
    pub fn min_length(self, min: usize, message: &str) -> Self {
        let ok = self.value.chars().count() >= min;
        self.check(ok, message)
    }

    /// Fail when the value has more than `max` characters.
    pub fn max_length(self, max: usize, message: &str) -> Self {
        let ok = self.value.chars().count() <= max;
        self.check(ok, message)
    }

    /// Fail unless every character is alphabetic.
    pub fn alphabetic(self, message: &str) -> Self {
        let ok = !self.value.is_empty() && self.value.chars().all(|c| c.is_alphabetic());
        self.check(ok, message)
    }

    /// Fail unless every character is alphanumeric.
    pub fn alphanumeric(self, message: &str) -> Self {
        let ok = !self.value.is_empty() && self.value.chars().all(|c| c.is_alphanumeric());
        self.check(ok, message)
    }

    /// Fail unless the value parses as an integer.
    pub fn integer(self, message: &str) -> Self {
        let ok = self.value.trim().parse::<i64>().is_ok();
        self.check(ok, message)
    }

    /// Fail unless the value looks like an email address (one `@` with
    /// non-empty local part and a dotted domain).
    pub fn email(self, message: &str) -> Self {
        let ok = match self.value.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            }
            None => false,
        };
        self.check(ok, message)
    }

    /// Fail unless the value matches the pattern.
    ///
    /// With the `regex` feature the pattern is a regular expression;
    /// without it the check degrades to a substring match.
    pub fn matching(self, pattern: &str, message: &str) -> Self {
        let ok = matches_pattern(pattern, self.value);
        self.check(ok, message)
    }

    /// Resolve the chain: `Ok` if every rule passed, otherwise the first
    /// failure's message.
    pub fn finish(self) -> Result<(), String> {
        match self.error {
            Some(message) => Err(message),
            None => Ok(()),
        }
    }
}

#[cfg(feature = "regex")]
fn matches_pattern(pattern: &str, value: &str) -> bool {
    match regex::Regex::new(pattern) {
        Ok(re) => re.is_match(value),
        Err(err) => {
            log::warn!("invalid pattern `{}`: {}", pattern, err);
            false
        }
    }
}

#[cfg(not(feature = "regex"))]
fn matches_pattern(pattern: &str, value: &str) -> bool {
    value.contains(pattern)
}

// ============================================================================
// Ready-made parsers
// ============================================================================

/// A parser that trims the input and rejects the empty string.
pub fn non_empty(message: &str) -> impl Fn(&String) -> Result<String, String> {
    let message = message.to_string();
    move |value: &String| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Err(message.clone())
        } else {
            Ok(trimmed.to_string())
        }
    }
}

/// A parser that accepts integers within an inclusive range.
pub fn int_in_range(
    min: i64,
    max: i64,
    message: &str,
) -> impl Fn(&String) -> Result<i64, String> {
    let message = message.to_string();
    move |value: &String| match value.trim().parse::<i64>() {
        Ok(n) if (min..=max).contains(&n) => Ok(n),
        _ => Err(message.clone()),
    }
}

/// A parser that requires the input to match the pattern, passing the value
/// through untouched. Same `regex`-feature semantics as
/// [`Validator::matching`].
pub fn matching(pattern: &str, message: &str) -> impl Fn(&String) -> Result<String, String> {
    let pattern = pattern.to_string();
    let message = message.to_string();
    move |value: &String| {
        if matches_pattern(&pattern, value) {
            Ok(value.clone())
        } else {
            Err(message.clone())
        }
    }
}

/// A parser that caps the input length, passing the value through untouched.
pub fn max_chars(max: usize, message: &str) -> impl Fn(&String) -> Result<String, String> {
    let message = message.to_string();
    move |value: &String| {
        if value.chars().count() > max {
            Err(message.clone())
        } else {
            Ok(value.clone())
        }
    }
}
