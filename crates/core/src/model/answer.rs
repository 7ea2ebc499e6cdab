use std::str::FromStr;

use thiserror::Error;

/// Decimal places two values must agree on to count as the same answer.
pub const ANSWER_PRECISION: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("answer is not a number: {raw:?}")]
    Malformed { raw: String },
}

/// A numeric answer submitted by a learner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Answer(f64);

impl Answer {
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl FromStr for Answer {
    type Err = AnswerError;

    /// Parses trimmed decimal input. `NaN` and infinities are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || AnswerError::Malformed { raw: s.to_owned() };
        let value: f64 = s.trim().parse().map_err(|_| malformed())?;
        if !value.is_finite() {
            return Err(malformed());
        }
        Ok(Self(value))
    }
}

/// Renders `value` rounded to [`ANSWER_PRECISION`] places.
///
/// A rounded negative zero renders as `0.000`.
#[must_use]
pub fn rounded_key(value: f64) -> String {
    let rendered = format!("{value:.ANSWER_PRECISION$}");
    match rendered.strip_prefix('-') {
        Some(rest) if rest.bytes().all(|b| b == b'0' || b == b'.') => rest.to_owned(),
        _ => rendered,
    }
}

/// True when both values round to the same 3-decimal rendering.
///
/// Rounding works on the exact binary value, so an answer a half step away
/// from the solution may land on either side: `7.0005` matches `7.0` while
/// `12.0005` renders as `12.001` and does not match `12.0`.
#[must_use]
pub fn answers_match(answer: f64, solution: f64) -> bool {
    rounded_key(answer) == rounded_key(solution)
}
