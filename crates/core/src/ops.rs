use serde::{Deserialize, Serialize};

//
// ─── REDUCERS ──────────────────────────────────────────────────────────────────
//
// Each reducer folds left-to-right over one or more operands. An empty slice
// yields the fold identity (0 for sums/differences, 1 for products/quotients).
//

/// Running sum of all operands.
#[must_use]
pub fn add(operands: &[f64]) -> f64 {
    operands.iter().sum()
}

/// `a - b - ...`, starting from the first operand.
#[must_use]
pub fn subtract(operands: &[f64]) -> f64 {
    match operands.split_first() {
        Some((first, rest)) => rest.iter().fold(*first, |acc, v| acc - v),
        None => 0.0,
    }
}

/// Running product of all operands.
#[must_use]
pub fn multiply(operands: &[f64]) -> f64 {
    operands.iter().product()
}

/// `a / b / ...`, starting from the first operand.
///
/// Callers guarantee that no divisor after the first operand is zero.
#[must_use]
pub fn divide(operands: &[f64]) -> f64 {
    match operands.split_first() {
        Some((first, rest)) => rest.iter().fold(*first, |acc, v| acc / v),
        None => 1.0,
    }
}

//
// ─── OPERATOR ──────────────────────────────────────────────────────────────────
//

/// One of the four arithmetic operators a problem can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Symbol used in problem text.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
        }
    }

    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::Add),
            "-" => Some(Self::Subtract),
            "*" => Some(Self::Multiply),
            "/" => Some(Self::Divide),
            _ => None,
        }
    }

    /// Reduce `operands` with this operator's reducer.
    #[must_use]
    pub fn apply(self, operands: &[f64]) -> f64 {
        match self {
            Operator::Add => add(operands),
            Operator::Subtract => subtract(operands),
            Operator::Multiply => multiply(operands),
            Operator::Divide => divide(operands),
        }
    }
}
