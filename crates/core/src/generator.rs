use rand::Rng;

use crate::ops::Operator;

//
// ─── RANDOM SOURCE ─────────────────────────────────────────────────────────────
//

/// Source of the random choices made while generating a problem.
///
/// Every `rand::Rng` is an `OperandSource`; tests can substitute
/// [`ScriptedOperands`] to pin the exact operands.
pub trait OperandSource {
    /// Uniform integer in `low..=high`.
    fn draw(&mut self, low: u32, high: u32) -> u32;

    /// Uniform index in `0..len`. `len` is always at least 1.
    fn pick(&mut self, len: usize) -> usize;
}

impl<R: Rng> OperandSource for R {
    fn draw(&mut self, low: u32, high: u32) -> u32 {
        self.random_range(low..=high)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.random_range(0..len)
    }
}

/// Fixed-sequence operand source.
///
/// Values are replayed in order and wrap around when exhausted. Draws are
/// clamped into the requested range and picks are taken modulo `len`, so a
/// script can never push a tier outside its operand bounds.
#[derive(Debug, Clone)]
pub struct ScriptedOperands {
    values: Vec<u32>,
    cursor: usize,
}

impl ScriptedOperands {
    #[must_use]
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    fn next_value(&mut self) -> u32 {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

impl OperandSource for ScriptedOperands {
    fn draw(&mut self, low: u32, high: u32) -> u32 {
        self.next_value().clamp(low, high)
    }

    fn pick(&mut self, len: usize) -> usize {
        usize::try_from(self.next_value()).unwrap_or(0) % len.max(1)
    }
}

//
// ─── TIER RULES ────────────────────────────────────────────────────────────────
//

/// Post-processing applied to the two drawn operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// Display operands as drawn.
    Plain,
    /// Display the larger operand first.
    LargerFirst,
    /// Display `left * right` over `right` so the quotient is `left`.
    WholeQuotient,
}

#[derive(Debug, Clone, Copy)]
struct TierRule {
    operators: &'static [Operator],
    left: (u32, u32),
    right: (u32, u32),
    shape: Shape,
}

const TIERS: [TierRule; 7] = [
    TierRule {
        operators: &[Operator::Add, Operator::Subtract],
        left: (0, 12),
        right: (0, 12),
        shape: Shape::LargerFirst,
    },
    TierRule {
        operators: &[Operator::Multiply],
        left: (0, 12),
        right: (0, 12),
        shape: Shape::Plain,
    },
    TierRule {
        operators: &[Operator::Divide],
        left: (1, 12),
        right: (1, 12),
        shape: Shape::WholeQuotient,
    },
    TierRule {
        operators: &[Operator::Add],
        left: (10, 300),
        right: (1, 50),
        shape: Shape::Plain,
    },
    TierRule {
        operators: &[Operator::Subtract],
        left: (10, 300),
        right: (1, 50),
        shape: Shape::LargerFirst,
    },
    TierRule {
        operators: &[Operator::Multiply],
        left: (10, 150),
        right: (1, 12),
        shape: Shape::Plain,
    },
    TierRule {
        operators: &[Operator::Divide],
        left: (10, 400),
        right: (1, 20),
        shape: Shape::WholeQuotient,
    },
];

/// Highest difficulty tier.
pub const MAX_TIER: u32 = 7;

/// Index into the tier table for a requested difficulty.
///
/// Anything outside `1..=7` falls back to tier 1.
#[must_use]
pub fn tier_index(difficulty: u32) -> usize {
    match difficulty {
        1..=MAX_TIER => usize::try_from(difficulty - 1).unwrap_or(0),
        _ => 0,
    }
}

//
// ─── GENERATION ────────────────────────────────────────────────────────────────
//

/// A freshly generated problem and its exact solution.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedProblem {
    pub text: String,
    pub solution: f64,
    pub left: u32,
    pub operator: Operator,
    pub right: u32,
}

impl GeneratedProblem {
    fn new(left: u32, operator: Operator, right: u32) -> Self {
        Self {
            text: format!("{left} {} {right}", operator.symbol()),
            solution: operator.apply(&[f64::from(left), f64::from(right)]),
            left,
            operator,
            right,
        }
    }
}

/// Generate a problem for `difficulty`.
///
/// Draw order is left operand, right operand, then the operator (only
/// consulted when the tier offers more than one).
pub fn generate<S>(difficulty: u32, source: &mut S) -> GeneratedProblem
where
    S: OperandSource + ?Sized,
{
    let rule = &TIERS[tier_index(difficulty)];

    let a = source.draw(rule.left.0, rule.left.1);
    let b = source.draw(rule.right.0, rule.right.1);

    let operator = match rule.operators {
        [only] => *only,
        many => many[source.pick(many.len()) % many.len()],
    };

    let (left, right) = match rule.shape {
        Shape::Plain => (a, b),
        Shape::LargerFirst => (a.max(b), a.min(b)),
        Shape::WholeQuotient => (a * b, b),
    };

    GeneratedProblem::new(left, operator, right)
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Coarse difficulty label shown next to a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Easy,
    Medium,
    Hard,
}

impl Band {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Band::Easy => "Easy",
            Band::Medium => "Medium",
            Band::Hard => "Hard",
        }
    }
}

/// Display metadata for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierInfo {
    pub level: u32,
    pub title: &'static str,
    pub band: Band,
    pub points: u32,
}

/// Points awarded for solving a problem of the given difficulty.
///
/// Unknown difficulties are worth nothing.
#[must_use]
pub fn point_value_for(difficulty: u32) -> u32 {
    match difficulty {
        1..=3 => 1,
        4..=6 => 3,
        7 => 5,
        _ => 0,
    }
}

/// All tiers in ascending order.
#[must_use]
pub fn tier_catalog() -> [TierInfo; 7] {
    const TITLES: [(&str, Band); 7] = [
        ("Simple Addition/Subtraction", Band::Easy),
        ("Multiplication (Times Tables)", Band::Easy),
        ("Simple Division", Band::Easy),
        ("Bigger Addition", Band::Medium),
        ("Bigger Subtraction", Band::Medium),
        ("Multiplication", Band::Medium),
        ("Division", Band::Hard),
    ];

    let mut level = 0;
    TITLES.map(|(title, band)| {
        level += 1;
        TierInfo {
            level,
            title,
            band,
            points: point_value_for(level),
        }
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
