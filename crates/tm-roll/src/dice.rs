//! Inline dice expressions.
//!
//! Entries may embed `{2d6}`, `{d20+3}`, `{1d20>15}` style expressions.
//! A roll replaces the braces with `expr: total`, or `total: true|false`
//! when a comparison is present. Brace text that does not parse as dice
//! is ordinary prose and is left alone.

use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;

/// Comparison operator in a dice expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Total must exceed the right-hand side.
    Over,
    /// Total must fall below the right-hand side.
    Under,
}

/// A parsed dice expression: `NdS`, optional `+K`/`-K` modifier,
/// optional `>T`/`<T` comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceExpr {
    /// Number of dice, 1..=1000.
    pub count: u32,
    /// Sides per die, at least 2.
    pub sides: u32,
    /// Flat modifier added to the total.
    pub modifier: i32,
    /// Optional comparison against the total.
    pub comparison: Option<(Comparison, i64)>,
}

impl DiceExpr {
    /// Parse an expression like `2d6`, `d20+3` or `3d8-1>12`.
    /// Returns `None` for anything that is not dice notation.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        let (core, comparison) = match text.find(['>', '<']) {
            Some(i) => {
                let rhs: i64 = text[i + 1..].trim().parse().ok()?;
                let op = if text.as_bytes()[i] == b'>' {
                    Comparison::Over
                } else {
                    Comparison::Under
                };
                (text[..i].trim(), Some((op, rhs)))
            }
            None => (text, None),
        };

        let (count_part, rest) = core.split_once(['d', 'D'])?;
        let count: u32 = if count_part.trim().is_empty() {
            1
        } else {
            count_part.trim().parse().ok()?
        };

        let (sides_part, modifier) = match rest.find(['+', '-']) {
            Some(i) => (rest[..i].trim(), rest[i..].trim().parse().ok()?),
            None => (rest.trim(), 0),
        };
        let sides: u32 = sides_part.parse().ok()?;

        if count == 0 || count > 1000 || sides < 2 {
            return None;
        }

        Some(Self {
            count,
            sides,
            modifier,
            comparison,
        })
    }

    /// Roll the dice and return the modified total.
    pub fn roll(&self, rng: &mut StdRng) -> i64 {
        let mut total: i64 = 0;
        for _ in 0..self.count {
            total += i64::from(rng.random_range(1..=self.sides));
        }
        total + i64::from(self.modifier)
    }

    /// Render a rolled total the way it is spliced into entry text.
    pub fn render(&self, total: i64) -> String {
        match self.comparison {
            None => format!("{self}: {total}"),
            Some((Comparison::Over, rhs)) => format!("{total}: {}", total > rhs),
            Some((Comparison::Under, rhs)) => format!("{total}: {}", total < rhs),
        }
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if self.modifier != 0 {
            write!(f, "{:+}", self.modifier)?;
        }
        Ok(())
    }
}
