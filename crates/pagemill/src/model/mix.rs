//! Interleaving the pages of two documents.
//!
//! Typical use is recombining a duplex scan made as two single-sided passes:
//! fronts in one file and backs, often in reverse order, in the other.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::PageMillError;

/// How many pages each side contributes per round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MixPattern {
    /// One page of A, then one page of B.
    #[default]
    #[serde(rename = "1:1")]
    OneToOne,
    /// Two pages of A, then one page of B.
    #[serde(rename = "2:1")]
    TwoToOne,
    /// One page of A, then two pages of B.
    #[serde(rename = "1:2")]
    OneToTwo,
}

impl MixPattern {
    /// Pages taken from (A, B) per round.
    fn take(self) -> (usize, usize) {
        match self {
            Self::OneToOne => (1, 1),
            Self::TwoToOne => (2, 1),
            Self::OneToTwo => (1, 2),
        }
    }
}

impl FromStr for MixPattern {
    type Err = PageMillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1:1" | "1-1" => Ok(Self::OneToOne),
            "2:1" | "2-1" => Ok(Self::TwoToOne),
            "1:2" | "1-2" => Ok(Self::OneToTwo),
            _ => Err(PageMillError::invalid_config(format!(
                "Invalid mix pattern: {s}. Must be one of: 1:1, 2:1, 1:2"
            ))),
        }
    }
}

/// Options for [`Workspace::mix`](crate::Workspace::mix).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MixOptions {
    /// Interleaving pattern.
    pub pattern: MixPattern,
    /// Reverse the second document before interleaving.
    pub reverse_second: bool,
}

/// Interleave `a` and `b` by `pattern`.
///
/// Rounds continue until both sides are exhausted; a side that runs out
/// simply stops contributing, so the longer side's tail ends up at the end.
pub fn interleave<T>(a: Vec<T>, b: Vec<T>, pattern: MixPattern) -> Vec<T> {
    let (take_a, take_b) = pattern.take();
    let mut mixed = Vec::with_capacity(a.len() + b.len());
    let mut a = a.into_iter().peekable();
    let mut b = b.into_iter().peekable();

    while a.peek().is_some() || b.peek().is_some() {
        mixed.extend(a.by_ref().take(take_a));
        mixed.extend(b.by_ref().take(take_b));
    }

    mixed
}
