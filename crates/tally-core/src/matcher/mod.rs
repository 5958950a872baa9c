//! Cardinality matchers.
//!
//! A `CountMatcher` is an immutable predicate over the size of a collection
//! (rows returned by a query, elements found on a page, lines printed by a
//! process). Matchers compose with `and` / `or` / `not` and render a canonical
//! description that is used verbatim in cardinality errors and parses back
//! into an equal matcher.

mod parse;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops;

pub use parse::ParseMatcherError;

/// Predicate over a non-negative count.
///
/// Counts are `usize`, so negative input cannot be expressed.
///
/// Build negations through [`CountMatcher::not`] rather than the `Not`
/// variant directly: the combinator unwraps double negation, so a matcher
/// built through the public combinators never nests two `Not` nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CountMatcher {
    /// Matches every count.
    Any,
    /// Matches exactly this count.
    Exactly(usize),
    /// Matches this count or more.
    AtLeast(usize),
    /// Both sides must match.
    And(Box<CountMatcher>, Box<CountMatcher>),
    /// Either side may match.
    Or(Box<CountMatcher>, Box<CountMatcher>),
    /// Inverts the delegate.
    Not(Box<CountMatcher>),
}

impl CountMatcher {
    /// Matches any count, including zero.
    pub const ANY: CountMatcher = CountMatcher::Any;

    /// Matches a count of exactly one.
    pub const EXACTLY_ONE: CountMatcher = CountMatcher::Exactly(1);

    pub fn any() -> Self {
        CountMatcher::Any
    }

    pub fn exactly(exact: usize) -> Self {
        CountMatcher::Exactly(exact)
    }

    pub fn at_least(min: usize) -> Self {
        CountMatcher::AtLeast(min)
    }

    /// Returns true if `count` satisfies this matcher.
    pub fn is_match(&self, count: usize) -> bool {
        match self {
            CountMatcher::Any => true,
            CountMatcher::Exactly(exact) => count == *exact,
            CountMatcher::AtLeast(min) => count >= *min,
            CountMatcher::And(left, right) => left.is_match(count) && right.is_match(count),
            CountMatcher::Or(left, right) => left.is_match(count) || right.is_match(count),
            CountMatcher::Not(delegate) => !delegate.is_match(count),
        }
    }

    /// `(self) and (other)`. No simplification is applied.
    pub fn and(self, other: CountMatcher) -> Self {
        CountMatcher::And(Box::new(self), Box::new(other))
    }

    /// `(self) or (other)`. No simplification is applied.
    pub fn or(self, other: CountMatcher) -> Self {
        CountMatcher::Or(Box::new(self), Box::new(other))
    }

    /// Negation. Negating a `Not` hands back its delegate (the same value that
    /// was wrapped) instead of stacking another `Not`.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        match self {
            CountMatcher::Not(delegate) => *delegate,
            other => CountMatcher::Not(Box::new(other)),
        }
    }

    /// Canonical human-readable description, e.g. `"(at least 1) and (not exactly 3)"`.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CountMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountMatcher::Any => write!(f, "any count"),
            CountMatcher::Exactly(exact) => write!(f, "exactly {}", exact),
            CountMatcher::AtLeast(min) => write!(f, "at least {}", min),
            CountMatcher::And(left, right) => write!(f, "({}) and ({})", left, right),
            CountMatcher::Or(left, right) => write!(f, "({}) or ({})", left, right),
            CountMatcher::Not(delegate) => write!(f, "not {}", delegate),
        }
    }
}

impl ops::BitAnd for CountMatcher {
    type Output = CountMatcher;

    fn bitand(self, rhs: CountMatcher) -> CountMatcher {
        self.and(rhs)
    }
}

impl ops::BitOr for CountMatcher {
    type Output = CountMatcher;

    fn bitor(self, rhs: CountMatcher) -> CountMatcher {
        self.or(rhs)
    }
}

impl ops::Not for CountMatcher {
    type Output = CountMatcher;

    fn not(self) -> CountMatcher {
        CountMatcher::not(self)
    }
}

impl From<CountMatcher> for String {
    fn from(m: CountMatcher) -> String {
        m.to_string()
    }
}

impl TryFrom<String> for CountMatcher {
    type Error = ParseMatcherError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
