//! Cardinality verification: pass a collection through if its size matches.
//!
//! Verification never retries. To retry until the count matches, run the
//! producer and the check together as one retried operation
//! ([`call_verified`] does exactly that).

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use crate::matcher::CountMatcher;
use crate::retry::{self, RetryInterrupted, RetryStrategyFactory};

/// The collection size did not satisfy the expected matcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Expected {expected} {unit}(s), but found {actual} {unit}(s)")]
pub struct CardinalityError {
    /// Description of the expected matcher, e.g. `exactly 2`.
    pub expected: String,
    /// Size of the collection that was checked.
    pub actual: usize,
    /// What was counted, e.g. `row`.
    pub unit: String,
}

/// Collections whose size can be verified.
pub trait Counted {
    fn count(&self) -> usize;
}

impl<T> Counted for Vec<T> {
    fn count(&self) -> usize {
        self.len()
    }
}

impl<T> Counted for [T] {
    fn count(&self) -> usize {
        self.len()
    }
}

impl<T, const N: usize> Counted for [T; N] {
    fn count(&self) -> usize {
        N
    }
}

impl<T> Counted for VecDeque<T> {
    fn count(&self) -> usize {
        self.len()
    }
}

impl<K, V> Counted for BTreeMap<K, V> {
    fn count(&self) -> usize {
        self.len()
    }
}

impl<T> Counted for BTreeSet<T> {
    fn count(&self) -> usize {
        self.len()
    }
}

impl<K, V, S> Counted for HashMap<K, V, S> {
    fn count(&self) -> usize {
        self.len()
    }
}

impl<T, S> Counted for HashSet<T, S> {
    fn count(&self) -> usize {
        self.len()
    }
}

impl<C: Counted + ?Sized> Counted for &C {
    fn count(&self) -> usize {
        (**self).count()
    }
}

/// Returns `results` unchanged if `matcher` accepts their count.
///
/// `unit` names what was counted ("row", "HTML element") and appears in the
/// error message.
pub fn verify<C: Counted>(
    results: C,
    matcher: &CountMatcher,
    unit: &str,
) -> Result<C, CardinalityError> {
    let actual = results.count();
    if matcher.is_match(actual) {
        return Ok(results);
    }
    Err(CardinalityError {
        expected: matcher.describe(),
        actual,
        unit: unit.to_string(),
    })
}

/// Produces results and verifies their count, retrying both together under
/// `factory` until the count matches or retries run out.
///
/// Producer errors and cardinality mismatches are retried alike; the error of
/// the last attempt is returned.
pub fn call_verified<S, F, C, E>(
    factory: &S,
    matcher: &CountMatcher,
    unit: &str,
    mut produce: F,
) -> Result<C, E>
where
    S: RetryStrategyFactory + ?Sized,
    F: FnMut() -> Result<C, E>,
    C: Counted,
    E: From<CardinalityError> + From<RetryInterrupted>,
{
    retry::call(factory, || -> Result<C, E> {
        let results = produce()?;
        Ok(verify(results, matcher, unit)?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::{RetryPolicy, Sleeper};
    use std::sync::Arc;
    use std::time::Duration;

    struct NoSleep;

    impl Sleeper for NoSleep {
        fn sleep(&self, _: Duration) -> Result<(), RetryInterrupted> {
            Ok(())
        }
    }

    #[test]
    fn matching_count_passes_results_through() {
        let rows = vec!["a", "b"];
        let out = verify(rows, &CountMatcher::exactly(2), "row").unwrap();
        assert_eq!(out, vec!["a", "b"]);
    }

    #[test]
    fn mismatch_names_expectation_and_actual() {
        let err = verify(vec!["a", "b", "c"], &CountMatcher::exactly(2), "row").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("exactly 2"), "{msg}");
        assert!(msg.contains("found 3"), "{msg}");
        assert_eq!(msg, "Expected exactly 2 row(s), but found 3 row(s)");
        assert_eq!(err.actual, 3);
        assert_eq!(err.expected, "exactly 2");
    }

    #[test]
    fn negated_at_least_one_accepts_empty() {
        let empty: Vec<u8> = Vec::new();
        let out = verify(empty, &CountMatcher::at_least(1).not(), "row").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn compound_description_is_verbatim() {
        let m = CountMatcher::at_least(1).and(CountMatcher::exactly(3).not());
        let err = verify(&[1, 2, 3][..], &m, "HTML element").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected (at least 1) and (not exactly 3) HTML element(s), but found 3 HTML element(s)"
        );
    }

    #[test]
    fn borrowed_and_keyed_collections() {
        let v = vec![1, 2];
        let borrowed = verify(&v, &CountMatcher::exactly(2), "row").unwrap();
        assert_eq!(borrowed.len(), 2);

        let mut m = HashMap::new();
        m.insert("k", 1);
        assert!(verify(m, &CountMatcher::EXACTLY_ONE, "entry").is_ok());
        assert!(verify([0u8; 4], &CountMatcher::at_least(5), "byte").is_err());
    }

    #[derive(Debug, PartialEq)]
    enum QueryError {
        Cardinality(CardinalityError),
        Interrupted,
    }

    impl From<CardinalityError> for QueryError {
        fn from(e: CardinalityError) -> Self {
            QueryError::Cardinality(e)
        }
    }

    impl From<RetryInterrupted> for QueryError {
        fn from(_: RetryInterrupted) -> Self {
            QueryError::Interrupted
        }
    }

    #[test]
    fn call_verified_retries_until_count_matches() {
        let p = RetryPolicy::new(3, Duration::from_millis(1))
            .unwrap()
            .with_sleeper(Arc::new(NoSleep));
        let mut polls = 0usize;
        let rows: Result<Vec<usize>, QueryError> =
            call_verified(&p, &CountMatcher::exactly(3), "row", || {
                polls += 1;
                Ok((0..polls).collect())
            });
        assert_eq!(rows, Ok(vec![0, 1, 2]));
        assert_eq!(polls, 3);
    }

    #[test]
    fn call_verified_returns_last_mismatch() {
        let p = RetryPolicy::new(1, Duration::from_millis(1))
            .unwrap()
            .with_sleeper(Arc::new(NoSleep));
        let rows: Result<Vec<u8>, QueryError> =
            call_verified(&p, &CountMatcher::at_least(1), "row", || Ok(Vec::new()));
        match rows {
            Err(QueryError::Cardinality(e)) => assert_eq!(e.actual, 0),
            other => panic!("unexpected {other:?}"),
        }
    }
}
