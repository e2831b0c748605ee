//! Edge cases: curated boundary values contributed independently of randomness.

use std::sync::Arc;

use crate::shrinkable::{Generated, Shrinkable};

/// Ordered, finite set of edge case shrinkables
pub struct EdgeCases<T> {
    cases: Vec<Shrinkable<T>>,
}

impl<T> Clone for EdgeCases<T> {
    fn clone(&self) -> Self {
        Self {
            cases: self.cases.clone(),
        }
    }
}

impl<T: Generated> Default for EdgeCases<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T: Generated> EdgeCases<T> {
    pub fn none() -> Self {
        Self { cases: Vec::new() }
    }

    pub fn new(cases: Vec<Shrinkable<T>>) -> Self {
        Self { cases }
    }

    /// Edge cases from shrinkables, dropping later duplicates by value
    pub fn dedup_by_value(cases: Vec<Shrinkable<T>>) -> Self
    where
        T: PartialEq,
    {
        let mut unique: Vec<Shrinkable<T>> = Vec::with_capacity(cases.len());
        for case in cases {
            let value = case.value();
            if !unique.iter().any(|kept| kept.value() == value) {
                unique.push(case);
            }
        }
        Self { cases: unique }
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Shrinkable<T>> {
        self.cases.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shrinkable<T>> {
        self.cases.iter()
    }

    pub fn map<U, F>(&self, f: F) -> EdgeCases<U>
    where
        U: Generated,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let f: Arc<dyn Fn(T) -> U + Send + Sync> = Arc::new(f);
        EdgeCases {
            cases: self
                .cases
                .iter()
                .map(|case| case.map_shared(Arc::clone(&f)))
                .collect(),
        }
    }

    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate: Arc<dyn Fn(&T) -> bool + Send + Sync> = Arc::new(predicate);
        Self {
            cases: self
                .cases
                .iter()
                .filter(|case| predicate(&case.value()))
                .map(|case| case.filter_shared(Arc::clone(&predicate)))
                .collect(),
        }
    }

    /// All cases of `self` followed by all cases of `other`
    pub fn concat(&self, other: &EdgeCases<T>) -> Self {
        let mut cases = self.cases.clone();
        cases.extend(other.cases.iter().cloned());
        Self { cases }
    }

    /// Keep at most the first `max` cases
    pub fn limit(&self, max: usize) -> Self {
        Self {
            cases: self.cases.iter().take(max).cloned().collect(),
        }
    }
}

impl<T: Generated> IntoIterator for EdgeCases<T> {
    type Item = Shrinkable<T>;
    type IntoIter = std::vec::IntoIter<Shrinkable<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.into_iter()
    }
}
