//! Fixed-capacity FIFO used for the event feed and agent logs.
//!
//! Serializes as a plain JSON array, oldest entry first. Deserializing a
//! longer array keeps only the newest `CAP` entries.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingLog<T, const CAP: usize> {
    items: VecDeque<T>,
}

impl<T, const CAP: usize> RollingLog<T, CAP> {
    pub const CAPACITY: usize = CAP;

    pub fn new() -> Self {
        Self {
            items: VecDeque::with_capacity(CAP),
        }
    }

    /// Append `item`, returning the evicted oldest entry if the log was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        if CAP == 0 {
            return Some(item);
        }
        let evicted = if self.items.len() >= CAP {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }
}

impl<T: Clone, const CAP: usize> RollingLog<T, CAP> {
    /// Oldest-first copy.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    /// Newest-first copy.
    pub fn to_vec_newest_first(&self) -> Vec<T> {
        self.items.iter().rev().cloned().collect()
    }
}

impl<T, const CAP: usize> Default for RollingLog<T, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const CAP: usize> FromIterator<T> for RollingLog<T, CAP> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut log = Self::new();
        for item in iter {
            log.push(item);
        }
        log
    }
}

impl<T: Serialize, const CAP: usize> Serialize for RollingLog<T, CAP> {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_seq(self.items.iter())
    }
}

impl<'de, T: Deserialize<'de>, const CAP: usize> Deserialize<'de> for RollingLog<T, CAP> {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items: Vec<T> = Vec::deserialize(d)?;
        Ok(items.into_iter().collect())
    }
}
