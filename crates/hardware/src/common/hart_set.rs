//! Set of hart identifiers.
//!
//! Used for the Debug Module's pending debug interrupts and for inter-processor
//! interrupts waiting to be delivered at the next batch boundary. Membership is
//! the only state: inserting a present id or removing an absent one changes nothing.

use std::collections::BTreeSet;

/// Ordered set of hart ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HartSet {
    harts: BTreeSet<u32>,
}

impl HartSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `hart`; returns `true` if it was not already present.
    pub fn insert(&mut self, hart: u32) -> bool {
        self.harts.insert(hart)
    }

    /// Removes `hart`; returns `true` if it was present.
    pub fn remove(&mut self, hart: u32) -> bool {
        self.harts.remove(&hart)
    }

    /// Returns whether `hart` is a member.
    pub fn contains(&self, hart: u32) -> bool {
        self.harts.contains(&hart)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.harts.len()
    }

    /// Returns `true` if no hart is a member.
    pub fn is_empty(&self) -> bool {
        self.harts.is_empty()
    }

    /// Iterates members in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.harts.iter().copied()
    }
}

impl FromIterator<u32> for HartSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self {
            harts: iter.into_iter().collect(),
        }
    }
}
