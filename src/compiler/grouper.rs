//! Boolean grouping of an ordered predicate list
//!
//! AND binds tighter than OR: the list is split at every OR-tagged
//! predicate, each run is AND-ed internally and the runs are OR-ed together.
//!
//! ```text
//! [A(and), B(or), C(and), D(or), E(and)]  =>  [[A], [B, C], [D, E]]
//! ```

use crate::query::Predicate;

/// Outer boolean combinator for a set of groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Exactly one group: every clause must match
    Must,
    /// Several groups: any group may match
    Should,
}

impl Combinator {
    /// Picks the combinator for `group_count` groups
    pub fn for_groups(group_count: usize) -> Self {
        if group_count > 1 {
            Combinator::Should
        } else {
            Combinator::Must
        }
    }

    /// Returns the wire key of the combinator
    pub fn as_str(&self) -> &'static str {
        match self {
            Combinator::Must => "must",
            Combinator::Should => "should",
        }
    }
}

/// Splits predicates into priority groups.
///
/// An OR-tagged predicate opens a new group and becomes its first member.
/// A leading OR tag has nothing to its left, so no empty group is produced
/// for it. This intentionally differs from a literal split at every OR
/// tag: that would emit an empty first group, and an empty group compiles
/// to a match-all `should` branch that widens the query to every document.
/// An empty input yields no groups.
pub fn group_predicates(predicates: &[Predicate]) -> Vec<&[Predicate]> {
    let mut groups = Vec::new();
    let mut begin = 0;

    for (i, predicate) in predicates.iter().enumerate() {
        if predicate.is_or() && i > begin {
            groups.push(&predicates[begin..i]);
            begin = i;
        }
    }

    if begin < predicates.len() {
        groups.push(&predicates[begin..]);
    }

    groups
}
