//! Dependency graph between named cells.
//!
//! A pair `(s, t)` means "t depends on s": `s` must be evaluated before `t`.
//! `t` is a *dependent* of `s`, `s` is a *dependee* of `t`.
//!
//! The relation is stored twice, once keyed by dependee and once keyed by
//! dependent, and every mutation goes through this type so the two maps
//! stay mirror images of each other. The graph does not reject cycles or
//! self-pairs; callers that need acyclicity check it with
//! [`recalculation_order`](super::recalculation_order).

use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    /// s -> { t : (s, t) }
    dependents: HashMap<String, HashSet<String>>,
    /// t -> { s : (s, t) }
    dependees: HashMap<String, HashSet<String>>,
    count: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `(s, t)` pairs.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of cells `s` depends on.
    pub fn num_dependees(&self, s: &str) -> usize {
        self.dependees.get(s).map_or(0, HashSet::len)
    }

    pub fn has_dependents(&self, s: &str) -> bool {
        self.dependents.get(s).is_some_and(|set| !set.is_empty())
    }

    pub fn has_dependees(&self, s: &str) -> bool {
        self.dependees.get(s).is_some_and(|set| !set.is_empty())
    }

    /// Cells that depend directly on `s` (empty for unknown `s`).
    pub fn dependents(&self, s: &str) -> impl Iterator<Item = &str> + '_ {
        self.dependents.get(s).into_iter().flatten().map(String::as_str)
    }

    /// Cells `s` depends on directly (empty for unknown `s`).
    pub fn dependees(&self, s: &str) -> impl Iterator<Item = &str> + '_ {
        self.dependees.get(s).into_iter().flatten().map(String::as_str)
    }

    /// Record that `t` depends on `s`. Adding an existing pair is a no-op.
    pub fn add_dependency(&mut self, s: &str, t: &str) {
        let inserted = self
            .dependents
            .entry(s.to_string())
            .or_default()
            .insert(t.to_string());
        if inserted {
            self.dependees
                .entry(t.to_string())
                .or_default()
                .insert(s.to_string());
            self.count += 1;
        }
    }

    /// Remove the pair `(s, t)` if present.
    pub fn remove_dependency(&mut self, s: &str, t: &str) {
        if !remove_from(&mut self.dependents, s, t) {
            return;
        }
        remove_from(&mut self.dependees, t, s);
        self.count -= 1;
    }

    /// Replace every `(s, x)` pair with `(s, t)` for each `t` in `new_dependents`.
    pub fn replace_dependents<I>(&mut self, s: &str, new_dependents: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        if let Some(old) = self.dependents.remove(s) {
            for t in &old {
                remove_from(&mut self.dependees, t, s);
            }
            self.count -= old.len();
        }
        for t in new_dependents {
            self.add_dependency(s, t.as_ref());
        }
    }

    /// Replace every `(x, s)` pair with `(t, s)` for each `t` in `new_dependees`.
    pub fn replace_dependees<I>(&mut self, s: &str, new_dependees: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        if let Some(old) = self.dependees.remove(s) {
            for t in &old {
                remove_from(&mut self.dependents, t, s);
            }
            self.count -= old.len();
        }
        for t in new_dependees {
            self.add_dependency(t.as_ref(), s);
        }
    }
}

/// Remove `value` from `map[key]`, dropping the entry once it is empty.
fn remove_from(map: &mut HashMap<String, HashSet<String>>, key: &str, value: &str) -> bool {
    let Some(set) = map.get_mut(key) else {
        return false;
    };
    let removed = set.remove(value);
    if set.is_empty() {
        map.remove(key);
    }
    removed
}
