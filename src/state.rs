use std::{borrow::Borrow, fmt::Debug};

use itertools::Itertools;

use crate::math::OrderedSet;

/// Identifies a state by its label. States carry no intrinsic order beyond the
/// lexicographic order of their labels, which is used wherever output has to be reproducible.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct State(String);

impl State {
    /// Creates a state with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Returns the label of the state.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the label is empty or consists only of whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Borrow<str> for State {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for State {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for State {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for State {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&State> for State {
    fn from(value: &State) -> Self {
        value.clone()
    }
}

impl PartialEq<str> for State {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for State {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A set of states, compared as an unordered set. It is used for the active states of a
/// simulation, for the destinations of a transition and as the key of the subset construction.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateSet(OrderedSet<State>);

impl StateSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the set containing only `q`.
    pub fn singleton(q: impl Into<State>) -> Self {
        Self(OrderedSet::from_iter([q.into()]))
    }

    /// Iterates over the states in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &'_ State> + '_ {
        self.0.iter()
    }

    /// Inserts `q` and returns whether it was not present before.
    pub fn insert(&mut self, q: impl Into<State>) -> bool {
        self.0.insert(q.into())
    }

    /// Removes `q` and returns whether it was present.
    pub fn remove(&mut self, q: &str) -> bool {
        self.0.remove(q)
    }

    /// Returns true if `q` is an element.
    pub fn contains(&self, q: &str) -> bool {
        self.0.contains(q)
    }

    /// Returns the number of states.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there is no state in the set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the only element if this is a singleton.
    pub fn single(&self) -> Option<&State> {
        match self.0.len() {
            1 => self.0.first(),
            _ => None,
        }
    }

    /// Returns true if `self` and `other` share at least one state.
    pub fn intersects(&self, other: &StateSet) -> bool {
        self.iter().any(|q| other.contains(q.as_str()))
    }

    /// Gives the canonical label of the set, which only depends on its members, `q{q0,q1}`
    /// for example. Equal sets always produce the same label and different sets never do, as
    /// `\`, `,`, `{` and `}` inside member labels are escaped with a backslash.
    pub fn canonical_name(&self) -> State {
        State(format!(
            "q{{{}}}",
            self.iter().map(|q| escape_label(q.as_str())).join(",")
        ))
    }
}

fn escape_label(label: &str) -> String {
    let mut escaped = String::with_capacity(label.len());
    for c in label.chars() {
        if matches!(c, '\\' | ',' | '{' | '}') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl Extend<State> for StateSet {
    fn extend<T: IntoIterator<Item = State>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

impl<'a> Extend<&'a State> for StateSet {
    fn extend<T: IntoIterator<Item = &'a State>>(&mut self, iter: T) {
        self.0.extend(iter.into_iter().cloned())
    }
}

impl FromIterator<State> for StateSet {
    fn from_iter<T: IntoIterator<Item = State>>(iter: T) -> Self {
        Self(OrderedSet::from_iter(iter))
    }
}

impl<'a> FromIterator<&'a str> for StateSet {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        Self(iter.into_iter().map(State::from).collect())
    }
}

impl IntoIterator for StateSet {
    type Item = State;
    type IntoIter = std::collections::btree_set::IntoIter<State>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a StateSet {
    type Item = &'a State;
    type IntoIter = std::collections::btree_set::Iter<'a, State>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for StateSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            write!(f, "∅")
        } else {
            write!(f, "{{{}}}", self.iter().join(", "))
        }
    }
}

impl Debug for StateSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}
