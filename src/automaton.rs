use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    builder::AutomatonBuilder,
    error::{AutomatonError, ValidationError},
    math::{OrderedMap, OrderedSet},
    state::{State, StateSet},
};

/// A finite automaton over `char` symbols, which may be deterministic or not.
///
/// The automaton consists of a set of [`State`]s, a transition relation mapping a pair of
/// source state and symbol to a [`StateSet`] of destinations, an optional start state and
/// a set of final states. The alphabet is not stored, it is always derived from the symbols
/// that appear on transitions (see [`Automaton::alphabet`]).
///
/// The automaton is mutated in place through [`Automaton::add_state`],
/// [`Automaton::add_transition`] and friends. Each of these either succeeds or reports an
/// [`AutomatonError`] without changing anything. Operations such as
/// [`Automaton::determinize`] and [`Automaton::minimize`] never modify `self`, they return
/// a freshly built automaton instead.
///
/// # Example
/// ```
/// use fa_sim::prelude::*;
///
/// let mut aut = Automaton::new();
/// aut.add_state("q0");
/// aut.add_state("q1");
/// aut.add_transition("q0", 'a', "q1").unwrap();
/// aut.set_start_state("q0").unwrap();
/// aut.add_final_state("q1").unwrap();
/// assert_eq!(aut.accepts("a"), Ok(true));
/// assert_eq!(aut.accepts("b"), Ok(false));
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Automaton {
    states: OrderedSet<State>,
    transitions: OrderedMap<(State, char), StateSet>,
    start: Option<State>,
    finals: StateSet,
}

impl Automaton {
    /// Creates an empty automaton without states, transitions, start and final states.
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiates a new [`AutomatonBuilder`].
    pub fn builder() -> AutomatonBuilder {
        AutomatonBuilder::default()
    }

    /// Adds a state with the given label. Blank labels are ignored and adding an existing
    /// state has no effect. Returns true if the state was newly inserted.
    pub fn add_state(&mut self, name: impl Into<State>) -> bool {
        let state = name.into();
        if state.is_blank() {
            debug!("ignoring state with blank label");
            return false;
        }
        self.states.insert(state)
    }

    /// Adds the transition `source --symbol--> target`. Both endpoints must exist. Adding a
    /// transition that already exists does not duplicate it. Returns true if the transition
    /// was not present before.
    pub fn add_transition(
        &mut self,
        source: impl AsRef<str>,
        symbol: char,
        target: impl AsRef<str>,
    ) -> Result<bool, AutomatonError> {
        let source = self.require_state(source.as_ref())?;
        let target = self.require_state(target.as_ref())?;
        trace!("adding transition {source} --{symbol}--> {target}");
        Ok(self
            .transitions
            .entry((source, symbol))
            .or_default()
            .insert(target))
    }

    /// Sets the start state, replacing a previously set one.
    pub fn set_start_state(&mut self, name: impl AsRef<str>) -> Result<(), AutomatonError> {
        let state = self.require_state(name.as_ref())?;
        self.start = Some(state);
        Ok(())
    }

    /// Marks the given state as final.
    pub fn add_final_state(&mut self, name: impl AsRef<str>) -> Result<(), AutomatonError> {
        let state = self.require_state(name.as_ref())?;
        self.finals.insert(state);
        Ok(())
    }

    /// Removes a state together with every transition that starts or ends in it. Other
    /// destinations sharing a source and symbol with the removed one are kept. If the state
    /// was the start state, the start state becomes unset, and it is dropped from the set of
    /// final states.
    pub fn remove_state(&mut self, name: impl AsRef<str>) -> Result<(), AutomatonError> {
        let name = name.as_ref();
        if !self.states.remove(name) {
            debug!("cannot remove unknown state {name}");
            return Err(AutomatonError::UnknownState(State::from(name)));
        }

        self.transitions.retain(|(source, _), targets| {
            if source == name {
                return false;
            }
            targets.remove(name);
            !targets.is_empty()
        });

        if self.start.as_ref().is_some_and(|q| q == name) {
            self.start = None;
        }
        self.finals.remove(name);
        Ok(())
    }

    /// Removes all transitions leaving `source` on `symbol` and returns their destinations.
    pub fn remove_transition(
        &mut self,
        source: impl AsRef<str>,
        symbol: char,
    ) -> Result<StateSet, AutomatonError> {
        let key = (State::from(source.as_ref()), symbol);
        match self.transitions.remove(&key) {
            Some(targets) => Ok(targets),
            None => {
                debug!("cannot remove unknown transition {} --{symbol}-->", key.0);
                Err(AutomatonError::UnknownTransition(key.0, symbol))
            }
        }
    }

    /// Resets `self` to the empty automaton.
    pub fn clear(&mut self) {
        self.states.clear();
        self.transitions.clear();
        self.start = None;
        self.finals = StateSet::new();
    }

    /// Returns true if every pair of source state and symbol that has a transition leads to
    /// exactly one destination.
    pub fn is_deterministic(&self) -> bool {
        self.transitions.values().all(|targets| targets.len() == 1)
    }

    /// Checks whether `self` is ready to be run, which requires a start state and at least
    /// one final state.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.start.is_none() {
            debug!("validation failed, no start state");
            return Err(ValidationError::MissingStartState);
        }
        if self.finals.is_empty() {
            debug!("validation failed, no final states");
            return Err(ValidationError::NoFinalStates);
        }
        Ok(())
    }

    /// Returns the start state after validating `self`.
    pub(crate) fn validated_start(&self) -> Result<&State, AutomatonError> {
        self.validate()?;
        self.start.as_ref().ok_or(ValidationError::MissingStartState.into())
    }

    /// Iterates over all states in lexicographic order.
    pub fn states(&self) -> impl Iterator<Item = &State> + '_ {
        self.states.iter()
    }

    /// Returns true if a state with the given label exists.
    pub fn contains_state(&self, name: &str) -> bool {
        self.states.contains(name)
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Iterates over all transitions as triples of source, symbol and destinations, ordered
    /// by source and symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (&State, char, &StateSet)> + '_ {
        self.transitions
            .iter()
            .map(|((source, symbol), targets)| (source, *symbol, targets))
    }

    /// Returns the number of individual transitions `(source, symbol, target)`.
    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(StateSet::len).sum()
    }

    /// Returns the destinations of `source` on `symbol`, if there are any.
    pub fn successors(&self, source: &str, symbol: char) -> Option<&StateSet> {
        self.transitions.get(&(State::from(source), symbol))
    }

    /// Iterates over the symbols on which `source` has a transition, in ascending order.
    pub fn symbols_from<'a>(&'a self, source: &State) -> impl Iterator<Item = char> + 'a {
        self.transitions
            .range((source.clone(), char::MIN)..=(source.clone(), char::MAX))
            .map(|((_, symbol), _)| *symbol)
    }

    /// Computes the union of the destinations on `symbol` over all states in `active`.
    pub fn successors_of_set(&self, active: &StateSet, symbol: char) -> StateSet {
        let mut out = StateSet::new();
        for q in active {
            if let Some(targets) = self.successors(q.as_str(), symbol) {
                out.extend(targets);
            }
        }
        out
    }

    /// Returns the start state, if one is set.
    pub fn start_state(&self) -> Option<&State> {
        self.start.as_ref()
    }

    /// Returns the set of final states.
    pub fn final_states(&self) -> &StateSet {
        &self.finals
    }

    /// Returns true if `name` is a final state.
    pub fn is_final(&self, name: &str) -> bool {
        self.finals.contains(name)
    }

    /// Returns the alphabet, which is the set of symbols that appear on some transition.
    pub fn alphabet(&self) -> OrderedSet<char> {
        self.transitions.keys().map(|(_, symbol)| *symbol).collect()
    }

    /// Builds the chain automaton for a sample `word`. There is one state `qi` for every
    /// position, each state loops on the symbol read at its position and `qi` moves to
    /// `q(i+1)` on that symbol, except at the last position. `q0` is the start state and
    /// the state at the last position is final.
    ///
    /// # Example
    /// ```
    /// use fa_sim::prelude::*;
    ///
    /// let aut = Automaton::from_word("abc").unwrap();
    /// assert_eq!(aut.size(), 3);
    /// assert_eq!(aut.accepts("abc"), Ok(true));
    /// assert_eq!(aut.accepts("aabbc"), Ok(true));
    /// assert_eq!(aut.accepts("ac"), Ok(false));
    /// ```
    pub fn from_word(word: &str) -> Result<Self, AutomatonError> {
        if word.is_empty() {
            return Err(AutomatonError::EmptyInput);
        }
        let symbols = word.chars().collect_vec();
        let mut aut = Self::new();
        let mut current = State::from("q0");
        aut.add_state(current.clone());
        aut.set_start_state(&current)?;

        for (i, symbol) in symbols.iter().copied().enumerate() {
            aut.add_transition(&current, symbol, &current)?;
            if i + 1 < symbols.len() {
                let next = State::new(format!("q{}", i + 1));
                aut.add_state(next.clone());
                aut.add_transition(&current, symbol, &next)?;
                current = next;
            }
        }
        aut.add_final_state(&current)?;
        Ok(aut)
    }

    fn require_state(&self, name: &str) -> Result<State, AutomatonError> {
        match self.states.get(name) {
            Some(state) => Ok(state.clone()),
            None => {
                debug!("rejecting operation on unknown state {name}");
                Err(AutomatonError::UnknownState(State::from(name)))
            }
        }
    }

    /// Returns a string representation of the transition table. The start state is
    /// prefixed with `->` and final states are marked with `*`.
    pub fn build_transition_table(&self) -> String {
        let alphabet = self.alphabet();
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string()).chain(alphabet.iter().map(|s| s.to_string())),
        );
        for q in &self.states {
            let mut label = q.to_string();
            if self.is_final(q.as_str()) {
                label = format!("*{label}");
            }
            if self.start.as_ref() == Some(q) {
                label = format!("->{label}");
            }
            let mut row = vec![label];
            for sym in &alphabet {
                row.push(match self.successors(q.as_str(), *sym) {
                    Some(targets) => match targets.single() {
                        Some(target) => target.to_string(),
                        None => targets.to_string(),
                    },
                    None => "-".to_string(),
                });
            }
            builder.push_record(row);
        }

        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }
}

impl std::fmt::Display for Automaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.build_transition_table())
    }
}

impl std::fmt::Debug for Automaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Automaton with {} states, start {}, final {}\n{}",
            self.size(),
            self.start.as_ref().map_or("-".to_string(), |q| q.to_string()),
            self.finals,
            self.build_transition_table()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_states() -> Automaton {
        let mut aut = Automaton::new();
        aut.add_state("q0");
        aut.add_state("q1");
        aut
    }

    #[test]
    fn add_state_is_idempotent() {
        let mut aut = Automaton::new();
        assert!(aut.add_state("q0"));
        assert!(!aut.add_state("q0"));
        assert!(!aut.add_state(""));
        assert!(!aut.add_state("   "));
        assert_eq!(aut.size(), 1);
    }

    #[test]
    fn add_transition_deduplicates() {
        let mut aut = two_states();
        assert_eq!(aut.add_transition("q0", 'a', "q1"), Ok(true));
        assert_eq!(aut.add_transition("q0", 'a', "q1"), Ok(false));
        assert_eq!(aut.transition_count(), 1);
        assert!(aut.is_deterministic());

        assert_eq!(aut.add_transition("q0", 'a', "q0"), Ok(true));
        assert_eq!(aut.successors("q0", 'a').map(StateSet::len), Some(2));
        assert!(!aut.is_deterministic());
    }

    #[test]
    fn unknown_endpoints_are_rejected() {
        let mut aut = two_states();
        let before = aut.clone();
        assert_eq!(
            aut.add_transition("q0", 'a', "q9"),
            Err(AutomatonError::UnknownState(State::from("q9")))
        );
        assert_eq!(
            aut.add_transition("q9", 'a', "q0"),
            Err(AutomatonError::UnknownState(State::from("q9")))
        );
        assert_eq!(
            aut.set_start_state("q9"),
            Err(AutomatonError::UnknownState(State::from("q9")))
        );
        assert_eq!(
            aut.add_final_state("q9"),
            Err(AutomatonError::UnknownState(State::from("q9")))
        );
        assert_eq!(aut, before);
    }

    #[test]
    fn remove_state_cascades() {
        let mut aut = Automaton::builder()
            .with_transitions([
                ("q0", 'a', "q0"),
                ("q0", 'a', "q1"),
                ("q1", 'b', "q2"),
                ("q2", 'a', "q1"),
                ("q0", 'b', "q1"),
            ])
            .with_start("q1")
            .with_finals(["q1", "q2"])
            .build()
            .unwrap();

        aut.remove_state("q1").unwrap();
        assert!(!aut.contains_state("q1"));
        assert!(aut.start_state().is_none());
        assert_eq!(aut.final_states(), &StateSet::singleton("q2"));
        assert!(aut
            .transitions()
            .all(|(source, _, targets)| source != "q1" && !targets.contains("q1")));
        assert_eq!(
            aut.successors("q0", 'a'),
            Some(&StateSet::singleton("q0"))
        );
        assert!(aut.successors("q0", 'b').is_none());
        assert!(aut.successors("q2", 'a').is_none());

        assert_eq!(
            aut.remove_state("q1"),
            Err(AutomatonError::UnknownState(State::from("q1")))
        );
    }

    #[test]
    fn remove_state_keeps_other_destinations() {
        let mut aut = Automaton::builder()
            .with_transitions([("q0", 'a', "q0"), ("q0", 'a', "q1"), ("q0", 'b', "q1")])
            .with_start("q0")
            .with_finals(["q0"])
            .build()
            .unwrap();
        assert_eq!(aut.transition_count(), 3);

        aut.remove_state("q1").unwrap();
        assert_eq!(aut.successors("q0", 'a'), Some(&StateSet::singleton("q0")));
        assert!(aut.successors("q0", 'b').is_none());
        assert_eq!(aut.transition_count(), 1);
        assert!(aut.is_deterministic());
    }

    #[test]
    fn remove_transition() {
        let mut aut = two_states();
        aut.add_transition("q0", 'a', "q1").unwrap();
        aut.add_transition("q0", 'a', "q0").unwrap();
        assert_eq!(
            aut.remove_transition("q0", 'a'),
            Ok(StateSet::from_iter(["q0", "q1"]))
        );
        assert_eq!(
            aut.remove_transition("q0", 'a'),
            Err(AutomatonError::UnknownTransition(State::from("q0"), 'a'))
        );
        assert_eq!(aut.transition_count(), 0);
    }

    #[test]
    fn validation() {
        let mut aut = two_states();
        assert_eq!(aut.validate(), Err(ValidationError::MissingStartState));
        aut.set_start_state("q0").unwrap();
        assert_eq!(aut.validate(), Err(ValidationError::NoFinalStates));
        aut.add_final_state("q1").unwrap();
        assert_eq!(aut.validate(), Ok(()));

        aut.clear();
        assert_eq!(aut, Automaton::new());
    }

    #[test]
    fn alphabet_is_derived() {
        let mut aut = two_states();
        assert!(aut.alphabet().is_empty());
        aut.add_transition("q0", 'b', "q1").unwrap();
        aut.add_transition("q1", 'a', "q1").unwrap();
        aut.add_transition("q0", 'a', "q1").unwrap();
        assert_eq!(aut.alphabet().into_iter().collect::<String>(), "ab");
        aut.remove_transition("q0", 'b').unwrap();
        assert_eq!(aut.alphabet().into_iter().collect::<String>(), "a");
    }

    #[test]
    fn chain_from_word() {
        assert_eq!(Automaton::from_word(""), Err(AutomatonError::EmptyInput));

        let aut = Automaton::from_word("aba").unwrap();
        assert_eq!(aut.size(), 3);
        assert_eq!(aut.start_state(), Some(&State::from("q0")));
        assert_eq!(aut.final_states(), &StateSet::singleton("q2"));
        assert_eq!(
            aut.successors("q0", 'a'),
            Some(&StateSet::from_iter(["q0", "q1"]))
        );
        assert_eq!(
            aut.successors("q1", 'b'),
            Some(&StateSet::from_iter(["q1", "q2"]))
        );
        assert_eq!(aut.successors("q2", 'a'), Some(&StateSet::singleton("q2")));
    }

    #[test]
    fn transition_table() {
        let aut = Automaton::builder()
            .with_transitions([("q0", 'a', "q1"), ("q0", 'a', "q0"), ("q1", 'b', "q1")])
            .with_start("q0")
            .with_finals(["q1"])
            .build()
            .unwrap();
        let table = aut.to_string();
        assert!(table.contains("->q0"));
        assert!(table.contains("*q1"));
        assert!(table.contains("{q0, q1}"));
    }
}
