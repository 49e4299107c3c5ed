use itertools::Itertools;
use tracing::trace;

use crate::{
    error::AutomatonError,
    state::{State, StateSet},
    Automaton,
};

/// A single step of a [`Simulation`]. The first step of every simulation carries no symbol
/// and has the singleton set of the start state as its active set. Every further step
/// consumes one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    active: StateSet,
    previous: StateSet,
    symbol: Option<char>,
    accepted: Option<bool>,
    focus: Option<State>,
    dead: bool,
}

impl Step {
    /// The states that are active after this step. If the run died on [`Step::symbol`],
    /// these are the states in which it got stuck.
    pub fn active(&self) -> &StateSet {
        &self.active
    }

    /// The states that were active in the previous step, empty for the first step.
    pub fn previous(&self) -> &StateSet {
        &self.previous
    }

    /// The symbol consumed in this step, `None` for the first step.
    pub fn symbol(&self) -> Option<char> {
        self.symbol
    }

    /// The verdict, which is only known for the last step of a simulation.
    pub fn accepted(&self) -> Option<bool> {
        self.accepted
    }

    /// The most recently visited state that was active on its own. A renderer can use
    /// this to highlight a single current position.
    pub fn focus(&self) -> Option<&State> {
        self.focus.as_ref()
    }

    /// Returns true if no state had a transition on the symbol of this step.
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Returns true if this is the last step of its simulation.
    pub fn is_last(&self) -> bool {
        self.accepted.is_some()
    }
}

/// Lazily runs an input on an [`Automaton`] with nondeterministic semantics, yielding one
/// [`Step`] per consumed symbol after an initial step. Starting from the start state, the
/// active set after a symbol is the union of all destinations on that symbol. If this union
/// is empty the run dies and the simulation ends with a rejecting step. Otherwise the input
/// is accepted if, after the last symbol, some active state is final.
///
/// The simulation borrows the automaton, so it cannot be modified while a run is in progress.
/// It can be restarted with [`Simulation::restart`] or cloned to replay it.
///
/// # Example
/// ```
/// use fa_sim::prelude::*;
///
/// let aut = Automaton::builder()
///     .with_transitions([("q0", 'a', "q0"), ("q0", 'a', "q1"), ("q1", 'b', "q2")])
///     .with_start("q0")
///     .with_finals(["q2"])
///     .build()
///     .unwrap();
/// let steps: Vec<_> = aut.simulate("ab").unwrap().collect();
/// assert_eq!(steps.len(), 3);
/// assert_eq!(steps[1].active(), &StateSet::from_iter(["q0", "q1"]));
/// assert_eq!(steps[2].accepted(), Some(true));
/// ```
#[derive(Debug, Clone)]
pub struct Simulation<'a> {
    automaton: &'a Automaton,
    start: &'a State,
    input: Vec<char>,
    position: usize,
    active: StateSet,
    focus: Option<State>,
    started: bool,
    finished: bool,
}

impl<'a> Simulation<'a> {
    /// Creates a simulation from the given start state without validating the automaton.
    pub(crate) fn from_start<I>(automaton: &'a Automaton, start: &'a State, input: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        Self {
            automaton,
            start,
            input: input.into_iter().collect(),
            position: 0,
            active: StateSet::singleton(start),
            focus: Some(start.clone()),
            started: false,
            finished: false,
        }
    }

    /// Rewinds the simulation to its initial step.
    pub fn restart(&mut self) {
        self.position = 0;
        self.active = StateSet::singleton(self.start);
        self.focus = Some(self.start.clone());
        self.started = false;
        self.finished = false;
    }

    /// The input that is being simulated.
    pub fn input(&self) -> &[char] {
        &self.input
    }

    /// Runs the remaining steps and collects them into a [`Run`].
    pub fn into_run(self) -> Run {
        let mut path = vec![];
        let mut accepted = false;
        for step in self {
            if !step.is_dead() {
                path.push(step.active.clone());
            }
            if let Some(verdict) = step.accepted {
                accepted = verdict;
            }
        }
        Run { path, accepted }
    }

    fn is_accepting(&self) -> bool {
        self.active.intersects(self.automaton.final_states())
    }
}

impl Iterator for Simulation<'_> {
    type Item = Step;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if !self.started {
            self.started = true;
            let accepted = if self.input.is_empty() {
                self.finished = true;
                Some(self.is_accepting())
            } else {
                None
            };
            return Some(Step {
                active: self.active.clone(),
                previous: StateSet::new(),
                symbol: None,
                accepted,
                focus: self.focus.clone(),
                dead: false,
            });
        }

        let symbol = self.input[self.position];
        let previous = self.active.clone();
        let next = self.automaton.successors_of_set(&previous, symbol);

        if next.is_empty() {
            trace!(
                "run on {} died at position {} in {previous} on {symbol}",
                self.input.iter().join(""),
                self.position
            );
            self.finished = true;
            return Some(Step {
                active: previous.clone(),
                previous,
                symbol: Some(symbol),
                accepted: Some(false),
                focus: self.focus.clone(),
                dead: true,
            });
        }

        self.active = next;
        self.position += 1;
        if let Some(q) = self.active.single() {
            self.focus = Some(q.clone());
        }

        let accepted = if self.position == self.input.len() {
            self.finished = true;
            Some(self.is_accepting())
        } else {
            None
        };
        Some(Step {
            active: self.active.clone(),
            previous,
            symbol: Some(symbol),
            accepted,
            focus: self.focus.clone(),
            dead: false,
        })
    }
}

/// The outcome of running a word, consisting of the verdict and the sequence of active
/// sets that were visited, starting with the singleton set of the start state. A run that
/// died ends with the set in which it got stuck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    path: Vec<StateSet>,
    accepted: bool,
}

impl Run {
    /// The active sets that were visited.
    pub fn path(&self) -> &[StateSet] {
        &self.path
    }

    /// Whether the word was accepted.
    pub fn accepted(&self) -> bool {
        self.accepted
    }

    /// Decomposes `self` into the path and the verdict.
    pub fn into_parts(self) -> (Vec<StateSet>, bool) {
        (self.path, self.accepted)
    }
}

impl Automaton {
    /// Starts a step by step [`Simulation`] of `input`. Fails if `self` does not have a start
    /// state or final states.
    pub fn simulate(&self, input: &str) -> Result<Simulation<'_>, AutomatonError> {
        let start = self.validated_start()?;
        Ok(Simulation::from_start(self, start, input.chars()))
    }

    /// Runs `input` to completion and returns the visited active sets and the verdict.
    pub fn run(&self, input: &str) -> Result<Run, AutomatonError> {
        self.simulate(input).map(Simulation::into_run)
    }

    /// Returns whether `input` is accepted.
    pub fn accepts(&self, input: &str) -> Result<bool, AutomatonError> {
        self.run(input).map(|run| run.accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn single_a() -> Automaton {
        Automaton::builder()
            .with_transitions([("q0", 'a', "q1")])
            .with_start("q0")
            .with_finals(["q1"])
            .build()
            .unwrap()
    }

    fn ends_with_ab() -> Automaton {
        Automaton::builder()
            .with_transitions([("q0", 'a', "q0"), ("q0", 'a', "q1"), ("q1", 'b', "q2")])
            .with_start("q0")
            .with_finals(["q2"])
            .build()
            .unwrap()
    }

    #[test_log::test]
    fn accepts_single_symbol() {
        let aut = single_a();
        assert_eq!(aut.accepts("a"), Ok(true));

        let steps = aut.simulate("b").unwrap().collect_vec();
        assert_eq!(steps.len(), 2);
        let last = steps.last().unwrap();
        assert!(last.is_dead());
        assert_eq!(last.accepted(), Some(false));
        assert_eq!(last.active(), &StateSet::singleton("q0"));
        assert_eq!(last.symbol(), Some('b'));
    }

    #[test_log::test]
    fn nondeterministic_path() {
        let aut = ends_with_ab();
        let run = aut.run("ab").unwrap();
        assert!(run.accepted());
        assert_eq!(
            run.path(),
            &[
                StateSet::singleton("q0"),
                StateSet::from_iter(["q0", "q1"]),
                StateSet::singleton("q2"),
            ]
        );
        assert_eq!(aut.accepts("aab"), Ok(true));
        assert_eq!(aut.accepts("aba"), Ok(false));
        assert_eq!(aut.accepts("a"), Ok(false));
    }

    #[test]
    fn steps_carry_presentation_hints() {
        let aut = ends_with_ab();
        let steps = aut.simulate("ab").unwrap().collect_vec();

        assert_eq!(steps[0].symbol(), None);
        assert!(steps[0].previous().is_empty());
        assert_eq!(steps[0].accepted(), None);
        assert_eq!(steps[0].focus(), Some(&State::from("q0")));

        assert_eq!(steps[1].previous(), &StateSet::singleton("q0"));
        assert_eq!(steps[1].accepted(), None);
        assert_eq!(steps[1].focus(), Some(&State::from("q0")));

        assert_eq!(steps[2].previous(), &StateSet::from_iter(["q0", "q1"]));
        assert_eq!(steps[2].focus(), Some(&State::from("q2")));
        assert!(steps[2].is_last());
        assert_eq!(steps[2].accepted(), Some(true));
    }

    #[test]
    fn empty_input() {
        let mut aut = single_a();
        let steps = aut.simulate("").unwrap().collect_vec();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].accepted(), Some(false));

        aut.add_final_state("q0").unwrap();
        assert_eq!(aut.accepts(""), Ok(true));
    }

    #[test]
    fn simulation_can_be_restarted() {
        let aut = ends_with_ab();
        let mut sim = aut.simulate("aab").unwrap();
        let first = sim.by_ref().collect_vec();
        assert!(sim.next().is_none());
        sim.restart();
        assert_eq!(sim.collect_vec(), first);
    }

    #[test]
    fn invalid_automaton_is_not_simulated() {
        let mut aut = single_a();
        aut.remove_state("q1").unwrap();
        assert_eq!(
            aut.simulate("a").err(),
            Some(AutomatonError::Validation(ValidationError::NoFinalStates))
        );
        aut.remove_state("q0").unwrap();
        assert_eq!(
            aut.accepts("a"),
            Err(AutomatonError::Validation(ValidationError::MissingStartState))
        );
    }
}
