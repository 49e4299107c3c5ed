use crate::{
    error::AutomatonError,
    state::State,
    Automaton,
};

/// Helper struct for the construction of automata. It collects states, transitions, a start
/// state and final states, and checks them all at once in [`AutomatonBuilder::build`].
/// Endpoints of transitions are added as states automatically.
///
/// # Example
///
/// We want an automaton with states `q0` and `q1`, which moves from `q0` to `q1` on `a` and
/// stays in `q1` on `b`, where `q0` is the start state and `q1` is final.
/// ```
/// use fa_sim::prelude::*;
///
/// let aut = Automaton::builder()
///     .with_transitions([("q0", 'a', "q1"), ("q1", 'b', "q1")])
///     .with_start("q0")
///     .with_finals(["q1"])
///     .build()
///     .unwrap();
/// assert_eq!(aut.size(), 2);
/// assert!(aut.is_deterministic());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AutomatonBuilder {
    states: Vec<State>,
    transitions: Vec<(State, char, State)>,
    start: Option<State>,
    finals: Vec<State>,
}

impl AutomatonBuilder {
    /// Adds the given states, which is only necessary for states without transitions.
    pub fn with_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<State>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Adds the given transitions of the form `(source, symbol, target)`.
    pub fn with_transitions<I, S, T>(mut self, transitions: I) -> Self
    where
        I: IntoIterator<Item = (S, char, T)>,
        S: Into<State>,
        T: Into<State>,
    {
        self.transitions.extend(
            transitions
                .into_iter()
                .map(|(source, symbol, target)| (source.into(), symbol, target.into())),
        );
        self
    }

    /// Sets the start state.
    pub fn with_start(mut self, start: impl Into<State>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Adds the given final states.
    pub fn with_finals<I, S>(mut self, finals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<State>,
    {
        self.finals.extend(finals.into_iter().map(Into::into));
        self
    }

    /// Consumes `self` and builds the automaton. Fails if the start state or a final state
    /// does not occur as a state.
    pub fn build(self) -> Result<Automaton, AutomatonError> {
        let mut aut = Automaton::new();
        for q in self.states {
            aut.add_state(q);
        }
        for (source, _, target) in &self.transitions {
            aut.add_state(source);
            aut.add_state(target);
        }
        for (source, symbol, target) in &self.transitions {
            aut.add_transition(source, *symbol, target)?;
        }
        if let Some(start) = self.start {
            aut.set_start_state(start)?;
        }
        for q in self.finals {
            aut.add_final_state(q)?;
        }
        Ok(aut)
    }
}
