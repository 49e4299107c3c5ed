use thiserror::Error;

use crate::state::State;

/// Reasons for which an [`Automaton`](crate::Automaton) is not ready to be run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No start state has been set.
    #[error("start state is not set")]
    MissingStartState,
    /// The set of final states is empty.
    #[error("no final states defined")]
    NoFinalStates,
}

/// Errors reported by operations on an [`Automaton`](crate::Automaton). None of them is
/// fatal, a failed mutation leaves the automaton untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    /// The operation referenced a state that does not exist.
    #[error("state `{0}` does not exist")]
    UnknownState(State),
    /// There is no transition for the given source state and symbol.
    #[error("transition `{0} --{1}-->` does not exist")]
    UnknownTransition(State, char),
    /// The automaton lacks a start state or final states.
    #[error("invalid automaton: {0}")]
    Validation(#[from] ValidationError),
    /// Minimization requires a deterministic automaton.
    #[error("cannot minimize: input automaton must be deterministic")]
    InputNotDeterministic,
    /// A non-empty input string was required.
    #[error("input string is empty")]
    EmptyInput,
    /// A long running computation was stopped through its interrupt callback.
    #[error("computation was interrupted")]
    Interrupted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            AutomatonError::UnknownState(State::from("q7")).to_string(),
            "state `q7` does not exist"
        );
        assert_eq!(
            AutomatonError::UnknownTransition(State::from("q0"), 'a').to_string(),
            "transition `q0 --a-->` does not exist"
        );
        assert_eq!(
            AutomatonError::from(ValidationError::NoFinalStates).to_string(),
            "invalid automaton: no final states defined"
        );
    }
}
