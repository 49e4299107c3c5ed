use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::{
    error::AutomatonError,
    math::{OrderedSet, Set},
    state::StateSet,
    Automaton,
};

impl Automaton {
    /// Converts `self` into an equivalent deterministic automaton through the subset
    /// construction. Every state of the result corresponds to a set of states of `self` that
    /// can be active at the same time and is named by [`StateSet::canonical_name`]. Sets that
    /// are not reachable from the start state are never materialized, and neither is the
    /// empty set, so a missing transition in the result means the input is rejected.
    ///
    /// # Example
    /// ```
    /// use fa_sim::prelude::*;
    ///
    /// let nfa = Automaton::builder()
    ///     .with_transitions([("q0", 'a', "q0"), ("q0", 'a', "q1"), ("q1", 'b', "q2")])
    ///     .with_start("q0")
    ///     .with_finals(["q2"])
    ///     .build()
    ///     .unwrap();
    /// let dfa = nfa.determinize().unwrap();
    /// assert!(dfa.is_deterministic());
    /// assert_eq!(dfa.size(), 3);
    /// assert_eq!(dfa.start_state().unwrap(), "q{q0}");
    /// ```
    pub fn determinize(&self) -> Result<Automaton, AutomatonError> {
        self.determinize_interruptible(|| false)
    }

    /// Works as [`Automaton::determinize`], but polls `interrupted` before a set from the
    /// frontier is expanded and stops with [`AutomatonError::Interrupted`] once it returns true.
    pub fn determinize_interruptible<F>(
        &self,
        mut interrupted: F,
    ) -> Result<Automaton, AutomatonError>
    where
        F: FnMut() -> bool,
    {
        let start = self.validated_start()?;
        let seed = StateSet::singleton(start);

        let mut dfa = Automaton::new();
        let seed_name = seed.canonical_name();
        dfa.add_state(seed_name.clone());
        dfa.set_start_state(&seed_name)?;

        let mut seen: Set<StateSet> = Set::from_iter([seed.clone()]);
        let mut frontier = VecDeque::from([seed]);

        while let Some(current) = frontier.pop_front() {
            if interrupted() {
                debug!("subset construction interrupted with {} sets", seen.len());
                return Err(AutomatonError::Interrupted);
            }

            let name = current.canonical_name();
            if current.intersects(self.final_states()) {
                dfa.add_final_state(&name)?;
            }

            let symbols: OrderedSet<char> =
                current.iter().flat_map(|q| self.symbols_from(q)).collect();
            for symbol in symbols {
                let target = self.successors_of_set(&current, symbol);
                if target.is_empty() {
                    continue;
                }
                let target_name = target.canonical_name();
                if seen.insert(target.clone()) {
                    trace!("discovered {target} from {current} on {symbol}");
                    dfa.add_state(target_name.clone());
                    frontier.push_back(target);
                }
                dfa.add_transition(&name, symbol, &target_name)?;
            }
        }

        debug!(
            "subset construction turned {} states into {}",
            self.size(),
            dfa.size()
        );
        Ok(dfa)
    }
}
