mod partition_refinement;

use std::collections::BTreeSet;

use itertools::Itertools;
use tracing::debug;

use crate::{
    error::AutomatonError,
    math::{Map, Partition},
    state::State,
    Automaton,
};

impl Automaton {
    /// Returns the unique minimal deterministic automaton that accepts the same language as
    /// `self`. States of `self` that accept the same words are merged into one state, which
    /// is computed with Hopcroft's partition refinement algorithm. The merged states are named
    /// `q0`, `q1`, ... where classes are ordered by their lexicographically least member.
    ///
    /// Fails with [`AutomatonError::InputNotDeterministic`] if `self` is not deterministic and
    /// with [`AutomatonError::Validation`] if it lacks a start state or final states.
    ///
    /// # Example
    /// ```
    /// use fa_sim::prelude::*;
    ///
    /// let dfa = Automaton::builder()
    ///     .with_transitions([("p", 'a', "q"), ("q", 'a', "q")])
    ///     .with_start("p")
    ///     .with_finals(["p", "q"])
    ///     .build()
    ///     .unwrap();
    /// let min = dfa.minimize().unwrap();
    /// assert_eq!(min.size(), 1);
    /// assert_eq!(min.accepts("aaa"), Ok(true));
    /// ```
    pub fn minimize(&self) -> Result<Automaton, AutomatonError> {
        self.minimize_interruptible(|| false)
    }

    /// Works as [`Automaton::minimize`], but polls `interrupted` before each refinement round
    /// and stops with [`AutomatonError::Interrupted`] once it returns true.
    pub fn minimize_interruptible<F>(&self, interrupted: F) -> Result<Automaton, AutomatonError>
    where
        F: FnMut() -> bool,
    {
        let classes = self.equivalence_classes_interruptible(interrupted)?;

        let mut min = Automaton::new();
        let names = (0..classes.size())
            .map(|i| State::new(format!("q{i}")))
            .collect_vec();
        for name in &names {
            min.add_state(name.clone());
        }
        let class_of: Map<&State, &State> = self
            .states()
            .filter_map(|q| classes.class_index(q).map(|i| (q, &names[i])))
            .collect();

        for (q, class) in &class_of {
            if self.start_state() == Some(*q) {
                min.set_start_state(class)?;
            }
            if self.is_final(q.as_str()) {
                min.add_final_state(class)?;
            }
        }

        for (source, symbol, targets) in self.transitions() {
            for target in targets {
                min.add_transition(&class_of[source], symbol, &class_of[target])?;
            }
        }

        debug!("minimized automaton from {} to {} states", self.size(), min.size());
        Ok(min)
    }

    /// Computes the classes of states that accept exactly the same words. The classes are
    /// ordered by their lexicographically least member, which is how [`Automaton::minimize`]
    /// numbers its states.
    pub fn equivalence_classes(&self) -> Result<Partition<State>, AutomatonError> {
        self.equivalence_classes_interruptible(|| false)
    }

    fn equivalence_classes_interruptible<F>(
        &self,
        interrupted: F,
    ) -> Result<Partition<State>, AutomatonError>
    where
        F: FnMut() -> bool,
    {
        if !self.is_deterministic() {
            debug!("refusing to minimize nondeterministic automaton");
            return Err(AutomatonError::InputNotDeterministic);
        }
        self.validate()?;

        let mut classes: Vec<BTreeSet<State>> =
            partition_refinement::hopcroft(self, interrupted)?;
        classes.sort_by(|left, right| left.first().cmp(&right.first()));
        Ok(Partition::from(classes))
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use crate::prelude::*;

    /// The example DFA from the wikipedia article on DFA minimization.
    fn wiki_dfa() -> Automaton {
        Automaton::builder()
            .with_transitions([
                ("0", 'a', "1"),
                ("0", 'b', "2"),
                ("1", 'a', "0"),
                ("1", 'b', "3"),
                ("2", 'a', "4"),
                ("2", 'b', "5"),
                ("3", 'a', "4"),
                ("3", 'b', "5"),
                ("4", 'a', "4"),
                ("4", 'b', "5"),
                ("5", 'a', "5"),
                ("5", 'b', "5"),
            ])
            .with_start("0")
            .with_finals(["2", "3", "4"])
            .build()
            .unwrap()
    }

    fn words_up_to(alphabet: &str, length: usize) -> Vec<String> {
        std::iter::once(String::new())
            .chain((1..=length).flat_map(|n| {
                std::iter::repeat(alphabet.chars())
                    .take(n)
                    .multi_cartesian_product()
                    .map(|w| w.into_iter().collect::<String>())
                    .collect_vec()
            }))
            .collect()
    }

    #[test_log::test]
    fn wiki_minimization() {
        let dfa = wiki_dfa();
        let min = dfa.minimize().unwrap();
        assert_eq!(min.size(), 3);
        assert!(min.is_deterministic());

        let classes = dfa.equivalence_classes().unwrap();
        assert_eq!(
            classes,
            Partition::new([vec!["0", "1"], vec!["2", "3", "4"], vec!["5"]]
                .into_iter()
                .map(|class| class.into_iter().map(State::from)))
        );
        assert_eq!(min.start_state().unwrap(), "q0");
        assert_eq!(min.final_states(), &StateSet::singleton("q1"));

        for word in words_up_to("ab", 5) {
            assert_eq!(dfa.accepts(&word), min.accepts(&word), "{word}");
        }
    }

    #[test]
    fn identical_final_states_collapse() {
        let dfa = Automaton::builder()
            .with_transitions([("p", 'a', "r"), ("q", 'a', "r"), ("r", 'b', "p")])
            .with_start("r")
            .with_finals(["p", "q"])
            .build()
            .unwrap();
        let min = dfa.minimize().unwrap();
        assert_eq!(min.size(), 2);
        assert_eq!(min.transition_count(), 2);
        assert_eq!(min.successors("q0", 'a'), Some(&StateSet::singleton("q1")));
        assert_eq!(min.successors("q1", 'b'), Some(&StateSet::singleton("q0")));
        for word in words_up_to("ab", 4) {
            assert_eq!(dfa.accepts(&word), min.accepts(&word), "{word}");
        }
    }

    #[test]
    fn two_final_states_become_one() {
        let dfa = Automaton::builder()
            .with_transitions([("q0", 'a', "q1"), ("q1", 'a', "q1")])
            .with_start("q0")
            .with_finals(["q0", "q1"])
            .build()
            .unwrap();
        let min = dfa.minimize().unwrap();
        assert_eq!(min.size(), 1);
        assert_eq!(min.successors("q0", 'a'), Some(&StateSet::singleton("q0")));
        assert_eq!(min.accepts("aaaa"), Ok(true));
        assert_eq!(min.accepts("b"), Ok(false));
    }

    #[test]
    fn missing_transitions_are_not_confused_with_loops() {
        // `p` only moves on `b`, `q` loops on `a` without ever reaching `f`
        let dfa = Automaton::builder()
            .with_transitions([("s", 'a', "p"), ("s", 'b', "q"), ("q", 'a', "q"), ("p", 'b', "f")])
            .with_start("s")
            .with_finals(["f"])
            .build()
            .unwrap();
        let min = dfa.minimize().unwrap();
        for word in words_up_to("ab", 4) {
            assert_eq!(dfa.accepts(&word), min.accepts(&word), "{word}");
        }
        assert!(min.is_deterministic());
    }

    #[test]
    fn minimization_is_idempotent() {
        let min = wiki_dfa().minimize().unwrap();
        let again = min.minimize().unwrap();
        assert_eq!(min.size(), again.size());
        assert_eq!(min.transition_count(), again.transition_count());
    }

    #[test]
    fn nondeterministic_input_is_rejected() {
        let nfa = Automaton::builder()
            .with_transitions([("q0", 'a', "q0"), ("q0", 'a', "q1")])
            .with_start("q0")
            .with_finals(["q1"])
            .build()
            .unwrap();
        let before = nfa.clone();
        assert_eq!(nfa.minimize(), Err(AutomatonError::InputNotDeterministic));
        assert_eq!(nfa, before);
    }

    #[test]
    fn can_be_interrupted() {
        assert_eq!(
            wiki_dfa().minimize_interruptible(|| true),
            Err(AutomatonError::Interrupted)
        );
    }
}
