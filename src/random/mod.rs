use crate::{state::State, Automaton};

fn state_name(i: usize) -> State {
    State::new(format!("q{i}"))
}

fn symbol(i: usize) -> char {
    char::from(b'a' + (i % 26) as u8)
}

/// Generates a random, possibly nondeterministic automaton with states `q0, q1, ...` over
/// the first `symbols` lowercase letters. Every transition `(p, a, q)` is present with
/// probability `density`, each state is final with probability one half and `q0` is the start
/// state. If no state was chosen to be final, the last state becomes final, so the result
/// always passes [`Automaton::validate`].
pub fn random_nfa(
    rng: &mut fastrand::Rng,
    states: usize,
    symbols: usize,
    density: f64,
) -> Automaton {
    assert!(states > 0, "an automaton needs at least one state");
    let mut aut = Automaton::new();
    for i in 0..states {
        aut.add_state(state_name(i));
    }

    for source in 0..states {
        for a in 0..symbols {
            for target in 0..states {
                if rng.f64() < density {
                    aut.add_transition(state_name(source), symbol(a), state_name(target))
                        .expect("both endpoints were added before");
                }
            }
        }
    }

    mark_start_and_finals(rng, &mut aut, states);
    aut
}

/// Works as [`random_nfa`], but every state has at most one transition per symbol. A
/// transition is present with probability `density` and leads to a uniformly drawn state.
pub fn random_dfa(
    rng: &mut fastrand::Rng,
    states: usize,
    symbols: usize,
    density: f64,
) -> Automaton {
    assert!(states > 0, "an automaton needs at least one state");
    let mut aut = Automaton::new();
    for i in 0..states {
        aut.add_state(state_name(i));
    }

    for source in 0..states {
        for a in 0..symbols {
            if rng.f64() < density {
                let target = rng.usize(..states);
                aut.add_transition(state_name(source), symbol(a), state_name(target))
                    .expect("both endpoints were added before");
            }
        }
    }

    mark_start_and_finals(rng, &mut aut, states);
    aut
}

fn mark_start_and_finals(rng: &mut fastrand::Rng, aut: &mut Automaton, states: usize) {
    aut.set_start_state(state_name(0)).expect("q0 was added before");
    for i in 0..states {
        if rng.bool() {
            aut.add_final_state(state_name(i)).expect("state was added before");
        }
    }
    if aut.final_states().is_empty() {
        aut.add_final_state(state_name(states - 1)).expect("state was added before");
    }
}

/// Generate a random `String` over the given `alphabet`.
/// The length of the `String` is drawn uniformly from the range `min_len..=max_len`.
pub fn random_word(
    rng: &mut fastrand::Rng,
    alphabet: &[char],
    min_len: usize,
    max_len: usize,
) -> String {
    let length = rng.usize(min_len..=max_len);
    (0..length)
        .map(|_| alphabet[rng.usize(..alphabet.len())])
        .collect()
}
