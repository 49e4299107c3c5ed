use std::collections::{BTreeSet, VecDeque};

use bit_set::BitSet;
use tracing::trace;

use crate::{error::AutomatonError, math::Bijection, state::State, Automaton};

/// Computes the coarsest partition of the states of the deterministic automaton `aut` that is
/// compatible with its final states and its transitions, using Hopcroft's algorithm.
///
/// States are mapped to dense indices. The automaton is completed with a sink at index
/// `aut.size()`, which receives every missing transition and loops on every symbol. The sink
/// is removed from the returned classes, so states that reject everything end up together
/// in one class.
pub(super) fn hopcroft<F>(
    aut: &Automaton,
    mut interrupted: F,
) -> Result<Vec<BTreeSet<State>>, AutomatonError>
where
    F: FnMut() -> bool,
{
    let indices: Bijection<State, usize> = aut
        .states()
        .enumerate()
        .map(|(i, q)| (q.clone(), i))
        .collect();
    let sink = aut.size();
    let alphabet: Vec<char> = aut.alphabet().into_iter().collect();

    // predecessors[a][t] holds every state that reaches `t` on the a-th symbol
    let mut predecessors = vec![vec![vec![]; sink + 1]; alphabet.len()];
    for (a, symbol) in alphabet.iter().enumerate() {
        for (q, &source) in indices.iter() {
            let target = aut
                .successors(q.as_str(), *symbol)
                .and_then(|targets| targets.iter().next())
                .and_then(|target| indices.get_by_left(target))
                .copied()
                .unwrap_or(sink);
            predecessors[a][target].push(source);
        }
        predecessors[a][sink].push(sink);
    }

    let accepting: BitSet = aut
        .final_states()
        .iter()
        .filter_map(|q| indices.get_by_left(q).copied())
        .collect();
    let rejecting: BitSet = (0..=sink).filter(|q| !accepting.contains(*q)).collect();

    let mut blocks = vec![accepting, rejecting];
    let mut waiting = VecDeque::new();
    let mut is_waiting = BitSet::new();
    let first = if blocks[0].len() <= blocks[1].len() {
        0
    } else {
        1
    };
    waiting.push_back(first);
    is_waiting.insert(first);

    while let Some(splitter) = waiting.pop_front() {
        is_waiting.remove(splitter);
        if interrupted() {
            return Err(AutomatonError::Interrupted);
        }

        let splitter_states = blocks[splitter].clone();
        for (a, symbol) in alphabet.iter().enumerate() {
            let pre: BitSet = splitter_states
                .iter()
                .flat_map(|t| predecessors[a][t].iter().copied())
                .collect();
            if pre.is_empty() {
                continue;
            }

            for y in 0..blocks.len() {
                let inside: BitSet = blocks[y].intersection(&pre).collect();
                if inside.is_empty() || inside.len() == blocks[y].len() {
                    continue;
                }
                let outside: BitSet = blocks[y].difference(&pre).collect();
                trace!(
                    "splitting block {y} on {symbol} into {} and {} states",
                    inside.len(),
                    outside.len()
                );

                blocks[y] = inside;
                blocks.push(outside);
                let z = blocks.len() - 1;

                if is_waiting.contains(y) {
                    waiting.push_back(z);
                    is_waiting.insert(z);
                } else {
                    let smaller = if blocks[y].len() <= blocks[z].len() {
                        y
                    } else {
                        z
                    };
                    waiting.push_back(smaller);
                    is_waiting.insert(smaller);
                }
            }
        }
    }

    Ok(blocks
        .into_iter()
        .map(|block| {
            block
                .iter()
                .filter_map(|i| indices.get_by_right(&i).cloned())
                .collect::<BTreeSet<_>>()
        })
        .filter(|class| !class.is_empty())
        .collect())
}
