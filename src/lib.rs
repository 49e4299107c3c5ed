//! Library for building, running and transforming finite automata over `char` symbols.
//!
//! The central type is [`Automaton`], a mutable store of labelled states, a transition relation
//! that maps a state and a symbol to a set of destinations, an optional start state and a set of
//! final states. An automaton with at most one destination per state and symbol is
//! deterministic, but every operation works for nondeterministic automata as well, unless
//! noted otherwise. The alphabet is never stored, it consists of the symbols that appear on
//! transitions.
//!
//! On top of the store, the crate provides
//! - a step by step [`simulation::Simulation`] with nondeterministic semantics, which keeps
//!   track of the set of active states and yields the information needed to animate a run,
//! - [`Automaton::determinize`], the subset construction, which produces an equivalent
//!   deterministic automaton whose states are named after the sets of states they represent,
//! - [`Automaton::minimize`], which merges equivalent states of a deterministic automaton
//!   through Hopcroft's partition refinement,
//! - [`Automaton::generate_tests`], which enumerates all strings up to a given length and
//!   classifies each of them.
//!
//! None of these operations modify the automaton they are called on, and every failure is
//! reported as an [`AutomatonError`].
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use fa_sim::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        builder::AutomatonBuilder,
        error::{AutomatonError, ValidationError},
        generator::{GeneratorConfig, TestCase, TestReport, DEFAULT_WARN_LENGTH},
        math::{self, Partition},
        simulation::{Run, Simulation, Step},
        state::{State, StateSet},
        Automaton,
    };
}

/// This module contains some definitions of mathematical objects which are used throughout the crate and
/// do not really fit to the top level.
pub mod math;

/// Defines the error types of this crate.
pub mod error;
pub use error::{AutomatonError, ValidationError};

/// Defines states and sets of states.
pub mod state;
pub use state::{State, StateSet};

mod automaton;
pub use automaton::Automaton;

/// Contains a builder for conveniently constructing an [`Automaton`].
pub mod builder;

/// Running words on an automaton, step by step or all at once.
pub mod simulation;

mod determinization;

/// Contains the partition refinement algorithm used for minimizing deterministic automata.
mod minimization;

/// Exhaustive generation and classification of test strings.
pub mod generator;

/// Implements the generation of random automata and words. This is feature gated behind the
/// `random` feature.
#[cfg(feature = "random")]
pub mod random;
