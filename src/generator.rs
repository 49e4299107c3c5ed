use std::collections::VecDeque;

use itertools::Itertools;
use owo_colors::OwoColorize;
use tracing::{debug, warn};

use crate::{error::AutomatonError, simulation::Simulation, state::StateSet, Automaton};

/// Bounds above this length trigger a warning, as the number of generated strings grows
/// exponentially with the bound.
pub const DEFAULT_WARN_LENGTH: usize = 8;

/// Configures the exhaustive generation of test strings, see [`Automaton::generate_tests`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    max_length: usize,
    warn_above: usize,
    include_rejected: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_length: 5,
            warn_above: DEFAULT_WARN_LENGTH,
            include_rejected: true,
        }
    }
}

impl GeneratorConfig {
    /// Generates all strings of length at most `max_length`.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            ..Default::default()
        }
    }

    /// Sets the length above which a warning is emitted.
    pub fn warn_above(mut self, length: usize) -> Self {
        self.warn_above = length;
        self
    }

    /// Determines whether rejected strings are part of the result.
    pub fn include_rejected(mut self, include: bool) -> Self {
        self.include_rejected = include;
        self
    }

    /// The maximal length of generated strings.
    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

/// A generated string together with its verdict and the active sets of its run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    word: String,
    accepted: bool,
    path: Vec<StateSet>,
}

impl TestCase {
    /// The generated string.
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Whether the string is accepted.
    pub fn accepted(&self) -> bool {
        self.accepted
    }

    /// The active sets that were visited, starting with the set containing only the start
    /// state. If the run died, the path ends with the set in which it got stuck.
    pub fn path(&self) -> &[StateSet] {
        &self.path
    }
}

/// The result of generating test strings, sorted by length and then lexicographically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestReport(Vec<TestCase>);

impl TestReport {
    /// Iterates over the accepted test cases.
    pub fn accepted(&self) -> impl Iterator<Item = &TestCase> + '_ {
        self.0.iter().filter(|case| case.accepted)
    }

    /// Iterates over the rejected test cases.
    pub fn rejected(&self) -> impl Iterator<Item = &TestCase> + '_ {
        self.0.iter().filter(|case| !case.accepted)
    }

    /// Consumes `self` and returns the test cases.
    pub fn into_cases(self) -> Vec<TestCase> {
        self.0
    }
}

impl std::ops::Deref for TestReport {
    type Target = [TestCase];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for TestReport {
    type Item = TestCase;
    type IntoIter = std::vec::IntoIter<TestCase>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TestReport {
    type Item = &'a TestCase;
    type IntoIter = std::slice::Iter<'a, TestCase>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for TestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(["String", "Result", "Path"]);
        for case in &self.0 {
            let verdict = if case.accepted {
                "accepted".green().to_string()
            } else {
                "rejected".red().to_string()
            };
            builder.push_record([
                case.word.clone(),
                verdict,
                case.path.iter().join(" → "),
            ]);
        }
        write!(
            f,
            "{}",
            builder.build().with(tabled::settings::Style::ascii())
        )
    }
}

impl Automaton {
    /// Generates every non-empty string over the alphabet of `self` with length at most
    /// `max_length` and runs it. See [`Automaton::generate_tests`].
    pub fn generate_test_strings(&self, max_length: usize) -> Result<TestReport, AutomatonError> {
        self.generate_tests(GeneratorConfig::new(max_length))
    }

    /// Generates every non-empty string over the alphabet of `self` up to the configured
    /// length, in order of increasing length and lexicographically within one length, and
    /// classifies each of them. The number of strings is exponential in the length, so
    /// bounds beyond single digits are impractical. If the alphabet is empty, there is
    /// nothing to generate.
    ///
    /// # Example
    /// ```
    /// use fa_sim::prelude::*;
    ///
    /// let aut = Automaton::builder()
    ///     .with_transitions([("q0", 'a', "q1"), ("q1", 'b', "q0")])
    ///     .with_start("q0")
    ///     .with_finals(["q1"])
    ///     .build()
    ///     .unwrap();
    /// let report = aut.generate_tests(GeneratorConfig::new(3)).unwrap();
    /// let words: Vec<_> = report.accepted().map(|case| case.word()).collect();
    /// assert_eq!(words, vec!["a", "aba"]);
    /// ```
    pub fn generate_tests(&self, config: GeneratorConfig) -> Result<TestReport, AutomatonError> {
        let start = self.validated_start()?;
        let alphabet = self.alphabet().into_iter().collect_vec();
        if alphabet.is_empty() {
            debug!("alphabet is empty, no test strings to generate");
            return Ok(TestReport::default());
        }

        if config.max_length > config.warn_above {
            warn!(
                "generating all strings up to length {} over {} symbols, this may take very long",
                config.max_length,
                alphabet.len()
            );
        }

        let mut cases = vec![];
        let mut queue: VecDeque<Vec<char>> = VecDeque::from([vec![]]);
        while let Some(word) = queue.pop_front() {
            if word.len() < config.max_length {
                for symbol in &alphabet {
                    let mut extended = word.clone();
                    extended.push(*symbol);
                    queue.push_back(extended);
                }
            }
            if word.is_empty() {
                continue;
            }

            let (path, accepted) =
                Simulation::from_start(self, start, word.iter().copied())
                    .into_run()
                    .into_parts();
            if accepted || config.include_rejected {
                cases.push(TestCase {
                    word: word.into_iter().collect(),
                    accepted,
                    path,
                });
            }
        }

        cases.sort_by(|left, right| {
            left.word
                .chars()
                .count()
                .cmp(&right.word.chars().count())
                .then_with(|| left.word.cmp(&right.word))
        });
        debug!("generated {} test strings", cases.len());
        Ok(TestReport(cases))
    }
}
