//! This module defines the `FiniteMachine` struct, a total deterministic finite automaton
//! described by the 5-tuple (Q, Σ, q0, F, δ). A machine is validated once, when it is
//! constructed, and is immutable afterwards; driving it with `run`, `step` and `accepts`
//! never mutates it.

use serde::Serialize;
use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, trace};

use crate::types::{DefinitionError, RunError, MAX_REPORTED_MISSING};

/// Represents a total deterministic finite automaton.
///
/// `S` is the type of states and `A` the type of input symbols. The transition function
/// is defined for every pair in Q×Σ, which is checked by [`FiniteMachine::new`]; this is
/// what lets [`FiniteMachine::run`] assume every lookup succeeds.
#[derive(Debug, Clone)]
pub struct FiniteMachine<S, A> {
    states: HashSet<S>,
    alphabet: HashSet<A>,
    initial: S,
    accepting: HashSet<S>,
    transitions: HashMap<(S, A), S>,
    /// δ indexed by state, then symbol, so lookups borrow instead of cloning a key.
    table: HashMap<S, HashMap<A, S>>,
}

impl<S, A> FiniteMachine<S, A>
where
    S: Eq + Hash + Clone + Debug,
    A: Eq + Hash + Clone + Debug,
{
    /// Creates a new `FiniteMachine` from its 5-tuple, validating every invariant.
    ///
    /// The checks run in a fixed order and the first violation is returned: Q non-empty,
    /// Σ non-empty, q0 ∈ Q, F ⊆ Q, transition sources in Q, transition symbols in Σ,
    /// transition targets in Q, and finally totality over Q×Σ.
    ///
    /// # Arguments
    ///
    /// * `states` - The state set Q.
    /// * `alphabet` - The input alphabet Σ.
    /// * `initial` - The initial state q0.
    /// * `accepting` - The accepting states F.
    /// * `transitions` - The transition function δ, keyed by `(state, symbol)`.
    ///
    /// # Returns
    ///
    /// * `Ok(FiniteMachine)` if the definition is a valid total DFA.
    /// * `Err(DefinitionError)` naming the first invariant that does not hold.
    pub fn new(
        states: HashSet<S>,
        alphabet: HashSet<A>,
        initial: S,
        accepting: HashSet<S>,
        transitions: HashMap<(S, A), S>,
    ) -> Result<Self, DefinitionError> {
        let mut table: HashMap<S, HashMap<A, S>> = HashMap::new();
        for ((state, symbol), next_state) in &transitions {
            table
                .entry(state.clone())
                .or_default()
                .insert(symbol.clone(), next_state.clone());
        }

        let machine = Self {
            states,
            alphabet,
            initial,
            accepting,
            transitions,
            table,
        };

        machine.validate()?;

        debug!(
            states = machine.states.len(),
            symbols = machine.alphabet.len(),
            transitions = machine.transitions.len(),
            "validated finite machine"
        );

        Ok(machine)
    }

    /// Processes the input from left to right, starting in q0, and returns the final state.
    ///
    /// Any iterable whose items borrow as the symbol type is accepted, e.g. `"1011".chars()`,
    /// `&[0, 1]` or a `Vec<String>`. The empty input returns q0 unchanged.
    ///
    /// # Returns
    ///
    /// * `Ok(S)` with the state reached after the last symbol.
    /// * `Err(RunError::InvalidSymbol)` carrying the position and symbol of the first
    ///   symbol outside Σ. No partial result is returned.
    pub fn run<I>(&self, symbols: I) -> Result<S, RunError>
    where
        I: IntoIterator,
        I::Item: Borrow<A>,
    {
        let mut state = self.initial.clone();
        let mut consumed = 0;

        for (index, symbol) in symbols.into_iter().enumerate() {
            let symbol: &A = symbol.borrow();
            if !self.alphabet.contains(symbol) {
                return Err(RunError::InvalidSymbol {
                    index: Some(index),
                    symbol: format!("{:?}", symbol),
                });
            }

            state = self.next_state(&state, symbol)?;
            consumed += 1;
        }

        trace!(symbols = consumed, state = ?state, "run finished");

        Ok(state)
    }

    /// Performs a single transition from `state` on `symbol`.
    ///
    /// `state` is expected to come from Q or from a previous `step`/`run`. A symbol outside
    /// Σ is reported without a position; a state outside Q is reported as
    /// `RunError::UnknownState`.
    pub fn step(&self, state: &S, symbol: &A) -> Result<S, RunError> {
        if !self.alphabet.contains(symbol) {
            return Err(RunError::InvalidSymbol {
                index: None,
                symbol: format!("{:?}", symbol),
            });
        }

        self.next_state(state, symbol)
    }

    /// Returns `true` if running the input ends in an accepting state.
    pub fn accepts<I>(&self, symbols: I) -> Result<bool, RunError>
    where
        I: IntoIterator,
        I::Item: Borrow<A>,
    {
        self.run(symbols).map(|state| self.is_accepting(&state))
    }

    /// Checks whether `state` belongs to F.
    pub fn is_accepting(&self, state: &S) -> bool {
        self.accepting.contains(state)
    }

    /// Looks up δ(state, symbol) without validating the symbol.
    pub fn transition(&self, state: &S, symbol: &A) -> Option<&S> {
        self.table.get(state).and_then(|row| row.get(symbol))
    }

    /// Returns the state set Q.
    pub fn states(&self) -> &HashSet<S> {
        &self.states
    }

    /// Returns the input alphabet Σ.
    pub fn alphabet(&self) -> &HashSet<A> {
        &self.alphabet
    }

    /// Returns the initial state q0.
    pub fn initial(&self) -> &S {
        &self.initial
    }

    /// Returns the accepting states F.
    pub fn accepting(&self) -> &HashSet<S> {
        &self.accepting
    }

    /// Returns the transition function δ.
    pub fn transitions(&self) -> &HashMap<(S, A), S> {
        &self.transitions
    }

    fn next_state(&self, state: &S, symbol: &A) -> Result<S, RunError> {
        self.transition(state, symbol)
            .cloned()
            .ok_or_else(|| RunError::UnknownState {
                state: format!("{:?}", state),
                symbol: format!("{:?}", symbol),
            })
    }

    fn validate(&self) -> Result<(), DefinitionError> {
        if self.states.is_empty() {
            return Err(DefinitionError::EmptyStates);
        }

        if self.alphabet.is_empty() {
            return Err(DefinitionError::EmptyAlphabet);
        }

        if !self.states.contains(&self.initial) {
            return Err(DefinitionError::InitialNotInStates {
                initial: format!("{:?}", self.initial),
            });
        }

        let extra = self
            .accepting
            .difference(&self.states)
            .map(|state| format!("{:?}", state))
            .collect::<Vec<_>>();
        if !extra.is_empty() {
            return Err(DefinitionError::AcceptingNotInStates { extra });
        }

        for ((state, symbol), next_state) in &self.transitions {
            if !self.states.contains(state) {
                return Err(DefinitionError::TransitionStateNotInStates {
                    state: format!("{:?}", state),
                    symbol: format!("{:?}", symbol),
                });
            }
            if !self.alphabet.contains(symbol) {
                return Err(DefinitionError::TransitionSymbolNotInAlphabet {
                    state: format!("{:?}", state),
                    symbol: format!("{:?}", symbol),
                });
            }
            if !self.states.contains(next_state) {
                return Err(DefinitionError::TransitionTargetNotInStates {
                    state: format!("{:?}", state),
                    symbol: format!("{:?}", symbol),
                    next_state: format!("{:?}", next_state),
                });
            }
        }

        self.check_total()
    }

    /// Every key is known to lie in Q×Σ here, so a size mismatch means missing pairs.
    fn check_total(&self) -> Result<(), DefinitionError> {
        let expected = self.states.len() * self.alphabet.len();
        let actual = self.transitions.len();
        if actual == expected {
            return Ok(());
        }

        let mut missing = self
            .states
            .iter()
            .flat_map(|state| self.alphabet.iter().map(move |symbol| (state, symbol)))
            .filter(|&(state, symbol)| self.transition(state, symbol).is_none())
            .take(MAX_REPORTED_MISSING + 1)
            .map(|(state, symbol)| (format!("{:?}", state), format!("{:?}", symbol)))
            .collect::<Vec<_>>();

        let truncated = missing.len() > MAX_REPORTED_MISSING;
        missing.truncate(MAX_REPORTED_MISSING);

        Err(DefinitionError::NotTotal {
            expected,
            actual,
            missing,
            truncated,
        })
    }
}

impl<S, A> FiniteMachine<S, A>
where
    S: Eq + Hash + Clone + Debug + Ord,
    A: Eq + Hash + Clone + Debug + Ord,
{
    /// Returns an ordered, serializable view of the machine.
    pub fn summary(&self) -> MachineSummary<S, A> {
        let mut states = self.states.iter().cloned().collect::<Vec<_>>();
        states.sort();

        let mut alphabet = self.alphabet.iter().cloned().collect::<Vec<_>>();
        alphabet.sort();

        let mut accepting = self.accepting.iter().cloned().collect::<Vec<_>>();
        accepting.sort();

        let transitions = states
            .iter()
            .flat_map(|from| alphabet.iter().map(move |symbol| (from, symbol)))
            .filter_map(|(from, symbol)| {
                self.transition(from, symbol).map(|to| TransitionRow {
                    from: from.clone(),
                    symbol: symbol.clone(),
                    to: to.clone(),
                })
            })
            .collect();

        MachineSummary {
            states,
            alphabet,
            initial: self.initial.clone(),
            accepting,
            transitions,
        }
    }
}

/// A deterministic, ordered view of a machine, used for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineSummary<S, A> {
    pub states: Vec<S>,
    pub alphabet: Vec<A>,
    pub initial: S,
    pub accepting: Vec<S>,
    pub transitions: Vec<TransitionRow<S, A>>,
}

/// One row of a transition table: δ(from, symbol) = to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionRow<S, A> {
    pub from: S,
    pub symbol: A,
    pub to: S,
}
