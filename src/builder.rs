//! This module provides the `Specification` carrier for unvalidated machine definitions and
//! the `MachineBuilder` trait through which every machine in this crate is constructed.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use tracing::debug;

use crate::machine::FiniteMachine;
use crate::types::BuildError;

/// An unvalidated 5-tuple.
///
/// Unlike [`FiniteMachine`], a specification may be incomplete or inconsistent, and its
/// fields may be changed freely. It only becomes a machine by going through a builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specification<S, A>
where
    S: Eq + Hash,
    A: Eq + Hash,
{
    pub states: HashSet<S>,
    pub alphabet: HashSet<A>,
    pub initial: S,
    pub accepting: HashSet<S>,
    pub transitions: HashMap<(S, A), S>,
}

impl<S, A> Specification<S, A>
where
    S: Eq + Hash,
    A: Eq + Hash,
{
    /// Creates an empty specification that starts in `initial`.
    pub fn new(initial: S) -> Self {
        Self {
            states: HashSet::new(),
            alphabet: HashSet::new(),
            initial,
            accepting: HashSet::new(),
            transitions: HashMap::new(),
        }
    }

    /// Adds δ(from, symbol) = to, registering `from`, `symbol` and `to` in Q and Σ.
    pub fn with_transition(mut self, from: S, symbol: A, to: S) -> Self
    where
        S: Clone,
        A: Clone,
    {
        self.states.insert(from.clone());
        self.states.insert(to.clone());
        self.alphabet.insert(symbol.clone());
        self.transitions.insert((from, symbol), to);
        self
    }

    /// Marks `state` as accepting, registering it in Q.
    pub fn with_accepting(mut self, state: S) -> Self
    where
        S: Clone,
    {
        self.states.insert(state.clone());
        self.accepting.insert(state);
        self
    }
}

/// Builds a validated [`FiniteMachine`] from some source description.
///
/// This is the one construction interface of the crate. [`TableBuilder`] builds from an
/// explicit [`Specification`]; the binary modulus builder builds from a modulus.
pub trait MachineBuilder {
    /// The machine's state type.
    type State;
    /// The machine's symbol type.
    type Symbol;
    /// What the builder reads to produce a machine.
    type Source;

    /// Produces a machine from `source`, or the reason it cannot be built.
    fn build(
        &self,
        source: &Self::Source,
    ) -> Result<FiniteMachine<Self::State, Self::Symbol>, BuildError>;
}

/// Builds a machine from an explicit transition table.
///
/// The specification is only borrowed: every collection is copied into the new machine,
/// so later changes to the specification are never visible through it.
pub struct TableBuilder<S, A> {
    _marker: PhantomData<fn() -> (S, A)>,
}

impl<S, A> TableBuilder<S, A> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<S, A> Default for TableBuilder<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> Clone for TableBuilder<S, A> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<S, A> Copy for TableBuilder<S, A> {}

impl<S, A> Debug for TableBuilder<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TableBuilder")
    }
}

impl<S, A> MachineBuilder for TableBuilder<S, A>
where
    S: Eq + Hash + Clone + Debug,
    A: Eq + Hash + Clone + Debug,
{
    type State = S;
    type Symbol = A;
    type Source = Specification<S, A>;

    fn build(&self, spec: &Specification<S, A>) -> Result<FiniteMachine<S, A>, BuildError> {
        debug!(
            states = spec.states.len(),
            symbols = spec.alphabet.len(),
            transitions = spec.transitions.len(),
            "building machine from table"
        );

        let machine = FiniteMachine::new(
            spec.states.clone(),
            spec.alphabet.clone(),
            spec.initial.clone(),
            spec.accepting.clone(),
            spec.transitions.clone(),
        )?;

        Ok(machine)
    }
}
