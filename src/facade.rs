//! This module provides `ModuloFacade`, the entry point external callers use to compute the
//! remainder of a binary string. The facade owns one lazily built machine and reuses it for
//! every call until it is reset.

use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::debug;

use crate::binary_mod::{BinaryModBuilder, Modulus};
use crate::builder::MachineBuilder;
use crate::machine::FiniteMachine;
use crate::types::{value_kind, BuildError, RunError};

/// Errors returned by [`ModuloFacade::compute`] and [`ModuloFacade::compute_value`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComputeError {
    /// The input is not a string.
    #[error("input must be str: got {found}")]
    InputType { found: &'static str },
    /// The input is the empty string.
    #[error("input must be non-empty")]
    EmptyInput,
    /// The input contains a symbol other than '0' or '1'. The position and symbol are
    /// forwarded unchanged from the machine.
    #[error(transparent)]
    InvalidSymbol(#[from] RunError),
    /// The machine could not be built.
    #[error(transparent)]
    Build(#[from] BuildError),
}

type CachedMachine = Arc<FiniteMachine<usize, char>>;

/// Computes binary values modulo a fixed modulus through a cached machine.
///
/// The machine is built on first use, at most once even when several threads race to use
/// it first, and shared by all later calls. [`ModuloFacade::reset`] discards it so the next
/// call builds a fresh one.
pub struct ModuloFacade<B = BinaryModBuilder>
where
    B: MachineBuilder<State = usize, Symbol = char>,
{
    builder: B,
    source: B::Source,
    machine: RwLock<Option<CachedMachine>>,
}

impl ModuloFacade<BinaryModBuilder> {
    /// Creates a facade computing values modulo 3.
    pub fn mod_three() -> Self {
        Self::with_modulus(Modulus::THREE)
    }

    /// Creates a facade computing values modulo `modulus`.
    pub fn with_modulus(modulus: Modulus) -> Self {
        Self::new(BinaryModBuilder, modulus)
    }

    /// Returns the modulus this facade computes with.
    pub fn modulus(&self) -> Modulus {
        self.source
    }
}

impl Default for ModuloFacade<BinaryModBuilder> {
    fn default() -> Self {
        Self::mod_three()
    }
}

impl<B> ModuloFacade<B>
where
    B: MachineBuilder<State = usize, Symbol = char>,
{
    /// Creates a facade that builds its machine from `source` with `builder`. Nothing is
    /// built until the first computation.
    pub fn new(builder: B, source: B::Source) -> Self {
        Self {
            builder,
            source,
            machine: RwLock::new(None),
        }
    }

    /// Interprets `input` as a binary number, most significant bit first, and returns its
    /// value modulo the facade's modulus.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` with the remainder.
    /// * `Err(ComputeError::EmptyInput)` if `input` is empty.
    /// * `Err(ComputeError::InvalidSymbol)` if `input` contains anything but '0' and '1'.
    /// * `Err(ComputeError::Build)` if the machine could not be built.
    pub fn compute(&self, input: &str) -> Result<usize, ComputeError> {
        if input.is_empty() {
            return Err(ComputeError::EmptyInput);
        }

        let machine = self.machine()?;
        Ok(machine.run(input.chars())?)
    }

    /// Like [`ModuloFacade::compute`], for untyped input. Anything but a JSON string is
    /// rejected with `ComputeError::InputType`.
    pub fn compute_value(&self, input: &Value) -> Result<usize, ComputeError> {
        match input {
            Value::String(input) => self.compute(input),
            other => Err(ComputeError::InputType {
                found: value_kind(other),
            }),
        }
    }

    /// Returns the cached machine, building it if this is the first use.
    pub fn machine(&self) -> Result<CachedMachine, BuildError> {
        if let Some(machine) = self.read_slot().as_ref() {
            return Ok(Arc::clone(machine));
        }

        let mut slot = self.write_slot();
        // Another caller may have built it while we waited for the write lock.
        if let Some(machine) = slot.as_ref() {
            return Ok(Arc::clone(machine));
        }

        debug!("building cached machine");
        let machine = Arc::new(self.builder.build(&self.source)?);
        *slot = Some(Arc::clone(&machine));

        Ok(machine)
    }

    /// Discards the cached machine. The next computation builds it again.
    pub fn reset(&self) {
        if self.write_slot().take().is_some() {
            debug!("discarded cached machine");
        }
    }

    /// Checks whether a machine is currently cached.
    pub fn is_built(&self) -> bool {
        self.read_slot().is_some()
    }

    /// Returns the builder used to construct the machine.
    pub fn builder(&self) -> &B {
        &self.builder
    }

    // The slot only ever holds a complete machine, so a poisoned lock is still consistent.
    fn read_slot(&self) -> RwLockReadGuard<'_, Option<CachedMachine>> {
        self.machine.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Option<CachedMachine>> {
        self.machine.write().unwrap_or_else(PoisonError::into_inner)
    }
}
