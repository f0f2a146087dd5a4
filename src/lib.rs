//! This crate provides a generic deterministic finite automaton engine.
//! It includes the validated automaton model, a table builder that turns unvalidated
//! specifications into machines, the binary modulus machine family, and a facade that
//! computes binary remainders through a cached machine.

pub mod binary_mod;
pub mod builder;
pub mod facade;
pub mod machine;
pub mod types;

/// Re-exports the binary modulus family generator from the binary_mod module.
pub use binary_mod::{
    binary_mod_machine, binary_mod_spec, BinaryModBuilder, Modulus, ModulusError, BINARY_ALPHABET,
};
/// Re-exports the specification carrier and builders from the builder module.
pub use builder::{MachineBuilder, Specification, TableBuilder};
/// Re-exports the `ModuloFacade` struct and its error type from the facade module.
pub use facade::{ComputeError, ModuloFacade};
/// Re-exports the `FiniteMachine` struct and its summary view from the machine module.
pub use machine::{FiniteMachine, MachineSummary, TransitionRow};
/// Re-exports the error types shared by the machine and its builders.
pub use types::{BuildError, DefinitionError, RunError, MAX_REPORTED_MISSING};
