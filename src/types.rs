//! This module defines the error types shared by the automaton model and its builders,
//! together with the constants that shape their diagnostics.

use serde_json::Value;
use thiserror::Error;

use crate::binary_mod::ModulusError;

/// The maximum number of missing `(state, symbol)` pairs listed in a totality error.
pub const MAX_REPORTED_MISSING: usize = 10;

/// Represents a violation of the 5-tuple invariants, detected while constructing a machine.
///
/// States and symbols are carried in their `Debug` rendering so the error does not have
/// to be generic over the machine's state and symbol types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// The state set Q is empty.
    #[error("Q must be non-empty")]
    EmptyStates,
    /// The alphabet Σ is empty.
    #[error("Sigma must be non-empty")]
    EmptyAlphabet,
    /// The initial state is not a member of Q.
    #[error("q0 must be a member of Q: q0={initial}")]
    InitialNotInStates { initial: String },
    /// Some accepting states are not members of Q.
    #[error("F must be a subset of Q: extra={}", render_list(.extra))]
    AcceptingNotInStates { extra: Vec<String> },
    /// A transition leaves from a state outside Q.
    #[error("delta key state must be in Q: state={state}, symbol={symbol}")]
    TransitionStateNotInStates { state: String, symbol: String },
    /// A transition reads a symbol outside Σ.
    #[error("delta key symbol must be in Sigma: state={state}, symbol={symbol}")]
    TransitionSymbolNotInAlphabet { state: String, symbol: String },
    /// A transition leads to a state outside Q.
    #[error("delta value must be in Q: key=({state}, {symbol}), next_state={next_state}")]
    TransitionTargetNotInStates {
        state: String,
        symbol: String,
        next_state: String,
    },
    /// The transition function is not defined for every pair in Q×Σ.
    ///
    /// `missing` holds at most [`MAX_REPORTED_MISSING`] pairs; `truncated` tells whether
    /// more were left out.
    #[error(
        "delta must be total over QxSigma: expected={expected}, actual={actual}; missing={}{}",
        render_pairs(.missing),
        render_truncated(.truncated)
    )]
    NotTotal {
        expected: usize,
        actual: usize,
        missing: Vec<(String, String)>,
        truncated: bool,
    },
}

/// Represents the errors that can occur while driving a validated machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// A symbol outside the alphabet was supplied. `index` is the zero-based position in
    /// the input for `run`, and `None` for a single `step`.
    #[error("invalid symbol{}: {symbol}", render_index(.index))]
    InvalidSymbol {
        index: Option<usize>,
        symbol: String,
    },
    /// `step` was called with a state that is not a member of Q.
    #[error("no transition from unknown state {state} on symbol {symbol}")]
    UnknownState { state: String, symbol: String },
}

impl RunError {
    /// Returns the input position of an invalid symbol, if known.
    pub fn index(&self) -> Option<usize> {
        match self {
            RunError::InvalidSymbol { index, .. } => *index,
            RunError::UnknownState { .. } => None,
        }
    }

    /// Returns the offending symbol in its `Debug` rendering.
    pub fn symbol(&self) -> &str {
        match self {
            RunError::InvalidSymbol { symbol, .. } | RunError::UnknownState { symbol, .. } => {
                symbol
            }
        }
    }
}

/// The single error type returned by every `MachineBuilder`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The builder's source parameter was rejected before any table was generated.
    #[error(transparent)]
    Modulus(#[from] ModulusError),
    /// The generated or supplied table violates a machine invariant.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Names the JSON type of `value`, for type errors on untyped input.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn render_index(index: &Option<usize>) -> String {
    index
        .map(|index| format!(" at index {}", index))
        .unwrap_or_default()
}

fn render_truncated(truncated: &bool) -> &'static str {
    if *truncated {
        " (truncated)"
    } else {
        ""
    }
}

fn render_list(items: &[String]) -> String {
    format!("[{}]", items.join(", "))
}

fn render_pairs(pairs: &[(String, String)]) -> String {
    let rendered = pairs
        .iter()
        .map(|(state, symbol)| format!("({}, {})", state, symbol))
        .collect::<Vec<_>>();

    render_list(&rendered)
}
