//! The binary modulus machine family.
//!
//! For a modulus `m`, the machine reads a binary number one bit at a time, most significant
//! bit first, and its state is always the value read so far modulo `m`:
//!
//! * Q = {0, …, m-1}, Σ = {'0', '1'}, q0 = 0, F = Q
//! * δ(s, b) = (2·s + b) mod m
//!
//! Every pair in Q×Σ is enumerated exactly once, so the generated table is total by
//! construction.

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use thiserror::Error;

use crate::builder::{MachineBuilder, Specification, TableBuilder};
use crate::machine::FiniteMachine;
use crate::types::{value_kind, BuildError};

/// The input alphabet of every binary modulus machine.
pub const BINARY_ALPHABET: [char; 2] = ['0', '1'];

/// Errors raised while validating a modulus, before any state is generated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModulusError {
    /// The value is not an integer. Booleans and numeric strings fall in this category.
    #[error("mod must be int: got {found}")]
    NotAnInteger { found: &'static str },
    /// The integer is below 1.
    #[error("mod must be >= 1: got {value}")]
    OutOfRange { value: i128 },
    /// The integer does not fit the platform's state type.
    #[error("mod must fit in usize: got {value}")]
    TooLarge { value: i128 },
}

impl From<Infallible> for ModulusError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// A validated modulus, at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Modulus(usize);

impl Modulus {
    /// The modulus of the default facade machine.
    pub const THREE: Modulus = Modulus(3);

    /// Creates a modulus, rejecting 0.
    pub fn new(value: usize) -> Result<Self, ModulusError> {
        if value < 1 {
            return Err(ModulusError::OutOfRange { value: 0 });
        }
        Ok(Self(value))
    }

    /// Returns the modulus as an integer.
    pub fn get(self) -> usize {
        self.0
    }

    fn from_integer(value: i128) -> Result<Self, ModulusError> {
        if value < 1 {
            return Err(ModulusError::OutOfRange { value });
        }

        usize::try_from(value)
            .map(Self)
            .map_err(|_| ModulusError::TooLarge { value })
    }
}

macro_rules! impl_try_from_integer {
    ($($int:ty),*) => {
        $(
            impl TryFrom<$int> for Modulus {
                type Error = ModulusError;

                fn try_from(value: $int) -> Result<Self, Self::Error> {
                    Modulus::from_integer(i128::from(value))
                }
            }
        )*
    };
}

impl_try_from_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

impl TryFrom<usize> for Modulus {
    type Error = ModulusError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Modulus::new(value)
    }
}

/// A boolean has a 0/1 representation but is never a modulus.
impl TryFrom<bool> for Modulus {
    type Error = ModulusError;

    fn try_from(_: bool) -> Result<Self, Self::Error> {
        Err(ModulusError::NotAnInteger { found: "bool" })
    }
}

/// Text is not parsed: `"3"` is rejected the same way as `"three"`.
impl TryFrom<&str> for Modulus {
    type Error = ModulusError;

    fn try_from(_: &str) -> Result<Self, Self::Error> {
        Err(ModulusError::NotAnInteger { found: "string" })
    }
}

impl TryFrom<&Value> for Modulus {
    type Error = ModulusError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(number) => {
                if let Some(value) = number.as_i64() {
                    Modulus::from_integer(i128::from(value))
                } else if let Some(value) = number.as_u64() {
                    Modulus::from_integer(i128::from(value))
                } else {
                    Err(ModulusError::NotAnInteger { found: "float" })
                }
            }
            other => Err(ModulusError::NotAnInteger {
                found: value_kind(other),
            }),
        }
    }
}

/// Generates the specification of the binary modulus machine for `modulus`.
///
/// The modulus is validated before anything is generated.
///
/// # Arguments
///
/// * `modulus` - Anything convertible into a [`Modulus`]: an integer, a `Modulus`, or an
///   untyped JSON value. Booleans and strings are always rejected.
///
/// # Returns
///
/// * `Ok(Specification)` with `m` states and the full `m×2` transition table.
/// * `Err(ModulusError::NotAnInteger)` if the value is not an integer.
/// * `Err(ModulusError::OutOfRange)` if the integer is below 1.
pub fn binary_mod_spec<M>(modulus: M) -> Result<Specification<usize, char>, ModulusError>
where
    M: TryInto<Modulus>,
    M::Error: Into<ModulusError>,
{
    let modulus: Modulus = modulus.try_into().map_err(Into::<ModulusError>::into)?;
    let m = modulus.get();

    let transitions = (0..m)
        .flat_map(|state| {
            BINARY_ALPHABET
                .iter()
                .map(move |&bit| ((state, bit), next_remainder(state, bit, m)))
        })
        .collect::<HashMap<_, _>>();
    let states = (0..m).collect::<HashSet<_>>();

    Ok(Specification {
        accepting: states.clone(),
        states,
        alphabet: HashSet::from(BINARY_ALPHABET),
        initial: 0,
        transitions,
    })
}

/// Generates and validates the binary modulus machine for `modulus`.
pub fn binary_mod_machine<M>(modulus: M) -> Result<FiniteMachine<usize, char>, BuildError>
where
    M: TryInto<Modulus>,
    M::Error: Into<ModulusError>,
{
    let spec = binary_mod_spec(modulus)?;
    TableBuilder::new().build(&spec)
}

/// Builds binary modulus machines from a [`Modulus`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BinaryModBuilder;

impl MachineBuilder for BinaryModBuilder {
    type State = usize;
    type Symbol = char;
    type Source = Modulus;

    fn build(&self, modulus: &Modulus) -> Result<FiniteMachine<usize, char>, BuildError> {
        binary_mod_machine(*modulus)
    }
}

/// (2·state + bit) mod m, widened so it cannot overflow for any `usize` modulus.
fn next_remainder(state: usize, bit: char, m: usize) -> usize {
    let bit = u128::from(bit == '1');
    ((2 * state as u128 + bit) % m as u128) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn binary_value_mod(bits: &str, m: usize) -> usize {
        let m = m as u128;
        bits.chars().fold(0u128, |remainder, bit| {
            (remainder * 2 + u128::from(bit.to_digit(2).unwrap())) % m
        }) as usize
    }

    fn to_bits(bits: &[bool]) -> String {
        bits.iter().map(|&bit| if bit { '1' } else { '0' }).collect()
    }

    #[test]
    fn test_mod_three_builds_exact_transition_graph() {
        let machine = binary_mod_machine(3).unwrap();

        assert_eq!(machine.states(), &HashSet::from([0, 1, 2]));
        assert_eq!(machine.alphabet(), &HashSet::from(['0', '1']));
        assert_eq!(machine.initial(), &0);
        assert_eq!(machine.accepting(), &HashSet::from([0, 1, 2]));
        assert_eq!(
            machine.transitions(),
            &HashMap::from([
                ((0, '0'), 0),
                ((0, '1'), 1),
                ((1, '0'), 2),
                ((1, '1'), 0),
                ((2, '0'), 1),
                ((2, '1'), 2),
            ])
        );
    }

    #[test]
    fn test_transition_graph_is_total() {
        for m in 1..=16 {
            let machine = binary_mod_machine(m).unwrap();
            for state in machine.states() {
                for symbol in machine.alphabet() {
                    assert!(machine.transition(state, symbol).is_some());
                }
            }
            assert_eq!(machine.transitions().len(), m as usize * 2);
        }
    }

    #[test]
    fn test_mod_three_examples() {
        let machine = binary_mod_machine(3).unwrap();

        assert_eq!(machine.run("1101".chars()), Ok(1));
        assert_eq!(machine.run("1110".chars()), Ok(2));
        assert_eq!(machine.run("1111".chars()), Ok(0));
        assert_eq!(machine.run("1011".chars()), Ok(2));
        assert_eq!(machine.run("0001011".chars()), Ok(2));
    }

    #[test]
    fn test_mod_two_example() {
        let machine = binary_mod_machine(2).unwrap();

        assert_eq!(machine.run("101".chars()), Ok(1));
        assert_eq!(machine.run("110".chars()), Ok(0));
    }

    #[test]
    fn test_mod_one_is_single_self_looping_state() {
        let machine = binary_mod_machine(1).unwrap();

        assert_eq!(machine.states(), &HashSet::from([0]));
        assert_eq!(machine.accepting(), &HashSet::from([0]));
        assert_eq!(
            machine.transitions(),
            &HashMap::from([((0, '0'), 0), ((0, '1'), 0)])
        );
        assert_eq!(machine.run("1011101".chars()), Ok(0));
        assert_eq!(machine.run("".chars()), Ok(0));
    }

    #[test]
    fn test_mod_three_matches_reference_for_all_short_inputs() {
        let machine = binary_mod_machine(3).unwrap();

        for length in 1..=8u32 {
            for value in 0..(1usize << length) {
                let bits = format!("{:0width$b}", value, width = length as usize);
                assert_eq!(machine.run(bits.chars()), Ok(value % 3), "input {}", bits);
            }
        }
    }

    #[test]
    fn test_invalid_symbol_names_index_and_symbol() {
        let machine = binary_mod_machine(3).unwrap();

        let error = machine.run("1021".chars()).unwrap_err();
        assert_eq!(error.index(), Some(2));
        assert_eq!(error.symbol(), "'2'");
        assert_eq!(error.to_string(), "invalid symbol at index 2: '2'");
    }

    #[test]
    fn test_bool_modulus_is_type_error() {
        assert_eq!(
            binary_mod_spec(true).unwrap_err(),
            ModulusError::NotAnInteger { found: "bool" }
        );
        assert_eq!(
            binary_mod_spec(false).unwrap_err(),
            ModulusError::NotAnInteger { found: "bool" }
        );
    }

    #[test]
    fn test_string_modulus_is_type_error() {
        assert_eq!(
            binary_mod_spec("3").unwrap_err(),
            ModulusError::NotAnInteger { found: "string" }
        );
    }

    #[test]
    fn test_modulus_below_one_is_range_error() {
        assert_eq!(
            binary_mod_spec(0).unwrap_err(),
            ModulusError::OutOfRange { value: 0 }
        );
        assert_eq!(
            binary_mod_spec(-1).unwrap_err(),
            ModulusError::OutOfRange { value: -1 }
        );
        assert_eq!(
            binary_mod_spec(0usize).unwrap_err(),
            ModulusError::OutOfRange { value: 0 }
        );
        assert_eq!(
            binary_mod_spec(i64::MIN).unwrap_err().to_string(),
            format!("mod must be >= 1: got {}", i64::MIN)
        );
    }

    #[test]
    fn test_json_modulus_values() {
        assert_eq!(Modulus::try_from(&json!(5)), Ok(Modulus::new(5).unwrap()));
        assert_eq!(
            Modulus::try_from(&json!(true)),
            Err(ModulusError::NotAnInteger { found: "bool" })
        );
        assert_eq!(
            Modulus::try_from(&json!("3")),
            Err(ModulusError::NotAnInteger { found: "string" })
        );
        assert_eq!(
            Modulus::try_from(&json!(3.0)),
            Err(ModulusError::NotAnInteger { found: "float" })
        );
        assert_eq!(
            Modulus::try_from(&json!(null)),
            Err(ModulusError::NotAnInteger { found: "null" })
        );
        assert_eq!(
            Modulus::try_from(&json!(0)),
            Err(ModulusError::OutOfRange { value: 0 })
        );
        assert_eq!(
            Modulus::try_from(&json!(-4)),
            Err(ModulusError::OutOfRange { value: -4 })
        );
    }

    #[test]
    fn test_error_is_reported_through_machine_builder() {
        assert_eq!(
            binary_mod_machine(true).unwrap_err(),
            BuildError::Modulus(ModulusError::NotAnInteger { found: "bool" })
        );
        assert_eq!(
            binary_mod_machine(0).unwrap_err().to_string(),
            "mod must be >= 1: got 0"
        );
    }

    #[test]
    fn test_builder_trait_builds_from_modulus() {
        let machine = BinaryModBuilder.build(&Modulus::THREE).unwrap();

        assert_eq!(machine.run("1110".chars()), Ok(2));
    }

    #[test]
    fn test_spec_accepts_validated_modulus() {
        let spec = binary_mod_spec(Modulus::THREE).unwrap();

        assert_eq!(spec.states.len(), 3);
        assert_eq!(spec.transitions.len(), 6);
    }

    /// The mod-`m` family with only remainder 0 accepting.
    fn divisibility_machine(m: usize) -> FiniteMachine<usize, char> {
        let mut spec = binary_mod_spec(m).unwrap();
        spec.accepting = HashSet::from([0]);
        TableBuilder::new().build(&spec).unwrap()
    }

    #[test]
    fn test_divisibility_machine_rejects_nonzero_remainders() {
        let machine = divisibility_machine(3);

        assert_eq!(machine.accepts("110".chars()), Ok(true));
        assert_eq!(machine.accepts("111".chars()), Ok(false));
        assert_eq!(machine.accepts("1011".chars()), Ok(false));
        assert_eq!(machine.accepts("".chars()), Ok(true));
    }

    #[test]
    fn test_next_remainder_does_not_overflow() {
        assert_eq!(
            next_remainder(usize::MAX - 1, '1', usize::MAX),
            usize::MAX - 1
        );
    }

    proptest! {
        #[test]
        fn machine_computes_binary_value_mod_m(
            m in 1usize..64,
            bits in proptest::collection::vec(any::<bool>(), 0..64)
        ) {
            let machine = binary_mod_machine(m).unwrap();
            let input = to_bits(&bits);

            prop_assert_eq!(machine.run(input.chars()), Ok(binary_value_mod(&input, m)));
        }

        #[test]
        fn machine_matches_integer_value_mod_m(m in 1usize..1000, value in any::<u64>()) {
            let machine = binary_mod_machine(m).unwrap();
            let input = format!("{:b}", value);

            prop_assert_eq!(machine.run(input.chars()), Ok((value % m as u64) as usize));
        }

        #[test]
        fn acceptance_is_membership_of_final_state(
            m in 2usize..32,
            bits in proptest::collection::vec(any::<bool>(), 0..32)
        ) {
            let machine = divisibility_machine(m);
            let input = to_bits(&bits);
            let state = machine.run(input.chars()).unwrap();

            prop_assert_eq!(
                machine.accepts(input.chars()),
                Ok(machine.accepting().contains(&state))
            );
            prop_assert_eq!(
                machine.accepts(input.chars()),
                Ok(binary_value_mod(&input, m) == 0)
            );
        }

        #[test]
        fn empty_input_stays_in_initial_state(m in 1usize..256) {
            let machine = binary_mod_machine(m).unwrap();

            prop_assert_eq!(machine.run("".chars()), Ok(*machine.initial()));
        }
    }
}
