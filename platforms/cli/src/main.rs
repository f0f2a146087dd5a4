mod repl;

use clap::Parser;
use modulo_three::{Modulus, ModuloFacade};
use serde_json::Value;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Computes the remainder of a binary number with a finite automaton.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  modulo-three 1011
  modulo-three --modulus 5 1101
  printf '1011\\n110\\nq\\n' | modulo-three --interactive")]
struct Cli {
    /// Binary input, most significant bit first
    #[clap(required_unless_present_any = ["interactive", "table"])]
    input: Option<String>,

    /// Read one input per line from stdin until `exit`, `quit` or `q`
    #[clap(short, long, conflicts_with = "input")]
    interactive: bool,

    /// The modulus to compute with
    #[clap(short, long, env = "MODULO_THREE_MODULUS", default_value = "3")]
    modulus: String,

    /// Print the machine's transition table as JSON and exit
    #[clap(long, conflicts_with_all = ["input", "interactive"])]
    table: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let facade = match parse_modulus(&cli.modulus) {
        Ok(modulus) => ModuloFacade::with_modulus(modulus),
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.table {
        return print_table(&facade);
    }

    if cli.interactive {
        return match repl::run(&facade) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let input = cli.input.unwrap_or_default();
    match facade.compute(&input) {
        Ok(remainder) => {
            println!("{}", remainder);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Interprets the raw `--modulus` value as a JSON scalar, so `true` and `"3"` are rejected
/// as non-integers rather than coerced. Anything that is not JSON is treated as text.
fn parse_modulus(raw: &str) -> Result<Modulus, modulo_three::ModulusError> {
    let value = serde_json::from_str::<Value>(raw.trim())
        .unwrap_or_else(|_| Value::String(raw.to_string()));
    tracing::debug!(modulus = %value, "parsed modulus");

    Modulus::try_from(&value)
}

fn print_table(facade: &ModuloFacade) -> ExitCode {
    let rendered = facade
        .machine()
        .map_err(|e| e.to_string())
        .and_then(|machine| {
            serde_json::to_string_pretty(&machine.summary()).map_err(|e| e.to_string())
        });

    match rendered {
        Ok(table) => {
            println!("{}", table);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
