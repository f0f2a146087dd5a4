//! Interactive mode.

use modulo_three::{MachineBuilder, ModuloFacade};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::io::{self, BufRead, Write};

const EXIT_COMMANDS: [&str; 3] = ["exit", "quit", "q"];
const PROMPT: &str = "> ";

/// Reads inputs from stdin, one per line, until an exit command or end of input.
///
/// A terminal gets a line editor with history; piped stdin is read line by line and
/// prints nothing but results.
pub fn run<B>(facade: &ModuloFacade<B>) -> rustyline::Result<()>
where
    B: MachineBuilder<State = usize, Symbol = char>,
{
    if atty::is(atty::Stream::Stdin) {
        return run_editor(facade);
    }

    let stdin = io::stdin();
    run_with(facade, stdin.lock(), &mut io::stdout(), &mut io::stderr())?;
    Ok(())
}

fn run_editor<B>(facade: &ModuloFacade<B>) -> rustyline::Result<()>
where
    B: MachineBuilder<State = usize, Symbol = char>,
{
    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(config)?;

    println!("Enter a binary number, or 'exit' to quit.");

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if !evaluate(facade, &line, &mut io::stdout(), &mut io::stderr())? {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

fn run_with<B, R, W, E>(
    facade: &ModuloFacade<B>,
    mut input: R,
    out: &mut W,
    err: &mut E,
) -> io::Result<()>
where
    B: MachineBuilder<State = usize, Symbol = char>,
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        // Undecodable bytes become U+FFFD and are reported as invalid symbols.
        let line = String::from_utf8_lossy(&buf);
        if !evaluate(facade, &line, out, err)? {
            break;
        }
    }

    Ok(())
}

/// Handles one line of input. Returns `false` once an exit command is read.
fn evaluate<B, W, E>(
    facade: &ModuloFacade<B>,
    line: &str,
    out: &mut W,
    err: &mut E,
) -> io::Result<bool>
where
    B: MachineBuilder<State = usize, Symbol = char>,
    W: Write,
    E: Write,
{
    let line = line.trim();
    if is_exit_command(line) {
        return Ok(false);
    }

    match facade.compute(line) {
        Ok(remainder) => writeln!(out, "{}", remainder)?,
        Err(e) => writeln!(err, "{}", e)?,
    }

    Ok(true)
}

fn is_exit_command(line: &str) -> bool {
    EXIT_COMMANDS
        .iter()
        .any(|command| line.eq_ignore_ascii_case(command))
}
