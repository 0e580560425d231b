//! The REPL: reads lines from stdin, dispatches them, prints exact results.
//!
//! Deliberately plain `stdin`/`stdout` line reading, no raw terminal mode --
//! the result strings below are meant to be diffed byte-for-byte by scripted
//! tests, which rules out anything that writes cursor-control escapes.

use std::io::{self, BufRead, Write};

use crate::command::{self, Outcome};
use crate::errors::Error;
use crate::storage::Table;

const PROMPT: &str = "db > ";

pub fn run<R: BufRead, W: Write>(mut table: Table, mut input: R, mut output: W) -> Result<(), Error> {
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let mut line = String::new();
        let bytes_read = input.read_line(&mut line)?;
        if bytes_read == 0 {
            table.close()?;
            return Ok(());
        }
        let line = line.trim_end_matches(['\n', '\r']);

        match command::dispatch(line, &mut table) {
            Ok(Outcome::Exit) => {
                table.close()?;
                return Ok(());
            }
            Ok(Outcome::Executed) => {
                writeln!(output, "executed.")?;
            }
            Ok(Outcome::Selected(rows)) => {
                for row in &rows {
                    writeln!(output, "{row}")?;
                }
                writeln!(output, "executed.")?;
            }
            Ok(Outcome::Printed(text)) => {
                writeln!(output, "{text}")?;
            }
            Err(err) if err.is_recoverable() => {
                writeln!(output, "{err}")?;
            }
            Err(fatal) => return Err(fatal),
        }
    }
}

pub fn run_stdio(table: Table) -> Result<(), Error> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run(table, stdin.lock(), stdout.lock())
}
