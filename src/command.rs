//! Statement parsing and meta-command dispatch.
//!
//! Lines beginning with `.` are meta-commands, handled without going through
//! the statement grammar at all. Everything else is a statement: `insert` or
//! `select`, the only two this database understands.

use tracing::trace;

use crate::errors::Error;
use crate::storage::node::{
    COMMON_NODE_HEADER_SIZE, LEAF_NODE_CELL_SIZE, LEAF_NODE_HEADER_SIZE, LEAF_NODE_MAX_CELLS,
    LEAF_NODE_SPACE_FOR_CELLS,
};
use crate::storage::row::{Row, ROW_SIZE};
use crate::storage::Table;

pub enum Statement {
    Insert(Row),
    Select,
}

/// Outcome of dispatching one REPL line.
pub enum Outcome {
    /// Statement executed; print "executed.".
    Executed,
    /// Select executed; print each row then "executed.".
    Selected(Vec<Row>),
    /// `.exit` was issued; the REPL should close the table and stop.
    Exit,
    /// Plain text produced by a meta-command (`.btree`, `.constants`).
    Printed(String),
}

pub fn dispatch(line: &str, table: &mut Table) -> Result<Outcome, Error> {
    if let Some(command) = line.strip_prefix('.') {
        return run_meta_command(command, table, line);
    }

    let statement = parse_statement(line)?;
    match statement {
        Statement::Insert(row) => {
            table.insert(row)?;
            Ok(Outcome::Executed)
        }
        Statement::Select => {
            let rows = table.select()?;
            Ok(Outcome::Selected(rows))
        }
    }
}

fn run_meta_command(command: &str, table: &mut Table, full_line: &str) -> Result<Outcome, Error> {
    match command {
        "exit" => Ok(Outcome::Exit),
        "btree" => {
            let rendering = table.render_tree()?;
            Ok(Outcome::Printed(rendering))
        }
        "constants" => Ok(Outcome::Printed(constants_listing())),
        _ => Err(Error::UnrecognizedCommand(full_line.to_string())),
    }
}

fn constants_listing() -> String {
    format!(
        "ROW_SIZE: {ROW_SIZE}\n\
         COMMON_NODE_HEADER_SIZE: {COMMON_NODE_HEADER_SIZE}\n\
         LEAF_NODE_HEADER_SIZE: {LEAF_NODE_HEADER_SIZE}\n\
         LEAF_NODE_CELL_SIZE: {LEAF_NODE_CELL_SIZE}\n\
         LEAF_NODE_SPACE_FOR_CELLS: {LEAF_NODE_SPACE_FOR_CELLS}\n\
         LEAF_NODE_MAX_CELLS: {LEAF_NODE_MAX_CELLS}"
    )
}

fn parse_statement(line: &str) -> Result<Statement, Error> {
    let mut tokens = line.split_ascii_whitespace();
    let verb = tokens.next().ok_or_else(|| Error::UnrecognizedStatement(line.to_string()))?;

    match verb {
        "insert" => {
            let args: Vec<&str> = tokens.collect();
            if args.len() != 3 {
                return Err(Error::Syntax(line.to_string()));
            }
            let id: i64 = args[0].parse().map_err(|_| Error::Syntax(line.to_string()))?;
            if id < 0 {
                return Err(Error::NegativeId);
            }
            let id = id as u32;
            trace!(id, "parsed insert statement");
            let row = Row::new(id, args[1].to_string(), args[2].to_string())?;
            Ok(Statement::Insert(row))
        }
        "select" => Ok(Statement::Select),
        _ => Err(Error::UnrecognizedStatement(line.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_insert() {
        match parse_statement("insert 1 user user@example.com").unwrap() {
            Statement::Insert(row) => {
                assert_eq!(row.id, 1);
                assert_eq!(row.username, "user");
                assert_eq!(row.email, "user@example.com");
            }
            _ => panic!("expected insert"),
        }
    }

    #[test]
    fn rejects_negative_id() {
        assert!(matches!(
            parse_statement("insert -1 user user@example.com"),
            Err(Error::NegativeId)
        ));
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!(matches!(
            parse_statement("insert 1 user"),
            Err(Error::Syntax(_))
        ));
    }

    #[test]
    fn unrecognized_verb() {
        assert!(matches!(
            parse_statement("update 1 user"),
            Err(Error::UnrecognizedStatement(_))
        ));
    }
}
