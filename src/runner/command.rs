//! Filter command parsing.
//!
//! A script is one command per line:
//!
//! ```text
//! # comments and blank lines are skipped
//! insert 5
//! lookup 5
//! delete 5
//! show
//! ```
//!
//! Verbs are case-insensitive and `i`, `l` and `d` are accepted as short forms.

use std::fmt;

use crate::data_structures::kolea_cuckoo_filter::Key;
use crate::error::command::CommandError;

/// A single operation to run against the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterCommand {
    /// Insert a key
    Insert(Key),
    /// Query a key
    Lookup(Key),
    /// Delete a key
    Delete(Key),
    /// Capture the current table
    Show,
}

impl fmt::Display for FilterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert(key) => write!(f, "insert {key}"),
            Self::Lookup(key) => write!(f, "lookup {key}"),
            Self::Delete(key) => write!(f, "delete {key}"),
            Self::Show => f.write_str("show"),
        }
    }
}

/// Parses one script line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line_number: usize, line: &str) -> Result<Option<FilterCommand>, CommandError> {
    let content = line.split('#').next().unwrap_or_default();
    let mut words = content.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let verb = verb.to_ascii_lowercase();

    let command = match verb.as_str() {
        "show" => FilterCommand::Show,
        "insert" | "i" | "lookup" | "l" | "delete" | "d" => {
            let value = words.next().ok_or_else(|| CommandError::MissingKey {
                line: line_number,
                verb: verb.clone(),
            })?;
            let key: Key = value.parse().map_err(|_| CommandError::InvalidKey {
                line: line_number,
                value: value.to_string(),
            })?;
            match verb.as_str() {
                "insert" | "i" => FilterCommand::Insert(key),
                "lookup" | "l" => FilterCommand::Lookup(key),
                _ => FilterCommand::Delete(key),
            }
        }
        _ => {
            return Err(CommandError::UnknownCommand {
                line: line_number,
                verb,
            })
        }
    };

    if let Some(argument) = words.next() {
        return Err(CommandError::UnexpectedArgument {
            line: line_number,
            verb,
            argument: argument.to_string(),
        });
    }
    Ok(Some(command))
}

/// Parses a whole script, stopping at the first bad line.
pub fn parse_script(script: &str) -> Result<Vec<FilterCommand>, CommandError> {
    script
        .lines()
        .enumerate()
        .filter_map(|(index, line)| parse_line(index + 1, line).transpose())
        .collect()
}
