//! Command script error module.

use thiserror::Error;

/// Errors raised while parsing a filter command script.
///
/// Line numbers are 1-based.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum CommandError {
    /// The first word of the line is not a known command.
    #[error("line {line}: unknown command '{verb}'")]
    UnknownCommand {
        /// Line the command appeared on
        line: usize,
        /// The unrecognised word
        verb: String,
    },

    /// A command that needs a key was given none.
    #[error("line {line}: '{verb}' needs an integer key")]
    MissingKey {
        /// Line the command appeared on
        line: usize,
        /// The command missing its key
        verb: String,
    },

    /// The key is not a 32-bit integer.
    #[error("line {line}: '{value}' is not a 32-bit integer key")]
    InvalidKey {
        /// Line the command appeared on
        line: usize,
        /// The text that failed to parse
        value: String,
    },

    /// Extra words after a complete command.
    #[error("line {line}: unexpected argument '{argument}' after '{verb}'")]
    UnexpectedArgument {
        /// Line the command appeared on
        line: usize,
        /// The command
        verb: String,
        /// The first surplus word
        argument: String,
    },
}
