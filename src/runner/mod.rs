//! Command runner for Kolea.
//!
//! Drives a [`KoleaCuckooFilter`] from parsed [`FilterCommand`]s, one at a time
//! or as a whole script, and collects a printable outcome for each.

use std::fmt;

use rand::Rng;
use tracing::{debug, instrument};

use crate::data_structures::kolea_cuckoo_filter::{Key, KoleaCuckooFilter, TableSnapshot};
use crate::error::KoleaResult;

pub mod command;

pub use command::{parse_line, parse_script, FilterCommand};

/// Result of running one command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// The key was stored
    Inserted(Key),
    /// The key was already present
    Duplicate(Key),
    /// Lookup result
    Lookup {
        /// Queried key
        key: Key,
        /// Whether a matching fingerprint was found
        found: bool,
    },
    /// Delete result
    Delete {
        /// Deleted key
        key: Key,
        /// Whether a fingerprint was removed
        removed: bool,
    },
    /// Table captured by `show`
    Table(TableSnapshot),
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inserted(key) => write!(f, "inserted {key}"),
            Self::Duplicate(key) => write!(f, "{key} already present"),
            Self::Lookup { key, found: true } => write!(f, "{key} possibly present"),
            Self::Lookup { key, found: false } => write!(f, "{key} not present"),
            Self::Delete { key, removed: true } => write!(f, "deleted {key}"),
            Self::Delete { key, removed: false } => write!(f, "{key} not found for deletion"),
            Self::Table(snapshot) => {
                write!(
                    f,
                    "{} buckets x {} slots",
                    snapshot.bucket_count, snapshot.bucket_size
                )?;
                for (index, bucket) in snapshot.buckets.iter().enumerate() {
                    write!(f, "\n  {index:>4}:")?;
                    for slot in bucket {
                        match slot {
                            Some(fingerprint) => write!(f, " {fingerprint:>3}")?,
                            None => f.write_str("   .")?,
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

/// Applies commands to an owned filter.
#[derive(Debug)]
pub struct CommandRunner<R> {
    filter: KoleaCuckooFilter<R>,
}

impl<R: Rng> CommandRunner<R> {
    /// Wraps a filter.
    pub fn new(filter: KoleaCuckooFilter<R>) -> Self {
        Self { filter }
    }

    /// Runs a single command.
    ///
    /// Only an insert that exhausts the resize budget fails; the filter is left
    /// as it was before that insert.
    #[instrument(level = "debug", skip_all, fields(command = %command))]
    pub fn run(&mut self, command: FilterCommand) -> KoleaResult<CommandOutcome> {
        let outcome = match command {
            FilterCommand::Insert(key) => {
                if self.filter.insert(key)? {
                    CommandOutcome::Inserted(key)
                } else {
                    CommandOutcome::Duplicate(key)
                }
            }
            FilterCommand::Lookup(key) => CommandOutcome::Lookup {
                key,
                found: self.filter.lookup(key),
            },
            FilterCommand::Delete(key) => CommandOutcome::Delete {
                key,
                removed: self.filter.delete(key),
            },
            FilterCommand::Show => CommandOutcome::Table(self.filter.snapshot()),
        };
        debug!(%outcome, "Command complete");
        Ok(outcome)
    }

    /// Runs commands in order, stopping at the first failure.
    pub fn run_all<I>(&mut self, commands: I) -> KoleaResult<Vec<CommandOutcome>>
    where
        I: IntoIterator<Item = FilterCommand>,
    {
        commands.into_iter().map(|command| self.run(command)).collect()
    }

    /// Parses and runs a script.
    pub fn run_script(&mut self, script: &str) -> KoleaResult<Vec<CommandOutcome>> {
        let commands = parse_script(script)?;
        self.run_all(commands)
    }

    /// The wrapped filter.
    pub fn filter(&self) -> &KoleaCuckooFilter<R> {
        &self.filter
    }

    /// Gives the filter back.
    pub fn into_filter(self) -> KoleaCuckooFilter<R> {
        self.filter
    }
}
