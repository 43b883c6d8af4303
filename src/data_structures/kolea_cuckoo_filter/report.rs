// Copyright (c) 2025 Kolea Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Operation reports and the observers that receive them.
//!
//! After every insert, lookup, delete and rehash the filter pushes an
//! [`OperationReport`] to each registered [`FilterObserver`]. A report carries
//! everything a presentation layer needs to draw the table, so the filter has
//! no knowledge of how (or whether) it is displayed.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::data_structures::kolea_cuckoo_filter::bucket::{Slot, Table};
use crate::data_structures::kolea_cuckoo_filter::hash::{Fingerprint, Key};

/// The operation a report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// An insert attempt
    Insert,
    /// A membership query
    Lookup,
    /// A delete attempt
    Delete,
    /// A table doubling followed by a replay of all live keys
    Rehash,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Insert => "insert",
            Self::Lookup => "lookup",
            Self::Delete => "delete",
            Self::Rehash => "rehash",
        };
        f.write_str(name)
    }
}

/// How touched buckets should be emphasised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightIntent {
    /// Buckets written by a successful insert
    Touched,
    /// The fingerprint was found in a candidate bucket
    Confirmed,
    /// The fingerprint was absent from both candidate buckets
    NotFound,
}

/// Filter parameters and bucket contents at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// Current number of buckets
    pub bucket_count: usize,
    /// Slots per bucket
    pub bucket_size: usize,
    /// Nominal fingerprint width
    pub fingerprint_bits: u32,
    /// Relocation budget
    pub max_kicks: usize,
    /// Slot contents per bucket, `None` for empty
    pub buckets: Vec<Vec<Slot>>,
}

impl TableSnapshot {
    pub(crate) fn capture(table: &Table, fingerprint_bits: u32, max_kicks: usize) -> Self {
        Self {
            bucket_count: table.bucket_count(),
            bucket_size: table.bucket_size(),
            fingerprint_bits,
            max_kicks,
            buckets: table
                .buckets()
                .iter()
                .map(|bucket| bucket.slots().to_vec())
                .collect(),
        }
    }
}

/// Result of a single filter operation, pushed to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationReport {
    /// Operation performed
    pub operation: OperationKind,
    /// Key the operation acted on (none for rehash)
    pub key: Option<Key>,
    /// Whether the operation succeeded
    pub success: bool,
    /// Human-readable summary
    pub description: String,
    /// Bucket indices touched (zero, one or two)
    pub touched_buckets: Vec<usize>,
    /// Fingerprint involved, if any
    pub fingerprint: Option<Fingerprint>,
    /// Emphasis requested for the touched buckets
    pub highlight: Option<HighlightIntent>,
    /// Live keys in insertion order
    pub live_keys: Vec<Key>,
    /// Table state after the operation
    pub snapshot: TableSnapshot,
}

/// Receives a report after every filter operation.
#[cfg_attr(test, mockall::automock)]
pub trait FilterObserver {
    /// Called once per completed operation.
    fn on_operation(&mut self, report: &OperationReport);
}

/// Logs every report through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl FilterObserver for TracingObserver {
    fn on_operation(&mut self, report: &OperationReport) {
        tracing::info!(
            operation = %report.operation,
            key = ?report.key,
            success = report.success,
            touched = ?report.touched_buckets,
            live_keys = report.live_keys.len(),
            "{}",
            report.description
        );
    }
}

/// Collects reports in memory; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    reports: Arc<Mutex<Vec<OperationReport>>>,
}

impl RecordingObserver {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of every report received so far.
    pub fn reports(&self) -> Vec<OperationReport> {
        self.reports.lock().clone()
    }

    /// The most recent report.
    pub fn last(&self) -> Option<OperationReport> {
        self.reports.lock().last().cloned()
    }

    /// Number of reports received.
    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    /// Whether nothing was received.
    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }
}

impl FilterObserver for RecordingObserver {
    fn on_operation(&mut self, report: &OperationReport) {
        self.reports.lock().push(report.clone());
    }
}

/// Writes each report as one JSON line.
#[derive(Debug)]
pub struct JsonLinesObserver<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesObserver<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FilterObserver for JsonLinesObserver<W> {
    fn on_operation(&mut self, report: &OperationReport) {
        let written = serde_json::to_writer(&mut self.writer, report)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"))
            .and_then(|()| self.writer.flush());
        if let Err(e) = written {
            tracing::warn!(error = %e, operation = %report.operation, "Failed to write operation report");
        }
    }
}
