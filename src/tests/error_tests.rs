//! Tests for the error module.
//!
//! This module contains tests for error handling and error types.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::data_structures::KoleaCuckooFilterError;
use crate::error::command::CommandError;
use crate::error::config::ConfigError;
use crate::error::{
    report_error, set_error_reporter, ErrorContext, ErrorReporter, KoleaError, KoleaResult,
    TracingErrorReporter,
};

/// Test that error context can be created and displayed properly.
#[test]
fn test_error_context_display() {
    let error = KoleaError::Custom("test error".to_string());
    let context = ErrorContext::new(error, "test_component").with_details("additional details");

    let display_string = format!("{context}");
    assert!(display_string.contains("test error"));
    assert!(display_string.contains("test_component"));
    assert!(display_string.contains("additional details"));
}

/// Test that nested errors work correctly.
#[test]
fn test_nested_errors() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let kolea_error = KoleaError::Io(io_error);

    let error_string = format!("{kolea_error}");
    assert!(error_string.contains("file not found"));
}

/// Test conversions from the component error types.
#[test]
fn test_error_conversions() {
    let filter: KoleaError = KoleaCuckooFilterError::ResizeLimitExceeded {
        key: 21,
        resizes: 0,
        bucket_count: 16,
    }
    .into();
    assert!(matches!(filter, KoleaError::Filter(_)));
    assert!(filter.to_string().starts_with("Filter error:"));

    let config: KoleaError = ConfigError::ValidationError("bad level".to_string()).into();
    assert!(matches!(config, KoleaError::Config(_)));

    let command: KoleaError = CommandError::MissingKey {
        line: 3,
        verb: "delete".to_string(),
    }
    .into();
    assert_eq!(
        command.to_string(),
        "Command error: line 3: 'delete' needs an integer key"
    );

    let json: KoleaError = serde_json::from_str::<serde_json::Value>("{")
        .unwrap_err()
        .into();
    assert!(matches!(json, KoleaError::Serialization(_)));
    assert!(json.to_string().starts_with("Serialization error:"));
}

/// Test that `?` lifts filter errors into the crate error.
#[test]
fn test_question_mark_propagation() {
    fn fails() -> KoleaResult<()> {
        Err::<(), _>(KoleaCuckooFilterError::InvalidConfiguration(
            "bucket_count must be positive".to_string(),
        ))?;
        Ok(())
    }

    let err = fails().unwrap_err();
    assert!(err.to_string().contains("bucket_count must be positive"));
}

/// Test that the span trace is attached only when a span is active.
#[test]
fn test_error_context_without_span() {
    let context = ErrorContext::new(KoleaError::Custom("x".to_string()), "test")
        .with_span_trace();
    assert!(context.details.is_none());
    assert_eq!(context.component, "test");
}

/// Counting error reporter for testing.
#[derive(Debug, Default)]
struct CountingErrorReporter {
    reported_count: AtomicUsize,
}

impl ErrorReporter for CountingErrorReporter {
    fn report(&self, _context: ErrorContext) {
        self.reported_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Test that the global error reporter receives reported errors.
///
/// The reporter can only be installed once per process.
#[test]
fn test_global_error_reporter() {
    let reporter = Arc::new(CountingErrorReporter::default());
    if !set_error_reporter(reporter.clone()) {
        return;
    }

    report_error(ErrorContext::new(
        KoleaError::Custom("test error".to_string()),
        "test_component",
    ));
    assert_eq!(reporter.reported_count.load(Ordering::SeqCst), 1);

    // A second reporter is refused
    assert!(!set_error_reporter(Arc::new(TracingErrorReporter)));
}

/// Test that the library initializer installs a reporter at most once.
#[test]
fn test_init_installs_reporter_once() {
    // Another test may already hold the slot, so only the refusal is certain
    let _ = crate::init();
    assert!(!crate::init());
    assert!(!set_error_reporter(Arc::new(TracingErrorReporter)));
}

/// Test that the default tracing error reporter can be used directly.
#[test]
fn test_tracing_error_reporter() {
    let reporter = TracingErrorReporter;
    let context = ErrorContext::new(KoleaError::Custom("test error".to_string()), "test_component");
    reporter.report(context);
}
