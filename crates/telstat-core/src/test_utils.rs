//! Shared test utilities for unit tests
//!
//! Integration tests have their own builders in tests/common/mod.rs because
//! this module is only compiled for the crate's own unit tests.

use crate::types::ErrorEvent;

/// Build an error event raised by the main process
pub fn error_event(message: &str, stack: &str, version: Option<&str>) -> ErrorEvent {
    ErrorEvent {
        message: Some(message.to_string()),
        stack: Some(stack.to_string()),
        process: Some("main".to_string()),
        version: version.map(str::to_string),
    }
}
