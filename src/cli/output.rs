//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{SdfError, SessionError};

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &SdfError) -> String {
    match e {
        SdfError::Session(SessionError::ExitStatus { .. }) => {
            format!("sdfcli reported a failure ({})", e)
        }
        _ => e.to_string(),
    }
}

/// Process exit code for an error. Cancellation is not a failure of the tool.
pub fn exit_code(e: &SdfError) -> i32 {
    match e {
        SdfError::Cancelled => 130,
        _ => 1,
    }
}
