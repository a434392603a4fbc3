//! Exit code constants for CLI commands
//!
//! - 0: Success
//! - 1: Runtime failure, including a tool answering with an error result
//! - 2: Invalid input or configuration

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// Runtime failure or tool error result
pub const EXIT_WARNING: i32 = 1;

/// Invalid input or configuration
pub const EXIT_ERROR: i32 = 2;
