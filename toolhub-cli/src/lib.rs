//! toolhub CLI library
//!
//! Command definitions and handlers behind the `toolhub` binary.

/// Tool call command
pub mod call;
/// Command-line interface definitions and argument parsing
pub mod cli;
/// Shell completion generation
pub mod completions;
/// Configuration loading and hub construction
pub mod config;
/// CLI errors and their exit codes
pub mod error;
/// Exit codes used by the CLI application
pub mod exit_codes;
/// Tool listing command
pub mod list;
/// Tracing subscriber setup
pub mod logging;
/// Tool search command
pub mod search;
/// Stdio MCP server
pub mod serve;
