//! Common utilities module

/// Environment variable loading utilities
pub mod env_loader;

/// MCP error conversion utilities
pub mod mcp_errors;

pub use env_loader::EnvLoader;
pub use mcp_errors::McpErrorHandler;
