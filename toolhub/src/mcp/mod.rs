//! Model Context Protocol (MCP) server support
//!
//! This module provides the tool registry, the built-in tools and the server
//! handler that exposes them through the Model Context Protocol.

pub mod registration;
pub mod server;
pub mod tool_registry;
pub mod tools;

pub use registration::{
    CategoryFilter, DiscoveryMode, ToolMetadata, ToolPriority, ToolRegistration, ToolResolver,
};
pub use server::McpServer;
pub use tool_registry::{BaseToolImpl, McpTool, ToolDescriptor, ToolRegistry};
pub use tools::{builtin_registrations, builtin_resolver};
