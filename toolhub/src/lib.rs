//! # Toolhub
//!
//! Tool discovery and concurrent batch execution for MCP servers.
//!
//! ## Features
//!
//! - **Tool Registry**: Lazily resolved tools, priority ordered views and
//!   failure-contained dispatch by name
//! - **Tool Search**: Ranked free-text search over the registered tools with
//!   filters, three detail levels and an LRU response cache
//! - **Parallel Executor**: Concurrency-bounded execution of independent
//!   keyed operations with per-item outcomes
//! - **MCP Support**: A ready `ServerHandler` advertising tools eagerly or lazily
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use toolhub::{Config, SearchParams, ToolHub};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hub = ToolHub::with_builtins(Config::new())?;
//!
//! let response = hub.search(&SearchParams::new("filter json").with_limit(3))?;
//! for tool in &response.tools {
//!     println!("{} ({:?})", tool.name, tool.score);
//! }
//!
//! let arguments = serde_json::json!({"message": "hello"});
//! let result = hub.call("echo", arguments.as_object().cloned().unwrap_or_default()).await?;
//! println!("{:?}", result.content);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Shared helpers for environment loading and MCP error mapping
pub mod common;

/// Configuration loading from defaults, environment and YAML
pub mod config;

/// Error types used throughout the library
pub mod error;

/// Registry, search engine and executor wired together
pub mod hub;

/// Model Context Protocol (MCP) tool registry, tools and server
pub mod mcp;

/// Bounded parallel execution of independent operations
pub mod parallel;

/// Ranked tool search
pub mod search;

pub use config::{Config, ConfigError};
pub use error::{Result, ToolhubError};
pub use hub::ToolHub;
pub use mcp::{
    BaseToolImpl, CategoryFilter, DiscoveryMode, McpServer, McpTool, ToolDescriptor,
    ToolMetadata, ToolPriority, ToolRegistration, ToolRegistry, ToolResolver,
};
pub use parallel::{BatchItem, BatchOperation, BatchOutcome, ParallelConfig, ParallelExecutor};
pub use search::{DetailLevel, SearchParams, SearchResponse, ToolSearchEngine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BaseToolImpl, Config, DetailLevel, McpServer, McpTool, Result, SearchParams, ToolHub,
        ToolMetadata, ToolRegistration, ToolhubError,
    };
}

/// Test utilities module for testing support
#[doc(hidden)]
pub mod test_utils;
