//! Tool discovery tools
//!
//! Both tools depend on services built around the registry, so they are
//! registered after construction through [`register_discovery_tools`].

pub mod batch;
pub mod search;

use crate::mcp::tool_registry::ToolRegistry;
use crate::parallel::ParallelExecutor;
use crate::search::ToolSearchEngine;
use crate::Result;
use std::sync::Arc;

/// Late-register `search_tools` and `batch_call` with the registry
pub fn register_discovery_tools(
    registry: &Arc<ToolRegistry>,
    engine: Arc<ToolSearchEngine>,
    executor: ParallelExecutor,
) -> Result<()> {
    registry.register_resolved(
        Arc::new(search::SearchToolsTool::new(engine, registry)),
        search::SearchToolsTool::metadata(),
    )?;
    registry.register_resolved(
        Arc::new(batch::BatchCallTool::new(registry, executor)),
        batch::BatchCallTool::metadata(),
    )?;
    Ok(())
}
