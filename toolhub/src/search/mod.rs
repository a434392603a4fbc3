//! Tool search
//!
//! Ranks registered tools against a free-text query. The pieces are layered:
//! [`index`] tokenizes each tool once, [`strategy`] scores index entries,
//! [`cache`] keeps formatted responses, and [`engine`] ties them to a
//! [`ToolRegistry`](crate::mcp::ToolRegistry).

pub mod cache;
pub mod engine;
pub mod index;
pub mod strategy;
pub mod types;

pub use cache::{CacheKey, SearchCache};
pub use engine::ToolSearchEngine;
pub use index::{short_description, tokenize, StaticIndexEntry};
pub use strategy::{
    CategoryStrategy, DescriptionStrategy, FuzzyStrategy, NameStrategy, SearchStrategy,
    WeightedComponent, WeightedStrategy,
};
pub use types::{CacheStats, DetailLevel, FormattedTool, SearchParams, SearchResponse, SearchResult};
