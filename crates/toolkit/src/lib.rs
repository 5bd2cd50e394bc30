//! # Toolkit
//!
//! Custom tools callable by crew workers, and the registry the crew factory
//! resolves `ToolRef::Custom` references against.
//!
//! Built-in tools (search, scraping, file and directory reading) belong to the
//! orchestrator and are not implemented here.

mod registry;
mod sentiment;

pub use contracts::{Tool, ToolHandle};
pub use registry::ToolRegistry;
pub use sentiment::{Sentiment, SentimentAnalysisTool, SENTIMENT_TOOL_NAME};
