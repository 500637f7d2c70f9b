//! A function-calling agent and the tools it can use.

mod calculator;
mod executor;
mod serpapi;
mod tool;

pub use calculator::CalculatorTool;
pub use executor::{AgentExecutor, DEFAULT_MAX_ITERATIONS};
pub use serpapi::SerpApiTool;
pub use tool::{Tool, ToolRegistry};
