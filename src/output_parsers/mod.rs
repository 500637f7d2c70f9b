//! Turning model text into structured values.

mod list;
mod structured;

pub use list::CommaSeparatedListOutputParser;
pub use structured::StructuredOutputParser;

use crate::Result;

pub trait OutputParser: Send + Sync {
    type Output;

    fn parse(&self, text: &str) -> Result<Self::Output>;

    /// Instructions to splice into a prompt so the model answers parseably
    fn format_instructions(&self) -> String;
}
