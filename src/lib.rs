//! A small LLM orchestration layer and the sample programs built on it.
//!
//! Models ([`llms`]) talk to a [`CompletionProvider`]; prompts, memory,
//! parsers and loaders feed [`chains`]; every model, chain and agent can be
//! traced through a [`callbacks::CallbackManager`].

pub mod agents;
pub mod callbacks;
pub mod chains;
pub mod config;
pub mod document_loaders;
pub mod error;
pub mod hub;
pub mod llms;
pub mod logging;
pub mod memory;
pub mod models;
pub mod output_parsers;
pub mod prompts;
pub mod providers;
pub mod schema;
pub mod selectors;
pub mod traits;

pub use error::*;
pub use models::*;
pub use traits::*;
