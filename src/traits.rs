use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;

use crate::{error::Result, models::*};

pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    async fn complete_stream(&self, request: CompletionRequest) -> Result<CompletionStream>;

    fn name(&self) -> &'static str;

    fn default_model(&self) -> &'static str;
}
