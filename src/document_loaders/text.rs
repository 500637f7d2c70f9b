use async_trait::async_trait;
use std::path::PathBuf;

use super::{Document, DocumentLoader};
use crate::{AiError, Result};

/// Reads one file into a single document
pub struct TextLoader {
    path: PathBuf,
}

impl TextLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DocumentLoader for TextLoader {
    async fn load(&self) -> Result<Vec<Document>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| AiError::DocumentLoadError {
                source_ref: self.path.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(vec![
            Document::new(text).with_metadata("source", self.path.display().to_string())
        ])
    }
}
