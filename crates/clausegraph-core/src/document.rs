use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A source document as handed to clause segmentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    /// File path or caller-supplied name, echoed into report metadata.
    pub source: String,
    pub content: String,
    pub collected_at: DateTime<Utc>,
}

impl RawDocument {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
            collected_at: Utc::now(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}
