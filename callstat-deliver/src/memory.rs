use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{DeliveryError, ReportSink};

/// Sink that keeps every message in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<String> {
        self.messages.lock().await.clone()
    }
}

#[async_trait]
impl ReportSink for MemorySink {
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        self.messages.lock().await.push(text.to_string());
        Ok(())
    }
}
