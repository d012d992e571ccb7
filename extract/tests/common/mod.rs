//! Scripted transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use scrape_extract::prelude::*;
use tokio::time::Instant;

/// Replays a fixed sequence of replies and records every request.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<ModelReply, TransportError>>>,
    calls: Mutex<Vec<(Instant, ModelRequest)>>,
    enforces_schema: bool,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Result<ModelReply, TransportError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
            enforces_schema: true,
        }
    }

    /// A transport whose service does not guarantee schema conformance.
    pub fn without_schema_enforcement(mut self) -> Self {
        self.enforces_schema = false;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.calls.lock().unwrap().iter().map(|(_, r)| r.clone()).collect()
    }

    /// Gaps between consecutive calls.
    pub fn gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls.windows(2).map(|w| w[1].0 - w[0].0).collect()
    }
}

#[async_trait]
impl ModelTransport for ScriptedTransport {
    async fn send(&self, request: &ModelRequest) -> Result<ModelReply, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), request.clone()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::fatal(ServiceFailureKind::Other, "script exhausted"))
            })
    }

    fn enforces_schema(&self) -> bool {
        self.enforces_schema
    }
}

pub fn timeout() -> Result<ModelReply, TransportError> {
    Err(TransportError::timeout(
        Some(Duration::from_secs(60)),
        "deadline elapsed",
    ))
}

pub fn fatal(kind: ServiceFailureKind) -> Result<ModelReply, TransportError> {
    Err(TransportError::fatal(kind, "service said no"))
}

pub fn structured(value: serde_json::Value) -> Result<ModelReply, TransportError> {
    Ok(ModelReply::Structured(value))
}

/// Asserts that `actual` is `expected` within the timer's millisecond granularity.
pub fn assert_close(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(10),
        "expected ~{expected:?}, got {actual:?}"
    );
}
