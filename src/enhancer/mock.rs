use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{Backend, CompletionRequest, EnhanceError};

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum MockStep {
    /// Return this text.
    Reply(String),
    /// Fail as the provider would, with a status and message.
    Fail(u16, String),
}

/// A scripted backend for tests. Returns pre-defined outcomes in order and
/// remembers every request it saw.
pub struct MockBackend {
    steps: Vec<MockStep>,
    cycle: bool,
    index: AtomicUsize,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockBackend {
    /// Run through `steps` once; a call past the end is an error.
    pub fn scripted(steps: Vec<MockStep>) -> Self {
        Self {
            steps,
            cycle: false,
            index: AtomicUsize::new(0),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer every call with the same text.
    pub fn always(reply: impl Into<String>) -> Self {
        Self {
            steps: vec![MockStep::Reply(reply.into())],
            cycle: true,
            index: AtomicUsize::new(0),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle onto the requests this backend has seen. Grab it before
    /// moving the backend into a service.
    pub fn requests(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }

    /// How many calls have been made so far.
    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, EnhanceError> {
        self.requests.lock().unwrap().push(request.clone());

        let i = self.index.fetch_add(1, Ordering::SeqCst);
        let step = if self.cycle {
            &self.steps[i % self.steps.len()]
        } else {
            self.steps.get(i).ok_or_else(|| EnhanceError::Provider {
                status: 500,
                message: format!("MockBackend: no more steps (called {} times)", i + 1),
            })?
        };

        match step {
            MockStep::Reply(text) => Ok(text.clone()),
            MockStep::Fail(status, message) => Err(EnhanceError::Provider {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}
