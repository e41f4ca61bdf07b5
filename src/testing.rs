//! Test utilities: a transport that replays canned replies.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::ResponseEnvelope;
use crate::transport::{PostRequest, Transport, TransportError};

struct Scripted {
    reply: Result<ResponseEnvelope, TransportError>,
    delay: Duration,
}

/// Replays queued replies in order and records every request it receives.
///
/// Delays run on `tokio::time`, so tests on a paused clock stay instant.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<PostRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, reply: Result<ResponseEnvelope, TransportError>) -> Self {
        self.reply_after(Duration::ZERO, reply)
    }

    pub fn reply_after(
        self,
        delay: Duration,
        reply: Result<ResponseEnvelope, TransportError>,
    ) -> Self {
        self.replies
            .lock()
            .expect("scripted replies lock poisoned")
            .push_back(Scripted { reply, delay });
        self
    }

    pub fn requests(&self) -> Vec<PostRequest> {
        self.requests
            .lock()
            .expect("scripted requests lock poisoned")
            .clone()
    }
}

impl Transport for ScriptedTransport {
    async fn post(&self, request: PostRequest) -> Result<ResponseEnvelope, TransportError> {
        self.requests
            .lock()
            .expect("scripted requests lock poisoned")
            .push(request);
        let next = self
            .replies
            .lock()
            .expect("scripted replies lock poisoned")
            .pop_front();

        match next {
            Some(scripted) => {
                if !scripted.delay.is_zero() {
                    tokio::time::sleep(scripted.delay).await;
                }
                scripted.reply
            }
            None => Err(TransportError::Network("no scripted reply left".to_string())),
        }
    }
}
