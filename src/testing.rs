//! In-memory doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::transport::{Transport, TransportError};
use crate::types::message::Message;

pub type CallLog = Arc<Mutex<Vec<(Message, Option<Duration>)>>>;

/// Answers `call_and_wait` from a script; an exhausted script is silence.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Option<Message>>>,
    calls: CallLog,
    closed: Arc<Mutex<bool>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Option<Message>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: CallLog::default(),
            closed: Arc::default(),
        }
    }

    pub fn calls(&self) -> CallLog {
        Arc::clone(&self.calls)
    }

    pub fn closed(&self) -> Arc<Mutex<bool>> {
        Arc::clone(&self.closed)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, _message: &Message, _port: u16) {}

    async fn receive_datagram(&self, _timeout: Option<Duration>) -> Result<Vec<u8>, TransportError> {
        Err(TransportError::Timeout)
    }

    async fn call_and_wait(&self, message: &Message, timeout: Option<Duration>) -> Option<Message> {
        self.calls.lock().unwrap().push((message.clone(), timeout));
        self.replies.lock().unwrap().pop_front().flatten()
    }

    fn local_port(&self) -> u16 {
        40000
    }

    fn close(&self) {
        *self.closed.lock().unwrap() = true;
    }
}
