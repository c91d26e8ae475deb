use std::future::{Ready, ready};
use std::task::{Context, Poll};

use tower::Service;

use crate::queue::MessageSender;
use crate::types::message::Message;

/// End of the receive pipeline: hands each message to the decision loop.
#[derive(Debug, Clone)]
pub struct EnqueueService {
    queue: MessageSender,
}

impl EnqueueService {
    pub fn new(queue: MessageSender) -> Self {
        Self { queue }
    }
}

impl Service<Message> for EnqueueService {
    type Response = ();
    type Error = anyhow::Error;
    type Future = Ready<Result<(), Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, message: Message) -> Self::Future {
        ready(self.queue.put(message))
    }
}
