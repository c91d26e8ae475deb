use tokio::sync::mpsc;

use crate::types::message::Message;

/// Producer half, held by the receive pipeline.
#[derive(Debug, Clone)]
pub struct MessageSender {
    tx: mpsc::UnboundedSender<Message>,
}

impl MessageSender {
    pub fn put(&self, message: Message) -> anyhow::Result<()> {
        self.tx.send(message)?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct MessageQueue {
    rx: mpsc::UnboundedReceiver<Message>,
}

impl MessageQueue {
    /// Waits for at least one message, then drains whatever else is queued.
    /// Returns `None` once every sender is gone and nothing is left.
    pub async fn take_all(&mut self) -> Option<Vec<Message>> {
        let first = self.rx.recv().await?;
        let mut messages = vec![first];
        while let Ok(message) = self.rx.try_recv() {
            messages.push(message);
        }
        Some(messages)
    }
}

pub fn message_queue() -> (MessageSender, MessageQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MessageSender { tx }, MessageQueue { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn drains_everything_in_arrival_order() {
        let (sender, mut queue) = message_queue();
        sender.put(Message::EmptyReply).unwrap();
        sender.put(Message::Terminate).unwrap();
        sender.put(Message::Register { id: 1, port: 2 }).unwrap();

        let messages = queue.take_all().await.unwrap();
        assert_eq!(
            messages,
            vec![
                Message::EmptyReply,
                Message::Terminate,
                Message::Register { id: 1, port: 2 }
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn blocks_until_a_message_arrives() {
        let (sender, mut queue) = message_queue();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            sender.put(Message::Terminate).unwrap();
        });

        let messages = queue.take_all().await.unwrap();
        assert_eq!(messages, vec![Message::Terminate]);
    }

    #[tokio::test]
    async fn ends_when_senders_are_gone() {
        let (sender, mut queue) = message_queue();
        sender.put(Message::EmptyReply).unwrap();
        drop(sender);

        assert_eq!(queue.take_all().await, Some(vec![Message::EmptyReply]));
        assert_eq!(queue.take_all().await, None);
    }
}
