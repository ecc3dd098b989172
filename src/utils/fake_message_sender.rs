use crate::connection::sender::{MessageSender, MessageSenderTrait};
use crate::message::outgoing::OutgoingMessage;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Records every message sent to it so tests can assert on what a
/// connection would have received.
#[derive(Clone, Debug, Default)]
pub struct FakeMessageSender {
	messages: Arc<Mutex<Vec<OutgoingMessage>>>,
}

impl FakeMessageSender {
	pub fn messages(&self) -> Vec<OutgoingMessage> {
		self.messages.lock().clone()
	}
}

#[async_trait]
impl MessageSenderTrait for FakeMessageSender {
	async fn send_message(&self, message: OutgoingMessage) -> Result<(), ()> {
		self.messages.lock().push(message);
		Ok(())
	}

	async fn close(&self) {}
}

impl From<FakeMessageSender> for MessageSender {
	fn from(fake_message_sender: FakeMessageSender) -> Self {
		Arc::pin(fake_message_sender)
	}
}
