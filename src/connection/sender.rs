use crate::message::WebSocketMessage;
use crate::message::outgoing::OutgoingMessage;
use async_trait::async_trait;
use futures_util::{Sink, SinkExt};
use std::fmt::Debug;
use std::pin::Pin;
use std::sync::Arc;
use tracing::error;

pub type MessageSender = Pin<Arc<dyn MessageSenderTrait + Send + Sync>>;

#[async_trait]
pub trait MessageSenderTrait {
	async fn send_message(&self, message: OutgoingMessage) -> Result<(), ()>;
	async fn close(&self);
}

pub struct SinkMessageSender<ResponseSink> {
	inner: tokio::sync::Mutex<ResponseSink>,
}

impl<ResponseSink> SinkMessageSender<ResponseSink> {
	pub fn new(response_sink: ResponseSink) -> Self {
		Self {
			inner: tokio::sync::Mutex::new(response_sink),
		}
	}
}

#[async_trait]
impl<ResponseSink, SinkError> MessageSenderTrait for SinkMessageSender<ResponseSink>
where
	ResponseSink: Sink<WebSocketMessage, Error = SinkError> + Send + Unpin + 'static,
	SinkError: Debug + Send + 'static,
{
	async fn send_message(&self, message: OutgoingMessage) -> Result<(), ()> {
		let websocket_message = WebSocketMessage::from(&message);
		let mut sink = self.inner.lock().await;
		sink.send(websocket_message).await.map_err(|error| {
			error!("Failed to send message via websocket: {error:?}");
		})
	}

	async fn close(&self) {
		let mut sink = self.inner.lock().await;
		let _ = sink.send(WebSocketMessage::Close(None)).await;
	}
}

impl<ResponseSink, SinkError> From<SinkMessageSender<ResponseSink>> for MessageSender
where
	ResponseSink: Sink<WebSocketMessage, Error = SinkError> + Send + Unpin + 'static,
	SinkError: Debug + Send + 'static,
{
	fn from(sink_message_sender: SinkMessageSender<ResponseSink>) -> Self {
		Arc::pin(sink_message_sender)
	}
}
