use crate::connection::sender::MessageSender;
use crate::message::client_request::ClientRequest;
use crate::message::outgoing::OutgoingMessage;
use crate::message::outgoing::error_message::{ErrorMessage, ErrorMessageType};
use crate::message::{MessageError, WebSocketMessage};
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use std::pin::Pin;
use tracing::{debug, error};

pub type MessageReceiver = Pin<Box<dyn MessageReceiverTrait + Unpin + Send>>;

#[async_trait]
pub trait MessageReceiverTrait {
	/// Waits for the next valid request from the client.
	/// Returns `None` once the connection has been closed.
	async fn receive(&mut self) -> Option<ClientRequest>;
}

/// Number of consecutive invalid messages to tolerate before giving up
/// on a connection.
const MAXIMUM_RETRIES: usize = 10;

pub struct StreamMessageReceiver<RequestStream> {
	request_stream: RequestStream,
	message_sender: MessageSender,
}

impl<RequestStream> StreamMessageReceiver<RequestStream> {
	pub fn new(request_stream: RequestStream, message_sender: MessageSender) -> Self {
		Self {
			request_stream,
			message_sender,
		}
	}
}

#[async_trait]
impl<RequestStream> MessageReceiverTrait for StreamMessageReceiver<RequestStream>
where
	RequestStream: Stream<Item = WebSocketMessage> + Unpin + Send,
{
	async fn receive(&mut self) -> Option<ClientRequest> {
		for _ in 0..MAXIMUM_RETRIES {
			let websocket_message = self.request_stream.next().await?;

			match &websocket_message {
				WebSocketMessage::Ping(_) | WebSocketMessage::Pong(_) => continue,
				WebSocketMessage::Close(_) => {
					self.message_sender.close().await;
					return None;
				}
				_ => {}
			}

			match ClientRequest::try_from(&websocket_message) {
				Ok(request) => return Some(request),
				Err(message_error) => {
					debug!("Failed to deserialize client request: {message_error}");
					let error_message = invalid_format_error(&message_error);
					if self
						.message_sender
						.send_message(OutgoingMessage::Error(error_message))
						.await
						.is_err()
					{
						return None;
					}
				}
			}
		}

		error!("Too many consecutive invalid messages, closing connection.");
		self.message_sender.close().await;
		None
	}
}

fn invalid_format_error(message_error: &MessageError) -> ErrorMessage {
	ErrorMessage::builder()
		.error(ErrorMessageType::InvalidFormat)
		.message(message_error.to_string())
		.build()
}

impl<RequestStream> From<StreamMessageReceiver<RequestStream>> for MessageReceiver
where
	RequestStream: Stream<Item = WebSocketMessage> + Unpin + Send + 'static,
{
	fn from(stream_message_receiver: StreamMessageReceiver<RequestStream>) -> Self {
		Box::pin(stream_message_receiver)
	}
}
