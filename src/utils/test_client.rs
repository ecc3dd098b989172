use crate::connection::receiver::{MessageReceiver, StreamMessageReceiver};
use crate::connection::sender::{MessageSender, SinkMessageSender};
use crate::message::WebSocketMessage;
use crate::message::client_request::ClientRequest;
use crate::message::outgoing::OutgoingMessage;
use futures_channel::mpsc;
use futures_util::StreamExt;

/// Client end of an in-memory websocket connection, the server end is the
/// `MessageSender`/`MessageReceiver` pair handed to `run_client`.
pub struct WavechatTestClient {
	request_sender: mpsc::UnboundedSender<WebSocketMessage>,
	response_receiver: mpsc::UnboundedReceiver<WebSocketMessage>,
}

impl WavechatTestClient {
	pub fn new() -> (MessageSender, MessageReceiver, Self) {
		let (request_sender, request_receiver) = mpsc::unbounded();
		let (response_sender, response_receiver) = mpsc::unbounded();

		let message_sender = MessageSender::from(SinkMessageSender::new(response_sender));
		let message_receiver = MessageReceiver::from(StreamMessageReceiver::new(
			request_receiver,
			message_sender.clone(),
		));

		let test_client = Self {
			request_sender,
			response_receiver,
		};
		(message_sender, message_receiver, test_client)
	}

	pub fn send_request(&mut self, request: impl Into<ClientRequest>) {
		let request = request.into();
		let websocket_message = WebSocketMessage::from(&request);
		self.request_sender
			.unbounded_send(websocket_message)
			.expect("Failed to send request, the server is gone");
	}

	pub fn send_raw(&mut self, json: &str) {
		self.request_sender
			.unbounded_send(WebSocketMessage::Text(json.to_string().into()))
			.expect("Failed to send request, the server is gone");
	}

	pub async fn receive_message(&mut self) -> OutgoingMessage {
		let websocket_message = self
			.response_receiver
			.next()
			.await
			.expect("Connection was closed while waiting for a message");
		OutgoingMessage::try_from(&websocket_message).expect("Failed to deserialize outgoing message")
	}

	/// Simulates the client going away, the server side sees the stream end.
	pub fn disconnect(self) {
		drop(self.request_sender);
	}
}
