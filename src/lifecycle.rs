use crate::auth::Identity;
use crate::connection::receiver::MessageReceiver;
use crate::connection::sender::MessageSender;
use crate::message::client_request::{AttachmentKind, ChatRequest, ClientRequest, JoinRequest};
use crate::message::outgoing::OutgoingMessage;
use crate::message::outgoing::error_message::{ErrorMessage, ErrorMessageType};
use crate::relay::Relay;
use crate::relay::error::RelayError;
use crate::relay::registry::ConnectionId;
use std::sync::Arc;
use tracing::debug;

/// Drives one websocket connection from admission to disconnect.
/// Requests are handled one at a time in arrival order, so a connection
/// can never race its own join against its own disconnect.
pub async fn run_client(
	relay: Arc<Relay>,
	identity: Identity,
	message_sender: MessageSender,
	mut message_receiver: MessageReceiver,
) {
	let connection_id = relay.admit(identity, message_sender.clone());

	while let Some(request) = message_receiver.receive().await {
		if let Err(error) = dispatch(&relay, connection_id, request).await {
			debug!("Request from {connection_id} failed: {error}");
			let _ = message_sender
				.send_message(OutgoingMessage::Error(error_message(&error)))
				.await;
		}
	}

	relay.disconnect(connection_id).await;
}

async fn dispatch(relay: &Relay, connection_id: ConnectionId, request: ClientRequest) -> Result<(), RelayError> {
	use ClientRequest::*;
	match request {
		Join(JoinRequest { room }) => relay.join_room(connection_id, &room).await,
		ChatMessage(ChatRequest { room, message }) => relay.send_chat(connection_id, &room, message).await,
		ImageMessage(request) => relay.send_attachment(connection_id, AttachmentKind::Image, request).await,
		ContactMessage(request) => {
			relay
				.send_attachment(connection_id, AttachmentKind::Contact, request)
				.await
		}
		PollMessage(request) => relay.send_attachment(connection_id, AttachmentKind::Poll, request).await,
		LocationMessage(request) => {
			relay
				.send_attachment(connection_id, AttachmentKind::Location, request)
				.await
		}
		VoiceMessage(request) => relay.send_attachment(connection_id, AttachmentKind::Voice, request).await,
		FileMessage(request) => relay.send_attachment(connection_id, AttachmentKind::File, request).await,
	}
}

fn error_message(error: &RelayError) -> ErrorMessage {
	let error_type = match error {
		RelayError::NotAuthenticated => ErrorMessageType::NotAuthenticated,
		RelayError::NotFound(_) => ErrorMessageType::NotFound,
		RelayError::Storage(_) => ErrorMessageType::StorageUnavailable,
	};
	ErrorMessage::builder().error(error_type).message(error.to_string()).build()
}
