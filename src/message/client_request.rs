use crate::message::{MessageError, WebSocketMessage, deserialize_message_from_str, serialize_message_to_websocket_message};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Everything a connected client can ask the relay to do. The `type` tag
/// mirrors the socket event names of the browser client.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum ClientRequest {
	Join(JoinRequest),
	ChatMessage(ChatRequest),
	ImageMessage(AttachmentRequest),
	ContactMessage(AttachmentRequest),
	PollMessage(AttachmentRequest),
	LocationMessage(AttachmentRequest),
	VoiceMessage(AttachmentRequest),
	FileMessage(AttachmentRequest),
}

macro_rules! client_request_from_struct {
	($enum_case: ident, $struct_type: ty) => {
		impl From<$struct_type> for ClientRequest {
			fn from(request: $struct_type) -> ClientRequest {
				ClientRequest::$enum_case(request)
			}
		}
	};
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct JoinRequest {
	pub room: String,
}

client_request_from_struct!(Join, JoinRequest);

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChatRequest {
	pub room: String,
	pub message: String,
}

client_request_from_struct!(ChatMessage, ChatRequest);

/// Attachment payloads are opaque to the relay; they are echoed back to the
/// room untouched, so the content stays whatever the client sent.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct AttachmentRequest {
	pub room: String,
	pub payload: serde_json::Value,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachmentKind {
	Image,
	Contact,
	Poll,
	Location,
	Voice,
	File,
}

impl Display for AttachmentKind {
	fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
		let kind = match self {
			AttachmentKind::Image => "image",
			AttachmentKind::Contact => "contact",
			AttachmentKind::Poll => "poll",
			AttachmentKind::Location => "location",
			AttachmentKind::Voice => "voice",
			AttachmentKind::File => "file",
		};
		write!(formatter, "{kind}")
	}
}

impl From<&ClientRequest> for WebSocketMessage {
	fn from(request: &ClientRequest) -> Self {
		serialize_message_to_websocket_message(request)
	}
}

impl TryFrom<&str> for ClientRequest {
	type Error = MessageError;

	fn try_from(json: &str) -> Result<Self, Self::Error> {
		deserialize_message_from_str(json)
	}
}

impl TryFrom<&WebSocketMessage> for ClientRequest {
	type Error = MessageError;

	fn try_from(websocket_message: &WebSocketMessage) -> Result<Self, Self::Error> {
		match websocket_message {
			WebSocketMessage::Text(json) => json.as_str().try_into(),
			_ => Err(MessageError::WrongMessageType(websocket_message.clone())),
		}
	}
}
