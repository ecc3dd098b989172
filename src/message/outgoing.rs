use crate::message::outgoing::broadcast_message::{AttachmentBroadcast, MessageBroadcast, RoomUsersBroadcast};
use crate::message::outgoing::error_message::ErrorMessage;
use crate::message::{MessageError, WebSocketMessage, serialize_message_to_websocket_message};
use serde::{Deserialize, Serialize};

pub mod broadcast_message;
pub mod error_message;

/// Everything the relay can send to a client, either addressed to one
/// connection or fanned out to a whole room. There is no reply/ack envelope;
/// the re-broadcast is the only acknowledgement a sender gets.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum OutgoingMessage {
	Message(MessageBroadcast),
	RoomUsers(RoomUsersBroadcast),
	ImageMessage(AttachmentBroadcast),
	ContactMessage(AttachmentBroadcast),
	PollMessage(AttachmentBroadcast),
	LocationMessage(AttachmentBroadcast),
	VoiceMessage(AttachmentBroadcast),
	FileMessage(AttachmentBroadcast),
	Error(ErrorMessage),
}

macro_rules! outgoing_from_struct {
	($enum_case: ident, $struct_type: ty) => {
		impl From<$struct_type> for OutgoingMessage {
			fn from(message: $struct_type) -> OutgoingMessage {
				OutgoingMessage::$enum_case(message)
			}
		}
	};
}

outgoing_from_struct!(Message, MessageBroadcast);
outgoing_from_struct!(RoomUsers, RoomUsersBroadcast);
outgoing_from_struct!(Error, ErrorMessage);

impl From<&OutgoingMessage> for WebSocketMessage {
	fn from(message: &OutgoingMessage) -> Self {
		serialize_message_to_websocket_message(message)
	}
}

impl TryFrom<&WebSocketMessage> for OutgoingMessage {
	type Error = MessageError;

	fn try_from(websocket_message: &WebSocketMessage) -> Result<Self, MessageError> {
		match websocket_message {
			WebSocketMessage::Text(json) => crate::message::deserialize_message_from_str(json.as_str()),
			_ => Err(MessageError::WrongMessageType(websocket_message.clone())),
		}
	}
}
