use crate::message::client_request::AttachmentKind;
use crate::message::outgoing::OutgoingMessage;
use crate::relay::registry::ConnectionId;
use crate::store::StoredMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A text event, either authored by a user or by the system bot.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct MessageBroadcast {
	pub sender: String,
	pub body: String,
	pub time: DateTime<Utc>,
}

impl From<StoredMessage> for MessageBroadcast {
	fn from(message: StoredMessage) -> Self {
		Self {
			sender: message.sender,
			body: message.body,
			time: message.created_at,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct RoomUser {
	pub id: ConnectionId,
	pub username: String,
	pub avatar: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct RoomUsersBroadcast {
	pub room: String,
	pub users: Vec<RoomUser>,
}

/// Echo of an inbound attachment, same payload plus a generated id and time.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AttachmentBroadcast {
	pub id: Uuid,
	pub sender: String,
	pub room: String,
	pub payload: serde_json::Value,
	pub time: DateTime<Utc>,
}

impl AttachmentBroadcast {
	/// Attachments are dispatched by payload kind, each kind keeps its own
	/// event name on the wire.
	pub fn into_outgoing(self, kind: AttachmentKind) -> OutgoingMessage {
		match kind {
			AttachmentKind::Image => OutgoingMessage::ImageMessage(self),
			AttachmentKind::Contact => OutgoingMessage::ContactMessage(self),
			AttachmentKind::Poll => OutgoingMessage::PollMessage(self),
			AttachmentKind::Location => OutgoingMessage::LocationMessage(self),
			AttachmentKind::Voice => OutgoingMessage::VoiceMessage(self),
			AttachmentKind::File => OutgoingMessage::FileMessage(self),
		}
	}
}
