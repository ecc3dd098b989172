use crate::auth::Identity;
use crate::connection::sender::MessageSender;
use crate::message::client_request::{AttachmentKind, AttachmentRequest};
use crate::message::outgoing::OutgoingMessage;
use crate::message::outgoing::broadcast_message::AttachmentBroadcast;
use crate::message::outgoing::error_message::{ErrorMessage, ErrorMessageType};
use crate::relay::error::RelayError;
use crate::relay::membership::{Membership, RoomMembershipTable};
use crate::relay::presence::PresenceNotifier;
use crate::relay::registry::{ConnectionId, ConnectionRegistry, Session};
use crate::store::{MessageKind, MessageStore, NewMessage};
use chrono::Utc;
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub mod error;
pub mod membership;
pub mod presence;
pub mod registry;

/// Central dispatcher. Owns the connection registry and room membership
/// and turns client requests into store writes and fan-out broadcasts.
pub struct Relay {
	registry: ConnectionRegistry,
	membership: RoomMembershipTable,
	presence: PresenceNotifier,
	store: Arc<dyn MessageStore>,
	join_history_limit: u32,
}

impl Relay {
	pub fn new(store: Arc<dyn MessageStore>, join_history_limit: u32) -> Self {
		Self {
			registry: ConnectionRegistry::default(),
			membership: RoomMembershipTable::default(),
			presence: PresenceNotifier,
			store,
			join_history_limit,
		}
	}

	/// Registers a freshly authenticated connection. It isn't in any room
	/// yet; a join request has to follow before it can send messages.
	pub fn admit(&self, identity: Identity, sender: MessageSender) -> ConnectionId {
		let session = self.registry.admit(identity, sender);
		info!(
			"User '{}' connected as {}.",
			session.display_name, session.connection_id
		);
		session.connection_id
	}

	pub async fn join_room(&self, connection_id: ConnectionId, room: &str) -> Result<(), RelayError> {
		let session = self.session(connection_id)?;
		if room.trim().is_empty() {
			return Err(RelayError::NotFound(room.to_string()));
		}

		let membership = Membership {
			connection_id,
			user_id: session.user_id.clone(),
			display_name: session.display_name.clone(),
		};
		let previous_room = self.membership.join(room, membership);
		self.registry.set_room(connection_id, Some(room.to_string()));

		match previous_room {
			// Joining the room you're already in refreshes welcome, history
			// and roster without any leave announcements.
			Some(previous) if previous != room => {
				self.announce_departure(&previous, &session.display_name).await;
			}
			_ => {}
		}

		let welcome = self.presence.welcome(room, &session.display_name);
		let _ = session.sender.send_message(welcome).await;
		self.replay_history(&session, room).await;

		let other_members = self.room_senders(room, Some(connection_id));
		self.presence.announce_join(&session.display_name, &other_members).await;
		self.publish_roster(room).await;

		info!("User '{}' joined room '{room}'.", session.display_name);
		Ok(())
	}

	pub async fn send_chat(&self, connection_id: ConnectionId, room: &str, body: String) -> Result<(), RelayError> {
		let session = self.member_of(connection_id, room)?;

		// Persist first; if the store fails, nobody gets the message.
		let stored = self
			.store
			.append(NewMessage {
				room: room.to_string(),
				sender: session.display_name,
				body,
				kind: MessageKind::Text,
			})
			.await?;

		let members = self.room_senders(room, None);
		fan_out(&members, OutgoingMessage::Message(stored.into())).await;
		Ok(())
	}

	/// Attachments are relayed but never persisted. The broadcast echoes the
	/// payload untouched, with a generated id and server-side timestamp.
	pub async fn send_attachment(
		&self,
		connection_id: ConnectionId,
		kind: AttachmentKind,
		request: AttachmentRequest,
	) -> Result<(), RelayError> {
		let session = self.member_of(connection_id, &request.room)?;
		debug!(
			"Relaying {kind} attachment from '{}' to room '{}'.",
			session.display_name, request.room
		);

		let broadcast = AttachmentBroadcast {
			id: Uuid::new_v4(),
			sender: session.display_name,
			room: request.room.clone(),
			payload: request.payload,
			time: Utc::now(),
		};
		let members = self.room_senders(&request.room, None);
		fan_out(&members, broadcast.into_outgoing(kind)).await;
		Ok(())
	}

	/// Tears down a connection. Safe to call for connections that never
	/// joined a room or have already been disconnected.
	pub async fn disconnect(&self, connection_id: ConnectionId) {
		let Some(session) = self.registry.lookup(connection_id) else {
			return;
		};

		if let Some(room) = &session.room {
			self.membership.leave(room, connection_id);
			self.announce_departure(room, &session.display_name).await;
		}
		self.registry.forget(connection_id);

		if let Err(error) = self.store.mark_offline(&session.user_id, Utc::now()).await {
			warn!("Failed to mark user '{}' offline: {error}", session.user_id);
		}
		info!("User '{}' ({connection_id}) disconnected.", session.display_name);
	}

	pub fn room_names(&self) -> Vec<String> {
		self.membership.room_names()
	}

	pub fn members_of(&self, room: &str) -> Vec<Membership> {
		self.membership.members_of(room)
	}

	fn session(&self, connection_id: ConnectionId) -> Result<Session, RelayError> {
		self.registry.lookup(connection_id).ok_or(RelayError::NotAuthenticated)
	}

	fn member_of(&self, connection_id: ConnectionId, room: &str) -> Result<Session, RelayError> {
		let session = self.session(connection_id)?;
		match &session.room {
			None => Err(RelayError::NotAuthenticated),
			Some(current_room) if current_room != room => Err(RelayError::NotFound(room.to_string())),
			Some(_) => Ok(session),
		}
	}

	async fn replay_history(&self, session: &Session, room: &str) {
		match self.store.recent_history(room, self.join_history_limit).await {
			Ok(history) => {
				for message in history {
					if session
						.sender
						.send_message(OutgoingMessage::Message(message.into()))
						.await
						.is_err()
					{
						break;
					}
				}
			}
			// History is best effort on join; tell the joiner and move on.
			Err(error) => {
				warn!("Failed to read history for room '{room}': {error}");
				let notice = ErrorMessage::builder()
					.error(ErrorMessageType::StorageUnavailable)
					.message(format!("Message history for '{room}' is currently unavailable."))
					.build();
				let _ = session.sender.send_message(notice.into()).await;
			}
		}
	}

	async fn announce_departure(&self, room: &str, display_name: &str) {
		let remaining_members = self.room_senders(room, None);
		self.presence.announce_leave(display_name, &remaining_members).await;
		self.publish_roster(room).await;
	}

	async fn publish_roster(&self, room: &str) {
		let members = self.membership.members_of(room);
		let recipients = self.room_senders(room, None);
		self.presence.publish_roster(room, &members, &recipients).await;
	}

	fn room_senders(&self, room: &str, excluded: Option<ConnectionId>) -> Vec<MessageSender> {
		self.membership
			.members_of(room)
			.into_iter()
			.filter(|member| Some(member.connection_id) != excluded)
			.filter_map(|member| self.registry.lookup(member.connection_id))
			.map(|session| session.sender)
			.collect()
	}
}

/// Delivers one message to every recipient concurrently. Send failures are
/// ignored, the failing connection will notice and disconnect on its own.
pub(crate) async fn fan_out(recipients: &[MessageSender], message: OutgoingMessage) {
	let deliveries = recipients.iter().map(|sender| {
		let message = message.clone();
		async move {
			let _ = sender.send_message(message).await;
		}
	});
	join_all(deliveries).await;
}
