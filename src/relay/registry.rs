use crate::auth::Identity;
use crate::connection::sender::MessageSender;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering::Relaxed;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId {
	id: u64,
}

impl From<u64> for ConnectionId {
	fn from(id: u64) -> Self {
		Self { id }
	}
}

impl From<ConnectionId> for u64 {
	fn from(connection_id: ConnectionId) -> Self {
		connection_id.id
	}
}

impl Display for ConnectionId {
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
		write!(formatter, "ConnectionId({})", self.id)
	}
}

/// Everything the relay knows about one live websocket connection.
#[derive(Clone)]
pub struct Session {
	pub connection_id: ConnectionId,
	pub user_id: String,
	pub display_name: String,
	pub room: Option<String>,
	pub sender: MessageSender,
}

/// Tracks live connections. Identities are verified before they get here,
/// admission itself never fails.
#[derive(Default)]
pub struct ConnectionRegistry {
	connection_id_sequence: AtomicSequence,
	sessions: Mutex<HashMap<ConnectionId, Session>>,
}

impl ConnectionRegistry {
	pub fn admit(&self, identity: Identity, sender: MessageSender) -> Session {
		let connection_id = self.connection_id_sequence.next();
		let session = Session {
			connection_id,
			user_id: identity.user_id,
			display_name: identity.display_name,
			room: None,
			sender,
		};
		let existing = self.sessions.lock().insert(connection_id, session.clone());
		assert!(existing.is_none(), "Duplicate connection id: {connection_id}");
		session
	}

	pub fn lookup(&self, connection_id: ConnectionId) -> Option<Session> {
		self.sessions.lock().get(&connection_id).cloned()
	}

	pub fn set_room(&self, connection_id: ConnectionId, room: Option<String>) -> bool {
		match self.sessions.lock().get_mut(&connection_id) {
			Some(session) => {
				session.room = room;
				true
			}
			None => false,
		}
	}

	pub fn forget(&self, connection_id: ConnectionId) {
		self.sessions.lock().remove(&connection_id);
	}
}

#[derive(Default)]
struct AtomicSequence {
	counter: AtomicU64,
}

impl AtomicSequence {
	fn next(&self) -> ConnectionId {
		self.counter.fetch_add(1, Relaxed).into()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::utils::fake_message_sender::FakeMessageSender;

	fn identity(user_id: &str, display_name: &str) -> Identity {
		Identity {
			user_id: user_id.to_string(),
			display_name: display_name.to_string(),
		}
	}

	#[test]
	fn should_assign_strictly_increasing_connection_ids() {
		let registry = ConnectionRegistry::default();

		let first = registry.admit(identity("1", "alice"), FakeMessageSender::default().into());
		let second = registry.admit(identity("2", "bob"), FakeMessageSender::default().into());

		assert!(first.connection_id < second.connection_id);
	}

	#[test]
	fn should_look_up_admitted_sessions() {
		let registry = ConnectionRegistry::default();
		let admitted = registry.admit(identity("1", "alice"), FakeMessageSender::default().into());

		let session = registry
			.lookup(admitted.connection_id)
			.expect("Session was not found");

		assert_eq!("1", session.user_id);
		assert_eq!("alice", session.display_name);
		assert_eq!(None, session.room);
	}

	#[test]
	fn should_update_the_current_room() {
		let registry = ConnectionRegistry::default();
		let admitted = registry.admit(identity("1", "alice"), FakeMessageSender::default().into());

		assert!(registry.set_room(admitted.connection_id, Some("general".to_string())));

		let session = registry
			.lookup(admitted.connection_id)
			.expect("Session was not found");
		assert_eq!(Some("general".to_string()), session.room);
	}

	#[test]
	fn should_not_set_a_room_for_unknown_connections() {
		let registry = ConnectionRegistry::default();

		assert!(!registry.set_room(42.into(), Some("general".to_string())));
	}

	#[test]
	fn should_forget_sessions_idempotently() {
		let registry = ConnectionRegistry::default();
		let admitted = registry.admit(identity("1", "alice"), FakeMessageSender::default().into());

		registry.forget(admitted.connection_id);
		registry.forget(admitted.connection_id);

		assert!(registry.lookup(admitted.connection_id).is_none());
	}
}
