use crate::relay::registry::ConnectionId;
use parking_lot::Mutex;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Membership {
	pub connection_id: ConnectionId,
	pub user_id: String,
	pub display_name: String,
}

impl Membership {
	/// A user's avatar is the uppercased first character of their name.
	pub fn avatar(&self) -> String {
		self.display_name
			.chars()
			.next()
			.map_or_else(|| "?".to_string(), |character| character.to_uppercase().to_string())
	}
}

/// Maps room names to their current members. A connection is a member of
/// at most one room at any time.
#[derive(Default)]
pub struct RoomMembershipTable {
	rooms: Mutex<BTreeMap<String, Vec<Membership>>>,
}

impl RoomMembershipTable {
	/// Adds the connection to `room`, removing it from whatever room it
	/// was in before. Returns the previous room, if any. Both steps happen
	/// under one lock so the connection is never in two rooms at once.
	pub fn join(&self, room: &str, membership: Membership) -> Option<String> {
		let mut rooms = self.rooms.lock();

		let mut previous_room = None;
		for (name, members) in rooms.iter_mut() {
			if let Some(index) = members
				.iter()
				.position(|member| member.connection_id == membership.connection_id)
			{
				members.remove(index);
				previous_room = Some(name.clone());
				break;
			}
		}

		rooms.entry(room.to_string()).or_default().push(membership);
		previous_room
	}

	/// Removes the connection from `room`. Returns `false` if it wasn't
	/// a member, leaving is idempotent.
	pub fn leave(&self, room: &str, connection_id: ConnectionId) -> bool {
		let mut rooms = self.rooms.lock();
		let Some(members) = rooms.get_mut(room) else {
			return false;
		};

		match members.iter().position(|member| member.connection_id == connection_id) {
			Some(index) => {
				members.remove(index);
				true
			}
			None => false,
		}
	}

	pub fn members_of(&self, room: &str) -> Vec<Membership> {
		self.rooms.lock().get(room).cloned().unwrap_or_default()
	}

	/// All room names seen so far, in lexicographic order. Rooms stay
	/// listed even once their last member has left.
	pub fn room_names(&self) -> Vec<String> {
		self.rooms.lock().keys().cloned().collect()
	}
}
