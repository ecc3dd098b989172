use crate::connection::sender::MessageSender;
use crate::message::outgoing::OutgoingMessage;
use crate::message::outgoing::broadcast_message::{MessageBroadcast, RoomUser, RoomUsersBroadcast};
use crate::relay::fan_out;
use crate::relay::membership::Membership;
use chrono::Utc;

/// Name the server signs its own announcements with.
pub const SYSTEM_SENDER: &str = "WaveBot";

/// Formats and delivers the server-generated messages around joins,
/// leaves and roster changes.
#[derive(Default)]
pub struct PresenceNotifier;

impl PresenceNotifier {
	pub fn welcome(&self, room: &str, display_name: &str) -> OutgoingMessage {
		system_message(format!("Welcome to {room}, {display_name}!"))
	}

	pub async fn announce_join(&self, display_name: &str, recipients: &[MessageSender]) {
		let message = system_message(format!("{display_name} has joined the chat"));
		fan_out(recipients, message).await;
	}

	pub async fn announce_leave(&self, display_name: &str, recipients: &[MessageSender]) {
		let message = system_message(format!("{display_name} has left the chat"));
		fan_out(recipients, message).await;
	}

	pub async fn publish_roster(&self, room: &str, members: &[Membership], recipients: &[MessageSender]) {
		let users = members
			.iter()
			.map(|member| RoomUser {
				id: member.connection_id,
				username: member.display_name.clone(),
				avatar: member.avatar(),
			})
			.collect();
		let message = RoomUsersBroadcast {
			room: room.to_string(),
			users,
		};
		fan_out(recipients, message.into()).await;
	}
}

fn system_message(body: String) -> OutgoingMessage {
	MessageBroadcast {
		sender: SYSTEM_SENDER.to_string(),
		body,
		time: Utc::now(),
	}
	.into()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::utils::fake_message_sender::FakeMessageSender;

	fn member(connection_id: u64, display_name: &str) -> Membership {
		Membership {
			connection_id: connection_id.into(),
			user_id: connection_id.to_string(),
			display_name: display_name.to_string(),
		}
	}

	#[tokio::test]
	async fn should_announce_joins_to_all_recipients() {
		let notifier = PresenceNotifier;
		let alice = FakeMessageSender::default();
		let bob = FakeMessageSender::default();

		notifier
			.announce_join("carol", &[alice.clone().into(), bob.clone().into()])
			.await;

		for recipient in [alice, bob] {
			let messages = recipient.messages();
			assert_eq!(1, messages.len());
			let OutgoingMessage::Message(broadcast) = &messages[0] else {
				panic!("Expected a message broadcast");
			};
			assert_eq!(SYSTEM_SENDER, broadcast.sender);
			assert_eq!("carol has joined the chat", broadcast.body);
		}
	}

	#[tokio::test]
	async fn should_publish_the_full_roster() {
		let notifier = PresenceNotifier;
		let alice = FakeMessageSender::default();

		notifier
			.publish_roster("general", &[member(0, "alice"), member(1, "bob")], &[alice.clone().into()])
			.await;

		let messages = alice.messages();
		assert_eq!(1, messages.len());
		let OutgoingMessage::RoomUsers(roster) = &messages[0] else {
			panic!("Expected a room users broadcast");
		};
		assert_eq!("general", roster.room);
		let usernames: Vec<&str> = roster.users.iter().map(|user| user.username.as_str()).collect();
		assert_eq!(vec!["alice", "bob"], usernames);
		assert_eq!("A", roster.users[0].avatar);
	}
}
