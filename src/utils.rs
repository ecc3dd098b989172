pub mod fake_message_sender;
pub mod test_client;
