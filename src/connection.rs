pub mod receiver;
pub mod sender;
