use crate::commandline::Commandline;
use crate::error::WavechatError;
use clap::Parser;

mod auth;
mod commandline;
mod configuration;
mod connection;
mod context;
mod error;
mod lifecycle;
mod message;
mod relay;
mod server;
mod store;
#[cfg(test)]
mod utils;

#[tokio::main]
async fn main() -> Result<(), WavechatError> {
	let commandline = Commandline::parse();
	commandline.run().await
}
