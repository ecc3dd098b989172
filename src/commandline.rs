use crate::auth::TokenIssuer;
use crate::configuration::Configuration;
use crate::context::ApplicationContext;
use crate::error::WavechatError;
use crate::server::run_server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser, Debug)]
#[clap(version)]
pub struct Commandline {
	/// Path to the configuration file
	#[clap(short, long, default_value = "configuration.toml")]
	pub configuration_file_path: String,

	#[clap(subcommand)]
	pub command: Option<BaseCommand>,
}

#[derive(clap::Subcommand, Debug)]
pub enum BaseCommand {
	/// Run the server (the default)
	Run,
	/// Print the parsed configuration
	Configuration,
	/// Issue a signed token for local development
	Token {
		user_id: String,
		username: String,
	},
}

impl Commandline {
	pub async fn run(self) -> Result<(), WavechatError> {
		let configuration = Configuration::from_file(&self.configuration_file_path)?;

		match self.command.unwrap_or(BaseCommand::Run) {
			BaseCommand::Run => {
				initialize_logging(&configuration);
				let application_context = ApplicationContext::new(configuration).await?;
				info!(
					"Listening on {} ...",
					application_context.configuration.address
				);
				run_server(application_context).await?;
			}
			BaseCommand::Configuration => println!("{configuration:?}"),
			BaseCommand::Token { user_id, username } => {
				let token = TokenIssuer::new(&configuration.jwt_secret).issue(&user_id, &username)?;
				println!("{token}");
			}
		}

		Ok(())
	}
}

fn initialize_logging(configuration: &Configuration) {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::new(&configuration.log_filters))
		.init();
}
