use clap::Parser;
use ledger_api::cli::client::ClientError;
use ledger_api::cli::utils::output_error;
use ledger_api::cli::{Cli, OutputFormat};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_format = OutputFormat::from_cli(&cli);

    if let Err(e) = ledger_api::cli::run(cli).await {
        let code = match e.downcast_ref::<ClientError>() {
            Some(ClientError::Api { code, .. }) => Some(code.as_str()),
            _ => None,
        };

        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => output_error(&output_format, &e.to_string(), code)?,
        }
        std::process::exit(1);
    }

    Ok(())
}
