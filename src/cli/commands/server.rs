use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::config::{load_config, save_config};
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Point the client at a server (clears any saved session)")]
    Set {
        #[arg(help = "Server URL, e.g. http://localhost:4000")]
        url: String,
    },

    #[command(about = "Show the configured server and its health")]
    Show,
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Set { url } => {
            let parsed = url::Url::parse(&url)
                .map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", url, e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                anyhow::bail!("Server URL must use http or https");
            }

            let mut config = load_config()?;
            config.server_url = url.trim_end_matches('/').to_string();
            config.session = None;
            save_config(&config)?;

            output_success(
                &output_format,
                &format!("Server set to {}", config.server_url),
                Some(json!({ "server_url": config.server_url })),
            )
        }
        ServerCommands::Show => {
            let config = load_config()?;
            let client = ApiClient::new(&config.server_url, None)?;

            let (status, detail) = match client.get("/health").await {
                Ok(health) => ("up", health),
                Err(e) => ("down", json!({ "error": e.to_string() })),
            };

            match output_format {
                OutputFormat::Json => output_json(&json!({
                    "server_url": config.server_url,
                    "status": status,
                    "health": detail,
                    "logged_in_as": config.session.as_ref().map(|s| &s.username),
                })),
                OutputFormat::Text => {
                    println!("Server: {}", config.server_url);
                    println!("Status: {}", status.to_uppercase());
                    if let Some(session) = &config.session {
                        println!("Logged in as: {}", session.username);
                    }
                    Ok(())
                }
            }
        }
    }
}
