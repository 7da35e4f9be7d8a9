use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::config::{load_config, save_config, Session};
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Create an account")]
    Register {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Login and save the session token")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Forget the saved session token")]
    Logout,

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Register { username, password } => {
            let config = load_config()?;
            let password = resolve_password(password)?;
            let client = ApiClient::new(&config.server_url, None)?;

            client
                .post("/api/register", &json!({ "username": username, "password": password }))
                .await?;

            output_success(
                &output_format,
                &format!("User '{}' registered", username),
                Some(json!({ "username": username })),
            )
        }
        AuthCommands::Login { username, password } => {
            let mut config = load_config()?;
            let password = resolve_password(password)?;
            let client = ApiClient::new(&config.server_url, None)?;

            let response = client
                .post("/api/login", &json!({ "username": username, "password": password }))
                .await?;

            let token = response
                .get("token")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow::anyhow!("Server response did not include a token"))?;
            let expires_in = response
                .get("expires_in")
                .and_then(|e| e.as_i64())
                .unwrap_or(3600);

            config.session = Some(Session::new(username.clone(), token.to_string(), expires_in));
            save_config(&config)?;

            output_success(
                &output_format,
                &format!("Logged in as '{}'", username),
                Some(json!({ "username": username, "expires_in": expires_in })),
            )
        }
        AuthCommands::Logout => {
            let mut config = load_config()?;
            config.session = None;
            save_config(&config)?;

            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Whoami => {
            let config = load_config()?;
            let client = ApiClient::new(&config.server_url, config.active_token().map(String::from))?;
            client.require_token()?;

            let profile = client.get("/api/profile").await?;

            match output_format {
                OutputFormat::Json => output_json(&profile),
                OutputFormat::Text => {
                    println!("User: {}", field(&profile, "username"));
                    println!("ID: {}", field(&profile, "id"));
                    if let Some(session) = &config.session {
                        println!("Session expires: {}", session.expires_at.format("%Y-%m-%d %H:%M:%S UTC"));
                    }
                    Ok(())
                }
            }
        }
    }
}
