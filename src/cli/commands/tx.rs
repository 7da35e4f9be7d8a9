use clap::Subcommand;
use serde_json::{json, Map, Value};

use crate::cli::client::ApiClient;
use crate::cli::config::load_config;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TxCommands {
    #[command(about = "List your transactions, newest first")]
    List,

    #[command(about = "Record a transaction")]
    Add {
        #[arg(help = "income or expense")]
        kind: String,
        #[arg(help = "Positive amount, e.g. 12.50")]
        amount: String,
        #[arg(help = "Date as YYYY-MM-DD")]
        date: String,
        #[arg(long, help = "Optional description")]
        description: Option<String>,
    },

    #[command(about = "Change fields of an existing transaction")]
    Update {
        #[arg(help = "Transaction ID")]
        id: i64,
        #[arg(long = "type", help = "income or expense")]
        kind: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long, help = "Date as YYYY-MM-DD")]
        date: Option<String>,
        #[arg(long, help = "New description (empty string clears it)")]
        description: Option<String>,
    },

    #[command(about = "Delete a transaction")]
    Delete {
        #[arg(help = "Transaction ID")]
        id: i64,
    },

    #[command(about = "Show income, expense and balance totals")]
    Summary,
}

pub async fn handle(cmd: TxCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config()?;
    let client = ApiClient::new(&config.server_url, config.active_token().map(String::from))?;
    client.require_token()?;

    match cmd {
        TxCommands::List => {
            let transactions = client.get("/api/transactions").await?;
            output_transactions(&output_format, &transactions)
        }
        TxCommands::Add {
            kind,
            amount,
            date,
            description,
        } => {
            let mut body = json!({ "type": kind, "amount": amount, "date": date });
            if let Some(description) = description {
                body["description"] = json!(description);
            }

            let created = client.post("/api/transactions", &body).await?;
            output_success(
                &output_format,
                &format!("Transaction {} recorded", field(&created, "id")),
                Some(json!({ "transaction": created })),
            )
        }
        TxCommands::Update {
            id,
            kind,
            amount,
            date,
            description,
        } => {
            let body = update_body(kind, amount, date, description);
            if body.is_empty() {
                anyhow::bail!("Nothing to update; pass at least one of --type, --amount, --date, --description");
            }

            let updated = client
                .put(&format!("/api/transactions/{}", id), &Value::Object(body))
                .await?;
            output_success(
                &output_format,
                &format!("Transaction {} updated", id),
                Some(json!({ "transaction": updated })),
            )
        }
        TxCommands::Delete { id } => {
            client.delete(&format!("/api/transactions/{}", id)).await?;
            output_success(
                &output_format,
                &format!("Transaction {} deleted", id),
                Some(json!({ "id": id })),
            )
        }
        TxCommands::Summary => {
            let summary = client.get("/api/transactions/summary").await?;
            match output_format {
                OutputFormat::Json => output_json(&summary),
                OutputFormat::Text => {
                    println!("Income:  {:>14}", field(&summary, "income"));
                    println!("Expense: {:>14}", field(&summary, "expense"));
                    println!("Balance: {:>14}", field(&summary, "balance"));
                    println!("({} transactions)", field(&summary, "count"));
                    Ok(())
                }
            }
        }
    }
}

/// Only the flags that were given end up in the PUT body
fn update_body(
    kind: Option<String>,
    amount: Option<String>,
    date: Option<String>,
    description: Option<String>,
) -> Map<String, Value> {
    let mut body = Map::new();
    if let Some(kind) = kind {
        body.insert("type".into(), json!(kind));
    }
    if let Some(amount) = amount {
        body.insert("amount".into(), json!(amount));
    }
    if let Some(date) = date {
        body.insert("date".into(), json!(date));
    }
    if let Some(description) = description {
        body.insert("description".into(), json!(description));
    }
    body
}
