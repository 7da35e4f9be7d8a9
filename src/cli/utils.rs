use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Print a raw API value as pretty JSON
pub fn output_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render transactions as a fixed-width table
pub fn output_transactions(output_format: &OutputFormat, transactions: &Value) -> anyhow::Result<()> {
    let rows = transactions.as_array().map(Vec::as_slice).unwrap_or_default();

    match output_format {
        OutputFormat::Json => output_json(transactions)?,
        OutputFormat::Text if rows.is_empty() => println!("No transactions recorded"),
        OutputFormat::Text => {
            println!("{:<8} {:<12} {:<8} {:>14}  {}", "ID", "DATE", "TYPE", "AMOUNT", "DESCRIPTION");
            println!("{}", "-".repeat(70));

            for row in rows {
                println!(
                    "{:<8} {:<12} {:<8} {:>14}  {}",
                    field(row, "id"),
                    field(row, "date"),
                    field(row, "type"),
                    field(row, "amount"),
                    field(row, "description"),
                );
            }
        }
    }
    Ok(())
}

/// Display a JSON field as plain text; null and missing become empty
pub fn field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Use the given password or read one line from stdin
pub fn resolve_password(provided: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = provided {
        return Ok(password);
    }

    eprint!("Password: ");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();

    if password.is_empty() {
        anyhow::bail!("Password is required");
    }
    Ok(password)
}
