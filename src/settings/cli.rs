use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "utoken", about = "Issue, verify and rotate token pairs")]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Issue a new access credential and refresh handle.
    Issue {
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        audience: Option<String>,
        /// Extra claim as `name=value`; values that parse as JSON are kept typed.
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, serde_json::Value)>,
    },
    /// Verify an access credential and print its claims.
    Verify { token: String },
    /// Exchange a refresh handle for a new pair.
    Refresh { handle: String },
    /// Revoke a refresh handle.
    Revoke { handle: String },
}

fn parse_field(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got {:?}", raw))?;
    if name.is_empty() {
        return Err("field name is empty".to_string());
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((name.to_string(), value))
}
