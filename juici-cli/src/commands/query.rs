//! Raw query command
//!
//! Only the statements the storage layer recognises are accepted; each
//! `--param` is parsed as JSON, falling back to a plain string.
//!
//! ```bash
//! juici query --sql 'SELECT * FROM favorites WHERE user_id = $1 ORDER BY id' --param $USER_ID
//! ```

use anyhow::Result;
use clap::Parser;
use juici_store::Database;
use serde_json::Value;

use super::{print_json, public};

#[derive(Parser, Debug)]
pub struct QueryArgs {
    /// Statement text
    #[arg(long)]
    pub sql: String,

    /// Positional parameter ($1, $2, ...), as JSON or a bare string (repeatable)
    #[arg(long = "param")]
    pub params: Vec<String>,
}

fn parse_param(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub async fn run_query(db: &Database, args: QueryArgs) -> Result<()> {
    let params: Vec<Value> = args.params.iter().map(|p| parse_param(p)).collect();
    let result = db.query(&args.sql, &params).await.map_err(public)?;
    print_json(&result)
}
