//! Redlink CLI — inspect connection parameters without opening a connection.
//!
//! # Usage
//!
//! ```text
//! redlink parse tcp://10.10.10.10:6400?timeout=0.5
//! redlink resolve unix:///tmp/redis.sock
//! redlink resolve --json '{"port": 7000, "custom": "foobar"}'
//! ```
//!
//! `parse` prints the raw URI mapping (all values strings, untouched);
//! `resolve` prints the full effective view with defaults applied.

use std::collections::BTreeMap;
use std::process;

use redlink_core::{uri, Parameters, Value};


fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

    match run(&arg_refs) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("redlink: {}", e);
            process::exit(1);
        }
    }
}


/// Execute a subcommand and return its printable output.
fn run(args: &[&str]) -> Result<String, String> {
    match args {
        [] => Err("No command specified. Usage: redlink <parse|resolve> ...".into()),
        ["parse", uri_str] => {
            let parsed = uri::parse(uri_str).map_err(|e| e.to_string())?;
            to_pretty_json(&parsed)
        }
        ["parse", ..] => Err("Usage: redlink parse <uri>".into()),
        ["resolve", "--json", mapping_json] => {
            let mapping: BTreeMap<String, Value> = serde_json::from_str(mapping_json)
                .map_err(|e| format!("invalid JSON mapping: {}", e))?;
            to_pretty_json(&Parameters::from_mapping(mapping).to_mapping())
        }
        ["resolve", uri_str] => {
            let params = Parameters::from_uri(uri_str).map_err(|e| e.to_string())?;
            to_pretty_json(&params.to_mapping())
        }
        ["resolve", ..] => {
            Err("Usage: redlink resolve <uri> | redlink resolve --json <mapping>".into())
        }
        [cmd, ..] => Err(format!("Unknown command: '{}'", cmd)),
    }
}


fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Failed to serialize: {}", e))
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
