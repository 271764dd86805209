//! Redlink core — connection-parameter model for the redlink client.
//!
//! This crate normalizes user-supplied connection configuration into a
//! canonical [`Parameters`] value. Input is either an explicit key/value
//! mapping or a connection URI; output is a read-only parameter set with
//! scheme-appropriate defaults, verbatim custom fields, and lossless export
//! back to a mapping. Transport I/O and the wire protocol live elsewhere and
//! consume the finished value.
//!
//! ```
//! use redlink_core::{Parameters, Value};
//!
//! let params = Parameters::from_uri("tcp://10.10.10.10:6400?timeout=0.5").unwrap();
//! assert_eq!(params.get("host"), Some(Value::from("10.10.10.10")));
//! assert_eq!(params.get("timeout").and_then(|v| v.as_float()), Some(0.5));
//! ```

pub mod errors;
pub mod params;
pub mod uri;
pub mod value;

pub use errors::ParamsError;
pub use params::Parameters;
pub use value::Value;
