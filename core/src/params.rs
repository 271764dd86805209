//! Connection parameters — the canonical configuration value handed to the
//! transport layer.
//!
//! A `Parameters` instance is built once, from either an explicit key/value
//! mapping or a connection URI, and is read-only afterwards. Well-known
//! fields (`scheme`, `host`, `port`, `path`, `timeout`, `database`,
//! `persistent`) fall back to scheme-appropriate defaults when not supplied;
//! every other key is kept verbatim as a custom field. Nothing is ever
//! rejected for being unknown.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ParamsError;
use crate::uri;
use crate::value::Value;


// ---------------------------------------------------------------------------
// Default profiles
// ---------------------------------------------------------------------------

/// Which baseline supplies the defaults for well-known fields left unset.
///
/// Mapping-constructed instances always use the tcp baseline, even when the
/// mapping itself overrides `scheme`; only the URI constructor switches to
/// the unix profile. The asymmetry is deliberate: the URI path knows the
/// scheme before any field is applied, the mapping path does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum DefaultProfile {
    Tcp,
    Unix,
}

impl DefaultProfile {
    /// Default value for a well-known field, or `None` for fields that carry
    /// no default under this profile (`path`, `database`, `persistent`, and
    /// `port` on the unix profile).
    fn default_for(self, name: &str) -> Option<Value> {
        match (name, self) {
            ("scheme", DefaultProfile::Tcp) => Some("tcp".into()),
            ("scheme", DefaultProfile::Unix) => Some("unix".into()),
            ("host", DefaultProfile::Tcp) => Some("127.0.0.1".into()),
            ("host", DefaultProfile::Unix) => Some("localhost".into()),
            ("port", DefaultProfile::Tcp) => Some(Value::Int(6379)),
            ("timeout", _) => Some(Value::Float(5.0)),
            _ => None,
        }
    }

    /// Names of the fields that carry a default under this profile.
    fn defaulted_fields(self) -> &'static [&'static str] {
        match self {
            DefaultProfile::Tcp => &["scheme", "host", "port", "timeout"],
            DefaultProfile::Unix => &["scheme", "host", "timeout"],
        }
    }
}


// ---------------------------------------------------------------------------
// Well-known field storage
// ---------------------------------------------------------------------------

/// Explicit overrides for the well-known fields. `None` means "not supplied";
/// reads fall through to the default profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct WellKnown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scheme: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    host: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    port: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    persistent: Option<Value>,
}

impl WellKnown {
    const NAMES: [&'static str; 7] = [
        "scheme",
        "host",
        "port",
        "path",
        "timeout",
        "database",
        "persistent",
    ];

    fn is_known(name: &str) -> bool {
        Self::NAMES.contains(&name)
    }

    fn get(&self, name: &str) -> Option<&Value> {
        match name {
            "scheme" => self.scheme.as_ref(),
            "host" => self.host.as_ref(),
            "port" => self.port.as_ref(),
            "path" => self.path.as_ref(),
            "timeout" => self.timeout.as_ref(),
            "database" => self.database.as_ref(),
            "persistent" => self.persistent.as_ref(),
            _ => None,
        }
    }

    fn set(&mut self, name: &str, value: Value) {
        match name {
            "scheme" => self.scheme = Some(value),
            "host" => self.host = Some(value),
            "port" => self.port = Some(value),
            "path" => self.path = Some(value),
            "timeout" => self.timeout = Some(value),
            "database" => self.database = Some(value),
            "persistent" => self.persistent = Some(value),
            _ => {}
        }
    }
}


// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Normalized connection parameters.
///
/// Two-tier storage: a fixed record of well-known field overrides plus a
/// side map of custom fields, with a default profile fixed at construction.
/// The effective value of a name resolves override → custom → default →
/// absence, so reading a default-bearing well-known field never yields
/// "unset" and reading an arbitrary unknown name yields `None` rather than
/// an error.
///
/// Serde round-trips preserve the override/custom split, so a copied
/// instance answers [`Parameters::contains`] exactly like the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    profile: DefaultProfile,
    fixed: WellKnown,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    custom: BTreeMap<String, Value>,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            profile: DefaultProfile::Tcp,
            fixed: WellKnown::default(),
            custom: BTreeMap::new(),
        }
    }
}

impl Parameters {
    /// All-defaults instance: `tcp://127.0.0.1:6379` with a 5 second timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an explicit key/value mapping.
    ///
    /// Keys matching a well-known field override its default; every other
    /// key becomes a custom field. Defaulting stays field-by-field on the
    /// tcp baseline even when the mapping overrides `scheme`.
    pub fn from_mapping<K, V>(mapping: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut params = Self::default();
        for (key, value) in mapping {
            params.set(key.into(), value.into());
        }
        params
    }

    /// Build from a connection URI.
    ///
    /// Parses the URI into a mapping first (see [`crate::uri::parse`]), then
    /// applies the mapping rules with a scheme-conditional default profile:
    /// a `unix` URI defaults `host` to `localhost` and carries no `port`
    /// default. All parsed values are stored as strings.
    ///
    /// # Errors
    ///
    /// Propagates [`ParamsError::InvalidUri`] from parsing unchanged.
    pub fn from_uri(uri: &str) -> Result<Self, ParamsError> {
        let parsed = uri::parse(uri)?;
        let profile = match parsed.get("scheme").map(String::as_str) {
            Some("unix") => DefaultProfile::Unix,
            _ => DefaultProfile::Tcp,
        };
        let mut params = Parameters {
            profile,
            ..Self::default()
        };
        for (key, value) in parsed {
            params.set(key, Value::Str(value));
        }
        Ok(params)
    }

    fn set(&mut self, key: String, value: Value) {
        if WellKnown::is_known(&key) {
            self.fixed.set(&key, value);
        } else {
            self.custom.insert(key, value);
        }
    }

    /// Effective value for `name`: explicit override, else custom value,
    /// else the profile default, else `None`.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.fixed.get(name) {
            return Some(value.clone());
        }
        if let Some(value) = self.custom.get(name) {
            return Some(value.clone());
        }
        self.profile.default_for(name)
    }

    /// Whether `name` resolves to a value: an override, a custom field, or a
    /// default-bearing well-known name. False for arbitrary unknown names,
    /// even though [`Parameters::get`] on them is still a defined `None`.
    pub fn contains(&self, name: &str) -> bool {
        self.fixed.get(name).is_some()
            || self.custom.contains_key(name)
            || self.profile.default_for(name).is_some()
    }

    /// Full effective view: every defaulted well-known field merged with all
    /// explicit overrides and all custom fields, later sources winning.
    pub fn to_mapping(&self) -> BTreeMap<String, Value> {
        let mut mapping = BTreeMap::new();
        for &name in self.profile.defaulted_fields() {
            if let Some(value) = self.profile.default_for(name) {
                mapping.insert(name.to_string(), value);
            }
        }
        for name in WellKnown::NAMES {
            if let Some(value) = self.fixed.get(name) {
                mapping.insert(name.to_string(), value.clone());
            }
        }
        for (key, value) in &self.custom {
            mapping.insert(key.clone(), value.clone());
        }
        mapping
    }
}

impl FromStr for Parameters {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uri(s)
    }
}

impl fmt::Display for Parameters {
    /// Renders the effective configuration back to URI form:
    /// `scheme://host:port/?k=v&…` for the network form, `unix://path?k=v&…`
    /// when a socket path is set. Query pairs appear in sorted key order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mapping = self.to_mapping();
        let scheme = mapping
            .get("scheme")
            .map(Value::to_string)
            .unwrap_or_else(|| "tcp".to_string());

        if let Some(path) = mapping.get("path") {
            write!(f, "{}://{}?", scheme, path)?;
        } else {
            match (mapping.get("host"), mapping.get("port")) {
                (Some(host), Some(port)) => write!(f, "{}://{}:{}/?", scheme, host, port)?,
                (Some(host), None) => write!(f, "{}://{}/?", scheme, host)?,
                _ => write!(f, "{}://?", scheme)?,
            }
        }

        let mut first = true;
        for (key, value) in &mapping {
            if matches!(key.as_str(), "scheme" | "host" | "port" | "path") {
                continue;
            }
            if !first {
                f.write_str("&")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// The well-known defaults of a fresh tcp instance, as a mapping.
    fn default_mapping() -> BTreeMap<String, Value> {
        let mut m = BTreeMap::new();
        m.insert("scheme".to_string(), Value::from("tcp"));
        m.insert("host".to_string(), Value::from("127.0.0.1"));
        m.insert("port".to_string(), Value::Int(6379));
        m.insert("timeout".to_string(), Value::Float(5.0));
        m
    }

    #[test]
    fn default_values() {
        let params = Parameters::new();

        assert_eq!(params.get("scheme"), Some(Value::from("tcp")));
        assert_eq!(params.get("host"), Some(Value::from("127.0.0.1")));
        assert_eq!(params.get("port"), Some(Value::Int(6379)));
        assert_eq!(params.get("timeout"), Some(Value::Float(5.0)));

        // No other well-known field is present on a fresh instance.
        assert_eq!(params.get("path"), None);
        assert_eq!(params.get("database"), None);
        assert_eq!(params.get("persistent"), None);
    }

    #[test]
    fn existence_semantics() {
        let params = Parameters::new();

        assert!(params.contains("scheme"));
        assert!(!params.contains("unknown"));
        // Reading an unknown name is a defined absence, not an error.
        assert_eq!(params.get("unknown"), None);

        assert!(!params.contains("path"));
        assert!(!params.contains("database"));
        assert!(!params.contains("persistent"));
    }

    #[test]
    fn user_defined_parameters() {
        let params =
            Parameters::from_mapping(vec![("port", Value::Int(7000)), ("custom", "foobar".into())]);

        assert!(params.contains("scheme"));
        assert_eq!(params.get("scheme"), Some(Value::from("tcp")));

        assert!(params.contains("port"));
        assert_eq!(params.get("port"), Some(Value::Int(7000)));

        assert!(params.contains("custom"));
        assert_eq!(params.get("custom"), Some(Value::from("foobar")));

        assert!(!params.contains("unknown"));
        assert_eq!(params.get("unknown"), None);
    }

    #[test]
    fn construct_with_uri_string() {
        // Overrides {port: 7000, database: 5, custom: foobar} rendered the
        // way a caller would write them: port in the authority, the rest in
        // the query string.
        let params = Parameters::from_uri("tcp://127.0.0.1:7000/?database=5&custom=foobar")
            .unwrap();

        assert_eq!(params.get("scheme"), Some(Value::from("tcp")));
        assert_eq!(params.get("host"), Some(Value::from("127.0.0.1")));

        // URI-sourced values stay strings; coercion is the reader's call.
        assert_eq!(params.get("port").and_then(|v| v.as_int()), Some(7000));
        assert_eq!(params.get("database").and_then(|v| v.as_int()), Some(5));

        assert!(params.contains("custom"));
        assert_eq!(params.get("custom"), Some(Value::from("foobar")));

        assert!(!params.contains("unknown"));
        assert_eq!(params.get("unknown"), None);
    }

    #[test]
    fn uri_construction_equals_parse_then_construct() {
        let uri = "tcp://10.10.10.10:6400?timeout=0.5&persistent=1&custom=foobar";
        let from_uri = Parameters::from_uri(uri).unwrap();
        let from_parsed = Parameters::from_mapping(crate::uri::parse(uri).unwrap());
        assert_eq!(from_uri, from_parsed);
    }

    #[test]
    fn mapping_defaults_ignore_supplied_scheme() {
        // The mapping path defaults field-by-field on the tcp baseline even
        // when scheme says otherwise; only the URI path is scheme-aware.
        let params =
            Parameters::from_mapping(vec![("scheme", "unix"), ("path", "/tmp/redis.sock")]);

        assert_eq!(params.get("scheme"), Some(Value::from("unix")));
        assert_eq!(params.get("path"), Some(Value::from("/tmp/redis.sock")));
        assert_eq!(params.get("host"), Some(Value::from("127.0.0.1")));
        assert_eq!(params.get("port"), Some(Value::Int(6379)));
    }

    #[test]
    fn uri_defaults_are_scheme_conditional() {
        let params = Parameters::from_uri("unix:///tmp/redis.sock").unwrap();

        assert_eq!(params.get("scheme"), Some(Value::from("unix")));
        assert_eq!(params.get("host"), Some(Value::from("localhost")));
        assert_eq!(params.get("path"), Some(Value::from("/tmp/redis.sock")));
        assert_eq!(params.get("timeout"), Some(Value::Float(5.0)));

        // No port default on the unix profile.
        assert!(!params.contains("port"));
        assert_eq!(params.get("port"), None);
    }

    #[test]
    fn export_fidelity() {
        let params =
            Parameters::from_mapping(vec![("port", Value::Int(7000)), ("custom", "foobar".into())]);

        let mut expected = default_mapping();
        expected.insert("port".to_string(), Value::Int(7000));
        expected.insert("custom".to_string(), Value::from("foobar"));

        assert_eq!(params.to_mapping(), expected);
    }

    #[test]
    fn export_of_fresh_instance_is_exactly_the_defaults() {
        assert_eq!(Parameters::new().to_mapping(), default_mapping());
    }

    #[test]
    fn serialization_round_trip() {
        let params =
            Parameters::from_mapping(vec![("port", Value::Int(7000)), ("custom", "foobar".into())]);

        let json = serde_json::to_string(&params).unwrap();
        let restored: Parameters = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, params);
        assert_eq!(restored.get("scheme"), params.get("scheme"));
        assert_eq!(restored.get("port"), Some(Value::Int(7000)));

        assert!(restored.contains("custom"));
        assert_eq!(restored.get("custom"), Some(Value::from("foobar")));

        assert!(!restored.contains("unknown"));
        assert_eq!(restored.get("unknown"), None);
    }

    #[test]
    fn unix_serialization_preserves_profile() {
        let params = Parameters::from_uri("unix:///tmp/redis.sock").unwrap();
        let json = serde_json::to_string(&params).unwrap();
        let restored: Parameters = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, params);
        assert!(!restored.contains("port"));
    }

    #[test]
    fn invalid_uri_propagates_from_constructor() {
        let err = Parameters::from_uri("tcp://invalid:uri").unwrap_err();
        assert!(err.to_string().contains("tcp://invalid:uri"));
    }

    #[test]
    fn from_str_parses_a_uri() {
        let params: Parameters = "tcp://10.10.10.10:6400".parse().unwrap();
        assert_eq!(params.get("host"), Some(Value::from("10.10.10.10")));

        let err = "not a uri".parse::<Parameters>().unwrap_err();
        assert_eq!(err, ParamsError::InvalidUri("not a uri".to_string()));
    }

    #[test]
    fn display_network_form() {
        let params =
            Parameters::from_mapping(vec![("port", Value::Int(7000)), ("custom", "foobar".into())]);
        assert_eq!(
            params.to_string(),
            "tcp://127.0.0.1:7000/?custom=foobar&timeout=5"
        );
    }

    #[test]
    fn display_local_socket_form() {
        let params = Parameters::from_uri("unix:///tmp/redis.sock?persistent=1").unwrap();
        assert_eq!(
            params.to_string(),
            "unix:///tmp/redis.sock?persistent=1&timeout=5"
        );
    }

    #[test]
    fn display_round_trips_through_from_uri() {
        let params = Parameters::from_mapping(vec![("port", Value::Int(7000))]);
        let reparsed = Parameters::from_uri(&params.to_string()).unwrap();

        assert_eq!(reparsed.get("scheme"), params.get("scheme"));
        assert_eq!(reparsed.get("host"), params.get("host"));
        // Anything that travelled through a URI comes back as a string.
        assert_eq!(reparsed.get("port"), Some(Value::from("7000")));
        assert_eq!(reparsed.get("port").and_then(|v| v.as_int()), Some(7000));
    }
}
