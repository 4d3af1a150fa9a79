//! Honeypot configuration
//!
//! Field names are slugged on the way in so that the rendered inputs and the
//! classifier always look at the same keys.

use std::env;

pub const DEFAULT_NAME_FIELD: &str = "whf_name";
pub const DEFAULT_TIME_FIELD: &str = "whf_time";
pub const DEFAULT_TIME_INTERVAL: u64 = 3;

/// Process-wide honeypot settings. Whether the honeypot is enabled lives on
/// each form, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoneypotConfig {
    name_field: String,
    time_field: String,
    time_interval: u64,
}

impl HoneypotConfig {
    /// Build a validated config. Use [`HoneypotConfig::default`] or
    /// [`HoneypotConfig::from_env`] when falling back silently is preferred.
    pub fn new(name_field: &str, time_field: &str, time_interval: u64) -> Result<Self, ConfigError> {
        let name = slugify(name_field);
        if name.is_empty() {
            return Err(ConfigError::EmptyFieldName("name"));
        }
        let time = slugify(time_field);
        if time.is_empty() {
            return Err(ConfigError::EmptyFieldName("time"));
        }
        if name == time {
            return Err(ConfigError::DuplicateFieldName(name));
        }

        Ok(Self {
            name_field: name,
            time_field: time,
            time_interval,
        })
    }

    /// Load from `HONEYPOT_NAME_FIELD`, `HONEYPOT_TIME_FIELD` and
    /// `HONEYPOT_TIME_INTERVAL`. Never fails: bad values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`HoneypotConfig::from_env`] over any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let time_interval = match lookup("HONEYPOT_TIME_INTERVAL") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(
                    "Invalid HONEYPOT_TIME_INTERVAL {:?}, using {}s",
                    raw,
                    DEFAULT_TIME_INTERVAL
                );
                DEFAULT_TIME_INTERVAL
            }),
            None => DEFAULT_TIME_INTERVAL,
        };

        RawHoneypotConfig {
            name_field: lookup("HONEYPOT_NAME_FIELD"),
            time_field: lookup("HONEYPOT_TIME_FIELD"),
            time_interval,
        }
        .into()
    }

    /// Name of the text input that must stay empty
    pub fn name_field(&self) -> &str {
        &self.name_field
    }

    /// Name of the hidden input carrying the render timestamp
    pub fn time_field(&self) -> &str {
        &self.time_field
    }

    /// Minimum seconds between render and submit
    pub fn time_interval(&self) -> u64 {
        self.time_interval
    }

    pub fn with_time_interval(mut self, secs: u64) -> Self {
        self.time_interval = secs;
        self
    }
}

impl Default for HoneypotConfig {
    fn default() -> Self {
        Self {
            name_field: DEFAULT_NAME_FIELD.to_string(),
            time_field: DEFAULT_TIME_FIELD.to_string(),
            time_interval: DEFAULT_TIME_INTERVAL,
        }
    }
}

/// Unvalidated settings as they come from the environment
struct RawHoneypotConfig {
    name_field: Option<String>,
    time_field: Option<String>,
    time_interval: u64,
}

impl From<RawHoneypotConfig> for HoneypotConfig {
    fn from(raw: RawHoneypotConfig) -> Self {
        let mut name_field = field_or_default(raw.name_field, DEFAULT_NAME_FIELD, "name");
        let mut time_field = field_or_default(raw.time_field, DEFAULT_TIME_FIELD, "time");
        if time_field == name_field {
            tracing::warn!(
                "Honeypot name and time fields are both {:?}, using defaults",
                name_field
            );
            name_field = DEFAULT_NAME_FIELD.to_string();
            time_field = DEFAULT_TIME_FIELD.to_string();
        }

        Self {
            name_field,
            time_field,
            time_interval: raw.time_interval,
        }
    }
}

fn field_or_default(value: Option<String>, default: &str, which: &str) -> String {
    let Some(value) = value else {
        return default.to_string();
    };
    let slug = slugify(&value);
    if slug.is_empty() {
        tracing::warn!(
            "Honeypot {} field {:?} is empty once slugged, using {:?}",
            which,
            value,
            default
        );
        return default.to_string();
    }
    slug
}

/// Turn an arbitrary label into a field-name slug: lowercase ASCII
/// alphanumerics, `_` and `-`, whitespace runs collapsed to a single `-`.
pub fn slugify(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_dash = false;

    for c in value.chars() {
        if c == '-' || c.is_whitespace() {
            pending_dash = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash {
                out.push('-');
                pending_dash = false;
            }
            out.push(c.to_ascii_lowercase());
        }
    }

    out.trim_matches(|c| c == '-' || c == '_').to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Honeypot {0} field name is empty")]
    EmptyFieldName(&'static str),

    #[error("Honeypot name and time fields are both '{0}'")]
    DuplicateFieldName(String),
}
