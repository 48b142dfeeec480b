//! Consultation tuning parameters
//!
//! Model name, sampling temperature, response budget and request timeout are
//! configuration, not constants. Each can be overridden from the environment.

use std::time::Duration;

pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_MAX_TOKENS: u32 = 700;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Parameters for every model call made by the driver
#[derive(Debug, Clone, PartialEq)]
pub struct ConsultConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
}

impl Default for ConsultConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ConsultConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup; unparseable values keep defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let model = lookup("CONSULT_MODEL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.model);

        let temperature = parse_or("CONSULT_TEMPERATURE", &lookup, defaults.temperature)
            .clamp(0.0, 2.0);
        let max_tokens = parse_or("CONSULT_MAX_TOKENS", &lookup, defaults.max_tokens).max(1);
        let request_timeout = parse_or::<u64>("CONSULT_TIMEOUT_SECS", &lookup, 0);
        let request_timeout = if request_timeout == 0 {
            defaults.request_timeout
        } else {
            Duration::from_secs(request_timeout)
        };

        Self {
            model,
            temperature,
            max_tokens,
            request_timeout,
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
) -> T {
    match lookup(name) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(variable = name, value = %raw, "Ignoring unparseable setting");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ConsultConfig::from_lookup(|_| None);
        assert_eq!(config, ConsultConfig::default());
        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert_eq!(config.max_tokens, 700);
    }

    #[test]
    fn test_overrides() {
        let config = ConsultConfig::from_lookup(lookup_from(&[
            ("CONSULT_MODEL", "gpt-4o-mini"),
            ("CONSULT_TEMPERATURE", "0.4"),
            ("CONSULT_MAX_TOKENS", "500"),
            ("CONSULT_TIMEOUT_SECS", "15"),
        ]));
        assert_eq!(config.model, "gpt-4o-mini");
        assert!((config.temperature - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_garbage_falls_back() {
        let config = ConsultConfig::from_lookup(lookup_from(&[
            ("CONSULT_MODEL", "   "),
            ("CONSULT_TEMPERATURE", "warm"),
            ("CONSULT_MAX_TOKENS", "-3"),
            ("CONSULT_TIMEOUT_SECS", "0"),
        ]));
        assert_eq!(config, ConsultConfig::default());
    }
}
