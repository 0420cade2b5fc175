//! Listener configuration.
//!
//! ## Environment Variables
//!
//! - `JITMAP_EMIT_DEBUG_INFO`: `1`/`true`/`on` (default) translates and
//!   reports line tables; `0`/`false`/`off` only tracks image lifetimes.

use std::env;
use std::str::FromStr;

use tracing::warn;

/// Environment variable controlling [`ListenerConfig::emit_debug_info`].
pub const EMIT_DEBUG_INFO_VAR: &str = "JITMAP_EMIT_DEBUG_INFO";

/// Runtime options for a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerConfig
{
    /// Translate line tables and report them to the engine.
    ///
    /// When false, emitted images are still registered with their function
    /// lists so frees stay balanced, but nothing is allocated or delivered.
    pub emit_debug_info: bool,
}

impl Default for ListenerConfig
{
    fn default() -> Self
    {
        Self { emit_debug_info: true }
    }
}

impl ListenerConfig
{
    /// Read the configuration from the environment.
    ///
    /// Unset variables take their defaults; unparseable values are logged and
    /// ignored.
    #[must_use]
    pub fn from_env() -> Self
    {
        let mut config = Self::default();
        if let Ok(raw) = env::var(EMIT_DEBUG_INFO_VAR) {
            match raw.parse::<Toggle>() {
                Ok(Toggle(enabled)) => config.emit_debug_info = enabled,
                Err(err) => warn!("{err}; keeping {EMIT_DEBUG_INFO_VAR}={}", config.emit_debug_info),
            }
        }
        config
    }
}

/// A boolean switch as spelled in environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle(pub bool);

impl FromStr for Toggle
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.trim().to_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Ok(Toggle(true)),
            "0" | "false" | "off" | "no" => Ok(Toggle(false)),
            _ => Err(format!("Unknown toggle value: {s}. Use 'on' or 'off'")),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_toggle_from_str()
    {
        assert_eq!(Toggle::from_str("1").unwrap(), Toggle(true));
        assert_eq!(Toggle::from_str("ON").unwrap(), Toggle(true));
        assert_eq!(Toggle::from_str(" false ").unwrap(), Toggle(false));
        assert_eq!(Toggle::from_str("off").unwrap(), Toggle(false));
        assert!(Toggle::from_str("maybe").is_err());
    }

    #[test]
    fn test_default_emits_debug_info()
    {
        assert!(ListenerConfig::default().emit_debug_info);
    }
}
