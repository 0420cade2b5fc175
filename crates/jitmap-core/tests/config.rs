//! Tests for environment-driven configuration
//!
//! Kept in its own test binary: it mutates the process environment.

use std::env;

use jitmap_core::config::{ListenerConfig, EMIT_DEBUG_INFO_VAR};

#[test]
fn test_listener_config_from_env()
{
    env::remove_var(EMIT_DEBUG_INFO_VAR);
    assert!(ListenerConfig::from_env().emit_debug_info);

    env::set_var(EMIT_DEBUG_INFO_VAR, "off");
    assert!(!ListenerConfig::from_env().emit_debug_info);

    env::set_var(EMIT_DEBUG_INFO_VAR, "not-a-toggle");
    assert!(ListenerConfig::from_env().emit_debug_info);

    env::remove_var(EMIT_DEBUG_INFO_VAR);
}
