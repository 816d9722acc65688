//! Build-time configuration for the subscription endpoint and the Turnstile
//! challenge, with an optional runtime override. The runtime config is read from
//! `window.NEWSLETTER_CONFIG` (if present) so static deployments can change
//! endpoints or the site key without rebuilding. Configuration values are public;
//! do not store secrets here.
//!
//! The verification bypass is deliberately absent from the runtime override: it is
//! a build-time development switch and is forced off in release builds.

use crate::features::newsletter::PopupVariant;

/// Default Turnstile SDK location.
pub const TURNSTILE_SCRIPT_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/api.js";
/// How long the confirmation view stays up before the form returns.
const DEFAULT_SUCCESS_WINDOW_MS: u32 = 5_000;
/// How long the SDK script may take to load before the attempt is abandoned.
const DEFAULT_SCRIPT_TIMEOUT_MS: u32 = 15_000;
const DEFAULT_LOG_FILTER: &str = "info";

/// Frontend configuration derived from build-time environment variables.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub turnstile_site_key: String,
    pub turnstile_script_url: String,
    pub bypass_verification: bool,
    pub success_window_ms: u32,
    pub script_timeout_ms: u32,
    pub log_filter: String,
    pub popup_variant: PopupVariant,
}

impl AppConfig {
    /// Loads config from build-time environment variables and applies runtime overrides.
    pub fn load() -> Self {
        let api_base_url = option_env!("NEWSLETTER_API_BASE_URL").unwrap_or("");
        let turnstile_site_key = option_env!("NEWSLETTER_TURNSTILE_SITE_KEY").unwrap_or("");
        let bypass_verification = resolve_bypass(
            option_env!("NEWSLETTER_BYPASS_VERIFICATION"),
            cfg!(debug_assertions),
        );
        let success_window_ms = parse_millis(
            option_env!("NEWSLETTER_SUCCESS_WINDOW_MS"),
            DEFAULT_SUCCESS_WINDOW_MS,
        );
        let script_timeout_ms = parse_millis(
            option_env!("NEWSLETTER_SCRIPT_TIMEOUT_MS"),
            DEFAULT_SCRIPT_TIMEOUT_MS,
        );
        let log_filter = option_env!("NEWSLETTER_LOG").unwrap_or(DEFAULT_LOG_FILTER);
        let popup_variant = option_env!("NEWSLETTER_POPUP_VARIANT")
            .and_then(PopupVariant::parse)
            .unwrap_or_default();

        let mut config = Self {
            api_base_url: api_base_url.to_string(),
            turnstile_site_key: turnstile_site_key.to_string(),
            turnstile_script_url: TURNSTILE_SCRIPT_URL.to_string(),
            bypass_verification,
            success_window_ms,
            script_timeout_ms,
            log_filter: log_filter.to_string(),
            popup_variant,
        };

        if let Some(runtime) = runtime_config() {
            apply_runtime_overrides(&mut config, runtime);
        }

        config
    }
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Default)]
struct RuntimeConfig {
    api_base_url: Option<String>,
    turnstile_site_key: Option<String>,
    log_filter: Option<String>,
    popup_variant: Option<String>,
}

fn apply_runtime_overrides(config: &mut AppConfig, runtime: RuntimeConfig) {
    if let Some(value) = runtime.api_base_url {
        config.api_base_url = value;
    }
    if let Some(value) = runtime.turnstile_site_key {
        config.turnstile_site_key = value;
    }
    if let Some(value) = runtime.log_filter {
        config.log_filter = value;
    }
    if let Some(variant) = runtime.popup_variant.as_deref().and_then(PopupVariant::parse) {
        config.popup_variant = variant;
    }
}

/// The bypass only takes effect in debug builds; release artifacts always verify.
fn resolve_bypass(raw: Option<&str>, debug_build: bool) -> bool {
    debug_build && raw.is_some_and(parse_flag)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_millis(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

#[cfg(target_arch = "wasm32")]
fn runtime_config() -> Option<RuntimeConfig> {
    use js_sys::{Object, Reflect};
    use wasm_bindgen::JsValue;

    let window = web_sys::window()?;
    let config = Reflect::get(&window, &JsValue::from_str("NEWSLETTER_CONFIG")).ok()?;
    if config.is_null() || config.is_undefined() {
        return None;
    }
    let object = Object::from(config);

    Some(RuntimeConfig {
        api_base_url: read_runtime_value(&object, "api_base_url"),
        turnstile_site_key: read_runtime_value(&object, "turnstile_site_key"),
        log_filter: read_runtime_value(&object, "log_filter"),
        popup_variant: read_runtime_value(&object, "popup_variant"),
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn runtime_config() -> Option<RuntimeConfig> {
    None
}

#[cfg(target_arch = "wasm32")]
fn read_runtime_value(object: &js_sys::Object, key: &str) -> Option<String> {
    let value = js_sys::Reflect::get(object, &wasm_bindgen::JsValue::from_str(key))
        .ok()?
        .as_string()?;
    normalize_runtime_value(&value)
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn normalize_runtime_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AppConfig, DEFAULT_SUCCESS_WINDOW_MS, PopupVariant, RuntimeConfig, TURNSTILE_SCRIPT_URL,
        apply_runtime_overrides, normalize_runtime_value, parse_millis, resolve_bypass,
    };

    fn default_config() -> AppConfig {
        AppConfig {
            api_base_url: "https://api.default".to_string(),
            turnstile_site_key: "default-key".to_string(),
            turnstile_script_url: TURNSTILE_SCRIPT_URL.to_string(),
            bypass_verification: false,
            success_window_ms: DEFAULT_SUCCESS_WINDOW_MS,
            script_timeout_ms: 15_000,
            log_filter: "info".to_string(),
            popup_variant: PopupVariant::TwoColumn,
        }
    }

    #[test]
    fn normalize_runtime_value_trims_and_rejects_empty() {
        assert_eq!(normalize_runtime_value(""), None);
        assert_eq!(normalize_runtime_value("   "), None);
        assert_eq!(
            normalize_runtime_value("  0x4AAAAAAA "),
            Some("0x4AAAAAAA".to_string())
        );
    }

    #[test]
    fn apply_runtime_overrides_ignores_empty_values() {
        let mut config = default_config();
        let runtime = RuntimeConfig {
            api_base_url: normalize_runtime_value(""),
            turnstile_site_key: normalize_runtime_value("  "),
            log_filter: normalize_runtime_value(""),
            popup_variant: normalize_runtime_value(" "),
        };

        apply_runtime_overrides(&mut config, runtime);

        assert_eq!(config.api_base_url, "https://api.default");
        assert_eq!(config.turnstile_site_key, "default-key");
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.popup_variant, PopupVariant::TwoColumn);
    }

    #[test]
    fn apply_runtime_overrides_overwrites_when_present() {
        let mut config = default_config();
        let runtime = RuntimeConfig {
            api_base_url: normalize_runtime_value("https://api.override"),
            turnstile_site_key: normalize_runtime_value("override-key"),
            log_filter: normalize_runtime_value("debug"),
            popup_variant: normalize_runtime_value("takeover"),
        };

        apply_runtime_overrides(&mut config, runtime);

        assert_eq!(config.api_base_url, "https://api.override");
        assert_eq!(config.turnstile_site_key, "override-key");
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.popup_variant, PopupVariant::Takeover);
        assert!(!config.bypass_verification);
    }

    #[test]
    fn bypass_requires_debug_build_and_truthy_flag() {
        assert!(resolve_bypass(Some("true"), true));
        assert!(resolve_bypass(Some(" 1 "), true));
        assert!(!resolve_bypass(Some("true"), false));
        assert!(!resolve_bypass(Some("0"), true));
        assert!(!resolve_bypass(None, true));
    }

    #[test]
    fn parse_millis_falls_back_on_garbage_and_zero() {
        assert_eq!(parse_millis(Some("3000"), 5_000), 3_000);
        assert_eq!(parse_millis(Some("0"), 5_000), 5_000);
        assert_eq!(parse_millis(Some("soon"), 5_000), 5_000);
        assert_eq!(parse_millis(None, 5_000), 5_000);
    }
}
