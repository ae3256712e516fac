//! Application configuration and layout constants.
//!
//! [`AppConfig`] is read from a TOML file. Every field is optional and falls
//! back to its default; `SETTLE_APP_NAME` and `SETTLE_APP_URL` override the
//! corresponding fields after loading.
//!
//! ```toml
//! name = "My App"
//! url = "https://example.com"
//! debounce_delay_ms = 300
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::parse_url;

pub const ENV_APP_NAME: &str = "SETTLE_APP_NAME";
pub const ENV_APP_URL: &str = "SETTLE_APP_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    pub url: String,
    /// Quiet period for debounced inputs.
    pub debounce_delay_ms: u64,
    /// Refresh interval of the clock page.
    pub clock_tick_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Settle Template".to_string(),
            description: "A reactive UI-state starter".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            author: "Your Name".to_string(),
            url: "http://localhost:3000".to_string(),
            debounce_delay_ms: 500,
            clock_tick_ms: 1000,
        }
    }
}

impl AppConfig {
    /// Read `path` and apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&contents)?;
        config.apply_env();
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `SETTLE_APP_NAME` / `SETTLE_APP_URL` when set and non-empty.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup(ENV_APP_NAME).filter(|v| !v.is_empty()) {
            self.name = name;
        }
        if let Some(url) = lookup(ENV_APP_URL).filter(|v| !v.is_empty()) {
            self.url = url;
        }
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_delay_ms)
    }

    pub fn clock_tick(&self) -> Duration {
        Duration::from_millis(self.clock_tick_ms.max(1))
    }

    /// Host part of `url`, the reference for
    /// [`is_external_url`](crate::utils::is_external_url).
    pub fn site_host(&self) -> Option<String> {
        parse_url(&self.url).and_then(|url| url.host_str().map(str::to_owned))
    }
}

// ============================================
// Layout constants
// ============================================

/// A navigation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationItem {
    pub label: &'static str,
    pub href: &'static str,
}

pub const NAVIGATION_ITEMS: [NavigationItem; 3] = [
    NavigationItem { label: "Home", href: "/" },
    NavigationItem { label: "Next.js", href: "/next" },
    NavigationItem { label: "Start", href: "/start" },
];

/// A link leaving the site, grouped by the project it documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalLink {
    pub group: &'static str,
    pub label: &'static str,
    pub href: &'static str,
}

pub const EXTERNAL_LINKS: [ExternalLink; 6] = [
    ExternalLink { group: "nextjs", label: "docs", href: "https://nextjs.org/docs" },
    ExternalLink { group: "nextjs", label: "learn", href: "https://nextjs.org/learn" },
    ExternalLink { group: "nextjs", label: "github", href: "https://github.com/vercel/next.js" },
    ExternalLink {
        group: "nextjs",
        label: "examples",
        href: "https://vercel.com/templates?framework=next.js",
    },
    ExternalLink { group: "vercel", label: "deploy", href: "https://vercel.com/new" },
    ExternalLink { group: "vercel", label: "platform", href: "https://vercel.com" },
];

/// Breakpoint name and minimum width in pixels, ascending.
pub const BREAKPOINTS: [(&str, u32); 6] = [
    ("xs", 480),
    ("sm", 600),
    ("md", 768),
    ("lg", 1024),
    ("xl", 1280),
    ("2xl", 1536),
];

pub struct AnimationDuration;

impl AnimationDuration {
    pub const FAST: Duration = Duration::from_millis(150);
    pub const NORMAL: Duration = Duration::from_millis(200);
    pub const SLOW: Duration = Duration::from_millis(300);
}

/// Stacking order of overlay layers.
pub struct ZIndex;

impl ZIndex {
    pub const DROPDOWN: u32 = 1000;
    pub const STICKY: u32 = 1020;
    pub const FIXED: u32 = 1030;
    pub const MODAL: u32 = 1040;
    pub const POPOVER: u32 = 1050;
    pub const TOOLTIP: u32 = 1060;
    pub const TOAST: u32 = 1070;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.debounce_delay(), Duration::from_millis(500));
    }

    #[test]
    fn partial_file_overrides_fields() {
        let config = AppConfig::from_toml_str("name = \"Demo\"\ndebounce_delay_ms = 250\n").unwrap();
        assert_eq!(config.name, "Demo");
        assert_eq!(config.debounce_delay_ms, 250);
        assert_eq!(config.clock_tick_ms, 1000);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = AppConfig::from_toml_str("debounce_delay_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn environment_overrides_apply_when_non_empty() {
        let env: HashMap<&str, &str> = [(ENV_APP_NAME, "From Env"), (ENV_APP_URL, "")].into();
        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.name, "From Env");
        assert_eq!(config.url, "http://localhost:3000");
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settle.toml");
        std::fs::write(&path, "clock_tick_ms = 0\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.clock_tick(), Duration::from_millis(1));
    }

    #[test]
    fn layout_scales_are_ascending() {
        assert!(BREAKPOINTS.windows(2).all(|w| w[0].1 < w[1].1));
        assert!(ZIndex::DROPDOWN < ZIndex::MODAL && ZIndex::MODAL < ZIndex::TOAST);
        assert!(AnimationDuration::FAST < AnimationDuration::SLOW);
        assert_eq!(NAVIGATION_ITEMS[0].href, "/");
    }

    #[test]
    fn site_host_comes_from_url() {
        let mut config = AppConfig::default();
        assert_eq!(config.site_host().as_deref(), Some("localhost"));

        config.url = "https://Example.com:8443/app".to_string();
        assert_eq!(config.site_host().as_deref(), Some("example.com"));

        config.url = "not a url".to_string();
        assert_eq!(config.site_host(), None);
    }

    #[test]
    fn navigation_is_internal_and_links_are_external() {
        use crate::utils::is_external_url;

        let config = AppConfig::default();
        let host = config.site_host().unwrap();

        assert_eq!(NAVIGATION_ITEMS[1].label, "Next.js");
        for item in NAVIGATION_ITEMS {
            let absolute = format!("{}{}", config.url, item.href);
            assert!(!is_external_url(&absolute, &host), "{absolute}");
        }
        for link in EXTERNAL_LINKS {
            assert!(is_external_url(link.href, &host), "{}", link.href);
        }
    }
}
