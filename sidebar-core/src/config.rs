//! Host-specific constants, grouped so a single JSON or TOML document can
//! retarget the sidebar when the host markup shifts.

use crate::error::ConfigError;
use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_HOST_ORIGIN: &str = "https://chatgpt.com";
pub const DEFAULT_HOST_PATH: &str = "/codex";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarConfig {
    pub route: RouteConfig,
    pub selectors: HostSelectors,
    pub labels: OverlayLabels,
    pub timing: TimingConfig,
    pub storage: StorageKeys,
}

impl SidebarConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.route.path.starts_with('/') {
            return Err(ConfigError::invalid("route.path", "must start with '/'"));
        }
        if self.route.origin.trim().is_empty() {
            return Err(ConfigError::invalid("route.origin", "must not be empty"));
        }
        if self.timing.poll_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "timing.poll_interval_ms",
                "must be greater than zero",
            ));
        }
        if self.labels.section_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(ConfigError::invalid(
                "labels.section_markers",
                "needs at least one non-empty marker",
            ));
        }
        if self.storage.selection == self.storage.favorites {
            return Err(ConfigError::invalid(
                "storage.favorites",
                "must differ from storage.selection",
            ));
        }
        Ok(())
    }
}

/// Where the sidebar is active: exact origin plus an exact, trailing-slash
/// insensitive path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub origin: String,
    pub path: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_HOST_ORIGIN.to_string(),
            path: DEFAULT_HOST_PATH.to_string(),
        }
    }
}

/// CSS selectors for the host markup. Only the browser adapter reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSelectors {
    pub disclosure: String,
    pub overlay: String,
    pub control: String,
    pub row: String,
    pub fragment: String,
    pub header: String,
    /// Ancestor of the first row that bounds the header search.
    pub header_scope: String,
    pub panel_id: String,
    /// Class toggled on the document element while the panel is shown.
    pub active_root_class: String,
}

impl Default for HostSelectors {
    fn default() -> Self {
        Self {
            disclosure: r#"button[aria-label="Exibir todos os ambientes de programação"]"#
                .to_string(),
            overlay: "div.popover".to_string(),
            control: "button".to_string(),
            row: "div.border-token-border-light.grid.w-full".to_string(),
            fragment: "span".to_string(),
            header: "div.text-token-text-tertiary.uppercase".to_string(),
            header_scope: "main".to_string(),
            panel_id: "codex-env-sidebar".to_string(),
            active_root_class: "codex-sidebar-on".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayLabels {
    /// Exact text of the section header that marks the environment popover.
    pub section_markers: Vec<String>,
    /// Popover buttons containing any of these are actions, not environments.
    pub excluded_captions: Vec<String>,
    pub all_entry: String,
    pub all_meta: String,
}

impl Default for OverlayLabels {
    fn default() -> Self {
        Self {
            section_markers: vec!["Ambientes".to_string(), "Environments".to_string()],
            excluded_captions: vec![
                "Configurar repositórios".to_string(),
                "Gerenciar ambientes".to_string(),
                "Configure repositories".to_string(),
                "Manage environments".to_string(),
            ],
            all_entry: "Todos".to_string(),
            all_meta: "All environments".to_string(),
        }
    }
}

impl OverlayLabels {
    pub fn is_section_marker(&self, text: &str) -> bool {
        let trimmed = text.trim();
        !trimmed.is_empty() && self.section_markers.iter().any(|m| m == trimmed)
    }

    pub fn is_excluded_caption(&self, label: &str) -> bool {
        self.excluded_captions
            .iter()
            .filter(|caption| !caption.is_empty())
            .any(|caption| label.contains(caption.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub probe_timeout_ms: u64,
    pub discovery_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub debounce_ms: u64,
    pub start_delay_ms: u64,
    pub forced_refresh_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 50,
            discovery_timeout_ms: 1_800,
            poll_interval_ms: 50,
            debounce_ms: 200,
            start_delay_ms: 800,
            forced_refresh_delay_ms: 300,
        }
    }
}

impl TimingConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    pub fn forced_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.forced_refresh_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub selection: String,
    pub favorites: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            selection: "codexSidebar.env".to_string(),
            favorites: "codexSidebar.env.favs".to_string(),
        }
    }
}
