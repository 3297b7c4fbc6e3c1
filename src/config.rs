use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{BillDroidError, BillDroidResult};
use crate::invoice::Invoice;

/// Environment variable that overrides `hookURL` from the config file.
pub const HOOK_URL_ENV: &str = "BILLDROID_HOOK_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(rename = "hookURL", default)]
    pub hook_url: String,
    #[serde(default)]
    pub app: AppIdentity,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub waits: WaitBudgets,
    /// Every other top-level key is an invoice provider, e.g. `"enel": {...}`.
    #[serde(flatten)]
    pub providers: BTreeMap<String, ProviderEntry>,
}

/// Package and launch activity of the banking app being driven.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppIdentity {
    pub package: String,
    pub activity: String,
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self {
            package: "com.nu.production".into(),
            activity: "br.com.nubank.shell.screens.splash.SplashActivity".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    #[serde(default = "default_adb_path")]
    pub adb_path: PathBuf,
    /// Pin a specific device; otherwise the first physical device is used.
    #[serde(default)]
    pub serial: Option<String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            adb_path: default_adb_path(),
            serial: None,
        }
    }
}

fn default_adb_path() -> PathBuf {
    PathBuf::from("adb")
}

/// Retry budgets handed to `wait_in_screen` at each kind of checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitBudgets {
    /// Boot-completed checks before the device counts as unreachable.
    #[serde(default = "default_step_retries")]
    pub device_ready: u32,
    /// Foreground checks after the app is started.
    #[serde(default = "default_launch_retries")]
    pub app_start: u32,
    #[serde(default = "default_launch_retries")]
    pub launch: u32,
    #[serde(default = "default_step_retries")]
    pub step: u32,
    #[serde(default = "default_launch_retries")]
    pub date_picker: u32,
    #[serde(default = "default_tooltip_retries")]
    pub tooltip: u32,
}

impl Default for WaitBudgets {
    fn default() -> Self {
        Self {
            device_ready: default_step_retries(),
            app_start: default_launch_retries(),
            launch: default_launch_retries(),
            step: default_step_retries(),
            date_picker: default_launch_retries(),
            tooltip: default_tooltip_retries(),
        }
    }
}

fn default_launch_retries() -> u32 {
    10
}

fn default_step_retries() -> u32 {
    5
}

fn default_tooltip_retries() -> u32 {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEntry {
    /// Provider credentials; opaque to this crate.
    #[serde(default)]
    pub user: serde_json::Value,
    /// Invoice data already fetched for this provider.
    #[serde(default)]
    pub invoice: Option<Invoice>,
}

pub fn load_config(path: &Path) -> BillDroidResult<AppConfig> {
    if path.as_os_str().is_empty() {
        return Err(BillDroidError::Config("invalid path; cannot be empty".into()));
    }
    let content = std::fs::read_to_string(path).map_err(|e| {
        BillDroidError::Config(format!("cannot read {}: {e}", path.display()))
    })?;
    let mut config: AppConfig = serde_json::from_str(&content).map_err(|e| {
        BillDroidError::Config(format!("cannot parse {}: {e}", path.display()))
    })?;

    if let Ok(url) = std::env::var(HOOK_URL_ENV) {
        if !url.is_empty() {
            tracing::debug!("hook URL taken from {HOOK_URL_ENV}");
            config.hook_url = url;
        }
    }

    if config.app.package.is_empty() || config.app.activity.is_empty() {
        return Err(BillDroidError::Config(
            "app.package and app.activity must not be empty".into(),
        ));
    }

    tracing::info!(
        path = %path.display(),
        providers = config.providers.len(),
        package = %config.app.package,
        "config loaded"
    );
    Ok(config)
}
