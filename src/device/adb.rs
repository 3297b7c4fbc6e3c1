/// Device bridge over the `adb` executable.
///
/// Every operation is a single `adb` invocation (or two, for a forced UI dump)
/// spawned through `tokio::process`. Non-zero exit codes and spawn failures
/// map to `DeviceUnreachable`.
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;

use crate::device::bridge::{DeviceBridge, DeviceInfo, ScreenSize};
use crate::errors::{BillDroidError, BillDroidResult};

/// Where `uiautomator dump` writes on the device.
const DUMP_PATH: &str = "/sdcard/window_dump.xml";

pub struct AdbBridge {
    adb: PathBuf,
    serial: Option<String>,
    /// Last hierarchy read back from the device; cleared by every input.
    last_dump: Mutex<Option<String>>,
}

impl AdbBridge {
    pub fn new(adb: impl Into<PathBuf>) -> Self {
        Self {
            adb: adb.into(),
            serial: None,
            last_dump: Mutex::new(None),
        }
    }

    /// Targets every subsequent command at one device (`adb -s <serial>`).
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    async fn run(&self, args: &[&str]) -> BillDroidResult<String> {
        let mut cmd = Command::new(&self.adb);
        if let Some(serial) = &self.serial {
            cmd.arg("-s").arg(serial);
        }
        cmd.args(args).kill_on_drop(true);

        tracing::trace!(adb = %self.adb.display(), ?args, "adb call");
        let output = cmd.output().await.map_err(|e| {
            BillDroidError::DeviceUnreachable(format!("failed to spawn {}: {e}", self.adb.display()))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BillDroidError::DeviceUnreachable(format!(
                "adb {} exited with {}: {}",
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn shell(&self, args: &[&str]) -> BillDroidResult<String> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push("shell");
        full.extend_from_slice(args);
        self.run(&full).await
    }

    fn remember(&self, xml: Option<String>) {
        if let Ok(mut last) = self.last_dump.lock() {
            *last = xml;
        }
    }

    fn remembered(&self) -> Option<String> {
        self.last_dump.lock().ok().and_then(|last| last.clone())
    }

    /// Shell command that changes what is on screen.
    async fn input(&self, args: &[&str]) -> BillDroidResult<String> {
        self.remember(None);
        self.shell(args).await
    }

    async fn read_dump(&self) -> BillDroidResult<String> {
        let xml = self.run(&["exec-out", "cat", DUMP_PATH]).await?;
        if !xml.contains("<hierarchy") {
            return Err(BillDroidError::DeviceUnreachable(format!(
                "{DUMP_PATH} does not hold a UI hierarchy"
            )));
        }
        Ok(xml)
    }
}

#[async_trait]
impl DeviceBridge for AdbBridge {
    async fn list_devices(&self) -> BillDroidResult<Vec<DeviceInfo>> {
        let out = self.run(&["devices"]).await?;
        Ok(parse_devices(&out))
    }

    async fn is_boot_completed(&self) -> BillDroidResult<bool> {
        let out = self.shell(&["getprop", "sys.boot_completed"]).await?;
        Ok(out.trim() == "1")
    }

    async fn is_screen_on(&self) -> BillDroidResult<bool> {
        let out = self.shell(&["dumpsys", "power"]).await?;
        Ok(screen_on_from_dumpsys(&out))
    }

    async fn screen_off_timeout(&self) -> BillDroidResult<u64> {
        let out = self
            .shell(&["settings", "get", "system", "screen_off_timeout"])
            .await?;
        out.trim().parse().map_err(|_| {
            BillDroidError::DeviceUnreachable(format!(
                "unexpected screen_off_timeout value: {}",
                out.trim()
            ))
        })
    }

    async fn set_screen_off_timeout(&self, millis: u64) -> BillDroidResult<()> {
        let millis = millis.to_string();
        self.shell(&["settings", "put", "system", "screen_off_timeout", &millis])
            .await?;
        Ok(())
    }

    async fn wake_up(&self) -> BillDroidResult<()> {
        self.input(&["input", "keyevent", "KEYCODE_WAKEUP"]).await?;
        Ok(())
    }

    async fn close_app(&self, package: &str) -> BillDroidResult<()> {
        self.input(&["am", "force-stop", package]).await?;
        Ok(())
    }

    async fn start_app(&self, package: &str, activity: &str) -> BillDroidResult<()> {
        let component = format!("{package}/{activity}");
        let out = self.input(&["am", "start", "-n", &component]).await?;
        // `am start` exits 0 even when the activity does not exist.
        if out.contains("Error") {
            return Err(BillDroidError::DeviceUnreachable(format!(
                "am start {component}: {}",
                out.trim()
            )));
        }
        Ok(())
    }

    async fn foreground_package(&self) -> BillDroidResult<Option<String>> {
        let out = self.shell(&["dumpsys", "window", "windows"]).await?;
        Ok(parse_foreground_package(&out))
    }

    async fn screen_size(&self) -> BillDroidResult<ScreenSize> {
        let out = self.shell(&["wm", "size"]).await?;
        parse_screen_size(&out).ok_or_else(|| {
            BillDroidError::DeviceUnreachable(format!("unexpected `wm size` output: {}", out.trim()))
        })
    }

    async fn dump_ui_tree(&self, force_refresh: bool) -> BillDroidResult<String> {
        if !force_refresh {
            if let Some(xml) = self.remembered() {
                tracing::trace!("reusing last dump, no input since");
                return Ok(xml);
            }
        }
        let out = self.shell(&["uiautomator", "dump", DUMP_PATH]).await?;
        if out.contains("ERROR") {
            return Err(BillDroidError::DeviceUnreachable(format!(
                "uiautomator dump: {}",
                out.trim()
            )));
        }
        let xml = self.read_dump().await?;
        self.remember(Some(xml.clone()));
        Ok(xml)
    }

    async fn tap(&self, x: i32, y: i32) -> BillDroidResult<()> {
        let (x, y) = (x.to_string(), y.to_string());
        self.input(&["input", "tap", &x, &y]).await?;
        Ok(())
    }

    async fn swipe(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> BillDroidResult<()> {
        let coords = [x1, y1, x2, y2].map(|v| v.to_string());
        self.input(&["input", "swipe", &coords[0], &coords[1], &coords[2], &coords[3]])
            .await?;
        Ok(())
    }

    async fn type_text(&self, text: &str) -> BillDroidResult<()> {
        let escaped = escape_input_text(text);
        self.input(&["input", "text", &escaped]).await?;
        Ok(())
    }
}

/// Parses `adb devices` output, skipping the banner and daemon chatter.
pub fn parse_devices(out: &str) -> Vec<DeviceInfo> {
    out.lines()
        .skip_while(|l| !l.starts_with("List of devices"))
        .skip(1)
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let serial = parts.next()?;
            let state = parts.next()?;
            Some(DeviceInfo {
                serial: serial.to_string(),
                state: state.to_string(),
            })
        })
        .collect()
}

/// `wm size` prints the physical size and, when set, an override. The
/// override is what input coordinates are relative to.
pub fn parse_screen_size(out: &str) -> Option<ScreenSize> {
    let parse = |prefix: &str| {
        out.lines()
            .find_map(|l| l.trim().strip_prefix(prefix))
            .and_then(|dims| {
                let (w, h) = dims.trim().split_once('x')?;
                Some(ScreenSize {
                    width: w.trim().parse().ok()?,
                    height: h.trim().parse().ok()?,
                })
            })
    };
    parse("Override size:").or_else(|| parse("Physical size:"))
}

/// Package of `mCurrentFocus` in `dumpsys window windows`, falling back to
/// `mFocusedApp` while a transition has no focused window yet.
pub fn parse_foreground_package(out: &str) -> Option<String> {
    static FOCUS: OnceLock<Regex> = OnceLock::new();
    let focus = FOCUS.get_or_init(|| {
        Regex::new(r"(?m)^\s*(mCurrentFocus|mFocusedApp)=.*?\s([A-Za-z][\w.]*)/")
            .expect("focus regex is valid")
    });
    let mut focused_app = None;
    for caps in focus.captures_iter(out) {
        let package = caps[2].to_string();
        if &caps[1] == "mCurrentFocus" {
            return Some(package);
        }
        focused_app.get_or_insert(package);
    }
    focused_app
}

pub fn screen_on_from_dumpsys(out: &str) -> bool {
    out.lines().any(|l| {
        let l = l.trim();
        l == "mWakefulness=Awake" || l == "Display Power: state=ON" || l.contains("mScreenOn=true")
    })
}

/// `input text` runs through the device shell: spaces become `%s` and shell
/// metacharacters are backslash-escaped.
pub fn escape_input_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        match c {
            ' ' => out.push_str("%s"),
            '\\' | '"' | '\'' | '(' | ')' | '<' | '>' | '|' | ';' | '&' | '*' | '~' | '$'
            | '`' | '?' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
