//! Host operating system detection.
//!
//! The platform never changes during the life of the process, so `detect()`
//! probes once and hands out copies of the cached answer.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::fmt;

use crate::privilege;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Windows,
    Linux,
    MacOs,
    Unknown,
}

impl OsFamily {
    /// Map a `std::env::consts::OS` style name onto a family.
    pub fn from_os_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "windows" => OsFamily::Windows,
            "linux" => OsFamily::Linux,
            "macos" | "darwin" => OsFamily::MacOs,
            _ => OsFamily::Unknown,
        }
    }

    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    pub fn is_unix_like(&self) -> bool {
        matches!(self, OsFamily::Linux | OsFamily::MacOs)
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OsFamily::Windows => "Windows",
            OsFamily::Linux => "Linux",
            OsFamily::MacOs => "macOS",
            OsFamily::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformInfo {
    pub family: OsFamily,
    pub version: String,
}

static PLATFORM: Lazy<PlatformInfo> = Lazy::new(probe_platform);

/// Host OS family and a human readable version string. Never fails.
pub fn detect() -> PlatformInfo {
    PLATFORM.clone()
}

fn probe_platform() -> PlatformInfo {
    let family = OsFamily::current();
    let version = match family {
        OsFamily::Windows => windows_version(),
        OsFamily::Linux => format!("Linux {}", unix_release()),
        OsFamily::MacOs => macos_version(),
        OsFamily::Unknown => format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
    };
    log::debug!("[platform] Detected {} ({})", family, version);
    PlatformInfo { family, version }
}

fn windows_version() -> String {
    std::process::Command::new("cmd")
        .args(["/C", "ver"])
        .output()
        .ok()
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "Windows".to_string())
}

fn macos_version() -> String {
    let product = std::process::Command::new("sw_vers")
        .arg("-productVersion")
        .output()
        .ok()
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .filter(|v| !v.is_empty());
    match product {
        Some(v) => format!("macOS {}", v),
        None => format!("macOS (Darwin {})", unix_release()),
    }
}

#[cfg(unix)]
fn unix_release() -> String {
    match nix::sys::utsname::uname() {
        Ok(uts) => format!(
            "{} ({})",
            uts.release().to_string_lossy(),
            uts.version().to_string_lossy()
        ),
        Err(e) => {
            log::debug!("[platform] uname failed: {}", e);
            "unknown release".to_string()
        }
    }
}

#[cfg(not(unix))]
fn unix_release() -> String {
    "unknown release".to_string()
}

/// Read-only facts about the host, probed once at startup and passed to the
/// executor explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostContext {
    pub platform: PlatformInfo,
    pub elevated: bool,
}

impl HostContext {
    pub fn new(platform: PlatformInfo, elevated: bool) -> Self {
        Self { platform, elevated }
    }

    pub fn probe() -> Self {
        Self::new(detect(), privilege::is_elevated())
    }

    pub fn family(&self) -> OsFamily {
        self.platform.family
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_os_name() {
        assert_eq!(OsFamily::from_os_name("windows"), OsFamily::Windows);
        assert_eq!(OsFamily::from_os_name("Linux"), OsFamily::Linux);
        assert_eq!(OsFamily::from_os_name("darwin"), OsFamily::MacOs);
        assert_eq!(OsFamily::from_os_name("macos"), OsFamily::MacOs);
        assert_eq!(OsFamily::from_os_name("freebsd"), OsFamily::Unknown);
    }

    #[test]
    fn test_detect_is_idempotent() {
        let first = detect();
        let second = detect();
        assert_eq!(first, second);
        assert_eq!(first.family, OsFamily::current());
        assert!(!first.version.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_version_string() {
        let info = detect();
        assert_eq!(info.family, OsFamily::Linux);
        assert!(info.version.starts_with("Linux "));
    }

    #[test]
    fn test_host_context_probe() {
        let host = HostContext::probe();
        assert_eq!(host.family(), OsFamily::current());
        assert_eq!(host.elevated, privilege::is_elevated());
    }
}
