//! Privilege introspection for the current process.
//! Any failure to inspect is treated as "not elevated" so a needed elevation
//! attempt is never skipped.

use std::io;

pub type PrivResult<T> = Result<T, PrivilegeError>;

#[derive(Debug, thiserror::Error)]
pub enum PrivilegeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Privilege checks not supported on this OS")]
    Unsupported,
}

/// Query the process token's elevation state.
#[cfg(target_os = "windows")]
pub fn check_elevated() -> PrivResult<bool> {
    use std::mem;
    use windows_sys::Win32::Foundation::{CloseHandle, HANDLE};
    use windows_sys::Win32::Security::{
        GetTokenInformation, TokenElevation, TOKEN_ELEVATION, TOKEN_QUERY,
    };
    use windows_sys::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

    unsafe {
        let mut token: HANDLE = std::ptr::null_mut();

        if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token) == 0 {
            return Err(PrivilegeError::Io(io::Error::last_os_error()));
        }

        let mut elevation: TOKEN_ELEVATION = mem::zeroed();
        let mut return_length = 0u32;

        let result = GetTokenInformation(
            token,
            TokenElevation,
            &mut elevation as *mut _ as *mut _,
            mem::size_of::<TOKEN_ELEVATION>() as u32,
            &mut return_length,
        );

        CloseHandle(token);

        if result == 0 {
            return Err(PrivilegeError::Io(io::Error::last_os_error()));
        }

        Ok(elevation.TokenIsElevated != 0)
    }
}

/// Effective user id is root (0).
#[cfg(unix)]
pub fn check_elevated() -> PrivResult<bool> {
    use nix::unistd::Uid;

    Ok(Uid::effective().is_root())
}

#[cfg(not(any(target_os = "windows", unix)))]
pub fn check_elevated() -> PrivResult<bool> {
    Err(PrivilegeError::Unsupported)
}

/// Current privilege state, failing safe to `false`.
pub fn is_elevated() -> bool {
    match check_elevated() {
        Ok(elevated) => elevated,
        Err(e) => {
            log::warn!("[privilege] Could not determine privilege level, assuming standard user: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_elevated_returns_result() {
        let result = check_elevated();
        #[cfg(any(target_os = "windows", unix))]
        assert!(result.is_ok());
        #[cfg(not(any(target_os = "windows", unix)))]
        assert!(result.is_err());
    }

    #[test]
    fn test_is_elevated_matches_check() {
        let expected = check_elevated().unwrap_or(false);
        assert_eq!(is_elevated(), expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_elevation_follows_euid() {
        assert_eq!(is_elevated(), nix::unistd::geteuid().is_root());
    }
}
