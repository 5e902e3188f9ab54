//! UAC elevation through `ShellExecuteExW` with the `runas` verb.
//!
//! The elevated `cmd.exe` runs detached in its own console: we learn whether
//! the launch was accepted, never the command's exit code.

use crate::elevation::ElevationResult;

/// Win32 ERROR_CANCELLED, returned when the operator dismisses the UAC prompt.
pub const ERROR_CANCELLED_CODE: i32 = 1223;

/// Parameters handed to `cmd.exe` for the elevated launch.
pub fn runas_parameters(command: &str) -> String {
    format!("/c \"{}\"", command)
}

/// Map the OS error of a failed launch onto an elevation result.
pub fn classify_launch_error(error: &std::io::Error) -> ElevationResult {
    if error.raw_os_error() == Some(ERROR_CANCELLED_CODE) {
        ElevationResult::Denied("the UAC prompt was declined".to_string())
    } else {
        ElevationResult::LaunchError(error.to_string())
    }
}

#[cfg(target_os = "windows")]
pub fn launch_elevated(command: &str) -> ElevationResult {
    use std::ffi::OsStr;
    use std::io;
    use std::iter::once;
    use std::mem;
    use std::os::windows::ffi::OsStrExt;
    use windows_sys::Win32::Foundation::CloseHandle;
    use windows_sys::Win32::UI::Shell::{
        ShellExecuteExW, SEE_MASK_NOCLOSEPROCESS, SHELLEXECUTEINFOW,
    };
    use windows_sys::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

    fn wide(s: &str) -> Vec<u16> {
        OsStr::new(s).encode_wide().chain(once(0)).collect()
    }

    let verb = wide("runas");
    let file = wide("cmd.exe");
    let parameters = wide(&runas_parameters(command));

    log::info!("[elevation] Requesting UAC elevation for: {}", command);

    unsafe {
        let mut info: SHELLEXECUTEINFOW = mem::zeroed();
        info.cbSize = mem::size_of::<SHELLEXECUTEINFOW>() as u32;
        info.fMask = SEE_MASK_NOCLOSEPROCESS;
        info.lpVerb = verb.as_ptr();
        info.lpFile = file.as_ptr();
        info.lpParameters = parameters.as_ptr();
        info.nShow = SW_SHOWNORMAL;

        if ShellExecuteExW(&mut info) == 0 {
            let error = io::Error::last_os_error();
            let result = classify_launch_error(&error);
            match &result {
                ElevationResult::Denied(_) => {
                    log::warn!("[elevation] UAC prompt declined for: {}", command)
                }
                _ => log::error!("[elevation] Elevated launch failed: {}", error),
            }
            return result;
        }

        if !info.hProcess.is_null() {
            CloseHandle(info.hProcess);
        }
    }

    log::info!("[elevation] Elevated process launched: {}", command);
    ElevationResult::LaunchedDetached
}

#[cfg(not(target_os = "windows"))]
pub fn launch_elevated(command: &str) -> ElevationResult {
    let _ = command;
    ElevationResult::LaunchError("UAC elevation is only available on Windows".to_string())
}
