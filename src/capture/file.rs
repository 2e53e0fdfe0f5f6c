//! File naming for screenshots.

use super::types::CaptureError;
use chrono::NaiveDateTime;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// chrono format of the optional file name prefix.
pub const TIMESTAMP_FORMAT: &str = "%Y_%m_%d__%H_%M_%S__";

const MAX_FILENAME_LEN: usize = 255;
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Platform screenshot directory: `<Pictures>/Screenshots`, or `./Screenshots`
/// when the pictures directory is unknown.
pub fn default_screenshot_dir() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Screenshots")
}

/// Checks that `filename` can be used as a file name on every supported platform.
///
/// Path separators are illegal, so a name such as `../evil` is rejected here
/// rather than silently reduced to `evil`.
pub fn validate_filename(filename: &str) -> Result<(), CaptureError> {
    let invalid = |reason: String| Err(CaptureError::InvalidFilename(reason));

    if filename.trim().is_empty() {
        return invalid("filename is empty".to_string());
    }
    if filename.len() > MAX_FILENAME_LEN {
        return invalid(format!(
            "filename is longer than {MAX_FILENAME_LEN} bytes"
        ));
    }
    if let Some(c) = filename
        .chars()
        .find(|c| INVALID_CHARS.contains(c) || c.is_control())
    {
        return invalid(format!("'{}' contains illegal character {c:?}", filename));
    }
    if filename.chars().all(|c| c == '.') {
        return invalid(format!("'{filename}' is not a file name"));
    }
    if filename.ends_with('.') || filename.ends_with(' ') {
        return invalid(format!("'{filename}' ends with a dot or space"));
    }

    let stem = filename.split('.').next().unwrap_or(filename);
    if RESERVED_NAMES
        .iter()
        .any(|reserved| stem.eq_ignore_ascii_case(reserved))
    {
        return invalid(format!("'{filename}' is a reserved device name"));
    }

    Ok(())
}

/// Strips any directory and extension from `filename`.
pub fn base_filename(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    match name.rfind('.') {
        Some(0) | None => name.to_string(),
        Some(dot) => name[..dot].to_string(),
    }
}

/// Builds `<directory>/[<timestamp>]<base>`, without extension.
pub fn screenshot_path(directory: &Path, base: &str, timestamp: Option<NaiveDateTime>) -> PathBuf {
    let filename = match timestamp {
        Some(time) => format!("{}{}", time.format(TIMESTAMP_FORMAT), base),
        None => base.to_string(),
    };
    directory.join(filename)
}

/// Appends `.ext` to `path`, keeping any dots already in the file name.
pub fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut raw = OsString::from(path.as_os_str());
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}

/// Expand tilde (~) in path strings.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}
