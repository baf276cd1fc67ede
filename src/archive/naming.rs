//! Archive naming and delivery.
//!
//! The conversation title names both the folder inside the archive and the
//! archive file itself. Titles are free text (group names, emoji, slashes),
//! so they are made filesystem-safe first.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use deunicode::deunicode;
use tracing::warn;

/// Name used when a title sanitizes to nothing.
pub const FALLBACK_TITLE: &str = "conversation";

/// Longest sanitized title, leaving room for `-NN.zip`.
const MAX_TITLE_LENGTH: usize = 120;

const INVALID_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

const WINDOWS_RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Make a conversation title safe to use as a file or folder name.
///
/// Transliterates to ASCII, drops characters that are invalid on common
/// filesystems and control characters, collapses whitespace runs to one
/// space, trims dots and spaces from the edges, and escapes Windows device
/// names. An empty result becomes [`FALLBACK_TITLE`].
pub fn sanitize_title(title: &str) -> String {
    let ascii = deunicode(title);

    let mut name = String::with_capacity(ascii.len());
    for c in ascii.chars() {
        if c.is_whitespace() {
            if !name.ends_with(' ') {
                name.push(' ');
            }
        } else if !INVALID_CHARS.contains(&c) && !c.is_control() {
            name.push(c);
        }
    }

    let mut name: String = name
        .trim_matches(|c| c == '.' || c == ' ')
        .chars()
        .take(MAX_TITLE_LENGTH)
        .collect();
    // Truncation may expose a trailing space or dot again
    name = name.trim_end_matches(['.', ' ']).to_string();

    if name.is_empty() {
        return FALLBACK_TITLE.to_string();
    }

    let stem = name.split('.').next().unwrap_or_default();
    if WINDOWS_RESERVED
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(stem))
    {
        name.insert(0, '_');
    }
    name
}

/// Write `bytes` as `<sanitized title>.zip` inside `dir`.
///
/// Never overwrites: when the name is taken, `<title>-2.zip`, `<title>-3.zip`
/// and so on are tried in turn. Creates `dir` if needed and returns the path
/// that was written.
pub fn deliver(dir: &Path, title: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let stem = sanitize_title(title);

    let mut attempt = 1u32;
    loop {
        let file_name = if attempt == 1 {
            format!("{}.zip", stem)
        } else {
            format!("{}-{}.zip", stem, attempt)
        };
        let path = dir.join(file_name);

        // create_new makes the existence check and the create one step
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                write_fresh(file, &path, bytes)?;
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}

/// Write `bytes` to a file just created at `path`, removing it on failure.
fn write_fresh(mut file: impl Write, path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Err(e) = file.write_all(bytes).and_then(|()| file.flush()) {
        drop(file);
        if let Err(remove_err) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %remove_err, "failed to remove partial archive");
        }
        return Err(e);
    }
    Ok(())
}
