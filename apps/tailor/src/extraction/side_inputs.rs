//! Plain-text side inputs: the job description and optional extra details.

use std::io;
use std::path::Path;

use tracing::{info, warn};

/// Reads a text file as UTF-8, falling back to Latin-1 (which accepts every
/// byte) when the contents are not valid UTF-8.
pub fn read_text_with_fallback(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(decode_with_fallback(bytes, path))
}

/// Reads an optional side input. A missing or unreadable file is treated as
/// empty.
pub fn read_optional(path: &Path) -> String {
    if !path.exists() {
        return String::new();
    }
    match read_text_with_fallback(path) {
        Ok(text) => {
            info!(
                "Found additional details file {}; it will be incorporated into the resume",
                path.display()
            );
            text
        }
        Err(e) => {
            warn!("Ignoring unreadable details file {}: {e}", path.display());
            String::new()
        }
    }
}

fn decode_with_fallback(bytes: Vec<u8>, path: &Path) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            info!("{} is not valid UTF-8; reading it as Latin-1", path.display());
            e.into_bytes().into_iter().map(char::from).collect()
        }
    }
}
