//! Where masked documents come from.
//!
//! A source string is a filesystem path, `-` for stdin, or an `http(s)://`
//! URL. URLs are fetched only with the `remote` feature; without it they are
//! treated as paths and fail as missing files.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde_json::Value;

use crate::error::LoadError;

/// Source name that reads the document from stdin.
pub const STDIN_SOURCE: &str = "-";

#[cfg(feature = "remote")]
const FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Parse an in-memory document.
///
/// # Errors
///
/// `LoadError::InvalidJson` when `text` is not JSON.
pub fn load_json_str(text: &str) -> Result<Value, LoadError> {
    serde_json::from_str(text).map_err(|source| LoadError::InvalidJson { source })
}

/// Read and parse the document at `path`; `-` means stdin.
///
/// # Errors
///
/// `FileNotFound` for a missing path, `ReadError` for any other I/O failure,
/// `InvalidJson` when the contents do not parse.
pub fn load_json(path: &Path) -> Result<Value, LoadError> {
    let text = read_text(path)?;
    load_json_str(&text)
}

fn read_text(path: &Path) -> Result<String, LoadError> {
    let mut text = String::new();
    let read = if path == Path::new(STDIN_SOURCE) {
        io::stdin().read_to_string(&mut text)
    } else {
        File::open(path).and_then(|mut file| file.read_to_string(&mut text))
    };

    match read {
        Ok(_) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(LoadError::ReadError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Fetch a document over HTTP, failing on non-2xx responses.
///
/// # Errors
///
/// `LoadError::NetworkError` for transport failures, error statuses and
/// bodies that are not JSON.
#[cfg(feature = "remote")]
pub fn load_json_url(url: &str) -> Result<Value, LoadError> {
    let fetch = || -> reqwest::Result<Value> {
        reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()?
            .get(url)
            .send()?
            .error_for_status()?
            .json()
    };

    fetch().map_err(|source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    })
}

/// Whether `source` names an `http://` or `https://` resource.
pub fn is_remote(source: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| source.starts_with(scheme))
}

/// Load from whichever kind of source `source` names.
///
/// # Errors
///
/// Any `LoadError` from the underlying loader.
pub fn load_json_auto(source: &str) -> Result<Value, LoadError> {
    #[cfg(feature = "remote")]
    if is_remote(source) {
        return load_json_url(source);
    }

    load_json(Path::new(source))
}
