//! Mapping location strings to local files.
//!
//! Locations are plain filesystem paths or `file://` URIs. A dataset location may also be a
//! directory or a glob pattern, which [`expand_location`] turns into the list of files a loader
//! is invoked on.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use url::Url;
use walkdir::WalkDir;

use crate::error::{IngestionError, IngestionResult};

/// Resolve a single location string to a local path.
///
/// `file://` URIs are converted to paths. Strings that parse as a URL with any other scheme
/// (`s3://`, `https://`, ...) are rejected with [`IngestionError::UnreadableLocation`].
/// One-letter schemes are treated as Windows drive letters.
pub fn resolve_location(location: &str) -> IngestionResult<PathBuf> {
    match Url::parse(location) {
        Ok(url) if url.scheme() == "file" => {
            url.to_file_path()
                .map_err(|()| IngestionError::UnreadableLocation {
                    location: location.to_owned(),
                    reason: "file URI does not map to a local path".to_string(),
                })
        }
        Ok(url) if url.scheme().len() > 1 => Err(IngestionError::UnreadableLocation {
            location: location.to_owned(),
            reason: format!("unsupported URI scheme '{}'", url.scheme()),
        }),
        _ => Ok(PathBuf::from(location)),
    }
}

/// Open a resolved location for reading.
///
/// A missing file is reported as [`IngestionError::NotFound`] carrying the original location
/// string; other I/O failures pass through as [`IngestionError::Io`]. The returned handle is
/// owned by the caller and closed when dropped.
pub fn open_location(path: &Path, location: &str) -> IngestionResult<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => IngestionError::NotFound {
            location: location.to_owned(),
        },
        _ => IngestionError::Io(e),
    })
}

/// Expand a dataset location into the files it names, sorted by path.
///
/// - an existing directory expands recursively to its regular files, skipping hidden entries
/// - an existing file expands to itself
/// - otherwise a glob pattern (`data/*.csv`) expands to every matching regular file
///
/// Existing paths win over glob interpretation, so `run[1]/` is a directory, not a pattern.
/// An expansion that yields no files fails with [`IngestionError::NotFound`].
pub fn expand_location(location: &str) -> IngestionResult<Vec<PathBuf>> {
    let resolved = resolve_location(location)?;

    let mut files = if resolved.is_dir() {
        expand_dir(&resolved)?
    } else if resolved.is_file() {
        vec![resolved]
    } else if is_glob_pattern(&resolved.to_string_lossy()) {
        expand_glob(&resolved.to_string_lossy(), location)?
    } else {
        return Err(IngestionError::NotFound {
            location: location.to_owned(),
        });
    };

    if files.is_empty() {
        return Err(IngestionError::NotFound {
            location: location.to_owned(),
        });
    }

    files.sort();
    debug!(location, files = files.len(), "expanded dataset location");
    Ok(files)
}

fn is_glob_pattern(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

fn expand_glob(pattern: &str, location: &str) -> IngestionResult<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|e| IngestionError::UnreadableLocation {
        location: location.to_owned(),
        reason: format!("invalid glob pattern: {e}"),
    })?;

    let mut out = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| IngestionError::Io(e.into_error()))?;
        if path.is_file() {
            trace!(path = %path.display(), "glob match");
            out.push(path);
        }
    }
    Ok(out)
}

fn expand_dir(dir: &Path) -> IngestionResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
    for entry in walker {
        let entry = entry.map_err(|e| IngestionError::Io(io::Error::other(e)))?;
        if entry.file_type().is_file() {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.') || s.starts_with('_'))
}
