//! Path and formatting utilities

use humansize::{BINARY, format_size};
use log::warn;
use std::path::{Component, Path, PathBuf};

/// Human-readable byte count (binary units), e.g. `1.5 MiB`.
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, BINARY)
}

/// Absolute, lexically cleaned directory containing `path`. Symlinks are not resolved.
/// Falls back to the cleaned parent (and warns) when resolution fails; never fails the record.
pub fn containing_dir(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match std::path::absolute(parent) {
        Ok(abs) => normalize_lexically(&abs),
        Err(e) => {
            warn!(
                "Failed to get absolute path for {}: {}",
                parent.display(),
                e
            );
            normalize_lexically(parent)
        }
    }
}

/// Drop `.` and fold `..` into the preceding component without touching the filesystem.
/// `..` at the root stays at the root; leading `..` of a relative path is kept.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(comp),
            },
            _ => out.push(comp),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Final path component as a string (lossy for non-UTF-8 names).
pub fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
