//! Mapping between catalog directories and endpoint identifiers.
//!
//! `endpoint_for` and `location_for` are exact inverses for every directory
//! discovery can visit. Clients build request URLs, discovery links and
//! breadcrumbs straight from the `endpoint` string, so both directions must
//! agree on separators and on the mount prefix.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Endpoint prefix identifying the catalog root, e.g. `/api`.
///
/// Stored without a trailing slash. The root mount is the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MountPoint(String);

impl MountPoint {
    pub fn new(raw: &str) -> Self {
        let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            Self(String::new())
        } else {
            Self(format!("/{}", segments.join("/")))
        }
    }

    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Endpoint for a sequence of directory names below the catalog root.
    pub fn join<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> String {
        let mut endpoint = self.0.clone();
        for segment in segments {
            endpoint.push('/');
            endpoint.push_str(segment);
        }
        if endpoint.is_empty() {
            endpoint.push('/');
        }
        endpoint
    }

    /// Segments of `endpoint` below this mount, or `None` if it lies elsewhere.
    pub fn strip<'a>(&self, endpoint: &'a str) -> Option<Vec<&'a str>> {
        let rest = if self.is_root() {
            endpoint.strip_prefix('/')?
        } else {
            let rest = endpoint.strip_prefix(self.0.as_str())?;
            if rest.is_empty() {
                return Some(Vec::new());
            }
            rest.strip_prefix('/')?
        };
        let rest = rest.strip_suffix('/').unwrap_or(rest);
        if rest.is_empty() {
            return Some(Vec::new());
        }
        Some(rest.split('/').collect())
    }
}

impl fmt::Display for MountPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("/")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for MountPoint {
    fn from(raw: &str) -> Self {
        MountPoint::new(raw)
    }
}

/// True for directory names discovery never inventories.
pub fn is_excluded(name: &str, descriptor_dir: &str) -> bool {
    name == descriptor_dir || name.starts_with('_') || name.starts_with('.')
}

/// Canonical endpoint for `location`, a directory at or below `root`.
pub fn endpoint_for(root: &Path, mount: &MountPoint, location: &Path) -> Option<String> {
    let relative = location.strip_prefix(root).ok()?;
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => segments.push(name.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(mount.join(segments))
}

/// Directory serving `endpoint`. Rejects anything discovery could not have
/// produced: foreign prefixes, traversal, hidden and reserved names.
pub fn location_for(
    root: &Path,
    mount: &MountPoint,
    endpoint: &str,
    descriptor_dir: &str,
) -> Option<PathBuf> {
    let segments = mount.strip(endpoint)?;
    let mut location = root.to_path_buf();
    for segment in segments {
        if segment.is_empty()
            || segment == "."
            || segment == ".."
            || segment.contains('\\')
            || is_excluded(segment, descriptor_dir)
        {
            return None;
        }
        location.push(segment);
    }
    Some(location)
}
