//! Offline audit of every descriptor file under a catalog root.
//!
//! Discovery tolerates broken descriptors by skipping them; this pass is where
//! they get reported. Unlike discovery it also descends into hidden and
//! underscore directories so descriptors that can never be served show up.

use super::loader::MetadataLoader;
use super::path::{endpoint_for, is_excluded};
use crate::config::CatalogConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    Malformed { path: PathBuf, reason: String },
    /// The descriptor sits below a directory discovery never visits.
    Unreachable { path: PathBuf },
    DuplicateEndpoint { endpoint: String, paths: Vec<PathBuf> },
    /// The declared endpoint is not the one its directory maps to, so
    /// per-endpoint retrieval cannot resolve it.
    EndpointMismatch {
        path: PathBuf,
        declared: String,
        mapped: String,
    },
}

impl Finding {
    pub fn is_error(&self) -> bool {
        !matches!(self, Finding::Unreachable { .. })
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Finding::Malformed { path, reason } => {
                write!(f, "malformed: {} ({})", path.display(), reason)
            }
            Finding::Unreachable { path } => write!(f, "unreachable: {}", path.display()),
            Finding::DuplicateEndpoint { endpoint, paths } => {
                let paths: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
                write!(f, "duplicate endpoint {}: {}", endpoint, paths.join(", "))
            }
            Finding::EndpointMismatch {
                path,
                declared,
                mapped,
            } => write!(
                f,
                "endpoint mismatch: {} declares {} but is served at {}",
                path.display(),
                declared,
                mapped
            ),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct CheckReport {
    /// Descriptor files found, reachable or not.
    pub total: usize,
    /// Reachable descriptors that parsed.
    pub valid: usize,
    pub findings: Vec<Finding>,
}

impl CheckReport {
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(Finding::is_error)
    }
}

pub fn check_catalog(config: Arc<CatalogConfig>) -> CheckReport {
    let loader = MetadataLoader::new(config.clone());
    let mut report = CheckReport::default();
    let mut endpoints: HashMap<String, Vec<PathBuf>> = HashMap::new();

    let descriptors = WalkDir::new(&config.root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_descriptor(entry.path(), &config));

    for entry in descriptors {
        report.total += 1;
        let path = entry.path();
        let Some(location) = path.parent().and_then(Path::parent) else {
            continue;
        };

        if !is_reachable(&config, location) {
            report.findings.push(Finding::Unreachable {
                path: path.to_path_buf(),
            });
            continue;
        }

        let parsed = std::fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| {
                loader
                    .parse(&bytes, location, path)
                    .map_err(|e| e.to_string())
            });
        match parsed {
            Ok(api) => {
                report.valid += 1;
                if let Some(mapped) = endpoint_for(&config.root, &config.mount, location) {
                    if mapped != api.endpoint {
                        report.findings.push(Finding::EndpointMismatch {
                            path: path.to_path_buf(),
                            declared: api.endpoint.clone(),
                            mapped,
                        });
                    }
                }
                endpoints
                    .entry(api.endpoint)
                    .or_default()
                    .push(path.to_path_buf());
            }
            Err(reason) => report.findings.push(Finding::Malformed {
                path: path.to_path_buf(),
                reason,
            }),
        }
    }

    let mut duplicates: Vec<_> = endpoints
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .collect();
    duplicates.sort_by(|a, b| a.0.cmp(&b.0));
    report.findings.extend(
        duplicates
            .into_iter()
            .map(|(endpoint, paths)| Finding::DuplicateEndpoint { endpoint, paths }),
    );

    info!(
        "Checked {} descriptors: {} valid, {} findings",
        report.total,
        report.valid,
        report.findings.len()
    );
    report
}

fn is_descriptor(path: &Path, config: &CatalogConfig) -> bool {
    let file_matches =
        path.file_name().and_then(|n| n.to_str()) == Some(config.descriptor_file.as_str());
    let dir_matches = path
        .parent()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        == Some(config.descriptor_dir.as_str());
    file_matches && dir_matches
}

fn is_reachable(config: &CatalogConfig, location: &Path) -> bool {
    let Ok(relative) = location.strip_prefix(&config.root) else {
        return false;
    };
    relative.components().all(|component| {
        component
            .as_os_str()
            .to_str()
            .is_some_and(|name| !is_excluded(name, &config.descriptor_dir))
    })
}
