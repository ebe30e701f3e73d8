use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::coerce;
use crate::host::HostLimits;

pub const MAX_FILES_FLOOR: u64 = 500;
pub const MAX_FILES_CEILING: u64 = 200_000;

const DEFAULT_MAX_FILES_MIN: u64 = 10_000;
const DEFAULT_MAX_FILES_MAX: u64 = 100_000;
const FILES_PER_CEILING_SECOND: u64 = 1_000;

const MIB: u64 = 1024 * 1024;
const DEFAULT_MAX_FILE_SIZE: u64 = 5 * MIB;
const MIN_FILE_SIZE: u64 = 1024;
const MAX_FILE_SIZE: u64 = 512 * MIB;

const DEFAULT_CHUNK_SIZE: u64 = 100;
const MAX_CHUNK_SIZE: u64 = 10_000;

/// Scan intensity selected by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    #[default]
    Standard,
    Aggressive,
}

impl ScanMode {
    const ALLOWED: [&'static str; 2] = ["standard", "aggressive"];

    fn from_choice(choice: &str) -> Self {
        match choice {
            "aggressive" => ScanMode::Aggressive,
            _ => ScanMode::Standard,
        }
    }
}

/// Bounded configuration for one discovery run.
///
/// Always built through [`PolicyConfig::defaults`] or [`PolicyConfig::merge`],
/// so every field is within its documented range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub enabled: bool,
    pub max_files: u64,
    pub max_file_size_bytes: u64,
    /// Advisory batch size for consumers of the discovered file list.
    pub chunk_size: u64,
    pub forbidden_path_prefixes: Vec<String>,
    pub exception_subtree_markers: Vec<String>,
    pub exception_allowed_subpaths: Vec<String>,
    /// Lowercased substrings naming our own install, backup and quarantine directories.
    pub self_exclusion_markers: Vec<String>,
    pub aggressive_mode: bool,
    pub execution_time_ceiling: Duration,
}

impl PolicyConfig {
    /// Defaults scaled to the host: a longer execution ceiling allows more files.
    pub fn defaults(host: &HostLimits) -> Self {
        Self {
            enabled: true,
            max_files: default_max_files(host),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            forbidden_path_prefixes: default_forbidden_prefixes(),
            exception_subtree_markers: vec!["/.cagefs/".into(), "/virtfs/".into()],
            exception_allowed_subpaths: vec![
                "/.cagefs/tmp/".into(),
                "/.cagefs/var/tmp/".into(),
                "/virtfs/tmp/".into(),
            ],
            self_exclusion_markers: vec![
                "warden-quarantine".into(),
                "warden-backups".into(),
                ".warden".into(),
            ],
            aggressive_mode: false,
            execution_time_ceiling: host.execution_time_ceiling,
        }
    }

    /// Normalise raw operator settings on top of the defaults.
    ///
    /// Never fails: absent keys keep their default, unusable values are
    /// dropped, numbers are clamped and unknown keys are ignored.
    pub fn merge(host: &HostLimits, settings: &Map<String, Value>) -> Self {
        let mut policy = Self::defaults(host);

        if let Some(v) = settings.get("enabled").and_then(coerce::to_bool) {
            policy.enabled = v;
        }

        let mode = settings
            .get("scan_mode")
            .and_then(|v| coerce::to_choice(v, &ScanMode::ALLOWED))
            .map(ScanMode::from_choice)
            .unwrap_or_default();
        policy.aggressive_mode = mode == ScanMode::Aggressive;
        if let Some(v) = settings.get("aggressive_mode").and_then(coerce::to_bool) {
            policy.aggressive_mode = v;
        }

        if let Some(v) = settings
            .get("max_files")
            .and_then(|v| coerce::clamp_u64(v, MAX_FILES_FLOOR, MAX_FILES_CEILING))
        {
            policy.max_files = v;
        }

        let size_bytes = settings
            .get("max_file_size_bytes")
            .and_then(coerce::to_u64)
            .or_else(|| {
                settings
                    .get("max_file_size_mb")
                    .and_then(coerce::to_u64)
                    .map(|mb| mb.saturating_mul(MIB))
            });
        if let Some(v) = size_bytes {
            policy.max_file_size_bytes = v.clamp(MIN_FILE_SIZE, MAX_FILE_SIZE);
        }

        if let Some(v) = settings
            .get("chunk_size")
            .and_then(|v| coerce::clamp_u64(v, 1, MAX_CHUNK_SIZE))
        {
            policy.chunk_size = v;
        }

        if let Some(extra) = settings.get("forbidden_paths").and_then(coerce::to_string_list) {
            for path in extra {
                if !path.starts_with('/') {
                    tracing::debug!("Ignoring relative forbidden path: {}", path);
                    continue;
                }
                push_unique(&mut policy.forbidden_path_prefixes, path);
            }
        }

        if let Some(list) = settings
            .get("exception_allowed_subpaths")
            .and_then(coerce::to_string_list)
            .filter(|l| !l.is_empty())
        {
            policy.exception_allowed_subpaths = list;
        }

        if let Some(extra) = settings
            .get("self_exclusion_markers")
            .and_then(coerce::to_string_list)
        {
            for marker in extra {
                push_unique(&mut policy.self_exclusion_markers, marker.to_lowercase());
            }
        }

        policy
    }

    pub fn scan_mode(&self) -> ScanMode {
        if self.aggressive_mode {
            ScanMode::Aggressive
        } else {
            ScanMode::Standard
        }
    }

    pub fn chunk_size(&self) -> usize {
        usize::try_from(self.chunk_size).unwrap_or(usize::MAX)
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::defaults(&HostLimits::default())
    }
}

fn default_max_files(host: &HostLimits) -> u64 {
    if host.is_unlimited() {
        return DEFAULT_MAX_FILES_MAX;
    }
    host.execution_time_ceiling
        .as_secs()
        .saturating_mul(FILES_PER_CEILING_SECOND)
        .clamp(DEFAULT_MAX_FILES_MIN, DEFAULT_MAX_FILES_MAX)
}

fn default_forbidden_prefixes() -> Vec<String> {
    [
        "/proc", "/sys", "/dev", "/etc", "/boot", "/root", "/bin", "/sbin", "/lib", "/lib64",
        "/usr", "/run", "/var/lib", "/var/run", "/var/spool",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}
