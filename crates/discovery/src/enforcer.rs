//! Boundary checks applied to every directory entry.
//!
//! [`classify`] is a pure function of the probed [`Candidate`], the current
//! checkpoint (which fixes the home and protected roots) and the policy. The
//! rules run in a fixed order and the first match wins.

use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use warden_policy::PolicyConfig;
use warden_state::DiscoveryState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    /// A symlink whose target is a directory.
    SymlinkedDirectory,
    /// Sockets, fifos, devices and anything else that is neither file nor directory.
    Special,
}

/// Facts about one directory entry, gathered before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Path as reached through the walk.
    pub path: PathBuf,
    /// Fully resolved path, `None` when the entry could not be resolved.
    pub canonical: Option<PathBuf>,
    pub kind: EntryKind,
    pub size: u64,
    pub readable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Unresolvable,
    OutsideHome,
    ProtectedRoot,
    SymlinkedDirectory,
    Forbidden,
    ExceptionSubtree,
    SelfExclusion,
    Unreadable,
    Oversized,
    SpecialFile,
}

impl SkipReason {
    /// The protected root and oversized files are expected boundaries, not anomalies.
    pub fn counts_as_anomaly(self) -> bool {
        !matches!(self, SkipReason::ProtectedRoot | SkipReason::Oversized)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Descend,
    Collect,
    Skip(SkipReason),
}

pub fn classify(candidate: &Candidate, state: &DiscoveryState, policy: &PolicyConfig) -> Verdict {
    let Some(canonical) = candidate.canonical.as_deref() else {
        return Verdict::Skip(SkipReason::Unresolvable);
    };
    let is_dir = matches!(
        candidate.kind,
        EntryKind::Directory | EntryKind::SymlinkedDirectory
    );
    let canonical_str = match_string(canonical, is_dir);

    if !canonical.starts_with(Path::new(&state.home_root)) {
        return Verdict::Skip(SkipReason::OutsideHome);
    }

    if canonical.starts_with(Path::new(&state.protected_root)) {
        return Verdict::Skip(SkipReason::ProtectedRoot);
    }

    if candidate.kind == EntryKind::SymlinkedDirectory {
        let logical = match_string(&candidate.path, true);
        let caged = policy
            .exception_subtree_markers
            .iter()
            .any(|m| logical.contains(m.as_str()));
        if !caged {
            return Verdict::Skip(SkipReason::SymlinkedDirectory);
        }
    }

    if policy
        .forbidden_path_prefixes
        .iter()
        .any(|prefix| canonical.starts_with(Path::new(prefix)))
    {
        return Verdict::Skip(SkipReason::Forbidden);
    }

    if !exception_subtree_permits(&canonical_str, is_dir, policy) {
        return Verdict::Skip(SkipReason::ExceptionSubtree);
    }

    let lowered = canonical_str.to_lowercase();
    if policy
        .self_exclusion_markers
        .iter()
        .any(|m| lowered.contains(&m.to_lowercase()))
    {
        return Verdict::Skip(SkipReason::SelfExclusion);
    }

    match candidate.kind {
        EntryKind::Directory | EntryKind::SymlinkedDirectory => Verdict::Descend,
        EntryKind::File if !candidate.readable => Verdict::Skip(SkipReason::Unreadable),
        EntryKind::File if candidate.size > policy.max_file_size_bytes => {
            Verdict::Skip(SkipReason::Oversized)
        }
        EntryKind::File => Verdict::Collect,
        EntryKind::Special => Verdict::Skip(SkipReason::SpecialFile),
    }
}

/// Inside a marked subtree only allow-listed sub-paths are accepted.
///
/// Directories that lie on the way to an allow-listed sub-path are let
/// through so the walk can reach it; files must sit inside one.
fn exception_subtree_permits(canonical: &str, is_dir: bool, policy: &PolicyConfig) -> bool {
    let Some(start) = policy
        .exception_subtree_markers
        .iter()
        .filter_map(|m| canonical.find(m.as_str()))
        .min()
    else {
        return true;
    };

    let tail = &canonical[start..];
    policy.exception_allowed_subpaths.iter().any(|allowed| {
        canonical.contains(allowed.as_str()) || (is_dir && allowed.starts_with(tail))
    })
}

/// Lossy string form used for substring rules; directories get a trailing separator.
fn match_string(path: &Path, is_dir: bool) -> String {
    let mut s = path.to_string_lossy().into_owned();
    if is_dir && !s.ends_with(MAIN_SEPARATOR) {
        s.push(MAIN_SEPARATOR);
    }
    s
}
