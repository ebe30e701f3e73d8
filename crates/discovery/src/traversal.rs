//! Explicit-stack depth-first walk over the checkpointed frontier.
//!
//! The whole frontier lives in [`DiscoveryState::stack`], so stopping at any
//! check point and saving the state loses nothing. A directory is only
//! dropped from the stack once its listing has been fully processed; if a
//! listing is interrupted the directory goes back on top and is re-listed on
//! resume, with `seen` filtering out what was already handled.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use warden_policy::PolicyConfig;
use warden_state::DiscoveryState;

use crate::enforcer::{classify, Candidate, EntryKind, SkipReason, Verdict};
use crate::governor::Budget;
use crate::liveness::Liveness;
use crate::probe::{check_readable, dir_key, inspect, path_key, probe};
use crate::status::StatusBoard;

/// Collected files between mid-directory check points.
pub const BATCH_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YieldReason {
    TimeBudget,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    Yielded(YieldReason),
    Completed,
}

enum Drain {
    Finished,
    Interrupted(YieldReason),
    LimitReached,
}

/// Start a discovery phase: fix the roots and seed the stack.
///
/// The home root goes on the stack first; existing priority sub-paths are
/// pushed above it in reverse so the first one listed is visited first.
pub fn seed(
    state: &mut DiscoveryState,
    home_root: &Path,
    protected_root: &Path,
    priority: &[String],
    policy: &PolicyConfig,
) {
    state.begin(path_key(home_root), path_key(protected_root));
    state.seen.insert(path_key(home_root));
    state.stack.push(dir_key(home_root));

    let mut pushed = Vec::new();
    for rel in priority.iter().rev() {
        // A trailing separator would make lstat see through a symlinked directory.
        let trimmed = rel.trim_end_matches('/');
        if trimmed.is_empty() {
            continue;
        }
        let path = home_root.join(trimmed);
        if fs::symlink_metadata(&path).is_err() {
            continue;
        }

        let candidate = probe(&path);
        if classify(&candidate, state, policy) != Verdict::Descend {
            continue;
        }
        let Some(canonical) = candidate.canonical.as_deref() else {
            continue;
        };
        if state.seen.insert(path_key(canonical)) {
            state.stack.push(dir_key(canonical));
            pushed.push(rel.as_str());
        }
    }

    tracing::info!(
        "Discovery started under {} (excluding {}), priority dirs: {:?}",
        state.home_root,
        state.protected_root,
        pushed.iter().rev().collect::<Vec<_>>()
    );
}

pub struct Walker<'a> {
    state: &'a mut DiscoveryState,
    policy: &'a PolicyConfig,
    status: &'a StatusBoard,
}

impl<'a> Walker<'a> {
    pub fn new(
        state: &'a mut DiscoveryState,
        policy: &'a PolicyConfig,
        status: &'a StatusBoard,
    ) -> Self {
        Self {
            state,
            policy,
            status,
        }
    }

    /// Walk until the stack empties, the budget runs out or the caller cancels.
    pub fn run(&mut self, budget: &mut dyn Budget, liveness: &dyn Liveness) -> WalkOutcome {
        if self.limit_reached() {
            self.truncate();
            return WalkOutcome::Completed;
        }

        while let Some(dir) = self.state.stack.last().cloned() {
            if !liveness.is_still_running() {
                return WalkOutcome::Yielded(YieldReason::Cancelled);
            }
            if budget.exhausted() {
                return WalkOutcome::Yielded(YieldReason::TimeBudget);
            }

            self.state.stack.pop();
            match self.drain(&dir, budget, liveness) {
                Drain::Finished => {}
                Drain::Interrupted(reason) => return WalkOutcome::Yielded(reason),
                Drain::LimitReached => {
                    self.truncate();
                    return WalkOutcome::Completed;
                }
            }
        }

        self.state.complete();
        tracing::info!(
            "Discovery complete: {} files, {} skipped",
            self.state.collected_files.len(),
            self.state.skipped_count
        );
        WalkOutcome::Completed
    }

    /// Process every entry of one directory.
    ///
    /// Files are collected in listing order; subdirectories are pushed in
    /// reverse so that stack pops visit them in listing order. Subdirectories
    /// only enter `seen` once pushed, so an interrupted listing drops them and
    /// the re-listing pushes the full set in one go.
    fn drain(&mut self, dir: &str, budget: &mut dyn Budget, liveness: &dyn Liveness) -> Drain {
        let dir_path = Path::new(dir);
        let names = match list_names(dir_path) {
            Ok(names) => names,
            Err(e) => {
                tracing::debug!("Failed to list {}: {}", dir, e);
                self.state.skipped_count += 1;
                return Drain::Finished;
            }
        };

        let mut descend = Vec::new();
        let mut listed = HashSet::new();
        let mut since_check = 0usize;

        for name in names {
            let Some(candidate) = self.examine(&dir_path.join(&name)) else {
                continue;
            };
            let verdict = classify(&candidate, self.state, self.policy);
            let key = seen_key(&candidate, verdict);

            let fresh = if verdict == Verdict::Descend {
                !self.state.seen.contains(&key) && listed.insert(key)
            } else {
                self.state.seen.insert(key)
            };
            if !fresh {
                continue;
            }

            match (verdict, candidate.canonical) {
                (Verdict::Descend, Some(canonical)) => descend.push(canonical),
                (Verdict::Collect, Some(canonical)) => {
                    self.state.collected_files.push(path_key(&canonical));
                    if self.limit_reached() {
                        return Drain::LimitReached;
                    }

                    since_check += 1;
                    if since_check >= BATCH_SIZE {
                        since_check = 0;
                        self.status.publish(self.state);
                        let interrupted = if !liveness.is_still_running() {
                            Some(YieldReason::Cancelled)
                        } else if budget.exhausted() {
                            Some(YieldReason::TimeBudget)
                        } else {
                            None
                        };
                        if let Some(reason) = interrupted {
                            self.state.stack.push(dir.to_string());
                            return Drain::Interrupted(reason);
                        }
                    }
                }
                (Verdict::Skip(reason), _) => self.record_skip(&candidate.path, reason),
                (_, None) => self.record_skip(&candidate.path, SkipReason::Unresolvable),
            }
        }

        self.push_dirs(descend);
        Drain::Finished
    }

    /// Probe an entry unless it was already handled, opening files last.
    ///
    /// Stack directories are canonical, so a plain entry's own path is its
    /// canonical key and a refused symlink is keyed by its own path too.
    fn examine(&self, path: &Path) -> Option<Candidate> {
        if self.state.seen.contains(&path_key(path)) {
            return None;
        }

        let mut candidate = inspect(path);
        if candidate.kind != EntryKind::SymlinkedDirectory {
            if let Some(canonical) = candidate.canonical.as_deref() {
                if self.state.seen.contains(&path_key(canonical)) {
                    return None;
                }
            }
        }

        check_readable(&mut candidate);
        Some(candidate)
    }

    fn push_dirs(&mut self, dirs: Vec<PathBuf>) {
        for dir in dirs.into_iter().rev() {
            self.state.seen.insert(path_key(&dir));
            self.state.stack.push(dir_key(&dir));
        }
    }

    fn record_skip(&mut self, path: &Path, reason: SkipReason) {
        if reason.counts_as_anomaly() {
            self.state.skipped_count += 1;
            tracing::trace!("Skipped {} ({:?})", path.display(), reason);
        }
    }

    fn limit_reached(&self) -> bool {
        self.state.collected_files.len() as u64 >= self.policy.max_files
    }

    fn truncate(&mut self) {
        self.state.truncated = true;
        self.state.complete();
        tracing::warn!(
            "File limit of {} reached, discovery stopped early",
            self.policy.max_files
        );
    }
}

/// Dedup key for an entry.
///
/// A symlinked directory refused by the symlink rule is keyed by its own
/// path, so the real directory it points at is still reachable directly.
fn seen_key(candidate: &Candidate, verdict: Verdict) -> String {
    let refused_link = candidate.kind == EntryKind::SymlinkedDirectory
        && verdict == Verdict::Skip(SkipReason::SymlinkedDirectory);

    match candidate.canonical.as_deref() {
        Some(canonical) if !refused_link => path_key(canonical),
        _ => path_key(&candidate.path),
    }
}

/// Entry names of a directory, sorted for a deterministic visiting order.
fn list_names(dir: &Path) -> std::io::Result<Vec<OsString>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        match entry {
            Ok(entry) => names.push(entry.file_name()),
            Err(e) => tracing::debug!("Unreadable entry in {}: {}", dir.display(), e),
        }
    }
    names.sort();
    Ok(names)
}
