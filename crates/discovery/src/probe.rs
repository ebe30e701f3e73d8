//! Filesystem inspection feeding the enforcer.

use std::fs::{self, File};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::enforcer::{Candidate, EntryKind};

/// Stat, resolve and readability-check one entry without following a
/// symlinked directory any further than its target's metadata.
pub fn probe(path: &Path) -> Candidate {
    let mut candidate = inspect(path);
    check_readable(&mut candidate);
    candidate
}

/// Metadata and resolution only; `readable` stays false until
/// [`check_readable`] opens the file.
pub fn inspect(path: &Path) -> Candidate {
    let unresolved = Candidate {
        path: path.to_path_buf(),
        canonical: None,
        kind: EntryKind::Special,
        size: 0,
        readable: false,
    };

    let Ok(link_meta) = fs::symlink_metadata(path) else {
        return unresolved;
    };
    let is_symlink = link_meta.file_type().is_symlink();

    let target_meta = if is_symlink {
        match fs::metadata(path) {
            Ok(meta) => meta,
            Err(_) => return unresolved,
        }
    } else {
        link_meta
    };

    let canonical = fs::canonicalize(path)
        .ok()
        .filter(|p| p.to_str().is_some());

    let kind = if target_meta.is_dir() {
        if is_symlink {
            EntryKind::SymlinkedDirectory
        } else {
            EntryKind::Directory
        }
    } else if target_meta.is_file() {
        EntryKind::File
    } else {
        EntryKind::Special
    };

    Candidate {
        path: path.to_path_buf(),
        canonical,
        kind,
        size: target_meta.len(),
        readable: false,
    }
}

/// Files must open for reading; directories count as readable once resolved.
pub fn check_readable(candidate: &mut Candidate) {
    candidate.readable = match candidate.kind {
        EntryKind::File => File::open(&candidate.path).is_ok(),
        EntryKind::Directory | EntryKind::SymlinkedDirectory => candidate.canonical.is_some(),
        EntryKind::Special => false,
    };
}

/// Canonicalize a root directory, requiring valid UTF-8.
pub fn canonical_dir(path: &Path) -> Option<PathBuf> {
    fs::canonicalize(path)
        .ok()
        .filter(|p| p.is_dir() && p.to_str().is_some())
}

/// Key used in the checkpoint for a path.
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Stack entry for a directory: its path with a trailing separator.
pub fn dir_key(path: &Path) -> String {
    let mut key = path_key(path);
    if !key.ends_with(MAIN_SEPARATOR) {
        key.push(MAIN_SEPARATOR);
    }
    key
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_probe_regular_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.php");
        fs::write(&file, "<?php echo 1;").unwrap();

        let candidate = probe(&file);
        assert_eq!(candidate.kind, EntryKind::File);
        assert_eq!(candidate.size, 13);
        assert!(candidate.readable);
        assert_eq!(candidate.canonical, Some(fs::canonicalize(&file).unwrap()));
    }

    #[test]
    fn test_probe_directory() {
        let temp = TempDir::new().unwrap();
        let candidate = probe(temp.path());
        assert_eq!(candidate.kind, EntryKind::Directory);
        assert!(candidate.canonical.is_some());
    }

    #[test]
    fn test_probe_missing_entry() {
        let temp = TempDir::new().unwrap();
        let candidate = probe(&temp.path().join("gone"));
        assert!(candidate.canonical.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_symlinked_directory() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        let target = temp.path().join("real");
        let link = temp.path().join("link");
        fs::create_dir(&target).unwrap();
        symlink(&target, &link).unwrap();

        let candidate = probe(&link);
        assert_eq!(candidate.kind, EntryKind::SymlinkedDirectory);
        assert_eq!(candidate.path, link);
        assert_eq!(candidate.canonical, Some(fs::canonicalize(&target).unwrap()));
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_broken_symlink() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        let link = temp.path().join("dangling");
        symlink(temp.path().join("nowhere"), &link).unwrap();

        assert!(probe(&link).canonical.is_none());
    }

    #[test]
    fn test_inspect_does_not_open() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.php");
        fs::write(&file, "x").unwrap();

        let mut candidate = inspect(&file);
        assert_eq!(candidate.kind, EntryKind::File);
        assert!(!candidate.readable);

        check_readable(&mut candidate);
        assert!(candidate.readable);
    }

    #[cfg(unix)]
    #[test]
    fn test_trailing_slash_follows_symlink() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("real")).unwrap();
        symlink(temp.path().join("real"), temp.path().join("link")).unwrap();

        assert_eq!(
            inspect(&temp.path().join("link")).kind,
            EntryKind::SymlinkedDirectory
        );
        assert_eq!(
            inspect(&temp.path().join("link/")).kind,
            EntryKind::Directory
        );
    }

    #[test]
    fn test_dir_key_trailing_separator() {
        assert_eq!(dir_key(Path::new("/home/site")), "/home/site/");
        assert_eq!(dir_key(Path::new("/home/site/")), "/home/site/");
    }
}
