//! Sub-paths of the home root visited before the generic walk.

use warden_policy::PolicyConfig;

/// Common hiding spots for dropped payloads, relative to the home root.
pub const PRIORITY_PATHS: &[&str] = &[
    "tmp/",
    ".tmp/",
    "cache/",
    ".cache/",
    "logs/",
    "log/",
    ".cagefs/tmp/",
    ".cagefs/var/tmp/",
];

/// Extra locations visited first in aggressive mode.
pub const AGGRESSIVE_PRIORITY_PATHS: &[&str] = &[".config/", ".local/share/", "mail/", "etc/", ".trash/"];

pub fn priority_paths(policy: &PolicyConfig) -> Vec<String> {
    let mut paths: Vec<String> = PRIORITY_PATHS.iter().map(|p| p.to_string()).collect();
    if policy.aggressive_mode {
        paths.extend(AGGRESSIVE_PRIORITY_PATHS.iter().map(|p| p.to_string()));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_priority_paths() {
        let paths = priority_paths(&PolicyConfig::default());
        assert_eq!(paths.first().map(String::as_str), Some("tmp/"));
        assert!(!paths.contains(&".config/".to_string()));
    }

    #[test]
    fn test_aggressive_adds_paths() {
        let mut policy = PolicyConfig::default();
        policy.aggressive_mode = true;
        let paths = priority_paths(&policy);
        assert!(paths.contains(&".config/".to_string()));
        assert!(paths.contains(&"tmp/".to_string()));
    }
}
