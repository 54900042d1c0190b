use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use super::{command_exists, VersionControl};

/// What the status line needs to know about a working tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitStatus {
    pub is_repository: bool,
    /// Branch name, or the abbreviated commit when detached.
    pub branch: String,
    pub is_detached: bool,
    pub is_dirty: bool,
}

const SHORT_HASH_LEN: usize = 7;

/// Runs the `git` binary with a hard deadline.
pub struct GitCli {
    timeout: Duration,
}

impl GitCli {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl VersionControl for GitCli {
    async fn status(&self, dir: &Path) -> GitStatus {
        if !command_exists("git") {
            tracing::debug!("git not found on PATH");
            return GitStatus::default();
        }

        let output = Command::new("git")
            .arg("--no-optional-locks")
            .arg("-C")
            .arg(dir)
            .args(["status", "--porcelain=v2", "--branch"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, output).await {
            Ok(Ok(out)) if out.status.success() => {
                parse_porcelain(&String::from_utf8_lossy(&out.stdout))
            }
            Ok(Ok(out)) => {
                tracing::debug!(status = ?out.status, dir = %dir.display(), "not a git repository");
                GitStatus::default()
            }
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "failed to run git");
                GitStatus::default()
            }
            Err(_) => {
                tracing::debug!(timeout_ms = self.timeout.as_millis() as u64, "git status timed out");
                GitStatus::default()
            }
        }
    }
}

/// Parse `git status --porcelain=v2 --branch` output.
///
/// Header lines start with `#`; any other non-empty line is a changed,
/// unmerged or untracked entry and marks the tree dirty.
pub fn parse_porcelain(text: &str) -> GitStatus {
    let mut head = None;
    let mut oid = None;
    let mut is_dirty = false;

    for line in text.lines() {
        if let Some(value) = line.strip_prefix("# branch.head ") {
            head = Some(value.trim());
        } else if let Some(value) = line.strip_prefix("# branch.oid ") {
            oid = Some(value.trim());
        } else if !line.starts_with('#') && !line.trim().is_empty() {
            is_dirty = true;
        }
    }

    let (branch, is_detached) = match head {
        Some("(detached)") => {
            let hash = oid
                .filter(|o| *o != "(initial)")
                .map(|o| o.chars().take(SHORT_HASH_LEN).collect::<String>())
                .unwrap_or_default();
            (hash, true)
        }
        Some(name) => (name.to_string(), false),
        None => (String::new(), false),
    };

    GitStatus {
        is_repository: true,
        branch,
        is_detached,
        is_dirty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clean_branch() {
        let out = "# branch.oid 1234567890abcdef\n# branch.head main\n# branch.upstream origin/main\n# branch.ab +0 -0\n";
        let status = parse_porcelain(out);
        assert!(status.is_repository);
        assert_eq!(status.branch, "main");
        assert!(!status.is_detached);
        assert!(!status.is_dirty);
    }

    #[test]
    fn test_parse_dirty_branch() {
        let out = "# branch.oid 1234567890abcdef\n# branch.head feature/x\n1 .M N... 100644 100644 100644 aaa bbb src/main.rs\n";
        let status = parse_porcelain(out);
        assert_eq!(status.branch, "feature/x");
        assert!(status.is_dirty);
    }

    #[test]
    fn test_parse_untracked_is_dirty() {
        let out = "# branch.oid 1234567890abcdef\n# branch.head main\n? notes.txt\n";
        assert!(parse_porcelain(out).is_dirty);
    }

    #[test]
    fn test_parse_detached_head() {
        let out = "# branch.oid abcdef1234567890\n# branch.head (detached)\n";
        let status = parse_porcelain(out);
        assert!(status.is_detached);
        assert_eq!(status.branch, "abcdef1");
    }

    #[test]
    fn test_parse_initial_commit() {
        let out = "# branch.oid (initial)\n# branch.head main\n";
        let status = parse_porcelain(out);
        assert_eq!(status.branch, "main");
        assert!(!status.is_detached);
    }

    #[tokio::test]
    async fn test_git_cli_non_repository() {
        let dir = tempfile::TempDir::new().unwrap();
        let git = GitCli::new(Duration::from_secs(5));
        let status = git.status(dir.path()).await;
        assert!(!status.is_repository);
        assert!(status.branch.is_empty());
    }

    #[tokio::test]
    async fn test_git_cli_timeout_yields_absent() {
        // A zero deadline elapses before `git` can answer.
        let git = GitCli::new(Duration::ZERO);
        let started = std::time::Instant::now();
        let status = git.status(Path::new(env!("CARGO_MANIFEST_DIR"))).await;
        assert_eq!(status, GitStatus::default());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
