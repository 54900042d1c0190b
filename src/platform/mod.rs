//! Collaborators outside the render pipeline: git, the terminal, the clock
//! and file metadata. Each sits behind a trait so tests can substitute fakes.

pub mod git;
pub mod terminal;

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::statusline::snapshot::MetricsSnapshot;

pub use git::{GitCli, GitStatus};
pub use terminal::TerminalProbe;

/// Branch and dirty state for a directory. Never fails: an unavailable
/// `git`, a non-repository or a timeout all yield `GitStatus::default()`.
#[allow(async_fn_in_trait)]
pub trait VersionControl {
    async fn status(&self, dir: &Path) -> GitStatus;
}

/// Terminal width in columns, or `None` when it cannot be determined.
pub trait TerminalSize {
    fn columns(&self) -> Option<u16>;
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Last-modified time of a file, if it exists and the platform reports one.
pub trait FileMetadata {
    fn modified(&self, path: &Path) -> Option<DateTime<Utc>>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct FsMetadata;

impl FileMetadata for FsMetadata {
    fn modified(&self, path: &Path) -> Option<DateTime<Utc>> {
        let modified = std::fs::metadata(path).ok()?.modified().ok()?;
        Some(DateTime::<Utc>::from(modified))
    }
}

/// Check whether a command is available on `$PATH`.
///
/// Uses the `which` crate for pure-Rust PATH resolution. No shell spawning.
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// The set of collaborators one render talks to.
pub struct Capabilities<V, T, C, F> {
    pub vcs: V,
    pub terminal: T,
    pub clock: C,
    pub files: F,
}

impl Capabilities<GitCli, TerminalProbe, SystemClock, FsMetadata> {
    pub fn system(git_timeout: std::time::Duration) -> Self {
        Self {
            vcs: GitCli::new(git_timeout),
            terminal: TerminalProbe,
            clock: SystemClock,
            files: FsMetadata,
        }
    }
}

/// Everything the pipeline needs from outside the snapshot, resolved once.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub git: GitStatus,
    pub columns: Option<u16>,
    pub now: DateTime<Utc>,
    pub transcript_modified: Option<DateTime<Utc>>,
}

/// Probe every collaborator for one snapshot.
///
/// Git and terminal probes run concurrently; their results are bound by
/// position so completion order has no effect on the output.
pub async fn gather<V, T, C, F>(
    snapshot: &MetricsSnapshot,
    caps: &Capabilities<V, T, C, F>,
    git_enabled: bool,
) -> Environment
where
    V: VersionControl,
    T: TerminalSize,
    C: Clock,
    F: FileMetadata,
{
    let dir = snapshot.working_directory.as_str();

    let git = async {
        if git_enabled && !dir.is_empty() {
            caps.vcs.status(Path::new(dir)).await
        } else {
            GitStatus::default()
        }
    };
    let columns = async { caps.terminal.columns() };
    let (git, columns) = tokio::join!(git, columns);

    let transcript_modified = snapshot
        .transcript_path
        .as_deref()
        .and_then(|p| caps.files.modified(p));

    tracing::debug!(
        repo = git.is_repository,
        columns = ?columns,
        transcript = transcript_modified.is_some(),
        "collaborators probed"
    );

    Environment {
        git,
        columns,
        now: caps.clock.now(),
        transcript_modified,
    }
}
