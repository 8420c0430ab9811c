//! Version identifier stamped into packages and the executable

use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Used when the source tree is not a git checkout
pub const FALLBACK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// `git-<commit>` for a git checkout, `v<crate version>` otherwise
pub async fn identify(source_dir: &Path) -> String {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(source_dir)
        .output()
        .await;

    let revision = match output {
        Ok(out) if out.status.success() => Some(String::from_utf8_lossy(&out.stdout).into_owned()),
        Ok(out) => {
            debug!(
                "git rev-parse failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            );
            None
        }
        Err(e) => {
            debug!("Could not run git: {}", e);
            None
        }
    };

    from_revision(revision.as_deref())
}

fn from_revision(revision: Option<&str>) -> String {
    match revision.map(str::trim) {
        Some(rev) if !rev.is_empty() => format!("git-{}", rev),
        _ => format!("v{}", FALLBACK_VERSION),
    }
}
