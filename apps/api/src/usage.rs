//! Daily LinkedIn viewing counter, persisted across restarts.
//!
//! LinkedIn accounts tolerate roughly a thousand profile views per day, so
//! the search loop checks this counter before every page. The count lives in
//! a small JSON file; restarting the server keeps today's total, the first
//! view of a new day resets it.

use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const LINKEDIN_DAILY_LIMIT: u64 = 1000;
const USAGE_FILE: &str = "linkedin_usage.json";

#[derive(Debug, Serialize, Deserialize)]
struct UsageFile {
    date: String,
    count: u64,
}

/// Handle to the usage file. Cheap to clone, no open file descriptor is
/// held between calls.
#[derive(Clone)]
pub struct UsageTracker {
    path: PathBuf,
}

impl UsageTracker {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(USAGE_FILE),
        }
    }

    /// Profiles viewed today. A missing, stale or unreadable file counts as
    /// zero; quota tracking must never block a search.
    pub async fn count_today(&self) -> u64 {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(_) => return 0,
        };
        match serde_json::from_str::<UsageFile>(&raw) {
            Ok(parsed) if parsed.date == today() => parsed.count,
            Ok(_) => 0,
            Err(err) => {
                warn!(%err, path = %self.path.display(), "unreadable usage file, counting from zero");
                0
            }
        }
    }

    pub async fn remaining(&self) -> u64 {
        LINKEDIN_DAILY_LIMIT.saturating_sub(self.count_today().await)
    }

    /// Adds viewed profiles to today's counter. Write failures degrade to a
    /// warning.
    pub async fn add(&self, viewed: u64) {
        let count = self.count_today().await + viewed;
        let payload = UsageFile {
            date: today(),
            count,
        };
        let serialized = match serde_json::to_string(&payload) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!(%err, "failed to serialize usage counter");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if let Err(err) = tokio::fs::create_dir_all(parent).await {
                warn!(%err, path = %parent.display(), "failed to create usage directory");
                return;
            }
        }
        if let Err(err) = tokio::fs::write(&self.path, serialized).await {
            warn!(%err, path = %self.path.display(), "failed to persist usage counter");
        }
    }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}
