use std::path::{Path, PathBuf};

use chrono::Utc;
use log::debug;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::schema::{Submission, SubmissionRecord};

/// Append-only JSON-lines file of every accepted submission.
#[derive(Debug, Clone)]
pub struct SubmissionLog {
    path: PathBuf,
}

impl SubmissionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, submission: &Submission) -> Result<()> {
        let record = SubmissionRecord {
            submission: submission.clone(),
            received_at: Utc::now(),
        };

        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        debug!("Logged submission for {} to {}", submission.url, self.path.display());
        Ok(())
    }
}
