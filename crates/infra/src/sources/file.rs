//! Saved schedule page on disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;
use crewcal_core::ScheduleSource;
use crewcal_domain::{CrewCalError, Result};
use tracing::{debug, info, warn};

use crate::errors::InfraError;

/// Reads the master schedule from an HTML file, optionally archiving a
/// timestamped copy of every page it reads.
#[derive(Debug, Clone)]
pub struct FileScheduleSource {
    path: PathBuf,
    archive_dir: Option<PathBuf>,
}

impl FileScheduleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), archive_dir: None }
    }

    pub fn with_archive_dir(mut self, dir: Option<impl Into<PathBuf>>) -> Self {
        self.archive_dir = dir.map(Into::into);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn archive(&self, dir: &Path, html: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await.map_err(InfraError::from)?;
        let target = dir.join(format!("schedule_{}.html", Local::now().format("%Y%m%d_%H%M%S")));
        tokio::fs::write(&target, html).await.map_err(InfraError::from)?;
        Ok(target)
    }
}

#[async_trait]
impl ScheduleSource for FileScheduleSource {
    async fn fetch_schedule_html(&self) -> Result<String> {
        let html = tokio::fs::read_to_string(&self.path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                CrewCalError::NotFound(format!("schedule file {} not found", self.path.display()))
            } else {
                InfraError::from(err).into()
            }
        })?;
        debug!(path = %self.path.display(), bytes = html.len(), "read schedule page");

        if let Some(dir) = &self.archive_dir {
            match self.archive(dir, &html).await {
                Ok(target) => info!(path = %target.display(), "archived schedule page"),
                Err(err) => warn!(error = %err, "could not archive schedule page"),
            }
        }

        Ok(html)
    }
}
