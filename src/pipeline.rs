// One collect-and-archive run: fetch, then upload. Nothing is uploaded unless the fetch completed.

use crate::archiver::Archiver;
use crate::clock::Clock;
use crate::error::RunError;
use crate::models::ArchiveObject;
use crate::snapshotter::Snapshotter;
use std::fmt;

/// Where a run is. `Uploaded` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Fetching,
    Uploaded,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Fetching => "fetching",
            RunState::Uploaded => "uploaded",
            RunState::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[tracing::instrument(level = "debug", name = "run", skip_all)]
pub async fn run_once(
    clock: &dyn Clock,
    snapshotter: &Snapshotter,
    archiver: &Archiver,
) -> Result<ArchiveObject, RunError> {
    tracing::debug!(state = %RunState::Fetching, "run state");
    let capture = match snapshotter.capture(clock).await {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(
                error = %e,
                operation = "capture",
                state = %RunState::Failed,
                "Fetch failed; nothing archived"
            );
            return Err(e.into());
        }
    };

    match archiver.archive(&capture).await {
        Ok(object) => {
            tracing::debug!(state = %RunState::Uploaded, key = %object.key, "run state");
            Ok(object)
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                operation = "archive",
                timestamp = capture.timestamp,
                state = %RunState::Failed,
                "Upload failed"
            );
            Err(e.into())
        }
    }
}
