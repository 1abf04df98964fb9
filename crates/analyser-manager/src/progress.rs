//! Install lifecycle progress events.
//!
//! Progress is reported over an explicit mpsc channel passed into the
//! install pipeline; there is no listener rebinding and a dropped
//! receiver never fails an install. Every event carries the analyser
//! name, so one receiver can observe several in-flight installs.

use serde::Serialize;
use tokio::sync::mpsc;

/// Stages of one install attempt.
///
/// `Idle → Downloading → Downloaded → Extracting → Installing →
/// Installed`, or `Failed` from any stage. Terminal either way; a
/// failed install must be re-invoked by the caller.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InstallStage {
    Idle,
    Downloading,
    Downloaded,
    Extracting,
    Installing,
    Installed,
    Failed,
}

/// A lifecycle event emitted during an install, tagged with the
/// analyser it belongs to.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum InstallEvent {
    Downloading {
        analyser: String,
        version: String,
    },
    Downloaded {
        analyser: String,
        version: String,
    },
    Installing {
        analyser: String,
        version: String,
    },
    Installed {
        analyser: String,
        version: String,
    },
    Failed {
        analyser: String,
        version: String,
        message: String,
    },
}

impl InstallEvent {
    /// The analyser this event belongs to.
    pub fn analyser(&self) -> &str {
        match self {
            InstallEvent::Downloading { analyser, .. }
            | InstallEvent::Downloaded { analyser, .. }
            | InstallEvent::Installing { analyser, .. }
            | InstallEvent::Installed { analyser, .. }
            | InstallEvent::Failed { analyser, .. } => analyser,
        }
    }

    /// The stage this event transitions into.
    pub fn stage(&self) -> InstallStage {
        match self {
            InstallEvent::Downloading { .. } => InstallStage::Downloading,
            InstallEvent::Downloaded { .. } => InstallStage::Downloaded,
            InstallEvent::Installing { .. } => InstallStage::Installing,
            InstallEvent::Installed { .. } => InstallStage::Installed,
            InstallEvent::Failed { .. } => InstallStage::Failed,
        }
    }
}

/// Best-effort sender handed into the install pipeline.
#[derive(Debug, Clone, Default)]
pub struct ProgressSender {
    tx: Option<mpsc::Sender<InstallEvent>>,
}

impl ProgressSender {
    pub fn new(tx: mpsc::Sender<InstallEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sender that silently drops every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Send an event. Best-effort: a missing or closed channel is
    /// ignored.
    pub async fn send(&self, event: InstallEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event).await;
        }
    }
}
