//! # Action Board
//!
//! Per-action status for the user-triggered actions of the detail overlay
//! (export, share, download, citation).
//!
//! Each action owns an independent status. While an action is `Pending` its
//! control is disabled: a second `begin` for the same action is refused.
//! Different actions never block each other.
//!
//! The board only records state. Running the (simulated) work is the job of
//! the application's action runner.

use crate::SpaceBioError;
use crate::primitives::{CITATION_DELAY_MS, DOWNLOAD_DELAY_MS, EXPORT_DELAY_MS, SHARE_DELAY_MS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A user-triggered action with its own busy flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Export,
    Share,
    Download,
    Citation,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Export,
        ActionKind::Share,
        ActionKind::Download,
        ActionKind::Citation,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Export => "export",
            Self::Share => "share",
            Self::Download => "download",
            Self::Citation => "citation",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = SpaceBioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SpaceBioError::UnknownAction(s.to_string()))
    }
}

/// Lifecycle of one action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(String),
}

impl TaskStatus {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Status of every action, keyed by kind.
#[derive(Debug, Clone, Default)]
pub struct ActionBoard {
    statuses: BTreeMap<ActionKind, TaskStatus>,
}

impl ActionBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status; actions never started are `Idle`.
    #[must_use]
    pub fn status(&self, kind: ActionKind) -> &TaskStatus {
        const IDLE: TaskStatus = TaskStatus::Idle;
        self.statuses.get(&kind).unwrap_or(&IDLE)
    }

    #[must_use]
    pub fn is_busy(&self, kind: ActionKind) -> bool {
        self.status(kind).is_pending()
    }

    /// Mark an action pending. Refused while it is already pending.
    pub fn begin(&mut self, kind: ActionKind) -> Result<(), SpaceBioError> {
        if self.is_busy(kind) {
            return Err(SpaceBioError::ActionBusy(kind));
        }
        self.statuses.insert(kind, TaskStatus::Pending);
        Ok(())
    }

    pub fn succeed(&mut self, kind: ActionKind) {
        self.statuses.insert(kind, TaskStatus::Succeeded);
    }

    pub fn fail(&mut self, kind: ActionKind, reason: impl Into<String>) {
        self.statuses.insert(kind, TaskStatus::Failed(reason.into()));
    }

    /// Return an action to `Idle`, e.g. after cancellation.
    pub fn reset(&mut self, kind: ActionKind) {
        self.statuses.remove(&kind);
    }

    /// Every action with its status, in [`ActionKind::ALL`] order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(ActionKind, TaskStatus)> {
        ActionKind::ALL
            .into_iter()
            .map(|k| (k, self.status(k).clone()))
            .collect()
    }
}

/// Fixed simulated latency per action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionDelays {
    pub export: Duration,
    pub share: Duration,
    pub download: Duration,
    pub citation: Duration,
}

impl Default for ActionDelays {
    fn default() -> Self {
        Self {
            export: Duration::from_millis(EXPORT_DELAY_MS),
            share: Duration::from_millis(SHARE_DELAY_MS),
            download: Duration::from_millis(DOWNLOAD_DELAY_MS),
            citation: Duration::from_millis(CITATION_DELAY_MS),
        }
    }
}

impl ActionDelays {
    /// The same delay for every action.
    #[must_use]
    pub const fn uniform(delay: Duration) -> Self {
        Self {
            export: delay,
            share: delay,
            download: delay,
            citation: delay,
        }
    }

    #[must_use]
    pub const fn for_kind(&self, kind: ActionKind) -> Duration {
        match kind {
            ActionKind::Export => self.export,
            ActionKind::Share => self.share,
            ActionKind::Download => self.download,
            ActionKind::Citation => self.citation,
        }
    }
}
