//! The persisted queue aggregate.
//!
//! A `QueueState` is loaded at the start of every interaction, changed by
//! exactly one intent and written back. The JSON layout is shared with
//! every other client reading the same file, so field names are fixed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueState {
    #[serde(default)]
    pub(crate) queue: Vec<String>,
    #[serde(default)]
    pub(crate) calypso: Vec<String>,
    #[serde(default)]
    pub(crate) pinged: Vec<String>,
    #[serde(default, with = "manager_field")]
    pub(crate) current_manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) pending_manager: Option<String>,
    #[serde(default)]
    pub(crate) revision: u64,
}

/// Who holds the manager role, as a state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ManagerClaim {
    Unclaimed,
    Claimed { manager: String },
    PendingReplace { manager: String, candidate: String },
}

impl QueueState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position 0 is the person currently singing.
    pub fn queue(&self) -> &[String] {
        &self.queue
    }

    pub fn calypso(&self) -> &[String] {
        &self.calypso
    }

    pub fn pinged(&self) -> &[String] {
        &self.pinged
    }

    pub fn manager(&self) -> Option<&str> {
        self.current_manager.as_deref()
    }

    pub fn pending_manager(&self) -> Option<&str> {
        self.pending_manager.as_deref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn manager_claim(&self) -> ManagerClaim {
        match (&self.current_manager, &self.pending_manager) {
            (None, _) => ManagerClaim::Unclaimed,
            (Some(manager), None) => ManagerClaim::Claimed {
                manager: manager.clone(),
            },
            (Some(manager), Some(candidate)) => ManagerClaim::PendingReplace {
                manager: manager.clone(),
                candidate: candidate.clone(),
            },
        }
    }

    pub fn is_manager(&self, caller: &str) -> bool {
        !caller.trim().is_empty() && self.manager() == Some(caller)
    }

    pub fn in_queue(&self, name: &str) -> bool {
        self.queue.iter().any(|p| p == name)
    }

    pub fn in_calypso(&self, name: &str) -> bool {
        self.calypso.iter().any(|p| p == name)
    }

    pub fn is_member(&self, name: &str) -> bool {
        self.in_queue(name) || self.in_calypso(name)
    }

    pub fn is_pinged(&self, name: &str) -> bool {
        self.pinged.iter().any(|p| p == name)
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Repairs a blob that breaks the membership invariants, e.g. one edited
    /// by hand or written by an older client. Queue membership wins over
    /// calypso. Returns whether anything changed.
    pub fn normalize(&mut self) -> bool {
        let before = self.clone();

        let mut seen: Vec<String> = Vec::with_capacity(self.queue.len());
        self.queue.retain(|name| {
            if name.trim().is_empty() || seen.contains(name) {
                false
            } else {
                seen.push(name.clone());
                true
            }
        });

        let mut held: Vec<String> = Vec::with_capacity(self.calypso.len());
        self.calypso.retain(|name| {
            if name.trim().is_empty() || seen.contains(name) || held.contains(name) {
                false
            } else {
                held.push(name.clone());
                true
            }
        });

        let mut pinged: Vec<String> = Vec::with_capacity(self.pinged.len());
        for name in std::mem::take(&mut self.pinged) {
            if (seen.contains(&name) || held.contains(&name)) && !pinged.contains(&name) {
                pinged.push(name);
            }
        }
        self.pinged = pinged;

        if self.current_manager.as_deref().is_some_and(|m| m.trim().is_empty()) {
            self.current_manager = None;
        }
        if self.current_manager.is_none() {
            self.pending_manager = None;
        }
        if self.pending_manager.as_deref().is_some_and(|c| c.trim().is_empty())
            || self.pending_manager == self.current_manager
        {
            self.pending_manager = None;
        }

        *self != before
    }

    /// Checks the membership invariants without changing anything.
    pub fn is_consistent(&self) -> bool {
        let mut copy = self.clone();
        !copy.normalize()
    }
}

/// `current_manager` is stored as a plain string, empty when unclaimed.
mod manager_field {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|name| !name.trim().is_empty()))
    }
}
