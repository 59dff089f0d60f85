//! What a client shows after each interaction.

use serde::Serialize;

use crate::state::{ManagerClaim, QueueState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: String,
    pub pinged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueView {
    pub now_singing: Option<Entry>,
    pub up_next: Option<Entry>,
    pub waiting: Vec<Entry>,
    pub calypso: Vec<Entry>,
    pub manager: ManagerClaim,
    pub you: String,
    pub you_are_manager: bool,
    /// The takeover request is yours to confirm.
    pub you_are_candidate: bool,
    pub revision: u64,
}

impl QueueView {
    pub fn new(state: &QueueState, caller: &str) -> Self {
        let entry = |name: &String| Entry {
            name: name.clone(),
            pinged: state.is_pinged(name),
        };
        let queue = state.queue();
        Self {
            now_singing: queue.first().map(entry),
            up_next: queue.get(1).map(entry),
            waiting: queue.iter().skip(2).map(entry).collect(),
            calypso: state.calypso().iter().map(entry).collect(),
            manager: state.manager_claim(),
            you: caller.to_string(),
            you_are_manager: state.is_manager(caller),
            you_are_candidate: !caller.is_empty() && state.pending_manager() == Some(caller),
            revision: state.revision(),
        }
    }

    /// 1-based place in line, counting the current singer as 1.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.now_singing
            .iter()
            .chain(self.up_next.iter())
            .chain(self.waiting.iter())
            .position(|e| e.name == name)
            .map(|i| i + 1)
    }
}
