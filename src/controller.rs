//! Applies one intent to one `QueueState`.
//!
//! Every operation validates before it touches the state, so a rejected
//! intent leaves the state exactly as it was. Absent targets are not
//! errors: clicking "leave" twice must be harmless.

use serde::Deserialize;

use crate::error::QueueError;
use crate::state::QueueState;

/// Something a participant asked for. The payload names whoever the action
/// is about; the caller identity travels separately.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Intent {
    Join { name: String },
    Leave { name: String },
    Advance,
    Hold { name: String },
    Return { name: String },
    Reorder { order: Vec<String> },
    /// `position` is 1-based; 1 is the front of the queue.
    MoveTo { name: String, position: usize },
    TogglePing { name: String },
    ClearAll,
    ClaimManager { name: String },
    ConfirmManager,
    CancelManagerClaim,
    ReleaseManager,
}

impl Intent {
    pub fn join(name: impl Into<String>) -> Self {
        Intent::Join { name: name.into() }
    }

    pub fn leave(name: impl Into<String>) -> Self {
        Intent::Leave { name: name.into() }
    }

    pub fn hold(name: impl Into<String>) -> Self {
        Intent::Hold { name: name.into() }
    }

    pub fn return_from_calypso(name: impl Into<String>) -> Self {
        Intent::Return { name: name.into() }
    }

    pub fn reorder<I, N>(order: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Intent::Reorder {
            order: order.into_iter().map(Into::into).collect(),
        }
    }

    pub fn move_to(name: impl Into<String>, position: usize) -> Self {
        Intent::MoveTo {
            name: name.into(),
            position,
        }
    }

    pub fn toggle_ping(name: impl Into<String>) -> Self {
        Intent::TogglePing { name: name.into() }
    }

    pub fn claim_manager(name: impl Into<String>) -> Self {
        Intent::ClaimManager { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Nothing to do: already joined, not in the queue, and so on.
    Unchanged,
    /// Someone else manages the queue; `candidate` has to confirm the takeover.
    ConfirmationRequired { manager: String, candidate: String },
    Warning(QueueError),
}

impl Outcome {
    pub fn is_warning(&self) -> bool {
        matches!(self, Outcome::Warning(_))
    }

    pub fn message(&self) -> Option<String> {
        match self {
            Outcome::Applied | Outcome::Unchanged => None,
            Outcome::ConfirmationRequired { manager, candidate } => Some(format!(
                "{manager} is managing the queue. {candidate}, confirm to take over."
            )),
            Outcome::Warning(err) => Some(err.to_string()),
        }
    }
}

impl From<Result<Outcome, QueueError>> for Outcome {
    fn from(result: Result<Outcome, QueueError>) -> Self {
        result.unwrap_or_else(Outcome::Warning)
    }
}

/// Runs `intent` on behalf of `caller` (empty when anonymous).
pub fn apply(mut state: QueueState, caller: &str, intent: Intent) -> (QueueState, Outcome) {
    crate::dlog!("[Queue] {caller:?} -> {intent:?}");
    let result = match intent {
        Intent::Join { name } => state.join(name),
        Intent::Leave { name } => Ok(state.leave(&name)),
        Intent::Advance => state.advance(caller),
        Intent::Hold { name } => state.hold(caller, &name),
        Intent::Return { name } => Ok(state.return_from_calypso(&name)),
        Intent::Reorder { order } => state.reorder(caller, order),
        Intent::MoveTo { name, position } => state.move_to(caller, &name, position),
        Intent::TogglePing { name } => Ok(state.toggle_ping(&name)),
        Intent::ClearAll => state.clear_all(caller),
        Intent::ClaimManager { name } => state.claim_manager(name),
        Intent::ConfirmManager => state.confirm_manager(caller),
        Intent::CancelManagerClaim => state.cancel_manager_claim(caller),
        Intent::ReleaseManager => Ok(state.release_manager(caller)),
    };
    if let Err(err) = &result {
        tracing::warn!("[Queue] Rejected intent from {caller:?}: {err}");
    }
    (state, result.into())
}

fn changed(did_change: bool) -> Outcome {
    if did_change {
        Outcome::Applied
    } else {
        Outcome::Unchanged
    }
}

impl QueueState {
    fn require_manager(&self, caller: &str) -> Result<(), QueueError> {
        if self.is_manager(caller) {
            Ok(())
        } else {
            Err(QueueError::NotManager)
        }
    }

    pub fn join(&mut self, name: String) -> Result<Outcome, QueueError> {
        if name.trim().is_empty() {
            return Err(QueueError::EmptyName);
        }
        if self.is_member(&name) {
            return Ok(Outcome::Unchanged);
        }
        self.queue.push(name);
        Ok(Outcome::Applied)
    }

    pub fn leave(&mut self, name: &str) -> Outcome {
        let before = self.queue.len() + self.calypso.len() + self.pinged.len();
        self.queue.retain(|p| p != name);
        self.calypso.retain(|p| p != name);
        self.pinged.retain(|p| p != name);
        changed(self.queue.len() + self.calypso.len() + self.pinged.len() != before)
    }

    /// Round-robin: whoever just sang goes to the back.
    pub fn advance(&mut self, caller: &str) -> Result<Outcome, QueueError> {
        self.require_manager(caller)?;
        if self.queue.is_empty() {
            return Ok(Outcome::Unchanged);
        }
        self.queue.rotate_left(1);
        Ok(Outcome::Applied)
    }

    /// The manager may hold anyone; everyone else only themselves.
    pub fn hold(&mut self, caller: &str, name: &str) -> Result<Outcome, QueueError> {
        let own_name = !caller.is_empty() && caller == name;
        if !own_name {
            self.require_manager(caller)?;
        }
        let Some(index) = self.queue.iter().position(|p| p == name) else {
            return Ok(Outcome::Unchanged);
        };
        let person = self.queue.remove(index);
        self.calypso.push(person);
        Ok(Outcome::Applied)
    }

    pub fn return_from_calypso(&mut self, name: &str) -> Outcome {
        let Some(index) = self.calypso.iter().position(|p| p == name) else {
            return Outcome::Unchanged;
        };
        let person = self.calypso.remove(index);
        self.queue.push(person);
        Outcome::Applied
    }

    pub fn reorder(&mut self, caller: &str, order: Vec<String>) -> Result<Outcome, QueueError> {
        self.require_manager(caller)?;
        if !self.is_permutation(&order) {
            return Err(QueueError::NotAPermutation);
        }
        if order == self.queue {
            return Ok(Outcome::Unchanged);
        }
        self.queue = order;
        Ok(Outcome::Applied)
    }

    fn is_permutation(&self, order: &[String]) -> bool {
        if order.len() != self.queue.len() {
            return false;
        }
        order
            .iter()
            .enumerate()
            .all(|(i, name)| self.in_queue(name) && !order[..i].contains(name))
    }

    pub fn move_to(
        &mut self,
        caller: &str,
        name: &str,
        position: usize,
    ) -> Result<Outcome, QueueError> {
        self.require_manager(caller)?;
        let Some(index) = self.queue.iter().position(|p| p == name) else {
            return Ok(Outcome::Unchanged);
        };
        let len = self.queue.len();
        if position == 0 || position > len {
            return Err(QueueError::PositionOutOfRange { position, len });
        }
        if index == position - 1 {
            return Ok(Outcome::Unchanged);
        }
        let person = self.queue.remove(index);
        self.queue.insert(position - 1, person);
        Ok(Outcome::Applied)
    }

    /// Only people in the queue or with Calypso can be pinged.
    pub fn toggle_ping(&mut self, name: &str) -> Outcome {
        if !self.is_member(name) {
            return Outcome::Unchanged;
        }
        if self.is_pinged(name) {
            self.pinged.retain(|p| p != name);
        } else {
            self.pinged.push(name.to_string());
        }
        Outcome::Applied
    }

    pub fn clear_all(&mut self, caller: &str) -> Result<Outcome, QueueError> {
        self.require_manager(caller)?;
        if self.queue.is_empty() && self.calypso.is_empty() && self.pinged.is_empty() {
            return Ok(Outcome::Unchanged);
        }
        self.queue.clear();
        self.calypso.clear();
        self.pinged.clear();
        Ok(Outcome::Applied)
    }

    pub fn claim_manager(&mut self, name: String) -> Result<Outcome, QueueError> {
        if name.trim().is_empty() {
            return Err(QueueError::EmptyName);
        }
        match self.current_manager.clone() {
            None => {
                crate::dlog!("[Queue] {name} is now managing the queue");
                self.current_manager = Some(name);
                self.pending_manager = None;
                Ok(Outcome::Applied)
            }
            Some(manager) if manager == name => Ok(Outcome::Unchanged),
            Some(manager) => {
                self.pending_manager = Some(name.clone());
                Ok(Outcome::ConfirmationRequired {
                    manager,
                    candidate: name,
                })
            }
        }
    }

    pub fn confirm_manager(&mut self, caller: &str) -> Result<Outcome, QueueError> {
        let Some(candidate) = self.pending_manager.clone() else {
            return Err(QueueError::NoPendingClaim);
        };
        if caller != candidate {
            return Err(QueueError::NotCandidate { candidate });
        }
        crate::dlog!("[Queue] {candidate} took over managing the queue");
        self.current_manager = Some(candidate);
        self.pending_manager = None;
        Ok(Outcome::Applied)
    }

    /// Either side of a pending takeover can call it off.
    pub fn cancel_manager_claim(&mut self, caller: &str) -> Result<Outcome, QueueError> {
        let Some(candidate) = self.pending_manager.clone() else {
            return Ok(Outcome::Unchanged);
        };
        if caller != candidate && !self.is_manager(caller) {
            return Err(QueueError::NotCandidate { candidate });
        }
        self.pending_manager = None;
        Ok(Outcome::Applied)
    }

    pub fn release_manager(&mut self, caller: &str) -> Outcome {
        if !self.is_manager(caller) {
            return Outcome::Unchanged;
        }
        self.current_manager = None;
        self.pending_manager = None;
        Outcome::Applied
    }
}
