//! A shared song queue for taking turns in a live voice session.
//!
//! Every interaction loads the persisted [`QueueState`], applies one
//! [`Intent`] for the caller, saves the result and hands back a
//! [`QueueView`]. [`QueueSession`] runs that cycle; [`controller::apply`]
//! is the state machine on its own.

pub mod logging;

pub mod controller;
pub mod error;
pub mod session;
pub mod settings;
pub mod state;
pub mod store;
pub mod view;

pub use controller::{apply, Intent, Outcome};
pub use error::{ErrorKind, QueueError, StoreError};
pub use session::QueueSession;
pub use settings::Settings;
pub use state::{ManagerClaim, QueueState};
pub use store::{FileStore, MemoryStore, StateStore};
pub use view::{Entry, QueueView};
