//! Core listener types.

mod address;
mod builder;
mod listener;
mod status;

pub use address::{
    element, scope, FourCharCode, ObjectId, ParseFourCharCodeError, PropertyAddress,
    SELECTOR_WILDCARD,
};
pub use builder::PropertyChangeListenerBuilder;
pub use listener::{ListenerProc, ListenerRef, ProcId, PropertyChangeListener};
pub use status::Status;
