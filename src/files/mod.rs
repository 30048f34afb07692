//! Event file persistence.
//!
//! - `filename`: event id derivation and `event-<id>.txt` naming
//! - `event_file`: [`EventStore`] save/load/discovery

mod event_file;
pub mod filename;

pub use event_file::{read_event_file, EventStore, SaveOutcome};
pub use filename::{derive_event_id, event_filename};
