//! Event markers: the keyed frame log, its history and its file format.
//!
//! - `markers`: insertion-ordered key → sorted frame mapping
//! - `log`: [`EventLog`] with undo/redo and change listeners
//! - `pairing`: directional rules between marker keys
//! - `format`: the literal text form stored in event files

mod format;
mod log;
mod markers;
mod pairing;

pub use format::{parse_literal, to_literal};
pub use log::{Edit, EventLog, LogChange};
pub use markers::{Markers, Track};
pub use pairing::{PairSpan, Pairing, PairingMode};
