//! The annotation log: markers plus undo/redo history.
//!
//! Every mutation goes through [`EventLog`] so the history always describes
//! the marker state exactly. A user action that touches several keys (moving
//! a frame from one key to another, or marking a key together with its
//! partner) is recorded as one [`Edit::Batch`] and undone as a unit.

use std::fmt;

use tracing::{debug, warn};

use crate::error::{Result, ReviewError};
use crate::events::{Markers, PairSpan, Pairing};

/// One reversible change to the markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Add { key: String, frame: u64 },
    Remove { key: String, frame: u64 },
    Nudge { key: String, from: u64, to: u64 },
    Batch(Vec<Edit>),
}

impl Edit {
    fn apply(&self, markers: &mut Markers) {
        match self {
            Edit::Add { key, frame } => {
                markers.insert(key, *frame);
            }
            Edit::Remove { key, frame } => {
                markers.remove(key, *frame);
            }
            Edit::Nudge { key, from, to } => {
                markers.remove(key, *from);
                markers.insert(key, *to);
            }
            Edit::Batch(edits) => edits.iter().for_each(|e| e.apply(markers)),
        }
    }

    fn revert(&self, markers: &mut Markers) {
        match self {
            Edit::Add { key, frame } => {
                markers.remove(key, *frame);
            }
            Edit::Remove { key, frame } => {
                markers.insert(key, *frame);
            }
            Edit::Nudge { key, from, to } => {
                markers.remove(key, *to);
                markers.insert(key, *from);
            }
            Edit::Batch(edits) => edits.iter().rev().for_each(|e| e.revert(markers)),
        }
    }

    fn from_parts(mut edits: Vec<Edit>) -> Self {
        if edits.len() == 1 {
            edits.remove(0)
        } else {
            Edit::Batch(edits)
        }
    }
}

/// What happened to the log, passed to change listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogChange {
    Edited(Edit),
    Undone(Edit),
    Redone(Edit),
    Cleared,
    Imported,
}

type Listener = Box<dyn FnMut(&LogChange, &Markers)>;

/// Markers with history, pairing rules and change notification.
#[derive(Default)]
pub struct EventLog {
    markers: Markers,
    undo_stack: Vec<Edit>,
    redo_stack: Vec<Edit>,
    pairing: Pairing,
    dirty: bool,
    listeners: Vec<Listener>,
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("markers", &self.markers)
            .field("undo_stack", &self.undo_stack)
            .field("redo_stack", &self.redo_stack)
            .field("pairing", &self.pairing)
            .field("dirty", &self.dirty)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn checked_frame(frame: i64) -> Result<u64> {
    u64::try_from(frame).map_err(|_| ReviewError::InvalidFrame { frame })
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pairing(pairing: Pairing) -> Self {
        Self {
            pairing,
            ..Self::default()
        }
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn pairing(&self) -> &Pairing {
        &self.pairing
    }

    pub fn set_pairing(&mut self, pairing: Pairing) {
        self.pairing = pairing;
    }

    pub fn undo_stack(&self) -> &[Edit] {
        &self.undo_stack
    }

    pub fn redo_stack(&self) -> &[Edit] {
        &self.redo_stack
    }

    /// True when the markers changed since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record that the current markers are persisted.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Register a listener called after every change.
    pub fn subscribe(&mut self, listener: impl FnMut(&LogChange, &Markers) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Mark `frame` under `key`, taking it away from any other key.
    ///
    /// Returns `Ok(false)` without touching the history when the frame is
    /// already marked under `key`.
    pub fn add_marker(&mut self, key: &str, frame: i64) -> Result<bool> {
        let frame = checked_frame(frame)?;
        if self.markers.contains(key, frame) {
            return Ok(false);
        }
        let mut staged = self.markers.clone();
        let mut edits = Vec::new();
        claim(&mut staged, &mut edits, key, frame, None);
        self.commit(Edit::from_parts(edits));
        debug!(key, frame, "marked");
        Ok(true)
    }

    /// Mark `key` at `frame` and `partner` at `partner_frame` as one step.
    ///
    /// When both land on the same frame the two keys share it; any other
    /// key holding that frame loses it.
    pub fn add_pair(
        &mut self,
        key: &str,
        frame: i64,
        partner: &str,
        partner_frame: i64,
    ) -> Result<bool> {
        let frame = checked_frame(frame)?;
        let partner_frame = checked_frame(partner_frame)?;
        if key == partner {
            return self.add_marker(key, frame as i64);
        }

        let shared = frame == partner_frame;
        let mut staged = self.markers.clone();
        let mut edits = Vec::new();
        if !staged.contains(key, frame) {
            claim(&mut staged, &mut edits, key, frame, shared.then_some(partner));
        }
        if !staged.contains(partner, partner_frame) {
            claim(
                &mut staged,
                &mut edits,
                partner,
                partner_frame,
                shared.then_some(key),
            );
        }
        if edits.is_empty() {
            return Ok(false);
        }
        self.commit(Edit::from_parts(edits));
        debug!(key, frame, partner, partner_frame, "marked pair");
        Ok(true)
    }

    /// Mark `key` at `frame`, applying the configured pairing policy.
    pub fn mark(&mut self, key: &str, frame: i64) -> Result<bool> {
        let checked = checked_frame(frame)?;
        let partner = self
            .pairing
            .partner_of(key)
            .filter(|p| *p != key)
            .map(str::to_string)
            .zip(self.pairing.implicit_frame(checked));

        match partner {
            Some((partner, partner_frame)) => {
                if self.markers.contains(key, checked) {
                    return Ok(false);
                }
                self.add_pair(key, frame, &partner, partner_frame as i64)
            }
            None => self.add_marker(key, frame),
        }
    }

    /// Remove `frame` from `key`. Absent frames are a no-op.
    pub fn remove_marker(&mut self, key: &str, frame: i64) -> Result<bool> {
        let frame = checked_frame(frame)?;
        if !self.markers.contains(key, frame) {
            return Ok(false);
        }
        self.commit(Edit::Remove {
            key: key.to_string(),
            frame,
        });
        debug!(key, frame, "unmarked");
        Ok(true)
    }

    /// Remove the marker of `key` closest to `frame` within `tolerance`.
    ///
    /// Returns the removed frame, or `None` when nothing is close enough.
    pub fn remove_nearest(&mut self, key: &str, frame: i64, tolerance: u64) -> Result<Option<u64>> {
        let frame = checked_frame(frame)?;
        let Some(found) = self.markers.nearest(key, frame, tolerance) else {
            return Ok(None);
        };
        self.remove_marker(key, found as i64)?;
        Ok(Some(found))
    }

    /// Remove whichever key holds `frame`. Returns that key.
    pub fn remove_at(&mut self, frame: i64) -> Result<Option<String>> {
        let frame = checked_frame(frame)?;
        let Some(key) = self.markers.owner_of(frame).map(str::to_string) else {
            return Ok(None);
        };
        self.remove_marker(&key, frame as i64)?;
        Ok(Some(key))
    }

    /// Move the marker at `frame` by `delta` frames.
    ///
    /// The marker stops short of its neighbours under the same key and never
    /// lands on a frame held by another key. Returns the key and new frame.
    pub fn nudge(&mut self, frame: u64, delta: i64) -> Option<(String, u64)> {
        let key = self.markers.owner_of(frame)?.to_string();
        let (prev, next) = self.markers.neighbours(&key, frame);
        let lower = prev.map_or(0, |p| p + 1);
        let upper = next.map_or(u64::MAX, |n| n - 1);
        let target = frame.saturating_add_signed(delta).clamp(lower, upper);

        if target == frame || !self.markers.other_owners(&key, target).is_empty() {
            return None;
        }
        self.commit(Edit::Nudge {
            key: key.clone(),
            from: frame,
            to: target,
        });
        debug!(key = key.as_str(), from = frame, to = target, "nudged");
        Some((key, target))
    }

    /// Revert the most recent edit. Returns it, or `None` if there is none.
    pub fn undo(&mut self) -> Option<Edit> {
        let edit = self.undo_stack.pop()?;
        edit.revert(&mut self.markers);
        self.redo_stack.push(edit.clone());
        self.dirty = true;
        self.notify(LogChange::Undone(edit.clone()));
        Some(edit)
    }

    /// Re-apply the most recently undone edit.
    pub fn redo(&mut self) -> Option<Edit> {
        let edit = self.redo_stack.pop()?;
        edit.apply(&mut self.markers);
        self.undo_stack.push(edit.clone());
        self.dirty = true;
        self.notify(LogChange::Redone(edit.clone()));
        Some(edit)
    }

    /// Drop all markers and history.
    pub fn clear(&mut self) {
        self.markers = Markers::new();
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.dirty = false;
        self.notify(LogChange::Cleared);
    }

    /// Snapshot of the markers in their persisted shape.
    pub fn export(&self) -> Markers {
        self.markers.clone()
    }

    /// Replace all markers and reset the history.
    pub fn import(&mut self, markers: Markers) {
        warn_on_shared_frames(&markers);
        self.markers = markers;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.dirty = false;
        self.notify(LogChange::Imported);
    }

    /// Key marked at `frame`, if any.
    pub fn marker_at(&self, frame: u64) -> Option<&str> {
        self.markers.owner_of(frame)
    }

    /// First marked frame after `frame`, over all keys.
    pub fn next_marker_after(&self, frame: u64) -> Option<u64> {
        self.markers
            .tracks()
            .iter()
            .filter_map(|t| {
                let pos = t.frames().partition_point(|&f| f <= frame);
                t.frames().get(pos).copied()
            })
            .min()
    }

    /// Last marked frame before `frame`, over all keys.
    pub fn prev_marker_before(&self, frame: u64) -> Option<u64> {
        self.markers
            .tracks()
            .iter()
            .filter_map(|t| {
                let pos = t.frames().partition_point(|&f| f < frame);
                pos.checked_sub(1).map(|i| t.frames()[i])
            })
            .max()
    }

    pub fn all_frames(&self) -> Vec<u64> {
        self.markers.all_frames()
    }

    /// Start/partner spans for every pairing rule.
    pub fn pairs(&self) -> Vec<PairSpan> {
        self.pairing.spans(&self.markers)
    }

    fn commit(&mut self, edit: Edit) {
        edit.apply(&mut self.markers);
        self.undo_stack.push(edit.clone());
        self.redo_stack.clear();
        self.dirty = true;
        self.notify(LogChange::Edited(edit));
    }

    fn notify(&mut self, change: LogChange) {
        for listener in &mut self.listeners {
            listener(&change, &self.markers);
        }
    }
}

/// Legacy files may list a frame under two keys; keep them but say so.
fn warn_on_shared_frames(markers: &Markers) {
    let mut seen: Vec<(u64, &str)> = markers
        .tracks()
        .iter()
        .flat_map(|t| t.frames().iter().map(move |&f| (f, t.key())))
        .collect();
    seen.sort_unstable();
    for pair in seen.windows(2) {
        if pair[0].0 == pair[1].0 {
            warn!(
                frame = pair[0].0,
                first = pair[0].1,
                second = pair[1].1,
                "frame is marked under more than one key"
            );
        }
    }
}

/// Stage `key` taking `frame`, removing it from every other key except `keep`.
fn claim(
    staged: &mut Markers,
    edits: &mut Vec<Edit>,
    key: &str,
    frame: u64,
    keep: Option<&str>,
) {
    for owner in staged.other_owners(key, frame) {
        if keep == Some(owner.as_str()) {
            continue;
        }
        staged.remove(&owner, frame);
        edits.push(Edit::Remove { key: owner, frame });
    }
    staged.insert(key, frame);
    edits.push(Edit::Add {
        key: key.to_string(),
        frame,
    });
}
