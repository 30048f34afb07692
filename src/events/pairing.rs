//! Pairing rules between marker keys.
//!
//! A rule links a start key to a partner key (for example a reach onset and
//! its matching release). Rules are directional and each key has at most one
//! partner. What marking a paired key does is decided by [`PairingMode`].

use serde::{Deserialize, Serialize};

use crate::events::Markers;

/// What happens to the partner key when a paired key is marked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingMode {
    /// Rules only relate markers on the timeline; nothing is marked implicitly.
    #[default]
    Link,
    /// The partner is marked at the same frame.
    SameFrame,
    /// The partner is marked `offset` frames after (or before) the mark.
    Offset,
}

/// Pairing rules keyed by marker key name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pairing {
    pub enabled: bool,
    pub mode: PairingMode,
    pub offset: i64,
    rules: Vec<(String, String)>,
}

/// A start marker matched with the following partner marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSpan {
    pub start_key: String,
    pub end_key: String,
    pub start: u64,
    pub end: u64,
}

impl Pairing {
    pub fn new(enabled: bool, mode: PairingMode, offset: i64) -> Self {
        Self {
            enabled,
            mode,
            offset,
            rules: Vec::new(),
        }
    }

    /// Link `key` to `partner`, replacing any previous partner of `key`.
    pub fn set_rule(&mut self, key: impl Into<String>, partner: impl Into<String>) {
        let key = key.into();
        let partner = partner.into();
        match self.rules.iter_mut().find(|(k, _)| *k == key) {
            Some(rule) => rule.1 = partner,
            None => self.rules.push((key, partner)),
        }
    }

    pub fn rules(&self) -> &[(String, String)] {
        &self.rules
    }

    pub fn partner_of(&self, key: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, p)| p.as_str())
    }

    /// Frame at which the partner of a mark at `frame` is placed, if any.
    pub fn implicit_frame(&self, frame: u64) -> Option<u64> {
        if !self.enabled {
            return None;
        }
        match self.mode {
            PairingMode::Link => None,
            PairingMode::SameFrame => Some(frame),
            PairingMode::Offset => Some(frame.saturating_add_signed(self.offset)),
        }
    }

    /// Match each start marker with the next later partner marker.
    ///
    /// Matching is greedy: every partner marker is used at most once, and a
    /// partner marker that precedes all remaining starts is skipped.
    pub fn spans(&self, markers: &Markers) -> Vec<PairSpan> {
        if !self.enabled {
            return Vec::new();
        }
        let mut spans = Vec::new();
        for (start_key, end_key) in &self.rules {
            let starts = markers.get(start_key).unwrap_or(&[]);
            let ends = markers.get(end_key).unwrap_or(&[]);
            let (mut i, mut j) = (0, 0);
            while i < starts.len() && j < ends.len() {
                if starts[i] < ends[j] {
                    spans.push(PairSpan {
                        start_key: start_key.clone(),
                        end_key: end_key.clone(),
                        start: starts[i],
                        end: ends[j],
                    });
                    i += 1;
                }
                j += 1;
            }
        }
        spans
    }
}
