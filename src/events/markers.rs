//! The marker mapping: marker key to sorted, duplicate-free frame indices.
//!
//! Keys keep the order in which they were first used, which is also the
//! order the event file lists them in. A key that loses its last frame
//! keeps an empty track.

/// Frames recorded under one marker key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    key: String,
    frames: Vec<u64>,
}

impl Track {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Frames in ascending order.
    pub fn frames(&self) -> &[u64] {
        &self.frames
    }

    pub fn contains(&self, frame: u64) -> bool {
        self.frames.binary_search(&frame).is_ok()
    }

    fn insert(&mut self, frame: u64) -> bool {
        match self.frames.binary_search(&frame) {
            Ok(_) => false,
            Err(pos) => {
                self.frames.insert(pos, frame);
                true
            }
        }
    }

    fn remove(&mut self, frame: u64) -> bool {
        match self.frames.binary_search(&frame) {
            Ok(pos) => {
                self.frames.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Closest frame to `frame` within `tolerance`; ties go to the earlier frame.
    fn nearest(&self, frame: u64, tolerance: u64) -> Option<u64> {
        let pos = self.frames.partition_point(|&f| f < frame);
        let after = self.frames.get(pos).copied();
        let before = pos.checked_sub(1).map(|i| self.frames[i]);

        let best = match (before, after) {
            (Some(b), Some(a)) => {
                if frame - b <= a - frame {
                    b
                } else {
                    a
                }
            }
            (Some(b), None) => b,
            (None, Some(a)) => a,
            (None, None) => return None,
        };
        (best.abs_diff(frame) <= tolerance).then_some(best)
    }
}

/// Insertion-ordered mapping from marker key to frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers {
    tracks: Vec<Track>,
}

impl Markers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from raw `(key, frames)` pairs.
    ///
    /// Each frame list is sorted and de-duplicated; repeated keys are merged
    /// into the first occurrence.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<u64>)>,
        K: Into<String>,
    {
        let mut markers = Self::new();
        for (key, frames) in pairs {
            let track = markers.track_mut(&key.into());
            for frame in frames {
                track.insert(frame);
            }
        }
        markers
    }

    pub fn get(&self, key: &str) -> Option<&[u64]> {
        self.track(key).map(|t| t.frames())
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tracks.iter().map(|t| t.key())
    }

    pub fn contains(&self, key: &str, frame: u64) -> bool {
        self.track(key).is_some_and(|t| t.contains(frame))
    }

    /// True when no key holds any frame (empty tracks do not count).
    pub fn is_empty(&self) -> bool {
        self.tracks.iter().all(|t| t.frames.is_empty())
    }

    /// Total number of marked frames over all keys.
    pub fn len(&self) -> usize {
        self.tracks.iter().map(|t| t.frames.len()).sum()
    }

    /// First key (in key order) that holds `frame`.
    pub fn owner_of(&self, frame: u64) -> Option<&str> {
        self.tracks
            .iter()
            .find(|t| t.contains(frame))
            .map(|t| t.key())
    }

    /// Every key holding `frame` other than `key`.
    pub(crate) fn other_owners(&self, key: &str, frame: u64) -> Vec<String> {
        self.tracks
            .iter()
            .filter(|t| t.key != key && t.contains(frame))
            .map(|t| t.key.clone())
            .collect()
    }

    /// Every marked frame, sorted, duplicates kept once.
    pub fn all_frames(&self) -> Vec<u64> {
        let mut frames: Vec<u64> = self
            .tracks
            .iter()
            .flat_map(|t| t.frames.iter().copied())
            .collect();
        frames.sort_unstable();
        frames.dedup();
        frames
    }

    pub(crate) fn insert(&mut self, key: &str, frame: u64) -> bool {
        self.track_mut(key).insert(frame)
    }

    pub(crate) fn remove(&mut self, key: &str, frame: u64) -> bool {
        self.tracks
            .iter_mut()
            .find(|t| t.key == key)
            .is_some_and(|t| t.remove(frame))
    }

    pub(crate) fn nearest(&self, key: &str, frame: u64, tolerance: u64) -> Option<u64> {
        self.track(key).and_then(|t| t.nearest(frame, tolerance))
    }

    /// Neighbours of `frame` within its own key, as `(previous, next)`.
    pub(crate) fn neighbours(&self, key: &str, frame: u64) -> (Option<u64>, Option<u64>) {
        let Some(track) = self.track(key) else {
            return (None, None);
        };
        let lower = track.frames.partition_point(|&f| f < frame);
        let upper = track.frames.partition_point(|&f| f <= frame);
        let prev = lower.checked_sub(1).map(|i| track.frames[i]);
        let next = track.frames.get(upper).copied();
        (prev, next)
    }

    fn track(&self, key: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.key == key)
    }

    fn track_mut(&mut self, key: &str) -> &mut Track {
        let pos = match self.tracks.iter().position(|t| t.key == key) {
            Some(pos) => pos,
            None => {
                self.tracks.push(Track {
                    key: key.to_string(),
                    frames: Vec::new(),
                });
                self.tracks.len() - 1
            }
        };
        &mut self.tracks[pos]
    }
}
