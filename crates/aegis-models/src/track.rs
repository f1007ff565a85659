//! Upstream track input and the bounded per-identity position history.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// A single detector/tracker output for one identity in one frame.
///
/// Owned by the external tracker; the core treats each record as immutable
/// input and never mutates it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub track_id: u64,
    pub class_id: u32,
    pub class_name: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Axis-aligned pixel bounding box `(x1, y1, x2, y2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box center in pixel coordinates.
    pub fn center(&self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).max(0.0)
    }

    /// Clamp the box to `[0, width] x [0, height]` frame bounds.
    pub fn clamp_to_frame(&self, width: f64, height: f64) -> Self {
        Self {
            x1: self.x1.clamp(0.0, width),
            y1: self.y1.clamp(0.0, height),
            x2: self.x2.clamp(0.0, width),
            y2: self.y2.clamp(0.0, height),
        }
    }
}

/// A single position sample recorded by the history manager.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub x: f64,
    pub y: f64,
    pub frame_id: u64,
    pub t: f64,
}

/// Bounded sliding window of position samples for one identity.
///
/// Records are strictly increasing in `frame_id`; once `capacity` is
/// reached the oldest record is evicted on insert.
#[derive(Debug, Clone)]
pub struct TrackHistory {
    records: VecDeque<PositionRecord>,
    capacity: usize,
    created_at: f64,
    last_seen_frame: u64,
}

impl TrackHistory {
    pub fn new(capacity: usize, first: PositionRecord) -> Self {
        let mut records = VecDeque::with_capacity(capacity);
        records.push_back(first);
        Self {
            records,
            capacity,
            created_at: first.t,
            last_seen_frame: first.frame_id,
        }
    }

    /// Append a new sample, evicting the oldest if at capacity.
    ///
    /// Silently ignores out-of-order samples (`frame_id` not strictly
    /// greater than the last recorded one) to preserve the monotonicity
    /// invariant.
    pub fn push(&mut self, record: PositionRecord) {
        if let Some(last) = self.records.back() {
            if record.frame_id <= last.frame_id {
                return;
            }
        }
        if self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.last_seen_frame = record.frame_id;
        self.records.push_back(record);
    }

    pub fn records(&self) -> &VecDeque<PositionRecord> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last_seen_frame(&self) -> u64 {
        self.last_seen_frame
    }

    pub fn created_at(&self) -> f64 {
        self.created_at
    }

    /// Elapsed time between the first and last recorded sample.
    pub fn duration(&self) -> f64 {
        match (self.records.front(), self.records.back()) {
            (Some(first), Some(last)) => (last.t - first.t).max(0.0),
            _ => 0.0,
        }
    }

    /// Last `n` samples, oldest first. Returns fewer if history is shorter.
    pub fn last_n(&self, n: usize) -> Vec<PositionRecord> {
        let len = self.records.len();
        let skip = len.saturating_sub(n);
        self.records.iter().skip(skip).copied().collect()
    }
}
