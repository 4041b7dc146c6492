//! Temporal landmark smoothing
//!
//! Each category keeps a short FIFO of recent landmark sets and replaces the
//! newest set with the per-index mean across the window once it is full.

use std::collections::VecDeque;

use crate::landmarks::{Landmark, LandmarkSet};

/// Default window for pose and hand landmarks
pub const DEFAULT_POSE_WINDOW: usize = 5;
/// Default window for face landmarks
pub const DEFAULT_FACE_WINDOW: usize = 3;
/// Default window for hand landmarks
pub const DEFAULT_HAND_WINDOW: usize = 5;

/// Fixed-window moving average over landmark sets
#[derive(Debug, Clone)]
pub struct LandmarkSmoother {
    /// Buffered sets, oldest first
    history: VecDeque<LandmarkSet>,
    /// Window size
    window_size: usize,
}

impl LandmarkSmoother {
    /// Create a smoother with the given window size (at least 1)
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            history: VecDeque::with_capacity(window_size + 1),
            window_size,
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Number of sets currently buffered
    pub fn buffered(&self) -> usize {
        self.history.len()
    }

    /// Whether the window is full and output is averaged
    pub fn is_warm(&self) -> bool {
        self.history.len() >= self.window_size
    }

    /// Push a new set and return the smoothed result.
    ///
    /// During warm-up the input is returned unchanged. Once warm, every
    /// index is averaged over the buffered sets that contain it; an index
    /// with no samples is dropped, so the output is compacted and may be
    /// shorter than the input.
    pub fn smooth(&mut self, landmarks: &LandmarkSet) -> LandmarkSet {
        self.history.push_back(landmarks.clone());
        if self.history.len() > self.window_size {
            self.history.pop_front();
        }

        if self.history.len() < self.window_size {
            return landmarks.clone();
        }

        let max_len = self.history.iter().map(LandmarkSet::len).max().unwrap_or(0);
        let mut smoothed = Vec::with_capacity(max_len);

        for idx in 0..max_len {
            let mut sum = Landmark::default();
            let mut count = 0usize;
            for lm in self.history.iter().filter_map(|frame| frame.get(idx)) {
                sum.x += lm.x;
                sum.y += lm.y;
                sum.z += lm.z;
                sum.visibility += lm.visibility;
                count += 1;
            }

            if count > 0 {
                let n = count as f32;
                smoothed.push(Landmark {
                    x: sum.x / n,
                    y: sum.y / n,
                    z: sum.z / n,
                    visibility: sum.visibility / n,
                });
            }
        }

        if smoothed.len() < max_len {
            tracing::debug!(
                dropped = max_len - smoothed.len(),
                "Smoothed set compacted missing indices"
            );
        }

        LandmarkSet::from_dense(smoothed)
    }

    /// Drop all buffered history so the next session starts cold
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

/// Window sizes per category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSizes {
    pub pose: usize,
    pub face: usize,
    pub hand: usize,
}

impl Default for WindowSizes {
    fn default() -> Self {
        Self {
            pose: DEFAULT_POSE_WINDOW,
            face: DEFAULT_FACE_WINDOW,
            hand: DEFAULT_HAND_WINDOW,
        }
    }
}

/// Smoothers for one tracked subject. Left and right hands share a window.
#[derive(Debug, Clone)]
pub struct SubjectSmoothers {
    pub pose: LandmarkSmoother,
    pub face: LandmarkSmoother,
    pub hands: LandmarkSmoother,
}

impl SubjectSmoothers {
    fn new(sizes: WindowSizes) -> Self {
        Self {
            pose: LandmarkSmoother::new(sizes.pose),
            face: LandmarkSmoother::new(sizes.face),
            hands: LandmarkSmoother::new(sizes.hand),
        }
    }

    fn reset(&mut self) {
        self.pose.reset();
        self.face.reset();
        self.hands.reset();
    }
}

/// All smoothing windows of a session, one slot per subject index
#[derive(Debug, Clone)]
pub struct SmoothingWindows {
    sizes: WindowSizes,
    subjects: Vec<SubjectSmoothers>,
}

impl SmoothingWindows {
    pub fn new(sizes: WindowSizes) -> Self {
        Self {
            sizes,
            subjects: Vec::new(),
        }
    }

    /// Smoothers for subject `slot`, created on first use
    pub fn subject(&mut self, slot: usize) -> &mut SubjectSmoothers {
        while self.subjects.len() <= slot {
            self.subjects.push(SubjectSmoothers::new(self.sizes));
        }
        &mut self.subjects[slot]
    }

    /// Number of subject slots allocated so far
    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    /// Clear every window
    pub fn reset(&mut self) {
        for subject in &mut self.subjects {
            subject.reset();
        }
    }

    pub fn sizes(&self) -> WindowSizes {
        self.sizes
    }
}

impl Default for SmoothingWindows {
    fn default() -> Self {
        Self::new(WindowSizes::default())
    }
}
