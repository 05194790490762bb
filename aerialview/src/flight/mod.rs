//! Pose sources.
//!
//! A simulator feeds camera poses to the service one frame at a time.
//! [`PoseSource`] is that seam; [`StraightLineFlight`] is a simple source
//! that holds a heading at constant ground speed.

use crate::coord::{destination_point, MAX_LAT, MIN_LAT};
use crate::request::GeoPose;

/// Supplies successive camera poses.
pub trait PoseSource {
    /// The pose for the current frame.
    fn current(&self) -> GeoPose;

    /// Advance the simulation by `dt` seconds.
    ///
    /// # Returns
    ///
    /// The new pose, or `None` when the source is exhausted.
    fn advance(&mut self, dt: f64) -> Option<GeoPose>;
}

/// Constant-heading, constant-speed flight along a great circle.
///
/// The heading is held fixed at every step, like an autopilot in heading
/// hold mode. Flight stops before leaving the Web Mercator latitude range.
#[derive(Debug, Clone)]
pub struct StraightLineFlight {
    pose: GeoPose,
    ground_speed: f64,
    frames_left: Option<usize>,
}

impl StraightLineFlight {
    /// Start at `start`, moving at `ground_speed` meters per second along
    /// `start.bearing`.
    pub fn new(start: GeoPose, ground_speed: f64) -> Self {
        Self {
            pose: start,
            ground_speed,
            frames_left: None,
        }
    }

    /// Stop after `frames` further steps.
    pub fn with_max_steps(mut self, frames: usize) -> Self {
        self.frames_left = Some(frames);
        self
    }

    /// Ground speed in meters per second.
    pub fn ground_speed(&self) -> f64 {
        self.ground_speed
    }
}

impl PoseSource for StraightLineFlight {
    fn current(&self) -> GeoPose {
        self.pose
    }

    fn advance(&mut self, dt: f64) -> Option<GeoPose> {
        if let Some(left) = self.frames_left.as_mut() {
            if *left == 0 {
                return None;
            }
            *left -= 1;
        }

        let distance = self.ground_speed * dt;
        let (lat, lon) = destination_point(
            self.pose.latitude,
            self.pose.longitude,
            distance,
            self.pose.bearing,
        );
        if !(MIN_LAT..=MAX_LAT).contains(&lat) {
            self.frames_left = Some(0);
            return None;
        }

        self.pose = GeoPose::new(lat, lon, self.pose.bearing);
        Some(self.pose)
    }
}
