use serde::{Deserialize, Serialize};

use crate::error::SweepError;

/// Geometry and pacing for one waveform lane. Fixed at construction.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Sweep width in surface units. Must be positive.
    pub width: f32,
    /// Lane height in surface units. Must be positive.
    pub height: f32,
    /// Raw sample value that maps onto the baseline.
    pub median: f32,
    /// Erase the lane rectangle when the scheduler goes idle.
    pub clear_on_idle: bool,
    /// Samples plotted per drain iteration.
    pub draw_count: usize,
    /// Vertical origin of the trace, in surface units from the lane top.
    pub base_line: f32,
    /// Horizontal advance per sample.
    pub step: f32,
    /// Vertical units per raw sample unit of deviation from the median.
    pub scale_ratio: f32,
    /// Queue depth at which a single tick keeps draining batches until the
    /// backlog drops below this again. Zero disables catch-up entirely.
    pub max_cache_size: usize,
    /// Left edge of the lane.
    pub start_x: f32,
    /// Top edge of the lane.
    pub start_y: f32,
    /// Width of the wipe strip erased just ahead of the sweep cursor.
    pub padding: f32,
}

impl ChannelConfig {
    /// Defaults mirror the monitor widget: one sample per tick, unit step and
    /// scale, baseline centered in the lane, 16-unit wipe strip, no catch-up.
    pub fn new(width: f32, height: f32, median: f32) -> Self {
        Self {
            width,
            height,
            median,
            clear_on_idle: true,
            draw_count: 1,
            base_line: height / 2.0,
            step: 1.0,
            scale_ratio: 1.0,
            max_cache_size: 0,
            start_x: 0.0,
            start_y: 0.0,
            padding: 16.0,
        }
    }

    pub fn validate(&self) -> Result<(), SweepError> {
        if !(self.width > 0.0) {
            return Err(SweepError::InvalidWidth(self.width));
        }
        if !(self.height > 0.0) {
            return Err(SweepError::InvalidHeight(self.height));
        }
        Ok(())
    }
}
