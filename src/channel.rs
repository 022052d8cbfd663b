use std::collections::VecDeque;

use crate::config::ChannelConfig;
use crate::error::{SurfaceError, SweepError};
use crate::surface::DrawSurface;

/// Sentinel cursor X meaning "the next slice starts a fresh sweep".
const SWEEP_START: f32 = -1.0;

/// One waveform lane: buffered sample batches plus the sweep cursor.
///
/// Batches arrive via [`enqueue`](ChannelRenderer::enqueue) (producer side) and
/// are drained by [`tick`](ChannelRenderer::tick) (consumer side, driven by the
/// scheduler). The batch currently being drained is consumed through a head
/// index rather than by shifting elements out of the front.
pub struct ChannelRenderer {
    config: ChannelConfig,
    queue: VecDeque<Vec<f32>>,
    current: Vec<f32>,
    consumed: usize,
    x: f32,
    y: f32,
}

impl ChannelRenderer {
    pub fn new(config: ChannelConfig) -> Result<Self, SweepError> {
        config.validate()?;
        Ok(Self {
            config,
            queue: VecDeque::new(),
            current: Vec::new(),
            consumed: 0,
            x: SWEEP_START,
            y: config.base_line,
        })
    }

    /// Append one arrival batch. Empty batches are dropped so the drain loop
    /// never pops a batch it cannot make progress on.
    pub fn enqueue(&mut self, batch: Vec<f32>) {
        if batch.is_empty() {
            return;
        }
        self.queue.push_back(batch);
    }

    /// Drain and draw for one tick. Returns whether anything was drawn.
    ///
    /// Draws up to `draw_count` samples per iteration. Below the
    /// `max_cache_size` threshold at most one queued batch is started per
    /// tick; at or above it the loop keeps draining within this tick until
    /// the backlog drops under the threshold again (catch-up) or the queue
    /// runs dry.
    ///
    /// With `coalesce` the stroke is left open for the caller to commit once
    /// per tick; otherwise each slice commits immediately.
    pub fn tick(
        &mut self,
        surface: &mut dyn DrawSurface,
        coalesce: bool,
    ) -> Result<bool, SurfaceError> {
        let mut produced = false;
        loop {
            if self.consumed < self.current.len() {
                let remaining = self.current.len() - self.consumed;
                let n = remaining.min(self.config.draw_count.max(1));
                self.draw_slice(surface, n, coalesce)?;
                produced = true;
                if self.config.max_cache_size == 0
                    || self.queue.len() < self.config.max_cache_size
                {
                    return Ok(true);
                }
                // Backlogged: keep draining within this tick.
                continue;
            }
            match self.queue.pop_front() {
                Some(batch) => {
                    self.current = batch;
                    self.consumed = 0;
                }
                None => return Ok(produced),
            }
        }
    }

    fn draw_slice(
        &mut self,
        surface: &mut dyn DrawSurface,
        n: usize,
        coalesce: bool,
    ) -> Result<(), SurfaceError> {
        let cfg = self.config;
        if self.x < 0.0 {
            self.x = cfg.start_x;
        }
        // Wipe a strip just ahead of the cursor so the new trace overwrites
        // the previous sweep (oscilloscope wipe).
        surface.clear_rect(self.x, cfg.start_y, cfg.padding, cfg.height)?;
        surface.move_to(self.x, self.y)?;
        for _ in 0..n {
            let sample = self.current[self.consumed];
            self.consumed += 1;
            self.x += cfg.step;
            self.y = (cfg.base_line + (cfg.median - sample) * cfg.scale_ratio).round();
            surface.line_to(self.x, self.y)?;
        }
        if !coalesce {
            surface.stroke_path()?;
        }
        if self.x >= cfg.start_x + cfg.width {
            self.x = SWEEP_START;
        }
        Ok(())
    }

    /// Erase the lane (when configured to) and rewind the cursor to the start
    /// of a sweep at the baseline. Buffered batches are kept. Idempotent.
    pub fn clear(&mut self, surface: &mut dyn DrawSurface) -> Result<(), SurfaceError> {
        if self.config.clear_on_idle {
            surface.clear_rect(
                self.config.start_x,
                self.config.start_y,
                self.config.width,
                self.config.height,
            )?;
        }
        self.x = SWEEP_START;
        self.y = self.config.base_line;
        Ok(())
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Batches waiting behind the one currently being drained.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Samples not yet drawn, across the current batch and the queue.
    pub fn pending_samples(&self) -> usize {
        let current = self.current.len() - self.consumed;
        current + self.queue.iter().map(Vec::len).sum::<usize>()
    }

    /// Last plotted point; `x == -1.0` means the next slice starts a sweep.
    pub fn cursor(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}
