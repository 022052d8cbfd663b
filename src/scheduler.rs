use std::time::{Duration, Instant};

use crate::channel::ChannelRenderer;
use crate::config::ChannelConfig;
use crate::error::SweepError;
use crate::surface::DrawSurface;

/// Silence duration after which the scheduler clears every lane and pauses.
/// Measured against wall-clock arrival time, not tick count.
pub const IDLE_TIMEOUT: Duration = Duration::from_millis(2000);

/// Cancellable periodic-tick handle owned by the scheduler.
///
/// The scheduler never spins a timer itself; it arms and disarms whatever
/// drives [`SweepScheduler::on_tick`] in the embedding environment (a UI
/// frame callback, a timer thread, a test loop). Disarming happens in the
/// same call that flips the running flag, and `on_tick` drops stale ticks
/// that slip through after a stop.
pub trait TickHandle {
    fn arm(&mut self, period: Duration);
    fn disarm(&mut self);
}

/// No-op handle for embedders that poll [`SweepScheduler::is_running`] from
/// their own loop instead of being told when to tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualTicker;

impl TickHandle for ManualTicker {
    fn arm(&mut self, _period: Duration) {}
    fn disarm(&mut self) {}
}

/// Drives a set of [`ChannelRenderer`]s from one shared drawing tick.
///
/// Producers call [`push`](Self::push) with one batch per lane; the periodic
/// tick drains every lane. When every lane has been silent past
/// [`IDLE_TIMEOUT`], the scheduler clears the lanes once and pauses itself;
/// the next push resumes it (unless the embedder called
/// [`stop`](Self::stop), which also disables auto-resume).
pub struct SweepScheduler {
    channels: Vec<ChannelRenderer>,
    tick_interval: Duration,
    ticker: Box<dyn TickHandle>,
    last_arrival: Instant,
    running: bool,
    auto_recover: bool,
    idle_cleared: bool,
}

impl SweepScheduler {
    /// Build one renderer per config. Fails on the first invalid geometry.
    pub fn new(
        configs: impl IntoIterator<Item = ChannelConfig>,
        tick_interval: Duration,
    ) -> Result<Self, SweepError> {
        Self::with_ticker(configs, tick_interval, Box::new(ManualTicker))
    }

    pub fn with_ticker(
        configs: impl IntoIterator<Item = ChannelConfig>,
        tick_interval: Duration,
        ticker: Box<dyn TickHandle>,
    ) -> Result<Self, SweepError> {
        let channels = configs
            .into_iter()
            .map(ChannelRenderer::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            channels,
            tick_interval,
            ticker,
            last_arrival: Instant::now(),
            running: false,
            // The first push is allowed to start the tick on its own.
            auto_recover: true,
            idle_cleared: false,
        })
    }

    /// Route `batches[i]` to lane `i`. Batches beyond the lane count are
    /// ignored; lanes beyond the batch count simply receive nothing.
    pub fn push(&mut self, batches: impl IntoIterator<Item = Vec<f32>>) {
        self.push_at(batches, Instant::now());
    }

    /// [`push`](Self::push) with an explicit arrival timestamp.
    pub fn push_at(&mut self, batches: impl IntoIterator<Item = Vec<f32>>, now: Instant) {
        for (channel, batch) in self.channels.iter_mut().zip(batches) {
            channel.enqueue(batch);
        }
        self.last_arrival = now;
        self.idle_cleared = false;
        if !self.running && self.auto_recover {
            log::debug!("data arrived while paused, resuming tick");
            self.start();
        }
    }

    /// Start the tick unconditionally and re-enable auto-resume.
    pub fn start(&mut self) {
        self.running = true;
        self.auto_recover = true;
        self.ticker.arm(self.tick_interval);
    }

    /// Quiesce the tick; the next push resumes it.
    pub fn pause(&mut self) {
        self.running = false;
        self.auto_recover = true;
        self.ticker.disarm();
    }

    /// Quiesce the tick; pushes keep accumulating but drawing stays off
    /// until an explicit [`start`](Self::start).
    pub fn stop(&mut self) {
        self.running = false;
        self.auto_recover = false;
        self.ticker.disarm();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn channels(&self) -> &[ChannelRenderer] {
        &self.channels
    }

    /// One drawing tick. Invoked by the periodic source at the tick interval.
    pub fn on_tick(&mut self, surface: &mut dyn DrawSurface) {
        self.tick_at(surface, Instant::now());
    }

    /// [`on_tick`](Self::on_tick) with an explicit timestamp.
    ///
    /// A surface failure in one lane is logged and does not abort the tick or
    /// the other lanes. With more than one lane, strokes are coalesced into a
    /// single commit at the end of the tick.
    pub fn tick_at(&mut self, surface: &mut dyn DrawSurface, now: Instant) {
        if !self.running {
            // Stale tick after stop/pause.
            return;
        }
        let coalesce = self.channels.len() > 1;
        let mut any_output = false;
        for (index, channel) in self.channels.iter_mut().enumerate() {
            match channel.tick(surface, coalesce) {
                Ok(produced) => any_output |= produced,
                Err(err) => {
                    log::warn!("channel {index}: draw failed, continuing: {err}");
                    // The lane had data to draw, so the tick was not idle.
                    any_output = true;
                }
            }
        }
        if coalesce && any_output {
            if let Err(err) = surface.stroke_path() {
                log::warn!("coalesced stroke failed: {err}");
            }
        }
        if any_output {
            return;
        }
        if !self.idle_cleared && now.duration_since(self.last_arrival) >= IDLE_TIMEOUT {
            log::debug!("no data for {IDLE_TIMEOUT:?}, clearing lanes and pausing");
            for (index, channel) in self.channels.iter_mut().enumerate() {
                if let Err(err) = channel.clear(surface) {
                    log::warn!("channel {index}: idle clear failed: {err}");
                }
            }
            self.idle_cleared = true;
            self.pause();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurfaceError;
    use crate::surface::{DrawOp, LineStyle, RecordingSurface};
    use std::cell::Cell;
    use std::rc::Rc;

    const TICK: Duration = Duration::from_millis(40);

    fn lane(start_y: f32) -> ChannelConfig {
        let mut cfg = ChannelConfig::new(300.0, 100.0, 512.0);
        cfg.start_y = start_y;
        cfg.draw_count = 8;
        cfg
    }

    fn two_lane_scheduler() -> SweepScheduler {
        SweepScheduler::new([lane(0.0), lane(100.0)], TICK).unwrap()
    }

    #[test]
    fn construction_fails_on_bad_geometry() {
        let bad = ChannelConfig::new(0.0, 100.0, 512.0);
        assert!(SweepScheduler::new([lane(0.0), bad], TICK).is_err());
    }

    #[test]
    fn push_routes_in_lane_order_and_ignores_extras() {
        let mut sched = two_lane_scheduler();
        sched.push([vec![1.0; 3], vec![2.0; 5], vec![3.0; 7]]);
        assert_eq!(sched.channels()[0].pending_samples(), 3);
        assert_eq!(sched.channels()[1].pending_samples(), 5);

        // Fewer batches than lanes is fine too.
        sched.push([vec![4.0; 2]]);
        assert_eq!(sched.channels()[0].pending_samples(), 5);
        assert_eq!(sched.channels()[1].pending_samples(), 5);
    }

    #[test]
    fn push_auto_starts_and_stop_disables_auto_resume() {
        let mut sched = two_lane_scheduler();
        assert!(!sched.is_running());

        sched.push([vec![500.0; 4]]);
        assert!(sched.is_running());

        sched.stop();
        sched.push([vec![500.0; 4]]);
        assert!(!sched.is_running());
        // Data still accumulated while stopped.
        assert_eq!(sched.channels()[0].pending_samples(), 8);

        sched.start();
        assert!(sched.is_running());

        sched.pause();
        sched.push([vec![500.0; 4]]);
        assert!(sched.is_running());
    }

    #[test]
    fn stale_tick_after_stop_draws_nothing() {
        let mut sched = two_lane_scheduler();
        let mut surface = RecordingSurface::new();
        sched.push([vec![500.0; 4], vec![500.0; 4]]);
        sched.stop();
        sched.on_tick(&mut surface);
        assert!(surface.ops.is_empty());
    }

    #[test]
    fn single_lane_strokes_immediately_multi_lane_coalesces() {
        let mut single = SweepScheduler::new([lane(0.0)], TICK).unwrap();
        let mut surface = RecordingSurface::new();
        single.push([vec![500.0; 4]]);
        single.on_tick(&mut surface);
        assert_eq!(surface.stroke_count(), 1);

        let mut multi = two_lane_scheduler();
        let mut surface = RecordingSurface::new();
        multi.push([vec![500.0; 4], vec![500.0; 4]]);
        multi.on_tick(&mut surface);
        // Both lanes drew, one shared commit.
        assert!(surface.line_to_count() == 8);
        assert_eq!(surface.stroke_count(), 1);
    }

    #[test]
    fn all_pushed_samples_are_eventually_drawn() {
        let mut sched = two_lane_scheduler();
        let mut surface = RecordingSurface::new();
        let mut total = 0;
        for burst in [3usize, 11, 1, 6] {
            sched.push([vec![490.0; burst], vec![530.0; burst + 2]]);
            total += burst + burst + 2;
        }
        while sched.channels().iter().any(|c| c.pending_samples() > 0) {
            sched.on_tick(&mut surface);
        }
        assert_eq!(surface.line_to_count(), total);
    }

    #[test]
    fn idle_silence_clears_each_lane_once_and_pauses() {
        let mut sched = two_lane_scheduler();
        let mut surface = RecordingSurface::new();
        let t0 = Instant::now();

        sched.push_at([vec![500.0; 4], vec![500.0; 4]], t0);
        sched.tick_at(&mut surface, t0 + TICK);
        assert!(sched.is_running());

        let full_clear = |ops: &[DrawOp]| {
            ops.iter()
                .filter(|op| {
                    matches!(
                        op,
                        DrawOp::ClearRect { width, height, .. }
                            if *width == 300.0 && *height == 100.0
                    )
                })
                .count()
        };

        // Silent but under the threshold: still running, nothing cleared.
        sched.tick_at(&mut surface, t0 + Duration::from_millis(1900));
        assert!(sched.is_running());
        assert_eq!(full_clear(&surface.ops), 0);

        sched.tick_at(&mut surface, t0 + Duration::from_millis(2100));
        assert!(!sched.is_running());
        assert_eq!(full_clear(&surface.ops), 2);

        // Further stale ticks must not re-clear.
        sched.tick_at(&mut surface, t0 + Duration::from_millis(4000));
        assert_eq!(full_clear(&surface.ops), 2);

        for channel in sched.channels() {
            assert_eq!(channel.cursor(), (-1.0, 50.0));
        }

        // New data resumes drawing and re-arms the idle clear.
        sched.push_at([vec![500.0; 4], vec![500.0; 4]], t0 + Duration::from_millis(5000));
        assert!(sched.is_running());
    }

    /// Fails every primitive that lands in the lane whose top edge matches
    /// `fail_start_y`, records everything else.
    struct FlakySurface {
        inner: RecordingSurface,
        fail_start_y: f32,
    }

    impl DrawSurface for FlakySurface {
        fn clear_rect(
            &mut self,
            x: f32,
            y: f32,
            width: f32,
            height: f32,
        ) -> Result<(), SurfaceError> {
            if y == self.fail_start_y {
                return Err(SurfaceError::new("lane rejected"));
            }
            self.inner.clear_rect(x, y, width, height)
        }

        fn move_to(&mut self, x: f32, y: f32) -> Result<(), SurfaceError> {
            self.inner.move_to(x, y)
        }

        fn line_to(&mut self, x: f32, y: f32) -> Result<(), SurfaceError> {
            self.inner.line_to(x, y)
        }

        fn stroke_path(&mut self) -> Result<(), SurfaceError> {
            self.inner.stroke_path()
        }

        fn set_line_style(&mut self, style: &LineStyle) -> Result<(), SurfaceError> {
            self.inner.set_line_style(style)
        }
    }

    #[test]
    fn one_failing_lane_does_not_block_the_others() {
        let mut sched = two_lane_scheduler();
        let mut surface = FlakySurface {
            inner: RecordingSurface::new(),
            fail_start_y: 0.0,
        };
        sched.push([vec![500.0; 4], vec![500.0; 4]]);
        sched.on_tick(&mut surface);

        // Lane 0 failed on its wipe strip; lane 1 still drew its samples.
        assert_eq!(surface.inner.line_to_count(), 4);
        assert_eq!(surface.inner.stroke_count(), 1);
        assert!(sched.is_running());
    }

    /// TickHandle that records arm/disarm calls.
    #[derive(Clone)]
    struct SpyTicker {
        armed: Rc<Cell<bool>>,
        arms: Rc<Cell<usize>>,
    }

    impl TickHandle for SpyTicker {
        fn arm(&mut self, period: Duration) {
            assert_eq!(period, TICK);
            self.armed.set(true);
            self.arms.set(self.arms.get() + 1);
        }

        fn disarm(&mut self) {
            self.armed.set(false);
        }
    }

    #[test]
    fn lifecycle_arms_and_disarms_the_tick_handle() {
        let armed = Rc::new(Cell::new(false));
        let arms = Rc::new(Cell::new(0));
        let ticker = SpyTicker {
            armed: Rc::clone(&armed),
            arms: Rc::clone(&arms),
        };
        let mut sched =
            SweepScheduler::with_ticker([lane(0.0)], TICK, Box::new(ticker)).unwrap();

        sched.push([vec![500.0; 2]]);
        assert!(armed.get());

        sched.pause();
        assert!(!armed.get());

        sched.push([vec![500.0; 2]]);
        assert!(armed.get());

        sched.stop();
        assert!(!armed.get());
        sched.push([vec![500.0; 2]]);
        assert!(!armed.get());

        sched.start();
        assert!(armed.get());
        assert_eq!(arms.get(), 3);
    }
}
