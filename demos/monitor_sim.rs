//! Headless monitor simulation: three synthetic vitals lanes (ECG, pulse,
//! respiration) pushed in irregular bursts, drained by a 40 ms tick against a
//! recording surface. Ends with enough silence to trigger the idle
//! auto-clear. Run with `RUST_LOG=debug` to watch the scheduler transitions.

use std::thread;
use std::time::{Duration, Instant};

use rand::{rngs::StdRng, Rng, SeedableRng};
use vitalsweep::{
    ChannelConfig, DrawSurface, LineStyle, RecordingSurface, SweepError, SweepScheduler,
};

const TICK: Duration = Duration::from_millis(40);
const SAMPLE_RATE_HZ: f32 = 125.0;

struct VitalsGen {
    freq_hz: f32,
    amp: f32,
    noise: f32,
    phase: f32,
}

impl VitalsGen {
    fn batch(&mut self, n: usize, rng: &mut StdRng) -> Vec<f32> {
        (0..n)
            .map(|_| {
                self.phase += 2.0 * std::f32::consts::PI * self.freq_hz / SAMPLE_RATE_HZ;
                512.0 + self.phase.sin() * self.amp + rng.gen_range(-self.noise..self.noise)
            })
            .collect()
    }
}

fn lane(start_y: f32, scale_ratio: f32) -> ChannelConfig {
    let mut cfg = ChannelConfig::new(480.0, 120.0, 512.0);
    cfg.start_y = start_y;
    cfg.scale_ratio = scale_ratio;
    cfg.step = 0.8;
    cfg.draw_count = 6;
    cfg.max_cache_size = 4;
    cfg
}

fn main() -> Result<(), SweepError> {
    env_logger::init();
    let mut rng = StdRng::from_entropy();

    let mut gens = [
        VitalsGen { freq_hz: 1.3, amp: 180.0, noise: 6.0, phase: 0.0 }, // ECG-ish
        VitalsGen { freq_hz: 1.3, amp: 90.0, noise: 3.0, phase: 1.2 }, // pulse
        VitalsGen { freq_hz: 0.25, amp: 60.0, noise: 2.0, phase: 0.0 }, // respiration
    ];

    let mut scheduler = SweepScheduler::new(
        [lane(0.0, 0.20), lane(120.0, 0.25), lane(240.0, 0.35)],
        TICK,
    )?;

    let mut surface = RecordingSurface::new();
    surface.set_line_style(&LineStyle::default())?;

    // Bursty producer: batches land every 80-320 ms with 5-30 samples each,
    // while the consumer ticks steadily.
    let started = Instant::now();
    let mut next_burst = started;
    while started.elapsed() < Duration::from_secs(4) {
        let now = Instant::now();
        if now >= next_burst {
            let n = rng.gen_range(5..=30);
            let batches: Vec<Vec<f32>> =
                gens.iter_mut().map(|g| g.batch(n, &mut rng)).collect();
            scheduler.push(batches);
            next_burst = now + Duration::from_millis(rng.gen_range(80..=320));
        }
        scheduler.on_tick(&mut surface);
        thread::sleep(TICK);
    }

    println!(
        "burst phase done: {} segments drawn, {} strokes, backlog {:?}",
        surface.line_to_count(),
        surface.stroke_count(),
        scheduler
            .channels()
            .iter()
            .map(|c| c.pending_samples())
            .collect::<Vec<_>>()
    );

    // Go silent: after two seconds the scheduler clears the lanes and pauses.
    while scheduler.is_running() {
        scheduler.on_tick(&mut surface);
        thread::sleep(TICK);
    }
    println!(
        "idle: scheduler paused itself, {} ops total recorded",
        surface.ops.len()
    );
    Ok(())
}
