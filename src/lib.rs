//! Streaming sweep renderer for continuous physiological waveforms (ECG,
//! pulse, respiration), extracted from a patient-monitor UI and rewritten in
//! Rust.
//!
//! Sample batches arrive in irregular bursts; a fixed-cadence tick drains each
//! lane's buffer onto a [`DrawSurface`], catching up bounded amounts when the
//! producer outpaces drawing and clearing/pausing after sustained silence.
//!
//! Wire decoding, the concrete surface, and grid decoration live outside this
//! crate; see [`DrawSurface`] for the primitives the renderer emits.

pub mod channel;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod surface;

pub use channel::ChannelRenderer;
pub use config::ChannelConfig;
pub use error::{SurfaceError, SweepError};
pub use scheduler::{ManualTicker, SweepScheduler, TickHandle, IDLE_TIMEOUT};
pub use surface::{DrawOp, DrawSurface, LineCap, LineJoin, LineStyle, RecordingSurface};
