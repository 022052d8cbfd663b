use serde::{Deserialize, Serialize};

use crate::error::SurfaceError;

/// Stroke endpoint shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

/// Stroke corner shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

/// Pen settings for waveform strokes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
}

impl Default for LineStyle {
    fn default() -> Self {
        // Round cap/join keeps steep QRS edges from leaving miter spikes.
        LineStyle {
            width: 1.0,
            cap: LineCap::Round,
            join: LineJoin::Round,
        }
    }
}

/// The 2D drawing capability the renderer draws against.
///
/// Concrete surfaces (canvas, framebuffer, plotter backend) live outside this
/// crate; the renderer only ever issues these primitives and allocates nothing
/// on the surface itself.
pub trait DrawSurface {
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<(), SurfaceError>;
    fn move_to(&mut self, x: f32, y: f32) -> Result<(), SurfaceError>;
    fn line_to(&mut self, x: f32, y: f32) -> Result<(), SurfaceError>;
    /// Commit everything traced since the last stroke.
    fn stroke_path(&mut self) -> Result<(), SurfaceError>;
    fn set_line_style(&mut self, style: &LineStyle) -> Result<(), SurfaceError>;
}

/// One recorded draw primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawOp {
    ClearRect { x: f32, y: f32, width: f32, height: f32 },
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    Stroke,
    SetLineStyle(LineStyle),
}

/// Surface that records every primitive instead of rasterizing.
///
/// Useful for headless capture and for asserting on emitted draw commands.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line_to_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::LineTo { .. }))
            .count()
    }

    pub fn stroke_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Stroke)).count()
    }

    pub fn reset(&mut self) {
        self.ops.clear();
    }
}

impl DrawSurface for RecordingSurface {
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<(), SurfaceError> {
        self.ops.push(DrawOp::ClearRect { x, y, width, height });
        Ok(())
    }

    fn move_to(&mut self, x: f32, y: f32) -> Result<(), SurfaceError> {
        self.ops.push(DrawOp::MoveTo { x, y });
        Ok(())
    }

    fn line_to(&mut self, x: f32, y: f32) -> Result<(), SurfaceError> {
        self.ops.push(DrawOp::LineTo { x, y });
        Ok(())
    }

    fn stroke_path(&mut self) -> Result<(), SurfaceError> {
        self.ops.push(DrawOp::Stroke);
        Ok(())
    }

    fn set_line_style(&mut self, style: &LineStyle) -> Result<(), SurfaceError> {
        self.ops.push(DrawOp::SetLineStyle(*style));
        Ok(())
    }
}
