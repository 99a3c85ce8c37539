//! Draw-command interface between the simulation and whatever puts pixels (or
//! characters) on screen.

use anyhow::Result;

use crate::math::Rect;

/// Opaque visual tag; the render target decides what each one looks like.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visual {
    Sky,
    Platform,
    Player,
    Goal,
}

/// One screen-space rectangle to draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    pub rect: Rect,
    pub visual: Visual,
}

impl DrawCommand {
    pub fn new(rect: Rect, visual: Visual) -> Self {
        Self { rect, visual }
    }
}

/// Anything that can present a frame of draw commands.
pub trait RenderTarget {
    /// Start a new frame.
    fn begin_frame(&mut self) -> Result<()>;

    /// Queue a rectangle; commands are painted in submission order.
    fn draw(&mut self, command: &DrawCommand) -> Result<()>;

    /// Draw a line of text at a screen position (HUD, messages).
    fn draw_text(&mut self, _x: f32, _y: f32, _text: &str) -> Result<()> {
        Ok(())
    }

    /// Present the frame.
    fn end_frame(&mut self) -> Result<()>;
}

/// Render target that keeps the last presented frame in memory.
///
/// Used for headless runs and tests.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pending: Vec<DrawCommand>,
    pending_text: Vec<String>,
    last_frame: Vec<DrawCommand>,
    last_text: Vec<String>,
    frames_presented: u64,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> &[DrawCommand] {
        &self.last_frame
    }

    pub fn last_text(&self) -> &[String] {
        &self.last_text
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl RenderTarget for FrameRecorder {
    fn begin_frame(&mut self) -> Result<()> {
        self.pending.clear();
        self.pending_text.clear();
        Ok(())
    }

    fn draw(&mut self, command: &DrawCommand) -> Result<()> {
        self.pending.push(*command);
        Ok(())
    }

    fn draw_text(&mut self, _x: f32, _y: f32, text: &str) -> Result<()> {
        self.pending_text.push(text.to_owned());
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        self.last_frame = std::mem::take(&mut self.pending);
        self.last_text = std::mem::take(&mut self.pending_text);
        self.frames_presented += 1;
        Ok(())
    }
}
