use std::time::{Duration, Instant};

use anyhow::Result;

use crate::input::{InputSnapshot, InputSource};
use crate::render::RenderTarget;
use crate::world::World;

/// Configuration values for the frame loop.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Sleep away the rest of each frame budget. Disable for headless runs.
    pub limit_frame_rate: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "Pixel Hop".into(),
            width: 1024,
            height: 768,
            fps: 60,
            limit_frame_rate: true,
        }
    }
}

/// Main entrypoint for running a game.
pub struct Engine {
    config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create a new engine instance with default configuration.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Override the title reported to the front end.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// Override the viewport size.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Override the target tick rate. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.config.fps = fps.max(1);
        self
    }

    /// Enable or disable frame pacing.
    #[must_use]
    pub fn with_frame_limit(mut self, limit: bool) -> Self {
        self.config.limit_frame_rate = limit;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the game until the input source reports quit or the game requests
    /// exit. Returns the number of frames simulated.
    ///
    /// Each frame is strictly sequential: poll input, update, draw, then yield
    /// to the host before pacing to the target rate.
    pub fn run<G: Game>(
        &self,
        game: &mut G,
        input: &mut dyn InputSource,
        target: &mut dyn RenderTarget,
    ) -> Result<u64> {
        let config = &self.config;
        let frame_budget = Duration::from_secs_f64(1.0 / f64::from(config.fps.max(1)));

        let mut ctx = EngineContext::new(config);
        game.init(&mut ctx)?;
        log::info!(
            "Starting '{}' at {}x{}, {} fps",
            config.title,
            config.width,
            config.height,
            config.fps
        );

        let mut last_frame = Instant::now();
        loop {
            let frame_start = Instant::now();
            let snapshot = input.poll()?;
            if snapshot.quit {
                log::info!("Quit requested after {} frames", ctx.frame);
                break;
            }

            ctx.begin_frame(snapshot, frame_start - last_frame);
            last_frame = frame_start;

            game.update(&mut ctx)?;
            if ctx.exit_requested {
                log::info!("Game requested exit after {} frames", ctx.frame);
                break;
            }
            game.draw(&mut ctx, target)?;

            std::thread::yield_now();
            if config.limit_frame_rate {
                let spent = frame_start.elapsed();
                if spent < frame_budget {
                    std::thread::sleep(frame_budget - spent);
                }
            }
        }

        Ok(ctx.frame)
    }
}

/// Shared context provided to game code each frame.
pub struct EngineContext {
    delta_time: Duration,
    elapsed_time: Duration,
    frame: u64,
    viewport: (u32, u32),
    input: InputSnapshot,
    exit_requested: bool,
}

impl EngineContext {
    fn new(config: &EngineConfig) -> Self {
        Self {
            delta_time: Duration::ZERO,
            elapsed_time: Duration::ZERO,
            frame: 0,
            viewport: (config.width, config.height),
            input: InputSnapshot::default(),
            exit_requested: false,
        }
    }

    fn begin_frame(&mut self, input: InputSnapshot, delta: Duration) {
        self.input = input;
        self.delta_time = delta;
        self.elapsed_time += delta;
        self.frame += 1;
    }

    /// Duration between the current and previous frames.
    pub fn delta_time(&self) -> Duration {
        self.delta_time
    }

    /// Total time elapsed since the engine started running.
    pub fn elapsed_time(&self) -> Duration {
        self.elapsed_time
    }

    /// Number of the frame being processed, starting at 1.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// This frame's input snapshot.
    pub fn input(&self) -> &InputSnapshot {
        &self.input
    }

    /// Request that the engine exit after the current update.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }
}

/// Trait implemented by game code to hook into the engine lifecycle.
pub trait Game {
    /// Called once before the first frame.
    fn init(&mut self, _ctx: &mut EngineContext) -> Result<()> {
        Ok(())
    }

    /// Update game state. Called once per frame before drawing.
    fn update(&mut self, ctx: &mut EngineContext) -> Result<()>;

    /// Draw the current frame.
    fn draw(&mut self, ctx: &mut EngineContext, target: &mut dyn RenderTarget) -> Result<()>;
}

/// A platformer session runs directly under the engine: one physics tick per
/// frame.
impl Game for World {
    fn update(&mut self, ctx: &mut EngineContext) -> Result<()> {
        self.tick(ctx.input());
        Ok(())
    }

    fn draw(&mut self, _ctx: &mut EngineContext, target: &mut dyn RenderTarget) -> Result<()> {
        self.render(target)
    }
}
