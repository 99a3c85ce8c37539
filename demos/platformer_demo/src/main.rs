use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use pixelhop::{
    sandbox::{FIELD_HEIGHT, FIELD_WIDTH},
    Engine, EngineContext, FrameRecorder, Game, GameConfig, Level, RenderTarget, Sandbox,
    ScriptedInput, Vec2, World,
};
use simple_logger::SimpleLogger;

mod replay;
mod terminal;

use terminal::{TerminalInput, TerminalRenderer, TerminalSession, DEFAULT_HOLD_WINDOW};

#[derive(Parser)]
#[command(name = "platformer_demo")]
#[command(about = "Side-scrolling platformer in the terminal")]
struct Cli {
    /// Game config (JSON); defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, global = true)]
    log_level: Option<LevelFilter>,

    /// How long a key counts as held after its last press or repeat, for
    /// terminals that do not report key releases
    #[arg(long, global = true, default_value_t = DEFAULT_HOLD_WINDOW.as_millis() as u64)]
    hold_ms: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the platformer (default)
    Play {
        /// Level file (JSON); the built-in level is used when omitted
        #[arg(long)]
        level: Option<PathBuf>,
    },
    /// Free-movement sandbox with a goal square
    Sandbox,
    /// Run an input script without a terminal and print the final state as JSON
    Replay {
        /// Input script (JSON array of steps)
        script: PathBuf,

        #[arg(long)]
        level: Option<PathBuf>,
    },
}

/// Platformer session with a one-line HUD.
struct PlatformerDemo {
    world: World,
}

impl PlatformerDemo {
    fn hud(&self) -> String {
        let player = self.world.player();
        format!(
            "x={:.0} y={:.0} {} | arrows/AD move, space jump, esc quit",
            player.position.x,
            player.position.y,
            if player.grounded { "ground" } else { "air" },
        )
    }
}

impl Game for PlatformerDemo {
    fn update(&mut self, ctx: &mut EngineContext) -> Result<()> {
        self.world.tick(ctx.input());
        Ok(())
    }

    fn draw(&mut self, _ctx: &mut EngineContext, target: &mut dyn RenderTarget) -> Result<()> {
        target.begin_frame()?;
        for command in self.world.draw_commands() {
            target.draw(&command)?;
        }
        // HUD is screen-space, not affected by the camera.
        target.draw_text(0.0, 0.0, &self.hud())?;
        target.end_frame()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Play { level: None });

    // Interactive modes own the screen, so logging is off unless asked for.
    let default_level = match command {
        Commands::Replay { .. } => LevelFilter::Warn,
        _ => LevelFilter::Off,
    };
    SimpleLogger::new()
        .with_level(cli.log_level.unwrap_or(default_level))
        .init()?;

    let config = load_config(cli.config.as_deref())?;
    let hold_window = Duration::from_millis(cli.hold_ms);

    match command {
        Commands::Play { level } => play(config, level.as_deref(), hold_window),
        Commands::Sandbox => sandbox(config, hold_window),
        Commands::Replay { script, level } => run_replay(config, &script, level.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(GameConfig::default()),
    }
}

fn load_level(path: Option<&Path>, config: &GameConfig) -> Result<Level> {
    match path {
        Some(path) => Level::load_from_file(path)
            .with_context(|| format!("loading level {}", path.display())),
        None => Ok(Level::default_level(config.viewport.x, config.viewport.y)),
    }
}

fn engine_for(config: &GameConfig) -> Engine {
    Engine::new()
        .with_title(config.title.clone())
        .with_size(config.viewport.x as u32, config.viewport.y as u32)
        .with_fps(config.fps)
}

/// Run `game` in the terminal, restoring the terminal even when the game fails.
fn run_in_terminal<G: Game>(
    engine: &Engine,
    game: &mut G,
    viewport: Vec2,
    hold_window: Duration,
) -> Result<u64> {
    let session = TerminalSession::enter()?;
    let mut input = TerminalInput::spawn(session.reports_key_release(), hold_window)?;
    let mut renderer = TerminalRenderer::new(viewport)?;

    let result = engine.run(game, &mut input, &mut renderer);
    drop(input);
    drop(session);
    result
}

fn play(config: GameConfig, level_path: Option<&Path>, hold_window: Duration) -> Result<()> {
    let level = load_level(level_path, &config)?;
    let engine = engine_for(&config);
    let mut game = PlatformerDemo {
        world: World::new(config.clone(), &level),
    };

    let frames = run_in_terminal(&engine, &mut game, config.viewport, hold_window)?;
    log::info!("Played {frames} frames on level '{}'", level.name);
    Ok(())
}

fn sandbox(config: GameConfig, hold_window: Duration) -> Result<()> {
    let engine = engine_for(&config).with_size(FIELD_WIDTH as u32, FIELD_HEIGHT as u32);
    let mut game = Sandbox::default();

    let frames = run_in_terminal(
        &engine,
        &mut game,
        Vec2::new(FIELD_WIDTH, FIELD_HEIGHT),
        hold_window,
    )?;
    log::info!("Sandbox ran {frames} frames");
    Ok(())
}

fn run_replay(config: GameConfig, script: &Path, level_path: Option<&Path>) -> Result<()> {
    let level = load_level(level_path, &config)?;
    let frames = replay::load_script(script)?;
    log::info!("Replaying {} ticks on level '{}'", frames.len(), level.name);

    let mut world = World::new(config.clone(), &level);
    let mut input = ScriptedInput::new(frames);
    let mut recorder = FrameRecorder::new();
    engine_for(&config)
        .with_frame_limit(false)
        .run(&mut world, &mut input, &mut recorder)?;

    let report = replay::ReplayReport {
        ticks: world.ticks(),
        player: *world.player(),
        camera_offset: world.camera().offset(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
