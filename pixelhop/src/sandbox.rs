//! Free-movement sandbox: a box steered in four directions inside a fixed field,
//! with a goal square to reach. No gravity and no platforms.

use anyhow::Result;

use crate::engine::{EngineContext, Game};
use crate::input::InputSnapshot;
use crate::math::{Rect, Vec2};
use crate::render::{DrawCommand, RenderTarget, Visual};

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;
pub const PLAYER_SIZE: f32 = 50.0;
pub const PLAYER_SPEED: f32 = 5.0;
pub const GOAL_SIZE: f32 = 80.0;
const GOAL_MARGIN: f32 = 50.0;

pub struct Sandbox {
    field: Rect,
    player: Rect,
    goal: Rect,
    speed: f32,
    won: bool,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new(FIELD_WIDTH, FIELD_HEIGHT)
    }
}

impl Sandbox {
    pub fn new(width: f32, height: f32) -> Self {
        let field = Rect::new(0.0, 0.0, width, height);
        let goal = Rect::new(
            width - GOAL_SIZE - GOAL_MARGIN,
            height - GOAL_SIZE - GOAL_MARGIN,
            GOAL_SIZE,
            GOAL_SIZE,
        );
        Self {
            field,
            player: Rect::from_position_size(Self::start(&field), Vec2::new(PLAYER_SIZE, PLAYER_SIZE)),
            goal,
            speed: PLAYER_SPEED,
            won: false,
        }
    }

    fn start(field: &Rect) -> Vec2 {
        Vec2::new((field.size.x / 2.0).floor(), (field.size.y / 2.0).floor())
    }

    pub fn player(&self) -> Rect {
        self.player
    }

    pub fn goal(&self) -> Rect {
        self.goal
    }

    pub fn won(&self) -> bool {
        self.won
    }

    /// Move, keep the box inside the field, then check the goal. While the goal
    /// is reached, holding restart puts the box back at the start.
    pub fn step(&mut self, input: &InputSnapshot) {
        let mut delta = Vec2::ZERO;
        if input.up {
            delta.y -= self.speed;
        }
        if input.down {
            delta.y += self.speed;
        }
        if input.left {
            delta.x -= self.speed;
        }
        if input.right {
            delta.x += self.speed;
        }

        self.player = self.player.translated(delta).clamped_inside(&self.field);
        self.won = self.player.intersects(&self.goal);

        if self.won && input.restart {
            log::debug!("sandbox restart");
            self.player.position = Self::start(&self.field);
            self.won = false;
        }
    }

    pub fn draw_commands(&self) -> Vec<DrawCommand> {
        vec![
            DrawCommand::new(self.field, Visual::Sky),
            DrawCommand::new(self.player, Visual::Player),
            DrawCommand::new(self.goal, Visual::Goal),
        ]
    }
}

impl Game for Sandbox {
    fn update(&mut self, ctx: &mut EngineContext) -> Result<()> {
        self.step(ctx.input());
        Ok(())
    }

    fn draw(&mut self, _ctx: &mut EngineContext, target: &mut dyn RenderTarget) -> Result<()> {
        target.begin_frame()?;
        for command in self.draw_commands() {
            target.draw(&command)?;
        }
        target.draw_text(150.0, 50.0, "Use WASD or Arrow Keys to Move!")?;
        target.draw_text(self.goal.left() + 10.0, self.goal.top() + 25.0, "GOAL")?;
        if self.won {
            target.draw_text(200.0, self.field.size.y / 2.0, "YOU WIN! Press R to restart")?;
        }
        target.end_frame()
    }
}
