//! A running platformer session: one player, the level's platforms and the
//! camera that follows the player.

use anyhow::Result;

use crate::camera::Camera;
use crate::config::GameConfig;
use crate::input::InputSnapshot;
use crate::level::Level;
use crate::math::{Rect, Vec2};
use crate::physics::{step, Platform, PlayerBody};
use crate::render::{DrawCommand, RenderTarget, Visual};

pub struct World {
    config: GameConfig,
    player: PlayerBody,
    platforms: Vec<Platform>,
    camera: Camera,
    ticks: u64,
}

impl World {
    /// Build a session from a level. The camera starts centered on the spawn.
    pub fn new(config: GameConfig, level: &Level) -> Self {
        let player = PlayerBody::spawn(level.spawn, &config.physics);
        let mut camera = Camera::new(config.viewport.x, config.viewport.y);
        camera.follow(&player.rect());

        log::debug!(
            "World '{}' created: spawn=({}, {}), {} platforms",
            level.name,
            level.spawn.x,
            level.spawn.y,
            level.platforms.len()
        );

        Self {
            config,
            player,
            platforms: level.platforms.clone(),
            camera,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self) -> &PlayerBody {
        &self.player
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run one simulation tick: jump request, physics, then camera.
    pub fn tick(&mut self, input: &InputSnapshot) {
        let was_grounded = self.player.grounded;

        self.player = step(self.player, input, &self.platforms, &self.config.physics);
        self.camera.follow(&self.player.rect());
        self.ticks += 1;

        if self.player.grounded && !was_grounded {
            log::trace!(
                "landed at ({:.1}, {:.1}) on tick {}",
                self.player.position.x,
                self.player.position.y,
                self.ticks
            );
        }
    }

    /// Screen-space draw list: sky, platforms in level order, then the player.
    pub fn draw_commands(&self) -> Vec<DrawCommand> {
        let mut commands = Vec::with_capacity(self.platforms.len() + 2);
        commands.push(DrawCommand::new(
            Rect::from_position_size(Vec2::ZERO, self.camera.viewport()),
            Visual::Sky,
        ));
        commands.extend(
            self.platforms
                .iter()
                .map(|p| DrawCommand::new(self.camera.apply_rect(&p.rect), Visual::Platform)),
        );
        commands.push(DrawCommand::new(
            self.camera.apply_rect(&self.player.rect()),
            Visual::Player,
        ));
        commands
    }

    /// Submit this frame's draw list to a render target.
    pub fn render(&self, target: &mut dyn RenderTarget) -> Result<()> {
        target.begin_frame()?;
        for command in self.draw_commands() {
            target.draw(&command)?;
        }
        target.end_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::FrameRecorder;

    fn world() -> World {
        let config = GameConfig::default();
        let level = Level::default_level(config.viewport.x, config.viewport.y);
        World::new(config, &level)
    }

    #[test]
    fn camera_starts_on_spawn() {
        let world = world();
        let screen = world.camera().apply(world.player().center());
        assert_eq!(screen, Vec2::new(512.0, 384.0));
    }

    #[test]
    fn jump_request_ignored_in_mid_air() {
        let mut world = world();
        world.tick(&InputSnapshot::jump());
        assert!(world.player().velocity.y > 0.0);
    }

    #[test]
    fn jump_from_ground_goes_up() {
        let mut world = world();
        for _ in 0..200 {
            world.tick(&InputSnapshot::idle());
        }
        assert!(world.player().grounded);
        world.tick(&InputSnapshot::jump());
        assert!(!world.player().grounded);
        // jump strength plus one tick of gravity
        assert!((world.player().velocity.y + 14.2).abs() < 1e-5);
        assert!(world.player().rect().bottom() < 718.0);
    }

    #[test]
    fn tick_and_step_agree_on_a_jump() {
        let mut world = world();
        for _ in 0..200 {
            world.tick(&InputSnapshot::idle());
        }
        let before = *world.player();
        assert!(before.grounded);

        let expected = step(
            before,
            &InputSnapshot::jump(),
            world.platforms(),
            &world.config().physics,
        );
        world.tick(&InputSnapshot::jump());
        assert_eq!(*world.player(), expected);
        assert!(expected.velocity.y < 0.0);
    }

    #[test]
    fn player_stays_centered_on_screen() {
        let mut world = world();
        for i in 0..120 {
            let input = if i % 2 == 0 {
                InputSnapshot::right()
            } else {
                InputSnapshot::idle()
            };
            world.tick(&input);
            let center = world.camera().apply_rect(&world.player().rect()).center();
            assert!((center.x - 512.0).abs() < 1e-3);
            assert!((center.y - 384.0).abs() < 1e-3);
        }
        assert_eq!(world.ticks(), 120);
    }

    #[test]
    fn draw_order_is_sky_platforms_player() {
        let world = world();
        let commands = world.draw_commands();
        assert_eq!(commands.len(), world.platforms().len() + 2);
        assert_eq!(commands[0].visual, Visual::Sky);
        assert_eq!(commands[0].rect, Rect::new(0.0, 0.0, 1024.0, 768.0));
        assert!(commands[1..commands.len() - 1]
            .iter()
            .all(|c| c.visual == Visual::Platform));
        assert_eq!(commands.last().map(|c| c.visual), Some(Visual::Player));
    }

    #[test]
    fn render_presents_one_frame() {
        let world = world();
        let mut recorder = FrameRecorder::new();
        world.render(&mut recorder).unwrap();
        assert_eq!(recorder.frames_presented(), 1);
        assert_eq!(recorder.last_frame(), world.draw_commands().as_slice());
    }
}
