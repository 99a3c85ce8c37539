use std::collections::HashSet;

use anyhow::Result;

/// Keys the game knows how to react to.
///
/// Front ends translate their native key events into these before feeding
/// [`InputState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    A,
    D,
    W,
    S,
    R,
    Space,
    Escape,
}

/// Per-tick snapshot of the logical controls.
///
/// `jump` is edge-triggered (true only on the tick the key went down). The
/// directional fields and `restart` are level-triggered: they stay true for as
/// long as the key is held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub restart: bool,
    pub quit: bool,
}

impl InputSnapshot {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn left() -> Self {
        Self {
            left: true,
            ..Self::default()
        }
    }

    pub fn right() -> Self {
        Self {
            right: true,
            ..Self::default()
        }
    }

    pub fn jump() -> Self {
        Self {
            jump: true,
            ..Self::default()
        }
    }

    pub fn quit() -> Self {
        Self {
            quit: true,
            ..Self::default()
        }
    }
}

/// Source of one [`InputSnapshot`] per tick.
pub trait InputSource {
    fn poll(&mut self) -> Result<InputSnapshot>;
}

/// Replays a fixed list of snapshots, then reports quit.
pub struct ScriptedInput {
    frames: std::vec::IntoIter<InputSnapshot>,
}

impl ScriptedInput {
    pub fn new(frames: Vec<InputSnapshot>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Result<InputSnapshot> {
        Ok(self.frames.next().unwrap_or_else(InputSnapshot::quit))
    }
}

/// Tracks keyboard state across frames.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<Key>,
    keys_pressed: HashSet<Key>,
    keys_released: HashSet<Key>,
    quit_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame pressed/released flags.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    pub fn press(&mut self, key: Key) {
        if !self.keys_down.contains(&key) {
            self.keys_pressed.insert(key);
        }
        self.keys_down.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        if self.keys_down.remove(&key) {
            self.keys_released.insert(key);
        }
    }

    /// Record a close request that did not come from a key (window close, Ctrl+C).
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Returns true if the key is currently held down.
    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the key was released this frame.
    pub fn is_key_released(&self, key: Key) -> bool {
        self.keys_released.contains(&key)
    }
}

/// Mapping from logical controls to physical keys.
///
/// Any bound key activates its control.
#[derive(Clone, Debug)]
pub struct KeyBindings {
    pub left: Vec<Key>,
    pub right: Vec<Key>,
    pub up: Vec<Key>,
    pub down: Vec<Key>,
    pub jump: Vec<Key>,
    pub restart: Vec<Key>,
    pub quit: Vec<Key>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: vec![Key::Left, Key::A],
            right: vec![Key::Right, Key::D],
            up: vec![Key::Up, Key::W],
            down: vec![Key::Down, Key::S],
            jump: vec![Key::Space],
            restart: vec![Key::R],
            quit: vec![Key::Escape],
        }
    }
}

impl KeyBindings {
    /// Build the snapshot for the current frame.
    pub fn snapshot(&self, input: &InputState) -> InputSnapshot {
        let down = |keys: &[Key]| keys.iter().any(|&k| input.is_key_down(k));
        let pressed = |keys: &[Key]| keys.iter().any(|&k| input.is_key_pressed(k));

        InputSnapshot {
            left: down(&self.left),
            right: down(&self.right),
            up: down(&self.up),
            down: down(&self.down),
            jump: pressed(&self.jump),
            restart: down(&self.restart),
            quit: input.quit_requested() || pressed(&self.quit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressed_is_cleared_on_next_frame_but_down_persists() {
        let mut input = InputState::new();
        input.press(Key::Space);
        assert!(input.is_key_pressed(Key::Space));
        input.begin_frame();
        assert!(!input.is_key_pressed(Key::Space));
        assert!(input.is_key_down(Key::Space));
    }

    #[test]
    fn repeated_press_is_not_a_new_edge() {
        let mut input = InputState::new();
        input.press(Key::Space);
        input.begin_frame();
        input.press(Key::Space);
        assert!(!input.is_key_pressed(Key::Space));
    }

    #[test]
    fn release_only_reports_held_keys() {
        let mut input = InputState::new();
        input.release(Key::A);
        assert!(!input.is_key_released(Key::A));
        input.press(Key::A);
        input.release(Key::A);
        assert!(input.is_key_released(Key::A));
        assert!(!input.is_key_down(Key::A));
    }

    #[test]
    fn default_bindings_map_wasd_and_arrows() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.press(Key::A);
        input.press(Key::Right);
        input.press(Key::Space);
        let snap = bindings.snapshot(&input);
        assert!(snap.left && snap.right && snap.jump);
        assert!(!snap.quit && !snap.up);

        input.begin_frame();
        let snap = bindings.snapshot(&input);
        assert!(snap.left && !snap.jump);
    }

    #[test]
    fn restart_stays_on_while_held() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.press(Key::R);
        assert!(bindings.snapshot(&input).restart);
        input.begin_frame();
        assert!(bindings.snapshot(&input).restart);
        input.release(Key::R);
        assert!(!bindings.snapshot(&input).restart);
    }

    #[test]
    fn escape_or_close_request_quits() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.press(Key::Escape);
        assert!(bindings.snapshot(&input).quit);

        let mut input = InputState::new();
        input.request_quit();
        assert!(bindings.snapshot(&input).quit);
    }

    #[test]
    fn scripted_input_quits_when_exhausted() {
        let mut source = ScriptedInput::new(vec![InputSnapshot::right()]);
        assert_eq!(source.poll().unwrap(), InputSnapshot::right());
        assert!(source.poll().unwrap().quit);
    }
}
