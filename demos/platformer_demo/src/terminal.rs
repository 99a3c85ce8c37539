//! Crossterm front end: raw-mode keyboard input and a character-cell renderer.

use std::collections::HashMap;
use std::io::{stdout, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use pixelhop::{DrawCommand, InputSnapshot, InputSource, InputState, Key, KeyBindings, Vec2, Visual};

/// Without key-release reporting a key counts as held for this long after its
/// last press or auto-repeat. Must exceed the terminal's auto-repeat delay
/// (commonly around 500 ms) or a held key flickers between repeats.
pub const DEFAULT_HOLD_WINDOW: Duration = Duration::from_millis(600);

/// Puts the terminal in raw/alternate-screen mode and restores it on drop.
pub struct TerminalSession {
    enhanced_keys: bool,
}

impl TerminalSession {
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode().context("enabling raw mode")?;
        // Any early return below drops the session and restores the terminal.
        let mut session = Self {
            enhanced_keys: false,
        };
        let mut out = stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            session.enhanced_keys = true;
        }
        log::debug!(
            "terminal session started (key release events: {})",
            session.enhanced_keys
        );
        Ok(session)
    }

    /// True when the terminal reports key releases.
    pub fn reports_key_release(&self) -> bool {
        self.enhanced_keys
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let mut out = stdout();
        if self.enhanced_keys {
            let _ = execute!(out, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(out, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn map_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Esc => Key::Escape,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'a' => Key::A,
            'd' => Key::D,
            'w' => Key::W,
            's' => Key::S,
            'r' => Key::R,
            ' ' => Key::Space,
            'q' => Key::Escape,
            _ => return None,
        },
        _ => return None,
    };
    Some(key)
}

/// Folds terminal key events into an [`InputState`].
///
/// When the terminal does not report releases, a key is released once it has
/// not been seen for `hold_window`.
pub struct KeyTracker {
    state: InputState,
    bindings: KeyBindings,
    last_seen: HashMap<Key, Instant>,
    reports_release: bool,
    hold_window: Duration,
}

impl KeyTracker {
    pub fn new(reports_release: bool, hold_window: Duration) -> Self {
        Self {
            state: InputState::new(),
            bindings: KeyBindings::default(),
            last_seen: HashMap::new(),
            reports_release,
            hold_window,
        }
    }

    pub fn begin_frame(&mut self) {
        self.state.begin_frame();
    }

    pub fn request_quit(&mut self) {
        self.state.request_quit();
    }

    pub fn handle_key(&mut self, event: KeyEvent, now: Instant) {
        if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
            self.state.request_quit();
            return;
        }
        let Some(key) = map_key(event.code) else {
            return;
        };
        match event.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.state.press(key);
                self.last_seen.insert(key, now);
            }
            KeyEventKind::Release => {
                self.state.release(key);
                self.last_seen.remove(&key);
            }
        }
    }

    /// Build this frame's snapshot, first expiring keys past the hold window.
    pub fn snapshot(&mut self, now: Instant) -> InputSnapshot {
        if !self.reports_release {
            self.expire_held_keys(now);
        }
        self.bindings.snapshot(&self.state)
    }

    fn expire_held_keys(&mut self, now: Instant) {
        let window = self.hold_window;
        let expired: Vec<Key> = self
            .last_seen
            .iter()
            .filter(|(_, &seen)| now.duration_since(seen) > window)
            .map(|(&key, _)| key)
            .collect();
        for key in expired {
            self.last_seen.remove(&key);
            self.state.release(key);
        }
    }
}

/// Keyboard input read on a background thread and folded into a
/// [`KeyTracker`] once per frame.
pub struct TerminalInput {
    events: Receiver<Event>,
    stop: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
    keys: KeyTracker,
}

impl TerminalInput {
    pub fn spawn(reports_release: bool, hold_window: Duration) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let stop = Arc::new(AtomicBool::new(false));
        let reader_stop = Arc::clone(&stop);

        let reader = std::thread::Builder::new()
            .name("terminal-input".into())
            .spawn(move || {
                while !reader_stop.load(Ordering::Relaxed) {
                    match event::poll(Duration::from_millis(20)) {
                        Ok(false) => continue,
                        Ok(true) => match event::read() {
                            Ok(ev) => {
                                if tx.send(ev).is_err() {
                                    break;
                                }
                            }
                            Err(err) => {
                                log::warn!("terminal read failed: {err}");
                                break;
                            }
                        },
                        Err(err) => {
                            log::warn!("terminal poll failed: {err}");
                            break;
                        }
                    }
                }
            })
            .context("spawning input thread")?;

        Ok(Self {
            events: rx,
            stop,
            reader: Some(reader),
            keys: KeyTracker::new(reports_release, hold_window),
        })
    }
}

impl InputSource for TerminalInput {
    fn poll(&mut self) -> Result<InputSnapshot> {
        self.keys.begin_frame();
        let now = Instant::now();
        loop {
            match self.events.try_recv() {
                Ok(Event::Key(key)) => self.keys.handle_key(key, now),
                Ok(_) => {}
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.keys.request_quit();
                    break;
                }
            }
        }
        Ok(self.keys.snapshot(now))
    }
}

impl Drop for TerminalInput {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: char,
    color: Color,
}

const BLANK: Cell = Cell {
    glyph: ' ',
    color: Color::Reset,
};

fn cell_for(visual: Visual) -> Cell {
    match visual {
        Visual::Sky => Cell {
            glyph: ' ',
            color: Color::Reset,
        },
        Visual::Platform => Cell {
            glyph: '#',
            color: Color::DarkYellow,
        },
        Visual::Player => Cell {
            glyph: '@',
            color: Color::Cyan,
        },
        Visual::Goal => Cell {
            glyph: 'G',
            color: Color::Green,
        },
    }
}

/// Scales world-space draw commands down to a grid of character cells.
pub struct CellCanvas {
    viewport: Vec2,
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl CellCanvas {
    pub fn new(viewport: Vec2, cols: u16, rows: u16) -> Self {
        let mut canvas = Self {
            viewport,
            cols: 0,
            rows: 0,
            cells: Vec::new(),
        };
        canvas.resize(cols, rows);
        canvas
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols.max(1);
        self.rows = rows.max(1);
        self.cells = vec![BLANK; usize::from(self.cols) * usize::from(self.rows)];
    }

    pub fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    fn cell_size(&self) -> Vec2 {
        Vec2::new(
            self.viewport.x / f32::from(self.cols),
            self.viewport.y / f32::from(self.rows),
        )
    }

    fn to_cell(&self, pos: Vec2) -> (i64, i64) {
        let cell = self.cell_size();
        ((pos.x / cell.x).floor() as i64, (pos.y / cell.y).floor() as i64)
    }

    pub fn fill(&mut self, command: &DrawCommand) {
        let cell = self.cell_size();
        let rect = command.rect;
        let x0 = ((rect.left() / cell.x).floor() as i64).max(0);
        let y0 = ((rect.top() / cell.y).floor() as i64).max(0);
        let x1 = ((rect.right() / cell.x).ceil() as i64).min(i64::from(self.cols));
        let y1 = ((rect.bottom() / cell.y).ceil() as i64).min(i64::from(self.rows));

        let value = cell_for(command.visual);
        for y in y0..y1 {
            for x in x0..x1 {
                let idx = y as usize * usize::from(self.cols) + x as usize;
                self.cells[idx] = value;
            }
        }
    }

    pub fn text(&mut self, pos: Vec2, text: &str) {
        let (x, y) = self.to_cell(pos);
        if y < 0 || y >= i64::from(self.rows) {
            return;
        }
        for (i, ch) in text.chars().enumerate() {
            let cx = x + i as i64;
            if cx < 0 {
                continue;
            }
            if cx >= i64::from(self.cols) {
                break;
            }
            let idx = y as usize * usize::from(self.cols) + cx as usize;
            self.cells[idx] = Cell {
                glyph: ch,
                color: Color::White,
            };
        }
    }

    /// Plain-text rows, mostly useful for tests.
    pub fn rows_as_text(&self) -> Vec<String> {
        self.cells
            .chunks(usize::from(self.cols))
            .map(|row| row.iter().map(|c| c.glyph).collect())
            .collect()
    }

    fn write_to(&self, out: &mut impl Write) -> Result<()> {
        for (y, row) in self.cells.chunks(usize::from(self.cols)).enumerate() {
            queue!(out, cursor::MoveTo(0, y as u16))?;
            let mut color = None;
            for cell in row {
                if color != Some(cell.color) {
                    queue!(out, SetForegroundColor(cell.color))?;
                    color = Some(cell.color);
                }
                queue!(out, Print(cell.glyph))?;
            }
        }
        queue!(out, ResetColor)?;
        Ok(())
    }
}

/// [`pixelhop::RenderTarget`] drawing into the terminal.
pub struct TerminalRenderer {
    out: Stdout,
    canvas: CellCanvas,
}

impl TerminalRenderer {
    pub fn new(viewport: Vec2) -> Result<Self> {
        let (cols, rows) = terminal::size().context("querying terminal size")?;
        Ok(Self {
            out: stdout(),
            canvas: CellCanvas::new(viewport, cols, rows),
        })
    }
}

impl pixelhop::RenderTarget for TerminalRenderer {
    fn begin_frame(&mut self) -> Result<()> {
        let (cols, rows) = terminal::size()?;
        let (cur_cols, cur_rows) = self.canvas.size();
        if (cols, rows) != (cur_cols, cur_rows) {
            self.canvas.resize(cols, rows);
            queue!(self.out, terminal::Clear(ClearType::All))?;
        }
        self.canvas.clear();
        Ok(())
    }

    fn draw(&mut self, command: &DrawCommand) -> Result<()> {
        self.canvas.fill(command);
        Ok(())
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str) -> Result<()> {
        self.canvas.text(Vec2::new(x, y), text);
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        self.canvas.write_to(&mut self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelhop::Rect;

    #[test]
    fn maps_letters_case_insensitively() {
        assert_eq!(map_key(KeyCode::Char('A')), Some(Key::A));
        assert_eq!(map_key(KeyCode::Char(' ')), Some(Key::Space));
        assert_eq!(map_key(KeyCode::Char('q')), Some(Key::Escape));
        assert_eq!(map_key(KeyCode::Char('x')), None);
    }

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    #[test]
    fn held_key_survives_the_auto_repeat_delay() {
        let mut keys = KeyTracker::new(false, DEFAULT_HOLD_WINDOW);
        let t0 = Instant::now();

        keys.begin_frame();
        keys.handle_key(key(KeyCode::Char(' '), KeyEventKind::Press), t0);
        keys.handle_key(key(KeyCode::Right, KeyEventKind::Press), t0);
        let first = keys.snapshot(t0);
        assert!(first.jump && first.right);

        // Typical first auto-repeat arrives about 500 ms after the press.
        let gap = t0 + Duration::from_millis(500);
        keys.begin_frame();
        let waiting = keys.snapshot(gap);
        assert!(waiting.right);
        assert!(!waiting.jump);

        keys.begin_frame();
        keys.handle_key(key(KeyCode::Char(' '), KeyEventKind::Press), gap);
        keys.handle_key(key(KeyCode::Right, KeyEventKind::Press), gap);
        let repeated = keys.snapshot(gap);
        assert!(repeated.right);
        assert!(!repeated.jump, "auto-repeat must not fire a second jump");
    }

    #[test]
    fn key_is_released_after_the_hold_window() {
        let mut keys = KeyTracker::new(false, Duration::from_millis(100));
        let t0 = Instant::now();
        keys.handle_key(key(KeyCode::Left, KeyEventKind::Press), t0);
        assert!(keys.snapshot(t0 + Duration::from_millis(100)).left);
        assert!(!keys.snapshot(t0 + Duration::from_millis(101)).left);
    }

    #[test]
    fn release_events_disable_expiry() {
        let mut keys = KeyTracker::new(true, Duration::from_millis(10));
        let t0 = Instant::now();
        keys.handle_key(key(KeyCode::Left, KeyEventKind::Press), t0);
        assert!(keys.snapshot(t0 + Duration::from_secs(5)).left);
        keys.handle_key(key(KeyCode::Left, KeyEventKind::Release), t0);
        assert!(!keys.snapshot(t0 + Duration::from_secs(5)).left);
    }

    #[test]
    fn ctrl_c_quits() {
        let mut keys = KeyTracker::new(true, DEFAULT_HOLD_WINDOW);
        keys.handle_key(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Instant::now(),
        );
        assert!(keys.snapshot(Instant::now()).quit);
    }

    #[test]
    fn session_never_leaves_raw_mode_behind() {
        // Without a tty `enter` fails part way; with one it succeeds. Either
        // way raw mode must be off once the session is gone.
        if let Ok(session) = TerminalSession::enter() {
            drop(session);
        }
        assert!(!terminal::is_raw_mode_enabled().unwrap_or(false));
    }

    #[test]
    fn canvas_scales_world_rects_to_cells() {
        // 80x24 terminal: each cell covers 12.8 x 32 world units.
        let mut canvas = CellCanvas::new(Vec2::new(1024.0, 768.0), 80, 24);
        assert_eq!(canvas.size(), (80, 24));
        canvas.fill(&DrawCommand::new(Rect::new(0.0, 718.0, 1024.0, 50.0), Visual::Platform));
        canvas.fill(&DrawCommand::new(Rect::new(496.0, 368.0, 32.0, 32.0), Visual::Player));

        let rows = canvas.rows_as_text();
        assert_eq!(rows.len(), 24);
        assert!(rows[23].chars().all(|c| c == '#'));
        assert!(rows[22].chars().all(|c| c == '#'));
        assert!(rows[11].contains('@'));
        assert!(rows[12].contains('@'));
        assert!(!rows[10].contains('@'));
    }

    #[test]
    fn canvas_clips_offscreen_rects() {
        let mut canvas = CellCanvas::new(Vec2::new(1024.0, 768.0), 40, 13);
        canvas.fill(&DrawCommand::new(Rect::new(-500.0, -500.0, 100.0, 100.0), Visual::Platform));
        canvas.fill(&DrawCommand::new(Rect::new(2000.0, 0.0, 30.0, 400.0), Visual::Platform));
        assert!(canvas.rows_as_text().iter().all(|r| !r.contains('#')));
    }

    #[test]
    fn text_is_truncated_at_the_edge() {
        let mut canvas = CellCanvas::new(Vec2::new(1024.0, 768.0), 10, 5);
        canvas.text(Vec2::new(820.0, 0.0), "GOAL");
        assert_eq!(canvas.rows_as_text()[0], "        GO");
    }
}
