use crate::board::{BoardView, StatusHost};
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent};
use palette_core::{PaletteModule, GRID_SIZE, STAGE_COUNT};
use std::time::{Duration, Instant};

pub type Module = PaletteModule<StatusHost, BoardView>;

/// Result of handling a key press
pub enum AppAction {
    Continue,
    Quit,
}

/// Input mode for the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Keys move the cursor and press cells
    Normal,
    /// Keys edit an automation command after `:`
    Command,
}

/// The main application state
pub struct App {
    /// The puzzle
    pub module: Module,
    /// Cell under the cursor
    pub cursor: usize,
    /// Current input mode
    pub mode: InputMode,
    /// Command being typed in command mode
    pub command: String,
    /// Message to display
    pub message: Option<String>,
    /// Message timer
    message_timer: u32,
    /// Settings to persist on exit
    settings: Settings,
}

impl App {
    /// Wrap a freshly built puzzle and activate it
    pub fn new(mut module: Module, settings: Settings) -> Self {
        module.activate();
        let mut app = Self {
            module,
            cursor: 0,
            mode: InputMode::Normal,
            command: String::new(),
            message: None,
            message_timer: 0,
            settings,
        };
        if app.module.is_halted() {
            app.show_message("No valid palette for this rule seed; module passed");
        }
        app
    }

    /// Get the tick rate
    pub fn get_tick_rate(&self) -> Duration {
        Duration::from_millis(100)
    }

    /// Update timers (called every tick)
    pub fn tick(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message = None;
            }
        }
        self.module.tick(Instant::now());
    }

    /// Show a temporary message
    pub fn show_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_timer = 30; // ~3 seconds at 100ms poll
    }

    /// Stages finished so far
    pub fn stages_done(&self) -> usize {
        self.module
            .engine()
            .map_or(0, |engine| engine.used_highlights().len())
    }

    /// Whether the terminal bell should ring, clearing the request
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.module.surface_mut().bell)
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        match self.mode {
            InputMode::Normal => self.handle_game_key(key),
            InputMode::Command => {
                self.handle_command_key(key);
                AppAction::Continue
            }
        }
    }

    fn handle_game_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') => {
                self.persist_settings();
                return AppAction::Quit;
            }

            // Navigation
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, 0),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, 0),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(0, -1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(0, 1),

            KeyCode::Enter | KeyCode::Char(' ') => self.press_cursor(),

            KeyCode::Char('c') => self.run_command("cb"),
            KeyCode::Char(':') => {
                self.mode = InputMode::Command;
                self.command.clear();
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_command_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                self.command.clear();
            }
            KeyCode::Enter => {
                self.mode = InputMode::Normal;
                let command = std::mem::take(&mut self.command);
                self.run_command(&command);
            }
            KeyCode::Backspace => {
                self.command.pop();
            }
            KeyCode::Char(c) => self.command.push(c),
            _ => {}
        }
    }

    fn run_command(&mut self, command: &str) {
        match self.module.process_command(command) {
            Ok(()) => {
                let state = if self.module.is_colorblind() { "on" } else { "off" };
                self.show_message(&format!("Colorblind mode {}", state));
            }
            Err(err) => {
                tracing::warn!("rejected command {:?}: {}", command, err);
                self.show_message(&format!("{} ({})", err, palette_core::module::HELP_MESSAGE));
            }
        }
    }

    fn press_cursor(&mut self) {
        let strikes = self.module.host().strikes;
        let stages = self.stages_done();

        let handle = self.module.press_handlers()[self.cursor];
        self.module.press(handle);

        if self.module.host().strikes > strikes {
            let strikes = self.module.host().strikes;
            self.show_message(&format!(
                "Strike! {} {} so far",
                strikes,
                if strikes == 1 { "strike" } else { "strikes" }
            ));
        } else if self.stages_done() > stages {
            if self.module.is_solved() {
                self.show_message("Solved!");
            } else {
                self.show_message(&format!(
                    "Stage {} of {} complete",
                    self.stages_done(),
                    STAGE_COUNT
                ));
            }
        }
    }

    fn persist_settings(&mut self) {
        self.settings.colorblind = self.module.is_colorblind();
        if let Err(err) = self.settings.save() {
            tracing::warn!("could not save settings: {}", err);
        }
    }

    fn move_cursor(&mut self, drow: i32, dcol: i32) {
        let size = GRID_SIZE as i32;
        let row = (self.cursor / GRID_SIZE) as i32;
        let col = (self.cursor % GRID_SIZE) as i32;
        let row = (row + drow).rem_euclid(size);
        let col = (col + dcol).rem_euclid(size);
        self.cursor = (row * size + col) as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use palette_core::ModuleConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn app() -> App {
        let mut rng = StdRng::seed_from_u64(1);
        let module = Module::new(
            1,
            1,
            ModuleConfig::default(),
            StatusHost::default(),
            BoardView::default(),
            &mut rng,
        )
        .unwrap();
        App::new(module, Settings::default())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_app_starts_activated() {
        let app = app();
        assert!(app.module.is_activated());
        assert!(app.module.engine().unwrap().highlighted().is_some());
    }

    #[test]
    fn test_cursor_wraps() {
        let mut app = app();
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.cursor, 56);
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.cursor, 63);
        app.handle_key(key(KeyCode::Char('l')));
        assert_eq!(app.cursor, 56);
        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn test_c_toggles_colorblind() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('c')));
        assert!(app.module.is_colorblind());
        assert!(app.module.surface().cells.iter().all(|c| c.label.is_some()));
        app.handle_key(key(KeyCode::Char('c')));
        assert!(!app.module.is_colorblind());
    }

    #[test]
    fn test_command_mode() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char(':')));
        assert_eq!(app.mode, InputMode::Command);
        for c in "solve".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.mode, InputMode::Normal);
        assert!(app.message.as_deref().unwrap().contains("unsupported"));
        assert!(!app.module.is_solved());

        app.handle_key(key(KeyCode::Char(':')));
        for c in "colorblind".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
        assert!(app.module.is_colorblind());
    }

    #[test]
    fn test_cursor_press_completes_stage() {
        let mut app = app();
        let engine = app.module.engine().unwrap();
        let h = engine.highlighted().unwrap();
        let matches: Vec<usize> = engine.bitmap().cells_matching(h).collect();

        for cell in matches {
            app.cursor = cell;
            app.handle_key(key(KeyCode::Char(' ')));
        }
        assert_eq!(app.stages_done(), 1);
        assert_eq!(app.module.host().strikes, 0);
        assert_eq!(app.message.as_deref(), Some("Stage 1 of 4 complete"));
    }

    #[test]
    fn test_wrong_press_reports_strike() {
        let mut app = app();
        let engine = app.module.engine().unwrap();
        let h = engine.highlighted().unwrap();
        let wrong = (0..palette_core::CELL_COUNT)
            .find(|&c| engine.bitmap().get(c) != engine.bitmap().get(h))
            .unwrap();

        app.cursor = wrong;
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.module.host().strikes, 1);
        assert!(app.module.surface().incorrect);
        assert!(app.message.as_deref().unwrap().starts_with("Strike!"));
    }
}
