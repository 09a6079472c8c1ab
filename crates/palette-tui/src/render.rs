use crate::app::{App, InputMode};
use crate::board::CellView;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use palette_core::{GRID_SIZE, STAGE_COUNT};
use std::io;
use std::time::Instant;

const FG: Color = Color::Rgb { r: 230, g: 230, b: 240 };
const INFO: Color = Color::Rgb { r: 160, g: 165, b: 185 };
const KEY: Color = Color::Rgb { r: 255, g: 210, b: 100 };
const ERROR: Color = Color::Rgb { r: 255, g: 90, b: 90 };
const SUCCESS: Color = Color::Rgb { r: 90, g: 255, b: 130 };

// Each cell is 5 columns wide and 2 rows tall
const CELL_WIDTH: u16 = 5;
const CELL_HEIGHT: u16 = 2;

pub fn render(stdout: &mut io::Stdout, app: &mut App) -> io::Result<()> {
    let (term_width, term_height) = terminal::size()?;

    execute!(stdout, Hide, ResetColor, Clear(ClearType::All))?;

    let grid_width = CELL_WIDTH * GRID_SIZE as u16;
    let grid_height = CELL_HEIGHT * GRID_SIZE as u16;
    let total_width = grid_width + 30;
    let start_x = if term_width > total_width {
        (term_width - total_width) / 2
    } else {
        1
    };
    let start_y = if term_height > grid_height + 8 { 2 } else { 1 };

    render_grid(stdout, app, start_x, start_y)?;
    render_info_panel(stdout, app, start_x + grid_width + 3, start_y)?;
    render_controls(stdout, start_x, start_y + grid_height + 1)?;

    if let Some(ref msg) = app.message {
        execute!(
            stdout,
            MoveTo(start_x, start_y + grid_height + 3),
            SetForegroundColor(KEY),
            Print(msg)
        )?;
    }

    if app.mode == InputMode::Command {
        execute!(
            stdout,
            MoveTo(start_x, term_height.saturating_sub(1)),
            SetForegroundColor(FG),
            Print(format!(":{}", app.command))
        )?;
    }

    if app.take_bell() {
        execute!(stdout, Print("\x07"))?;
    }

    execute!(stdout, ResetColor, Show)?;
    Ok(())
}

fn render_grid(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let board = app.module.surface();
    let now = Instant::now();

    for row in 0..GRID_SIZE {
        for line in 0..CELL_HEIGHT {
            execute!(stdout, MoveTo(x, y + row as u16 * CELL_HEIGHT + line))?;
            for col in 0..GRID_SIZE {
                let cell = row * GRID_SIZE + col;
                let view = &board.cells[cell];
                let text = cell_text(view, line, cell == app.cursor);
                let (fg, bg) = if board.is_punched(cell, now) {
                    (view.primary, view.indicator)
                } else {
                    (view.indicator, view.primary)
                };
                execute!(
                    stdout,
                    SetBackgroundColor(bg),
                    SetForegroundColor(fg),
                    Print(text)
                )?;
            }
            execute!(stdout, ResetColor)?;
        }
    }
    Ok(())
}

/// Five characters for one line of a cell: border brackets on the highlight,
/// a dot when selected, the colorblind label, and a cursor marker underneath
fn cell_text(view: &CellView, line: u16, under_cursor: bool) -> String {
    let (open, close) = if view.border { ('[', ']') } else { (' ', ' ') };
    if line == 0 {
        let dot = if view.dot { '●' } else { ' ' };
        let label = view.label.unwrap_or(' ');
        format!("{}{}{} {}", open, dot, label, close)
    } else if under_cursor {
        format!("{} ^^{}", open, close)
    } else {
        format!("{}   {}", open, close)
    }
}

fn render_info_panel(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let module = &app.module;
    let board = module.surface();

    let mut lines: Vec<(Color, String)> = vec![
        (FG, format!("Palette Identification #{}", module.module_id())),
        (INFO, format!("Rule seed: {}", module.rule_seed())),
        (
            INFO,
            format!("Stages:    {}/{}", app.stages_done(), STAGE_COUNT),
        ),
        (INFO, format!("Strikes:   {}", module.host().strikes)),
        (
            INFO,
            format!(
                "Colorblind: {}",
                if module.is_colorblind() { "on" } else { "off" }
            ),
        ),
        (
            INFO,
            format!("Cursor:    pixel {}", app.cursor + 1),
        ),
    ];

    if board.incorrect {
        lines.push((ERROR, "STRIKE".to_string()));
    }
    if board.solved || module.host().passes > 0 {
        lines.push((SUCCESS, "SOLVED".to_string()));
    }

    for (i, (color, text)) in lines.iter().enumerate() {
        let attr = if i == 0 { Attribute::Bold } else { Attribute::Reset };
        execute!(
            stdout,
            MoveTo(x, y + i as u16),
            SetAttribute(attr),
            SetForegroundColor(*color),
            Print(text),
            SetAttribute(Attribute::Reset)
        )?;
    }
    Ok(())
}

fn render_controls(stdout: &mut io::Stdout, x: u16, y: u16) -> io::Result<()> {
    let controls = [
        ("arrows/hjkl", "move"),
        ("enter/space", "press"),
        ("c", "colorblind"),
        (":", "command"),
        ("q", "quit"),
    ];

    execute!(stdout, MoveTo(x, y))?;
    for (key, action) in controls {
        execute!(
            stdout,
            SetForegroundColor(KEY),
            Print(key),
            SetForegroundColor(INFO),
            Print(format!(" {}  ", action))
        )?;
    }
    Ok(())
}
