use std::{io::{Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, read, poll};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};

use crate::error::Result;
use crate::render::{PixelCanvas, Rgb, Surface};

pub type TermInt = u16;
pub type Coords = (TermInt, TermInt);

/// One terminal character with its colours.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Glyph {
    pub const fn plain(ch: char) -> Self {
        Glyph { ch, fg: Color::Reset, bg: Color::Reset }
    }
}

impl Default for Glyph {
    fn default() -> Self {
        Glyph::plain(' ')
    }
}

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<Glyph>,
    current_msg: Option<Message>,
}

struct Message {
    top_left: Coords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size()?;
        let stdout = stdout();
        let screen = vec![Glyph::default(); width as usize * height as usize];
        Ok(TermManager { width, height, stdout, screen, current_msg: None })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        execute!(
            self.stdout,
            style::ResetColor,
            cursor::Show,
            cursor::EnableBlinking,
            LeaveAlternateScreen
        )?;
        Ok(())
    }

    pub fn read_key_blocking(&self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read()? {
                if ev.kind == KeyEventKind::Press {
                    return Ok(ev);
                }
            }
        }
    }

    /// Drains every pending key press, waiting at most `timeout` for the first.
    pub fn read_key_events_queue(&self, timeout: Duration) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];
        let mut wait = timeout;

        while poll(wait)? {
            if let Event::Key(ev) = read()? {
                if ev.kind == KeyEventKind::Press {
                    events.push(ev);
                }
            }
            wait = Duration::ZERO;
        }

        Ok(events)
    }

    pub fn get_terminal_size(&self) -> Coords {
        (self.width, self.height)
    }

    /// Draws a frame whose outer corners are `top_left` and `bottom_right`.
    pub fn draw_borders(&mut self, top_left: Coords, bottom_right: Coords) -> Result<()> {
        let (x0, y0) = top_left;
        let (x1, y1) = bottom_right;

        for x in x0..=x1 {
            let ch = if x == x0 || x == x1 {'+'} else {'-'};
            self.print_at((x, y0), Glyph::plain(ch));
            self.print_at((x, y1), Glyph::plain(ch));
        }

        for y in y0 + 1..y1 {
            self.print_at((x0, y), Glyph::plain('|'));
            self.print_at((x1, y), Glyph::plain('|'));
        }

        self.flush()
    }

    /// Paints a pixel canvas as a grid of two-character tiles starting at
    /// `origin`. Each tile takes its fill colour from the pixel at its centre;
    /// a differing corner pixel marks an outlined tile.
    pub fn present(&mut self, canvas: &PixelCanvas, cell: i32, origin: Coords) -> Result<()> {
        let (cols, rows) = (canvas_len(canvas.width(), cell), canvas_len(canvas.height(), cell));

        for row in 0..rows {
            for col in 0..cols {
                let (x, y) = (col as i32 * cell, row as i32 * cell);
                let (Some(fill), Some(edge)) = (canvas.pixel(x + cell / 2, y + cell / 2), canvas.pixel(x, y)) else {
                    continue;
                };

                let (left, right) = if fill == edge {(' ', ' ')} else {('[', ']')};
                let (fg, bg) = (term_colour(edge), term_colour(fill));
                let pos = (origin.0 + col * 2, origin.1 + row);
                self.print_at(pos, Glyph { ch: left, fg, bg });
                self.print_at((pos.0 + 1, pos.1), Glyph { ch: right, fg, bg });
            }
        }

        self.flush()
    }

    /// Writes a line of plain text, blanking the rest of the row.
    pub fn print_line(&mut self, y: TermInt, text: &str) -> Result<()> {
        if y >= self.height {
            return Ok(());
        }
        let mut chars = text.chars();
        for x in 0..self.width {
            self.print_at((x, y), Glyph::plain(chars.next().unwrap_or(' ')));
        }
        self.flush()
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1] {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, y), Glyph::default());
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), Glyph::plain(ch));
            }
        }

        self.current_msg = Some(Message::new(msg_width, msg_height, top_left));
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let Some(msg) = self.current_msg.take() else {
            return Ok(());
        };
        let top_left = msg.top_left();

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height() {
            for x_diff in 0..msg.width() {
                let pos = (top_left.0 + x_diff, top_left.1 + y_diff);
                if let Some(i) = self.index(pos) {
                    let glyph = self.screen[i];
                    self.print_at_no_save(pos, glyph);
                }
            }
        }

        self.flush()
    }

    /// Records the glyph and draws it unless a message box covers it or it is
    /// already on screen.
    pub fn print_at(&mut self, pos: Coords, glyph: Glyph) {
        let Some(i) = self.index(pos) else {
            return;
        };
        if self.screen[i] == glyph {
            return;
        }
        self.screen[i] = glyph;

        if !self.current_msg.as_ref().is_some_and(|m| m.covers(pos)) {
            self.print_at_no_save(pos, glyph);
        }
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, style::ResetColor, terminal::Clear(ClearType::All))?;
        self.screen = vec![Glyph::default(); self.width as usize * self.height as usize];
        self.current_msg = None;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index(&self, pos: Coords) -> Option<usize> {
        if pos.0 < self.width && pos.1 < self.height {
            Some(self.width as usize * pos.1 as usize + pos.0 as usize)
        } else {
            None
        }
    }

    fn print_at_no_save(&mut self, pos: Coords, glyph: Glyph) {
        // Queue errors resurface on the next flush.
        let _ = queue!(
            self.stdout,
            cursor::MoveTo(pos.0, pos.1),
            style::SetForegroundColor(glyph.fg),
            style::SetBackgroundColor(glyph.bg),
            style::Print(glyph.ch)
        );
    }
}

impl Message {
    pub fn new(width: TermInt, height: TermInt, top_left: Coords) -> Self {
        Message { width, height, top_left }
    }

    pub fn width(&self) -> TermInt {
        self.width
    }

    pub fn height(&self) -> TermInt {
        self.height
    }

    pub fn top_left(&self) -> Coords {
        self.top_left
    }

    fn covers(&self, pos: Coords) -> bool {
        let (x, y) = self.top_left;
        (x..x + self.width).contains(&pos.0) && (y..y + self.height).contains(&pos.1)
    }
}

/// Number of whole cells along one side of the canvas.
pub fn canvas_len(pixels: i32, cell: i32) -> TermInt {
    (pixels / cell).clamp(0, TermInt::MAX as i32) as TermInt
}

pub fn term_colour(c: Rgb) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

/// Names a key the way browser `KeyboardEvent.key` does, so bindings such as
/// `ArrowLeft` or `a` carry over unchanged.
pub fn key_name(code: KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Left => "ArrowLeft",
        KeyCode::Right => "ArrowRight",
        KeyCode::Up => "ArrowUp",
        KeyCode::Down => "ArrowDown",
        KeyCode::Enter => "Enter",
        KeyCode::Esc => "Escape",
        KeyCode::Tab => "Tab",
        KeyCode::Backspace => "Backspace",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PageUp",
        KeyCode::PageDown => "PageDown",
        KeyCode::Char(c) => return Some(c.to_string()),
        _ => return None,
    };
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(key_name(KeyCode::Left).as_deref(), Some("ArrowLeft"));
        assert_eq!(key_name(KeyCode::Down).as_deref(), Some("ArrowDown"));
        assert_eq!(key_name(KeyCode::Char('w')).as_deref(), Some("w"));
        assert_eq!(key_name(KeyCode::Char(' ')).as_deref(), Some(" "));
        assert_eq!(key_name(KeyCode::F(1)), None);
    }

    #[test]
    fn test_message_covers() {
        let msg = Message::new(4, 3, (10, 5));
        assert!(msg.covers((10, 5)));
        assert!(msg.covers((13, 7)));
        assert!(!msg.covers((14, 7)));
        assert!(!msg.covers((9, 5)));
    }

    #[test]
    fn test_canvas_len() {
        assert_eq!(canvas_len(500, 20), 25);
        assert_eq!(canvas_len(510, 20), 25);
        assert_eq!(canvas_len(-5, 20), 0);
    }

    #[test]
    fn test_term_colour() {
        assert_eq!(term_colour(Rgb::new(1, 2, 3)), Color::Rgb { r: 1, g: 2, b: 3 });
    }
}
