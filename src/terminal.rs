use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, IsTerminal, Write};
use std::time::Duration;

/// Terminal abstraction for rendering
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    alternate_screen: bool,
}

/// A single cell in the terminal buffer
#[derive(Clone, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bold: false,
        }
    }
}

/// Input the render loop cares about
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Input {
    Key(KeyCode, KeyModifiers),
    Resize(u16, u16),
}

/// Whether stdout is an interactive terminal we can take over
pub fn is_interactive() -> bool {
    stdout().is_terminal()
}

impl Terminal {
    /// Take over the terminal: raw mode, alternate screen, hidden cursor
    pub fn new(alternate_screen: bool) -> io::Result<Self> {
        let (width, height) = size()?;

        if alternate_screen {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide)?;
        }

        Ok(Self::with_size(width, height, alternate_screen))
    }

    /// Off-screen buffer of a fixed size (print mode)
    pub fn detached(width: u16, height: u16) -> Self {
        Self::with_size(width, height, false)
    }

    fn with_size(width: u16, height: u16, alternate_screen: bool) -> Self {
        Self {
            width,
            height,
            buffer: vec![vec![Cell::default(); width as usize]; height as usize],
            alternate_screen,
        }
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Resize the back buffer, discarding its contents
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = vec![vec![Cell::default(); width as usize]; height as usize];
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            row.fill(Cell::default());
        }
    }

    /// Clear the actual terminal
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    /// Set a character at position with optional color
    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize][x as usize] = Cell { ch, fg, bold };
        }
    }

    /// Set a string starting at position
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    #[cfg(test)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.buffer.get(y as usize)?.get(x as usize)
    }

    /// Render the entire buffer to screen
    pub fn present(&self) -> io::Result<()> {
        let mut out = stdout();

        for (y, row) in self.buffer.iter().enumerate() {
            queue!(out, MoveTo(0, y as u16))?;

            for cell in row {
                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Bold))?;
                }

                if let Some(color) = cell.fg {
                    queue!(out, SetForegroundColor(color), Print(cell.ch), ResetColor)?;
                } else {
                    queue!(out, Print(cell.ch))?;
                }

                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Reset))?;
                }
            }
        }

        out.flush()?;
        Ok(())
    }

    /// Wait up to `timeout` for a keypress or resize
    pub fn next_input(&self, timeout: Duration) -> io::Result<Option<Input>> {
        if poll(timeout)? {
            match read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    return Ok(Some(Input::Key(key.code, key.modifiers)));
                }
                Event::Resize(w, h) => return Ok(Some(Input::Resize(w, h))),
                _ => {}
            }
        }
        Ok(None)
    }

    /// Print buffer to stdout with ANSI colors (for print mode)
    pub fn print_to_stdout(&self) {
        let mut out = String::new();
        self.write_ansi(&mut out);
        print!("{}", out);
    }

    fn write_ansi(&self, out: &mut String) {
        for row in &self.buffer {
            for cell in row {
                if cell.ch == ' ' {
                    out.push(' ');
                    continue;
                }

                if cell.bold {
                    out.push_str("\x1b[1m");
                }

                match cell.fg {
                    Some(Color::Rgb { r, g, b }) => {
                        out.push_str(&format!("\x1b[38;2;{};{};{}m", r, g, b));
                    }
                    Some(Color::AnsiValue(v)) => out.push_str(&format!("\x1b[38;5;{}m", v)),
                    Some(Color::White) => out.push_str("\x1b[97m"),
                    Some(Color::Grey) => out.push_str("\x1b[37m"),
                    Some(Color::DarkGrey) => out.push_str("\x1b[90m"),
                    _ => {}
                }

                out.push(cell.ch);
                out.push_str("\x1b[0m");
            }
            out.push('\n');
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(stdout(), Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}

/// Helper to create RGB colors
pub fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_is_clipped_to_buffer() {
        let mut term = Terminal::detached(4, 2);
        term.set(-1, 0, 'x', None, false);
        term.set(4, 0, 'x', None, false);
        term.set(3, 1, 'y', None, false);
        assert_eq!(term.get(3, 1).map(|c| c.ch), Some('y'));
        assert!(term.get(4, 0).is_none());
    }

    #[test]
    fn resize_discards_contents() {
        let mut term = Terminal::detached(4, 2);
        term.set_str(0, 0, "ab", None, false);
        term.resize(6, 3);
        assert_eq!(term.size(), (6, 3));
        assert_eq!(term.get(0, 0).map(|c| c.ch), Some(' '));
    }

    #[test]
    fn ansi_output_carries_rgb() {
        let mut term = Terminal::detached(2, 1);
        term.set(0, 0, '⠿', Some(rgb(1, 2, 3)), true);
        let mut out = String::new();
        term.write_ansi(&mut out);
        assert_eq!(out, "\x1b[1m\x1b[38;2;1;2;3m⠿\x1b[0m \n");
    }
}
