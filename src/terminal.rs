use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, stdout, BufWriter, Write};
use std::time::Duration;

/// Double-buffered terminal drawing surface. `present` only writes the
/// cells that differ from what is already on screen.
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    /// What the screen currently shows; `None` forces a full redraw
    front: Option<Vec<Vec<Cell>>>,
    alternate_screen: bool,
}

/// A single cell in the terminal buffer
#[derive(Clone, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
            bold: false,
        }
    }
}

impl Terminal {
    /// Initialize the terminal for drawing
    pub fn new(alternate_screen: bool) -> io::Result<Self> {
        let (width, height) = size()?;

        if alternate_screen {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide)?;
        }

        Ok(Self {
            width,
            height,
            buffer: blank(width, height),
            front: None,
            alternate_screen,
        })
    }

    /// Buffer-only terminal that never touches stdout modes
    pub fn headless(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            buffer: blank(width, height),
            front: None,
            alternate_screen: false,
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Reallocate the buffer for a new terminal size
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = blank(width, height);
        self.front = None;
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            for cell in row {
                *cell = Cell::default();
            }
        }
    }

    /// Clear the actual terminal
    pub fn clear_screen(&mut self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        self.front = None;
        Ok(())
    }

    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        self.set_with_bg(x, y, ch, fg, None, bold);
    }

    pub fn set_with_bg(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bg: Option<Color>, bold: bool) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize][x as usize] = Cell { ch, fg, bg, bold };
        }
    }

    /// Set a string starting at position
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        self.buffer.get(y as usize)?.get(x as usize)
    }

    /// Flush changed cells to the screen in one write
    pub fn present(&mut self) -> io::Result<()> {
        let mut out = BufWriter::new(stdout());

        for (y, row) in self.buffer.iter().enumerate() {
            let shown = self.front.as_ref().and_then(|f| f.get(y));
            let mut cursor_ok = false;

            for (x, cell) in row.iter().enumerate() {
                if shown.and_then(|r| r.get(x)) == Some(cell) {
                    cursor_ok = false;
                    continue;
                }
                if !cursor_ok {
                    queue!(out, MoveTo(x as u16, y as u16))?;
                    cursor_ok = true;
                }
                write_cell(&mut out, cell)?;
            }
        }

        out.flush()?;
        self.front = Some(self.buffer.clone());
        Ok(())
    }

    /// Check for keypress (non-blocking), returns (code, modifiers)
    pub fn check_key(&self) -> io::Result<Option<(KeyCode, KeyModifiers)>> {
        if poll(Duration::from_millis(0))? {
            if let Event::Key(key_event) = read()? {
                if key_event.kind != KeyEventKind::Release {
                    return Ok(Some((key_event.code, key_event.modifiers)));
                }
            }
        }
        Ok(None)
    }

    pub fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

fn write_cell<W: Write>(out: &mut W, cell: &Cell) -> io::Result<()> {
    if cell.bold {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if let Some(color) = cell.fg {
        queue!(out, SetForegroundColor(color))?;
    }
    if let Some(color) = cell.bg {
        queue!(out, SetBackgroundColor(color))?;
    }
    queue!(out, Print(cell.ch))?;
    if cell.fg.is_some() || cell.bg.is_some() {
        queue!(out, ResetColor)?;
    }
    if cell.bold {
        queue!(out, SetAttribute(Attribute::Reset))?;
    }
    Ok(())
}

fn blank(width: u16, height: u16) -> Vec<Vec<Cell>> {
    vec![vec![Cell::default(); width as usize]; height as usize]
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
