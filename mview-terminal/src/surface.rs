/// Terminal cells as a drawable surface
use crossterm::terminal;
use mview_core::Surface;
use std::io;

/// A grid of character cells.
///
/// Each cell covers two pixels vertically, so the displayed size is
/// `(columns, 2 * rows)`; this keeps pixels roughly square on common fonts.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalSurface {
    columns: u16,
    rows: u16,
    buffer: (u32, u32),
}

impl TerminalSurface {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns,
            rows,
            buffer: (columns.max(1) as u32, rows.max(1) as u32 * 2),
        }
    }

    /// Surface sized to the current terminal window.
    pub fn from_terminal() -> io::Result<Self> {
        let (columns, rows) = terminal::size()?;
        Ok(Self::new(columns, rows))
    }

    /// Records a terminal resize event.
    pub fn set_cells(&mut self, columns: u16, rows: u16) {
        self.columns = columns;
        self.rows = rows;
    }

    pub fn cells(&self) -> (u16, u16) {
        (self.columns, self.rows)
    }
}

impl Surface for TerminalSurface {
    fn displayed_size(&self) -> (f64, f64) {
        (self.columns as f64, self.rows as f64 * 2.0)
    }

    fn buffer_size(&self) -> (u32, u32) {
        self.buffer
    }

    fn set_buffer_size(&mut self, width: u32, height: u32) {
        self.buffer = (width, height);
    }
}
