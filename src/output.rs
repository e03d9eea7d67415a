/// Grid document output.
///
/// Writes the `{"data": [...]}` document directly to a `Write` sink with no
/// intermediate `serde_json::Value`. Uses `itoa` for cell values.
use std::io::{self, Write};

use crate::grid::Grid;

/// Document key holding the rows.
pub const DATA_KEY: &str = "data";

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Indented object, one compact row per line (the default file layout):
    ///
    /// ```text
    /// {
    ///   "data": [
    ///     [-1, 5, -1],
    ///     [2, -1, 7]
    ///   ]
    /// }
    /// ```
    #[default]
    Rows,
    /// Whole document on a single line (`--compact`).
    Compact,
}

/// Render the whole document into a `String`.
pub fn format_grid(grid: &Grid, mode: OutputMode) -> String {
    let mut buf = Vec::new();
    write_grid(&mut buf, grid, mode).expect("writing to a Vec cannot fail");
    String::from_utf8(buf).expect("grid output is ASCII")
}

/// Write the document followed by a newline.
pub fn write_grid<W: Write>(w: &mut W, grid: &Grid, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Rows => write_document(w, grid, &RowsFmt),
        OutputMode::Compact => write_document(w, grid, &CompactFmt),
    }?;
    w.write_all(b"\n")
}

// ---------------------------------------------------------------------------
// Formatter infrastructure
// ---------------------------------------------------------------------------

/// Whitespace differences between layouts. Structural characters are written
/// by `write_document`; formatters only add spacing and line breaks.
trait GridFormatter {
    /// After `{`.
    fn after_open_object<W: Write>(&self, w: &mut W) -> io::Result<()>;
    /// After `:` following the key.
    fn after_colon<W: Write>(&self, w: &mut W) -> io::Result<()>;
    /// After the outer `[`, before the first row.
    fn after_open_rows<W: Write>(&self, w: &mut W) -> io::Result<()>;
    /// Before every row's `[`.
    fn before_row<W: Write>(&self, w: &mut W) -> io::Result<()>;
    /// After the `,` between rows.
    fn after_row_sep<W: Write>(&self, w: &mut W) -> io::Result<()>;
    /// After the `,` between cells of one row.
    fn after_cell_sep<W: Write>(&self, w: &mut W) -> io::Result<()>;
    /// After the last row, before the outer `]`.
    fn before_close_rows<W: Write>(&self, w: &mut W) -> io::Result<()>;
    /// Before the final `}`.
    fn before_close_object<W: Write>(&self, w: &mut W) -> io::Result<()>;
}

struct CompactFmt;

impl GridFormatter for CompactFmt {
    #[inline]
    fn after_open_object<W: Write>(&self, _w: &mut W) -> io::Result<()> {
        Ok(())
    }
    #[inline]
    fn after_colon<W: Write>(&self, _w: &mut W) -> io::Result<()> {
        Ok(())
    }
    #[inline]
    fn after_open_rows<W: Write>(&self, _w: &mut W) -> io::Result<()> {
        Ok(())
    }
    #[inline]
    fn before_row<W: Write>(&self, _w: &mut W) -> io::Result<()> {
        Ok(())
    }
    #[inline]
    fn after_row_sep<W: Write>(&self, _w: &mut W) -> io::Result<()> {
        Ok(())
    }
    #[inline]
    fn after_cell_sep<W: Write>(&self, _w: &mut W) -> io::Result<()> {
        Ok(())
    }
    #[inline]
    fn before_close_rows<W: Write>(&self, _w: &mut W) -> io::Result<()> {
        Ok(())
    }
    #[inline]
    fn before_close_object<W: Write>(&self, _w: &mut W) -> io::Result<()> {
        Ok(())
    }
}

struct RowsFmt;

impl GridFormatter for RowsFmt {
    fn after_open_object<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(b"\n  ")
    }
    fn after_colon<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(b" ")
    }
    fn after_open_rows<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(b"\n")
    }
    fn before_row<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(b"    ")
    }
    fn after_row_sep<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(b"\n")
    }
    fn after_cell_sep<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(b" ")
    }
    fn before_close_rows<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(b"\n  ")
    }
    fn before_close_object<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(b"\n")
    }
}

fn write_document<W: Write, F: GridFormatter>(w: &mut W, grid: &Grid, fmt: &F) -> io::Result<()> {
    w.write_all(b"{")?;
    fmt.after_open_object(w)?;
    w.write_all(b"\"")?;
    w.write_all(DATA_KEY.as_bytes())?;
    w.write_all(b"\":")?;
    fmt.after_colon(w)?;
    w.write_all(b"[")?;
    fmt.after_open_rows(w)?;
    let mut buf = itoa::Buffer::new();
    for (i, row) in grid.iter_rows().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
            fmt.after_row_sep(w)?;
        }
        fmt.before_row(w)?;
        w.write_all(b"[")?;
        for (j, &cell) in row.iter().enumerate() {
            if j > 0 {
                w.write_all(b",")?;
                fmt.after_cell_sep(w)?;
            }
            w.write_all(buf.format(cell).as_bytes())?;
        }
        w.write_all(b"]")?;
    }
    fmt.before_close_rows(w)?;
    w.write_all(b"]")?;
    fmt.before_close_object(w)?;
    w.write_all(b"}")
}
