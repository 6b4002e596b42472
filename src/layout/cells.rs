//! Physical page subdivision into layout cells

use serde_json::Value;

use super::error::LayoutError;
use super::types::{BoundingBox, PageSize};

/// One coordinate of a cell, relative to the page extent or absolute
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coord {
    Percent(f64),
    Absolute(f64),
}

impl Coord {
    pub fn resolve(&self, extent: f64) -> f64 {
        match *self {
            Coord::Percent(p) => extent * p / 100.0,
            Coord::Absolute(v) => v,
        }
    }

    /// Parse `"NN%"`, `"NN"` or a bare number
    pub fn from_value(value: &Value) -> Option<Coord> {
        match value {
            Value::Number(n) => n.as_f64().map(Coord::Absolute),
            Value::String(s) => {
                let s = s.trim();
                match s.strip_suffix('%') {
                    Some(pct) => pct.trim().parse().ok().map(Coord::Percent),
                    None => s.parse().ok().map(Coord::Absolute),
                }
            }
            _ => None,
        }
    }
}

/// `[x, y, width, height]` of one cell
pub type CellSpec = [Coord; 4];

/// How a physical page is divided into cells.
///
/// Cells are ordered row-major starting at the page origin (bottom-left).
#[derive(Debug, Clone, PartialEq)]
pub struct CellLayout {
    cells: Vec<CellSpec>,
}

impl Default for CellLayout {
    fn default() -> Self {
        Self::grid(1, 1)
    }
}

impl CellLayout {
    /// Parse a layout mode: `"postcard"` or `"<cols>x<rows>"` (`*` also
    /// accepted as separator, case-insensitive)
    pub fn parse(mode: &str) -> Result<Self, LayoutError> {
        let normalized = mode.trim().to_lowercase();
        if normalized == "postcard" {
            return Ok(Self::postcard());
        }

        let (cols, rows) = normalized
            .split_once(|c: char| c == 'x' || c == '*')
            .ok_or_else(|| LayoutError::invalid_mode(mode))?;
        let parse_count = |s: &str| -> Option<usize> {
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            s.parse().ok().filter(|n| *n > 0)
        };
        match (parse_count(cols), parse_count(rows)) {
            (Some(cols), Some(rows)) => Ok(Self::grid(cols, rows)),
            _ => Err(LayoutError::invalid_mode(mode)),
        }
    }

    /// Parse either a mode string or an explicit list of `[x, y, w, h]` cells
    pub fn from_value(value: &Value) -> Result<Self, LayoutError> {
        match value {
            Value::String(mode) => Self::parse(mode),
            Value::Array(items) if !items.is_empty() => {
                let cells = items
                    .iter()
                    .map(|item| {
                        parse_cell(item).ok_or_else(|| LayoutError::invalid_mode(item.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self { cells })
            }
            other => Err(LayoutError::invalid_mode(other.to_string())),
        }
    }

    /// Fixed 2x2 grid of quarter-page cells
    pub fn postcard() -> Self {
        Self::grid(2, 2)
    }

    /// `cols * rows` equal cells, row-major
    pub fn grid(cols: usize, rows: usize) -> Self {
        let cw = 100.0 / cols as f64;
        let ch = 100.0 / rows as f64;
        let mut cells = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                cells.push([
                    Coord::Percent(col as f64 * cw),
                    Coord::Percent(row as f64 * ch),
                    Coord::Percent(cw),
                    Coord::Percent(ch),
                ]);
            }
        }
        Self { cells }
    }

    pub fn count(&self) -> usize {
        self.cells.len()
    }

    /// Absolute rectangle of cell `index` on a page of the given size
    pub fn cell(&self, index: usize, page: PageSize) -> Result<BoundingBox, LayoutError> {
        let [x, y, w, h] = self
            .cells
            .get(index)
            .ok_or_else(|| LayoutError::out_of_range(index, self.cells.len()))?;
        Ok(BoundingBox::new(
            x.resolve(page.width),
            y.resolve(page.height),
            w.resolve(page.width),
            h.resolve(page.height),
        ))
    }
}

fn parse_cell(value: &Value) -> Option<CellSpec> {
    let items = value.as_array()?;
    if items.len() != 4 {
        return None;
    }
    Some([
        Coord::from_value(&items[0])?,
        Coord::from_value(&items[1])?,
        Coord::from_value(&items[2])?,
        Coord::from_value(&items[3])?,
    ])
}
