//! Placement of repeated template items inside a named group area

use std::str::FromStr;

use super::error::LayoutError;
use super::types::{BoundingBox, Point};
use crate::template::TemplateSet;

/// Placement strategy for array-bound layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Fixed item-size steps from the area's top (vertical) or left edge
    #[default]
    Linear,
    /// Area height split into one equal slot per item
    Auto,
    /// Area split into `rows x columns` equal cells
    Grid,
}

impl Strategy {
    pub const NAMES: [&'static str; 3] = ["linear", "auto", "grid"];
}

impl FromStr for Strategy {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Strategy::Linear),
            "auto" => Ok(Strategy::Auto),
            "grid" => Ok(Strategy::Grid),
            other => Err(LayoutError::unknown_positioning(other, &Strategy::NAMES)),
        }
    }
}

/// Fill direction for linear and grid placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Horizontal,
    #[default]
    Vertical,
}

impl Direction {
    /// Anything other than `"horizontal"` is vertical
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("horizontal") => Direction::Horizontal,
            _ => Direction::Vertical,
        }
    }
}

/// A named placement region declared by a `group` definition
#[derive(Debug, Clone, PartialEq)]
pub struct GroupArea {
    pub name: String,
    pub bounds: BoundingBox,
}

impl GroupArea {
    /// Scan fixed templates for a group definition with this qualified name.
    ///
    /// When several fixed templates declare the same group, the last one wins.
    pub fn discover<'a>(
        fixed: impl DoubleEndedIterator<Item = &'a TemplateSet>,
        name: &str,
    ) -> Result<Self, LayoutError> {
        fixed
            .rev()
            .find_map(|set| set.find_group(name))
            .map(|def| {
                let (x, y) = def.origin();
                let (w, h) = def.size.unwrap_or((0.0, 0.0));
                GroupArea {
                    name: name.to_string(),
                    bounds: BoundingBox::new(x, y, w, h),
                }
            })
            .ok_or_else(|| LayoutError::group_not_found(name))
    }
}

/// Per-index anchor computation for one array layout and item count
#[derive(Debug, Clone, PartialEq)]
pub struct Positioner {
    pub area: BoundingBox,
    pub item_width: f64,
    pub item_height: f64,
    pub count: usize,
    pub strategy: Strategy,
    pub direction: Direction,
    pub rows: usize,
    pub columns: usize,
}

impl Positioner {
    pub fn new(area: BoundingBox, item_width: f64, item_height: f64, count: usize) -> Self {
        Self {
            area,
            item_width,
            item_height,
            count,
            strategy: Strategy::default(),
            direction: Direction::default(),
            rows: 1,
            columns: 1,
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Grid dimensions; zero counts are treated as one
    pub fn with_grid(mut self, rows: usize, columns: usize) -> Self {
        self.rows = rows.max(1);
        self.columns = columns.max(1);
        self
    }

    /// Bottom-left anchor of item `index`
    pub fn position(&self, index: usize) -> Point {
        let i = index as f64;
        let x = self.area.x;
        let top = self.area.top();

        match self.strategy {
            Strategy::Linear => match self.direction {
                Direction::Horizontal => Point::new(x + i * self.item_width, self.area.y),
                Direction::Vertical => Point::new(x, top - (i + 1.0) * self.item_height),
            },
            Strategy::Auto => {
                let slot = self.area.height / self.count.max(1) as f64;
                Point::new(x, top - i * slot - self.item_height)
            }
            Strategy::Grid => {
                let cw = self.area.width / self.columns as f64;
                let ch = self.area.height / self.rows as f64;
                let (col, row) = match self.direction {
                    Direction::Horizontal => (index % self.columns, index / self.columns),
                    Direction::Vertical => (index / self.rows, index % self.rows),
                };
                Point::new(x + col as f64 * cw, top - ch - row as f64 * ch)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse() {
        assert_eq!("grid".parse::<Strategy>().unwrap(), Strategy::Grid);
        assert!(matches!(
            "spiral".parse::<Strategy>(),
            Err(LayoutError::UnknownPositioning { .. })
        ));
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse(Some("horizontal")), Direction::Horizontal);
        assert_eq!(Direction::parse(Some("sideways")), Direction::Vertical);
        assert_eq!(Direction::parse(None), Direction::Vertical);
    }

    #[test]
    fn test_linear_vertical_stacks_from_top() {
        let p = Positioner::new(BoundingBox::new(0.0, 100.0, 200.0, 60.0), 200.0, 20.0, 3);
        assert_eq!(p.position(0), Point::new(0.0, 140.0));
        assert_eq!(p.position(1), Point::new(0.0, 120.0));
        assert_eq!(p.position(2), Point::new(0.0, 100.0));
    }

    #[test]
    fn test_linear_horizontal_steps_by_width() {
        let p = Positioner::new(BoundingBox::new(10.0, 5.0, 300.0, 50.0), 40.0, 50.0, 3)
            .with_direction(Direction::Horizontal);
        assert_eq!(p.position(0), Point::new(10.0, 5.0));
        assert_eq!(p.position(2), Point::new(90.0, 5.0));
    }

    #[test]
    fn test_auto_ignores_item_height_for_slots() {
        let p = Positioner::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0), 100.0, 10.0, 4)
            .with_strategy(Strategy::Auto);
        assert_eq!(p.position(0), Point::new(0.0, 90.0));
        assert_eq!(p.position(1), Point::new(0.0, 65.0));
        assert_eq!(p.position(3), Point::new(0.0, 15.0));
    }

    #[test]
    fn test_grid_horizontal_row_major() {
        let p = Positioner::new(BoundingBox::new(0.0, 0.0, 300.0, 200.0), 100.0, 100.0, 6)
            .with_strategy(Strategy::Grid)
            .with_direction(Direction::Horizontal)
            .with_grid(2, 3);
        assert_eq!(p.position(0), Point::new(0.0, 100.0));
        assert_eq!(p.position(2), Point::new(200.0, 100.0));
        assert_eq!(p.position(4), Point::new(100.0, 0.0));
    }

    #[test]
    fn test_grid_vertical_column_major() {
        let p = Positioner::new(BoundingBox::new(0.0, 0.0, 300.0, 200.0), 100.0, 100.0, 6)
            .with_strategy(Strategy::Grid)
            .with_grid(2, 3);
        assert_eq!(p.position(1), Point::new(0.0, 0.0));
        assert_eq!(p.position(2), Point::new(100.0, 100.0));
        assert_eq!(p.position(5), Point::new(200.0, 0.0));
    }

    #[test]
    fn test_positions_are_index_pure() {
        let p = Positioner::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0), 10.0, 10.0, 5);
        let first: Vec<_> = (0..5).map(|i| p.position(i)).collect();
        let again: Vec<_> = (0..5).rev().map(|i| p.position(i)).collect();
        assert_eq!(first, again.into_iter().rev().collect::<Vec<_>>());
    }
}
