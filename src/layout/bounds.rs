//! Pixel geometry of resolved panels.

use super::SplitDirection;

/// Area a panel occupies inside the page's content rectangle, in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanelBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PanelBounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True until a layout pass has assigned a real size
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Divide this area between the two children of a split
    ///
    /// The divider takes `divider_width` pixels between them; `ratio` is the
    /// first child's share of what remains. Neither side goes negative.
    pub fn split(
        &self,
        direction: SplitDirection,
        ratio: f32,
        divider_width: f32,
    ) -> (Self, Self) {
        match direction {
            SplitDirection::Horizontal => {
                let first = ((self.height - divider_width) * ratio).max(0.0);
                let second = (self.height - first - divider_width).max(0.0);
                (
                    Self::new(self.x, self.y, self.width, first),
                    Self::new(self.x, self.y + first + divider_width, self.width, second),
                )
            }
            SplitDirection::Vertical => {
                let first = ((self.width - divider_width) * ratio).max(0.0);
                let second = (self.width - first - divider_width).max(0.0);
                (
                    Self::new(self.x, self.y, first, self.height),
                    Self::new(self.x + first + divider_width, self.y, second, self.height),
                )
            }
        }
    }

    /// Terminal grid (cols, rows) that fits, never smaller than 1x1
    pub fn grid_size(&self, cell_width: f32, cell_height: f32) -> (u16, u16) {
        let cols = (self.width / cell_width).floor() as u16;
        let rows = (self.height / cell_height).floor() as u16;
        (cols.max(1), rows.max(1))
    }
}
