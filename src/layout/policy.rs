//! Reading-order policies.
//!
//! A policy answers two questions about a page: where the column boundaries
//! are, and in which order the columns are read. Partitioning, sorting and
//! joining stay in [`ColumnReconstructor`](super::ColumnReconstructor), so a
//! new layout only needs a new policy.

use std::fmt::Debug;

use crate::model::Locale;
use crate::options::{ReadingOrder, DEFAULT_GUTTER_MARGIN};

/// Column geometry and concatenation order for a page.
pub trait ReadingOrderPolicy: Send + Sync + Debug {
    /// Split positions, ascending in x, for a page of the given width.
    ///
    /// A fragment lands in column `i` where `i` is the number of splits
    /// strictly left of its x coordinate, so `n` splits give `n + 1` columns
    /// indexed left to right.
    fn splits(&self, page_width: f32) -> Vec<f32>;

    /// Column indices (left-to-right numbering) in the order they are read.
    fn column_order(&self, column_count: usize) -> Vec<usize>;

    /// Return the name of this policy for debugging.
    fn name(&self) -> &'static str;
}

/// Direction in which columns follow each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDirection {
    /// Leftmost column first
    LeftToRight,
    /// Rightmost column first
    RightToLeft,
}

/// Equal-width columns separated at fixed fractions of the page width.
///
/// Each split sits at `i * width / columns` pulled left by `gutter_margin`,
/// so text that starts just past a gutter still counts as the next column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnLayout {
    /// Number of columns (at least 1)
    pub columns: usize,
    /// Inward offset of every split
    pub gutter_margin: f32,
    /// Column reading direction
    pub direction: ColumnDirection,
}

impl ColumnLayout {
    /// Two columns read right column first.
    pub fn right_to_left(gutter_margin: f32) -> Self {
        Self {
            columns: 2,
            gutter_margin,
            direction: ColumnDirection::RightToLeft,
        }
    }

    /// Two columns read left column first.
    pub fn left_to_right(gutter_margin: f32) -> Self {
        Self {
            columns: 2,
            gutter_margin,
            direction: ColumnDirection::LeftToRight,
        }
    }

    /// A single top-to-bottom column.
    pub fn single_column() -> Self {
        Self {
            columns: 1,
            gutter_margin: 0.0,
            direction: ColumnDirection::LeftToRight,
        }
    }

    /// Build the layout named by a [`ReadingOrder`] option.
    pub fn from_order(order: ReadingOrder, gutter_margin: f32) -> Self {
        match order {
            ReadingOrder::RightToLeft => Self::right_to_left(gutter_margin),
            ReadingOrder::LeftToRight => Self::left_to_right(gutter_margin),
            ReadingOrder::SingleColumn => Self::single_column(),
        }
    }

    /// Natural two-column layout for a locale.
    pub fn for_locale(locale: Locale) -> Self {
        Self::from_order(ReadingOrder::for_locale(locale), DEFAULT_GUTTER_MARGIN)
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::right_to_left(DEFAULT_GUTTER_MARGIN)
    }
}

impl ReadingOrderPolicy for ColumnLayout {
    fn splits(&self, page_width: f32) -> Vec<f32> {
        let columns = self.columns.max(1);
        (1..columns)
            .map(|i| page_width * i as f32 / columns as f32 - self.gutter_margin)
            .collect()
    }

    fn column_order(&self, column_count: usize) -> Vec<usize> {
        match self.direction {
            ColumnDirection::LeftToRight => (0..column_count).collect(),
            ColumnDirection::RightToLeft => (0..column_count).rev().collect(),
        }
    }

    fn name(&self) -> &'static str {
        match (self.columns, self.direction) {
            (0 | 1, _) => "SingleColumn",
            (_, ColumnDirection::RightToLeft) => "RightToLeftColumns",
            (_, ColumnDirection::LeftToRight) => "LeftToRightColumns",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_column_split() {
        let layout = ColumnLayout::right_to_left(20.0);
        assert_eq!(layout.splits(1000.0), vec![480.0]);
        assert_eq!(layout.column_order(2), vec![1, 0]);
        assert_eq!(layout.name(), "RightToLeftColumns");
    }

    #[test]
    fn test_left_to_right_order() {
        let layout = ColumnLayout::left_to_right(20.0);
        assert_eq!(layout.column_order(2), vec![0, 1]);
    }

    #[test]
    fn test_single_column_has_no_splits() {
        let layout = ColumnLayout::single_column();
        assert!(layout.splits(800.0).is_empty());
        assert_eq!(layout.column_order(1), vec![0]);
        assert_eq!(layout.name(), "SingleColumn");
    }

    #[test]
    fn test_three_columns() {
        let layout = ColumnLayout {
            columns: 3,
            gutter_margin: 10.0,
            direction: ColumnDirection::LeftToRight,
        };
        assert_eq!(layout.splits(900.0), vec![290.0, 590.0]);
    }

    #[test]
    fn test_locale_layouts() {
        assert_eq!(
            ColumnLayout::for_locale(Locale::Hebrew).direction,
            ColumnDirection::RightToLeft
        );
        assert_eq!(
            ColumnLayout::for_locale(Locale::English).direction,
            ColumnDirection::LeftToRight
        );
    }
}
