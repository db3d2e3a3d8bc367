//! Grid placement for the rendered frames of a transfer.
//!
//! [`plan`] is a pure function of the frame count and the optional requested
//! dimensions. Frames fill the grid row-major, left to right and top to
//! bottom; trailing cells stay blank.

use serde::{Deserialize, Serialize};

use crate::error::EncodeError;

/// Default gap between adjacent cells of a composite image, in pixels.
pub const DEFAULT_CELL_SPACING: u32 = 20;

/// Position of one frame within the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Zero-based row.
    pub row: usize,
    /// Zero-based column.
    pub col: usize,
}

/// Grid of `rows` by `cols` cells holding `frame_count` frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    rows: usize,
    cols: usize,
    frame_count: usize,
}

impl Layout {
    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize { self.rows }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize { self.cols }

    /// Number of frames placed in the grid.
    #[must_use]
    pub const fn frame_count(&self) -> usize { self.frame_count }

    /// Total number of cells.
    #[must_use]
    pub const fn capacity(&self) -> usize { self.rows * self.cols }

    /// Cells left blank after the last frame.
    #[must_use]
    pub const fn blank_cells(&self) -> usize { self.capacity() - self.frame_count }

    /// Cell holding frame `index`, or `None` past the last frame.
    #[must_use]
    pub const fn cell(&self, index: usize) -> Option<Cell> {
        if index >= self.frame_count {
            return None;
        }
        Some(Cell {
            row: index / self.cols,
            col: index % self.cols,
        })
    }

    /// Cells in frame order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.frame_count).filter_map(|index| self.cell(index))
    }
}

/// Choose a grid for `frame_count` frames.
///
/// With both dimensions requested the grid is used as given. With one, the
/// other is the smallest value that fits every frame. With neither, the grid
/// is near-square with at least as many columns as rows.
///
/// # Errors
///
/// Returns [`EncodeError::EmptyTransfer`] for zero frames,
/// [`EncodeError::InvalidConfiguration`] for a requested dimension of zero,
/// and [`EncodeError::LayoutTooSmall`] when the requested grid has fewer cells
/// than frames.
///
/// # Examples
///
/// ```
/// use qrarray::layout::plan;
/// let layout = plan(10, None, None).expect("non-empty transfer");
/// assert_eq!((layout.rows(), layout.cols()), (3, 4));
/// ```
pub fn plan(
    frame_count: usize,
    requested_rows: Option<usize>,
    requested_cols: Option<usize>,
) -> Result<Layout, EncodeError> {
    if frame_count == 0 {
        return Err(EncodeError::EmptyTransfer);
    }
    if requested_rows == Some(0) || requested_cols == Some(0) {
        return Err(EncodeError::invalid_configuration(
            "requested rows and columns must be at least 1",
        ));
    }

    let (rows, cols) = match (requested_rows, requested_cols) {
        (Some(rows), Some(cols)) => {
            if rows.checked_mul(cols).is_some_and(|cells| cells < frame_count) {
                return Err(EncodeError::LayoutTooSmall {
                    rows,
                    cols,
                    frame_count,
                });
            }
            (rows, cols)
        }
        (Some(rows), None) => (rows, frame_count.div_ceil(rows)),
        (None, Some(cols)) => (frame_count.div_ceil(cols), cols),
        (None, None) => {
            let cols = ceil_sqrt(frame_count);
            (frame_count.div_ceil(cols), cols)
        }
    };

    if rows.checked_mul(cols).is_none() {
        return Err(EncodeError::invalid_configuration(format!(
            "a grid of {rows}x{cols} has more cells than can be addressed"
        )));
    }

    Ok(Layout {
        rows,
        cols,
        frame_count,
    })
}

fn ceil_sqrt(value: usize) -> usize {
    let root = value.isqrt();
    if root * root < value { root + 1 } else { root }
}

/// Pixel geometry of a composite image built from equally sized cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeGeometry {
    /// Width of one rendered frame.
    pub cell_width: u32,
    /// Height of one rendered frame.
    pub cell_height: u32,
    /// Gap between adjacent cells.
    pub spacing: u32,
}

impl CompositeGeometry {
    /// Geometry for cells of `cell_width` by `cell_height` with the default
    /// spacing.
    #[must_use]
    pub const fn new(cell_width: u32, cell_height: u32) -> Self {
        Self {
            cell_width,
            cell_height,
            spacing: DEFAULT_CELL_SPACING,
        }
    }

    /// Replace the gap between cells.
    #[must_use]
    pub const fn with_spacing(mut self, spacing: u32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Top-left pixel of `cell`.
    #[must_use]
    pub fn origin(&self, cell: Cell) -> (u32, u32) {
        (
            offset(cell.col, self.cell_width, self.spacing),
            offset(cell.row, self.cell_height, self.spacing),
        )
    }

    /// Width and height of the whole composite for `layout`.
    #[must_use]
    pub fn canvas_size(&self, layout: &Layout) -> (u32, u32) {
        (
            span(layout.cols(), self.cell_width, self.spacing),
            span(layout.rows(), self.cell_height, self.spacing),
        )
    }
}

fn offset(position: usize, extent: u32, spacing: u32) -> u32 {
    let position = u32::try_from(position).unwrap_or(u32::MAX);
    position.saturating_mul(extent.saturating_add(spacing))
}

fn span(count: usize, extent: u32, spacing: u32) -> u32 {
    let count = u32::try_from(count).unwrap_or(u32::MAX);
    count
        .saturating_mul(extent)
        .saturating_add(count.saturating_sub(1).saturating_mul(spacing))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{Cell, CompositeGeometry, Layout, plan};
    use crate::error::EncodeError;

    #[rstest]
    #[case(1, 1, 1)]
    #[case(2, 1, 2)]
    #[case(3, 2, 2)]
    #[case(4, 2, 2)]
    #[case(5, 2, 3)]
    #[case(10, 3, 4)]
    #[case(16, 4, 4)]
    #[case(17, 4, 5)]
    fn automatic_layout_is_near_square(
        #[case] frames: usize,
        #[case] rows: usize,
        #[case] cols: usize,
    ) {
        let layout = plan(frames, None, None).expect("non-empty transfer");
        assert_eq!((layout.rows(), layout.cols()), (rows, cols));
        assert!(layout.cols() >= layout.rows());
    }

    #[test]
    fn one_dimension_derives_the_other() {
        let by_cols = plan(10, None, Some(3)).expect("columns given");
        assert_eq!((by_cols.rows(), by_cols.cols()), (4, 3));

        let by_rows = plan(10, Some(3), None).expect("rows given");
        assert_eq!((by_rows.rows(), by_rows.cols()), (3, 4));
    }

    #[test]
    fn explicit_layout_is_kept_when_large_enough() {
        let layout = plan(5, Some(1), Some(8)).expect("eight cells hold five frames");
        assert_eq!((layout.rows(), layout.cols()), (1, 8));
        assert_eq!(layout.blank_cells(), 3);
    }

    #[test]
    fn explicit_layout_too_small_is_rejected() {
        let err = plan(7, Some(2), Some(3)).expect_err("six cells cannot hold seven frames");
        assert_eq!(
            err,
            EncodeError::LayoutTooSmall {
                rows: 2,
                cols: 3,
                frame_count: 7,
            }
        );
    }

    #[rstest]
    #[case(Some(usize::MAX), Some(2))]
    #[case(Some(2), Some(usize::MAX))]
    fn explicit_layout_with_unaddressable_cell_count_is_rejected(
        #[case] rows: Option<usize>,
        #[case] cols: Option<usize>,
    ) {
        let err = plan(1, rows, cols).expect_err("cell count overflows");
        assert!(matches!(err, EncodeError::InvalidConfiguration { .. }));
    }

    #[test]
    fn zero_frames_is_an_empty_transfer() {
        assert_eq!(plan(0, None, None), Err(EncodeError::EmptyTransfer));
    }

    #[rstest]
    #[case(Some(0), None)]
    #[case(None, Some(0))]
    #[case(Some(0), Some(4))]
    fn zero_dimension_is_invalid(#[case] rows: Option<usize>, #[case] cols: Option<usize>) {
        let err = plan(4, rows, cols).expect_err("zero dimension must fail");
        assert!(matches!(err, EncodeError::InvalidConfiguration { .. }));
    }

    #[test]
    fn cells_fill_row_major() {
        let layout = plan(5, None, Some(2)).expect("columns given");
        let cells: Vec<Cell> = layout.cells().collect();
        assert_eq!(
            cells,
            [
                Cell { row: 0, col: 0 },
                Cell { row: 0, col: 1 },
                Cell { row: 1, col: 0 },
                Cell { row: 1, col: 1 },
                Cell { row: 2, col: 0 },
            ]
        );
        assert_eq!(layout.cell(5), None);
    }

    fn three_by_two() -> Layout { plan(5, Some(2), Some(3)).expect("six cells hold five frames") }

    #[test]
    fn geometry_places_cells_with_spacing() {
        let geometry = CompositeGeometry::new(100, 80);
        assert_eq!(geometry.origin(Cell { row: 0, col: 0 }), (0, 0));
        assert_eq!(geometry.origin(Cell { row: 1, col: 2 }), (240, 100));
        assert_eq!(geometry.canvas_size(&three_by_two()), (340, 180));
    }

    #[test]
    fn geometry_without_spacing_tiles_edge_to_edge() {
        let geometry = CompositeGeometry::new(10, 10).with_spacing(0);
        assert_eq!(geometry.canvas_size(&three_by_two()), (30, 20));
    }
}
