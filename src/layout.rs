//! Page geometry and cursor bookkeeping for report content.
//!
//! Everything in this module works in millimetres measured from the top-left
//! corner of an A4 page, the same coordinate space the chart placement constants
//! are expressed in.  [`PageGeometry`] converts those page coordinates into the
//! body area that `genpdf` hands to elements.

use crate::model::OverflowPolicy;

/// Width of an A4 page.
pub const PAGE_WIDTH_MM: f64 = 210.0;
/// Height of an A4 page.
pub const PAGE_HEIGHT_MM: f64 = 297.0;
/// Margin applied on every side of the page.
pub const PAGE_MARGIN_MM: f64 = 10.0;
/// Height reserved for the page header.
pub const HEADER_HEIGHT_MM: f64 = 17.0;
/// Height reserved for the page footer.
pub const FOOTER_HEIGHT_MM: f64 = 10.0;
/// Height taken by a section title. Chart rows on a section's first page start right below it.
pub const SECTION_TITLE_HEIGHT_MM: f64 = 8.0;

/// Splits `items` into display rows for a list with `num_columns` columns.
///
/// Items fill the first display column top to bottom, then the next one, so
/// that the cell at `(row, col)` holds `items[row + col * num_rows]`.  Cells
/// past the end of `items` are `None`.
pub fn multicolumn_rows<T>(items: &[T], num_columns: usize) -> Vec<Vec<Option<&T>>> {
    let num_columns = num_columns.max(1);
    let num_rows = (items.len() + num_columns - 1) / num_columns;
    (0..num_rows)
        .map(|row| {
            (0..num_columns)
                .map(|col| items.get(row + col * num_rows))
                .collect()
        })
        .collect()
}

/// Fixed positions used when placing chart rows.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartLayout {
    /// Vertical position of the first row on the section's first page.
    pub first_row_y: f64,
    /// Distance between the tops of consecutive rows.
    pub row_height: f64,
    /// Cursor position past which a paginating section starts a new page.
    pub overflow_y: f64,
    /// Vertical position of the first row on continuation pages.
    pub continuation_y: f64,
    /// Horizontal position of every row image.
    pub image_x: f64,
    /// Rendered width of every row image.
    pub image_width: f64,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            first_row_y: 35.0,
            row_height: 80.0,
            overflow_y: 250.0,
            continuation_y: 30.0,
            image_x: PAGE_MARGIN_MM,
            image_width: 190.0,
        }
    }
}

/// Where a chart row image goes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Page index relative to the first page of the section.
    pub page: usize,
    /// Horizontal page coordinate.
    pub x: f64,
    /// Vertical page coordinate.
    pub y: f64,
}

impl ChartLayout {
    /// Computes the placement of `rows` chart rows.
    ///
    /// The cursor starts at [`first_row_y`](Self::first_row_y) and advances by
    /// [`row_height`](Self::row_height) after every row.  With
    /// [`OverflowPolicy::Paginate`], a cursor past
    /// [`overflow_y`](Self::overflow_y) moves the next row to a new page at
    /// [`continuation_y`](Self::continuation_y).  No page is started when no
    /// row follows.
    pub fn place_rows(&self, rows: usize, overflow: OverflowPolicy) -> Vec<Placement> {
        let mut placements = Vec::with_capacity(rows);
        let mut page = 0;
        let mut y = self.first_row_y;

        for _ in 0..rows {
            if overflow == OverflowPolicy::Paginate && y > self.overflow_y {
                page += 1;
                y = self.continuation_y;
            }
            placements.push(Placement {
                page,
                x: self.image_x,
                y,
            });
            y += self.row_height;
        }

        placements
    }
}

/// Number of chart rows needed for `columns` charts drawn two per row.
pub fn chart_rows(columns: usize) -> usize {
    (columns + 1) / 2
}

/// Fixed page frame shared by the document builder and positioned elements.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    /// Page margin on every side.
    pub margin: f64,
    /// Height reserved for the header.
    pub header_height: f64,
    /// Height reserved for the footer.
    pub footer_height: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            margin: PAGE_MARGIN_MM,
            header_height: HEADER_HEIGHT_MM,
            footer_height: FOOTER_HEIGHT_MM,
        }
    }
}

impl PageGeometry {
    /// Page coordinate of the top of the body area.
    pub fn body_top(&self) -> f64 {
        self.margin + self.header_height
    }

    /// Page coordinate of the bottom of the body area.
    pub fn body_bottom(&self) -> f64 {
        PAGE_HEIGHT_MM - self.margin - self.footer_height
    }

    /// Width of the body area.
    pub fn body_width(&self) -> f64 {
        PAGE_WIDTH_MM - 2.0 * self.margin
    }

    /// Converts a page coordinate into an offset inside an area whose top edge
    /// sits at `area_top` (also a page coordinate). Points above the area clamp to zero.
    pub fn to_area(&self, page_x: f64, page_y: f64, area_top: f64) -> (f64, f64) {
        ((page_x - self.margin).max(0.0), (page_y - area_top).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::{chart_rows, multicolumn_rows, ChartLayout, PageGeometry, Placement};
    use crate::model::OverflowPolicy;

    #[test]
    fn multicolumn_rows_fill_down_then_across() {
        let items = ["a", "b", "c", "d", "e"];
        let rows = multicolumn_rows(&items, 2);

        assert_eq!(
            rows,
            vec![
                vec![Some(&"a"), Some(&"d")],
                vec![Some(&"b"), Some(&"e")],
                vec![Some(&"c"), None],
            ]
        );
    }

    #[test]
    fn multicolumn_rows_reconstruct_original_order() {
        for len in 0..12 {
            let items: Vec<usize> = (0..len).collect();
            let rows = multicolumn_rows(&items, 2);
            let mut read_back = Vec::new();
            for col in 0..2 {
                for row in &rows {
                    if let Some(item) = row[col] {
                        read_back.push(*item);
                    }
                }
            }
            assert_eq!(read_back, items);
        }
    }

    #[test]
    fn multicolumn_rows_of_empty_list() {
        let items: [&str; 0] = [];
        assert!(multicolumn_rows(&items, 2).is_empty());
    }

    #[test]
    fn paginated_rows_break_after_overflow() {
        let layout = ChartLayout::default();
        let ys: Vec<_> = layout
            .place_rows(5, OverflowPolicy::Paginate)
            .into_iter()
            .map(|p| (p.page, p.y))
            .collect();

        assert_eq!(
            ys,
            vec![(0, 35.0), (0, 115.0), (0, 195.0), (1, 30.0), (1, 110.0)]
        );
    }

    #[test]
    fn paginated_rows_do_not_open_trailing_page() {
        let layout = ChartLayout::default();
        let placements = layout.place_rows(3, OverflowPolicy::Paginate);
        assert!(placements.iter().all(|p| p.page == 0));
    }

    #[test]
    fn overflowing_rows_stay_on_first_page() {
        let layout = ChartLayout::default();
        let placements = layout.place_rows(4, OverflowPolicy::Overflow);

        assert_eq!(
            placements.last(),
            Some(&Placement {
                page: 0,
                x: 10.0,
                y: 275.0
            })
        );
    }

    #[test]
    fn chart_rows_round_up() {
        assert_eq!(chart_rows(0), 0);
        assert_eq!(chart_rows(1), 1);
        assert_eq!(chart_rows(6), 3);
        assert_eq!(chart_rows(7), 4);
    }

    #[test]
    fn page_geometry_translates_into_body_area() {
        let geometry = PageGeometry::default();
        assert_eq!(geometry.body_top(), 27.0);
        assert_eq!(geometry.body_width(), 190.0);
        assert_eq!(geometry.to_area(10.0, 35.0, 27.0), (0.0, 8.0));
        assert_eq!(geometry.to_area(10.0, 20.0, 27.0), (0.0, 0.0));
    }
}
