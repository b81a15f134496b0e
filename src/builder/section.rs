//! Page orientation, margins, column count and the single-column heading break.

use crate::docx::{Margins, PageSize};
use crate::model::BuildWarning;

/// A4 long side in twips (842pt).
pub const PAGE_LONG_SIDE: u32 = 842 * 20;
/// A4 short side in twips (595pt).
pub const PAGE_SHORT_SIDE: u32 = 595 * 20;

pub const MINIMUM_MARGIN_TOP: u32 = 240;
pub const MINIMUM_MARGIN_BOTTOM: u32 = 240;

pub const MAX_COLUMNS: u8 = 3;

pub fn plan_orientation(landscape: bool) -> PageSize {
    if landscape {
        PageSize {
            width: PAGE_LONG_SIDE,
            height: PAGE_SHORT_SIDE,
        }
    } else {
        PageSize {
            width: PAGE_SHORT_SIDE,
            height: PAGE_LONG_SIDE,
        }
    }
}

/// Fixed top/bottom margins; left and right keep the format default.
pub fn document_margins() -> Margins {
    Margins {
        top: Some(MINIMUM_MARGIN_TOP),
        right: None,
        bottom: Some(MINIMUM_MARGIN_BOTTOM),
        left: None,
    }
}

/// Column count to apply. Values outside `1..=3` fall back to a single column.
pub fn plan_columns(requested: i32) -> (u8, Option<BuildWarning>) {
    match u8::try_from(requested) {
        Ok(n) if (1..=MAX_COLUMNS).contains(&n) => (n, None),
        _ => {
            log::warn!("'numColumns' must be between 1 and {MAX_COLUMNS} but is {requested}, using 1");
            (1, Some(BuildWarning::ColumnsClamped { requested }))
        }
    }
}

/// Content index whose paragraph ends the single-column heading section.
///
/// `columns` is the already clamped column count.
pub fn plan_section_break_index(single_column_lines: usize, columns: u8) -> Option<usize> {
    (single_column_lines >= 1 && columns > 1).then_some(single_column_lines)
}
