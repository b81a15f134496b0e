use crate::docx::{DocumentModel, ParagraphHandle, TableAlignment, TableHandle, TableLocation, TableProperties};
use crate::error::Error;
use crate::model::{Alignment, RegionId, Style, TableRegion, TableRegions};

pub const TABLE_CELL_MARGIN: u32 = 80;
pub const PAGE_LONG_SIDE_WITH_BORDER: u32 = 13300;
pub const TABLE_WIDTH: u32 = PAGE_LONG_SIDE_WITH_BORDER / 2;

/// `(row, col)` of `index` inside `region`, filling rows left to right.
pub fn cell_for(region: &TableRegion, index: usize) -> (usize, usize) {
    let offset = index - region.start_index;
    (offset / region.num_columns, offset % region.num_columns)
}

pub fn table_alignment(alignment: Alignment) -> TableAlignment {
    match alignment {
        Alignment::Left => TableAlignment::Left,
        Alignment::Right => TableAlignment::Right,
        _ => TableAlignment::Center,
    }
}

/// Table regions of one build together with the table created for each.
pub struct TableGrid {
    regions: TableRegions,
    content_len: usize,
    handles: Vec<Option<TableHandle>>,
}

impl TableGrid {
    pub fn new(regions: TableRegions, content_len: usize) -> Self {
        let handles = vec![None; regions.len()];
        Self {
            regions,
            content_len,
            handles,
        }
    }

    pub fn regions(&self) -> &TableRegions {
        &self.regions
    }

    pub fn region_for(&self, index: usize) -> Option<(RegionId, &TableRegion)> {
        self.regions.region_for(index)
    }

    pub fn is_table_index(&self, index: usize) -> bool {
        self.regions.is_table_index(index)
    }

    /// Tables created so far.
    pub fn created_tables(&self) -> usize {
        self.handles.iter().flatten().count()
    }

    /// Where the table of `id` lives: the first region starting at index 0
    /// goes into the header, the last region ending at the last index into
    /// the footer.
    pub fn table_location(&self, id: RegionId) -> TableLocation {
        let Some(region) = self.regions.get(id) else {
            return TableLocation::Body;
        };
        if id.0 == 0 && region.start_index == 0 {
            TableLocation::Header
        } else if id.0 + 1 == self.regions.len() && region.end_index + 1 == self.content_len {
            TableLocation::Footer
        } else {
            TableLocation::Body
        }
    }

    /// Table for `id`, created on first use and reused afterwards.
    /// `first_style` is the style of the region's first block.
    pub fn table_handle_for<M: DocumentModel>(
        &mut self,
        model: &mut M,
        id: RegionId,
        first_style: &Style,
    ) -> Result<TableHandle, Error> {
        if let Some(Some(handle)) = self.handles.get(id.0) {
            return Ok(*handle);
        }
        let Some(region) = self.regions.get(id).copied() else {
            return Err(Error::build(
                format!("unknown table region {}", id.0),
                "region is not part of this build",
            ));
        };

        let location = self.table_location(id);
        let properties = TableProperties {
            alignment: table_alignment(first_style.text_align),
            cell_margin: TABLE_CELL_MARGIN,
            width: TABLE_WIDTH,
        };
        let handle = model.create_table(region.num_rows, region.num_columns, location, properties);
        log::debug!(
            "TABLE region={} {}x{} indices={}..={} location={location:?}",
            id.0,
            region.num_rows,
            region.num_columns,
            region.start_index,
            region.end_index
        );
        self.handles[id.0] = Some(handle);
        Ok(handle)
    }

    /// Paragraph of the cell that holds `index`.
    pub fn cell_paragraph<M: DocumentModel>(
        &mut self,
        model: &mut M,
        id: RegionId,
        index: usize,
        first_style: &Style,
    ) -> Result<ParagraphHandle, Error> {
        let table = self.table_handle_for(model, id, first_style)?;
        let Some(region) = self.regions.get(id) else {
            return Err(Error::build(
                format!("unknown table region {}", id.0),
                "region is not part of this build",
            ));
        };
        let (row, col) = cell_for(region, index);
        let cell = model.table_cell(table, row, col)?;
        Ok(model.cell_paragraph(cell))
    }
}
