mod package;
mod template;
mod writer;

pub use package::{DocxPackage, RunContent};
pub use template::Template;

use crate::error::Error;
use crate::model::{Alignment, BreakType, EmbeddedPicture, Style};

pub(crate) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub(crate) const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const WPD_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
pub(crate) const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(crate) const PIC_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParagraphHandle(pub(crate) usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RunHandle(pub(crate) usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TableHandle(pub(crate) usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellHandle {
    pub(crate) table: TableHandle,
    pub(crate) row: usize,
    pub(crate) col: usize,
}

/// Container a table is created in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableLocation {
    Header,
    Footer,
    Body,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableAlignment {
    Left,
    Center,
    Right,
}

/// Widths and margins in twips.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableProperties {
    pub alignment: TableAlignment,
    pub cell_margin: u32,
    pub width: u32,
}

/// Page dimensions in twips.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

impl PageSize {
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// Page margins in twips. `None` keeps the format default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Margins {
    pub top: Option<u32>,
    pub right: Option<u32>,
    pub bottom: Option<u32>,
    pub left: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionProperties {
    pub page_size: Option<PageSize>,
    pub margins: Margins,
    pub columns: u8,
}

impl Default for SectionProperties {
    fn default() -> Self {
        Self {
            page_size: None,
            margins: Margins::default(),
            columns: 1,
        }
    }
}

/// Instructions the layout engine issues against a word-processing document.
///
/// Handles are only valid for the model that returned them.
pub trait DocumentModel {
    fn create_paragraph(&mut self) -> ParagraphHandle;
    fn create_header_paragraph(&mut self) -> ParagraphHandle;
    fn create_footer_paragraph(&mut self) -> ParagraphHandle;

    /// Creates a `rows` x `cols` table whose cells each hold one empty paragraph.
    fn create_table(
        &mut self,
        rows: usize,
        cols: usize,
        location: TableLocation,
        properties: TableProperties,
    ) -> TableHandle;
    fn table_cell(&self, table: TableHandle, row: usize, col: usize) -> Result<CellHandle, Error>;
    fn cell_paragraph(&self, cell: CellHandle) -> ParagraphHandle;

    fn add_run(&mut self, paragraph: ParagraphHandle, text: &str) -> RunHandle;
    fn runs(&self, paragraph: ParagraphHandle) -> Vec<RunHandle>;
    fn add_tab(&mut self, run: RunHandle);
    fn add_break(&mut self, run: RunHandle, kind: BreakType);
    fn set_run_style(&mut self, run: RunHandle, style: &Style);
    fn embed_picture(&mut self, run: RunHandle, picture: EmbeddedPicture);

    fn set_paragraph_alignment(&mut self, paragraph: ParagraphHandle, alignment: Alignment);
    fn set_spacing_after(&mut self, paragraph: ParagraphHandle, twips: u32);
    fn add_tab_stop(&mut self, paragraph: ParagraphHandle, offset: u32);

    fn set_page_size(&mut self, size: PageSize);
    /// Sets the given margins. A `None` side keeps its current value.
    fn set_margins(&mut self, margins: Margins);
    fn set_columns(&mut self, columns: u8);
    /// Ends a section at `paragraph` with the section properties current at the time of the call.
    fn insert_section_break(&mut self, paragraph: ParagraphHandle);

    fn serialize(&self) -> Result<Vec<u8>, Error>;
}
