use crate::error::Error;
use crate::model::{Alignment, BreakType, EmbeddedPicture, Style};

use super::template::Template;
use super::{
    CellHandle, DocumentModel, Margins, PageSize, ParagraphHandle, RunHandle, SectionProperties,
    TableHandle, TableLocation, TableProperties,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Block {
    Paragraph(ParagraphHandle),
    Table(TableHandle),
    /// Index into the package's carried template fragments.
    Raw(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunContent {
    Text(String),
    Tab,
    Break(BreakType),
    /// Index into the package's picture list.
    Picture(usize),
}

#[derive(Default)]
pub(super) struct ParagraphData {
    pub(super) runs: Vec<RunHandle>,
    pub(super) alignment: Option<Alignment>,
    pub(super) spacing_after: Option<u32>,
    pub(super) tab_stops: Vec<u32>,
    pub(super) section_break: Option<SectionProperties>,
}

#[derive(Default)]
pub(super) struct RunData {
    pub(super) content: Vec<RunContent>,
    pub(super) style: Option<Style>,
}

pub(super) struct TableData {
    pub(super) rows: usize,
    pub(super) cols: usize,
    pub(super) location: TableLocation,
    pub(super) properties: TableProperties,
    /// Row-major, one paragraph per cell.
    pub(super) cells: Vec<ParagraphHandle>,
}

/// In-memory WordprocessingML document. Paragraphs, runs and tables live in
/// arenas and are addressed by handle.
#[derive(Default)]
pub struct DocxPackage {
    pub(super) body: Vec<Block>,
    pub(super) header: Vec<Block>,
    pub(super) footer: Vec<Block>,
    pub(super) paragraphs: Vec<ParagraphData>,
    pub(super) runs: Vec<RunData>,
    pub(super) tables: Vec<TableData>,
    pub(super) pictures: Vec<EmbeddedPicture>,
    pub(super) section: SectionProperties,
    pub(super) raw: Vec<String>,
    pub(super) template: Option<Template>,
}

impl DocxPackage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document that starts from `template`: its styles, its kept body
    /// blocks and its final section properties.
    pub fn with_template(template: Template) -> Self {
        let mut pkg = Self {
            section: template.section.clone().unwrap_or_default(),
            raw: template.body.clone(),
            ..Self::default()
        };
        pkg.body = (0..pkg.raw.len()).map(Block::Raw).collect();
        pkg.template = Some(template);
        pkg
    }

    fn new_paragraph(&mut self) -> ParagraphHandle {
        self.paragraphs.push(ParagraphData::default());
        ParagraphHandle(self.paragraphs.len() - 1)
    }

    fn container(&self, location: TableLocation) -> &[Block] {
        match location {
            TableLocation::Header => &self.header,
            TableLocation::Footer => &self.footer,
            TableLocation::Body => &self.body,
        }
    }

    fn paragraphs_in(&self, location: TableLocation) -> Vec<ParagraphHandle> {
        self.container(location)
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(*p),
                Block::Table(_) | Block::Raw(_) => None,
            })
            .collect()
    }

    /// Top-level body paragraphs, in document order. Table cell paragraphs are not included.
    pub fn body_paragraphs(&self) -> Vec<ParagraphHandle> {
        self.paragraphs_in(TableLocation::Body)
    }

    pub fn header_paragraphs(&self) -> Vec<ParagraphHandle> {
        self.paragraphs_in(TableLocation::Header)
    }

    pub fn footer_paragraphs(&self) -> Vec<ParagraphHandle> {
        self.paragraphs_in(TableLocation::Footer)
    }

    pub fn tables_in(&self, location: TableLocation) -> Vec<TableHandle> {
        self.container(location)
            .iter()
            .filter_map(|b| match b {
                Block::Table(t) => Some(*t),
                Block::Paragraph(_) | Block::Raw(_) => None,
            })
            .collect()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// `(rows, cols)` of a table.
    pub fn table_dimensions(&self, table: TableHandle) -> (usize, usize) {
        let t = &self.tables[table.0];
        (t.rows, t.cols)
    }

    pub fn table_properties(&self, table: TableHandle) -> TableProperties {
        self.tables[table.0].properties
    }

    /// Paragraph text with tab advances as `'\t'` and line breaks as `'\n'`.
    pub fn paragraph_text(&self, paragraph: ParagraphHandle) -> String {
        let mut text = String::new();
        for run in &self.paragraphs[paragraph.0].runs {
            for c in &self.runs[run.0].content {
                match c {
                    RunContent::Text(t) => text.push_str(t),
                    RunContent::Tab => text.push('\t'),
                    RunContent::Break(BreakType::Line) => text.push('\n'),
                    RunContent::Break(_) | RunContent::Picture(_) => {}
                }
            }
        }
        text
    }

    pub fn paragraph_alignment(&self, paragraph: ParagraphHandle) -> Option<Alignment> {
        self.paragraphs[paragraph.0].alignment
    }

    pub fn spacing_after(&self, paragraph: ParagraphHandle) -> Option<u32> {
        self.paragraphs[paragraph.0].spacing_after
    }

    pub fn tab_stops(&self, paragraph: ParagraphHandle) -> &[u32] {
        &self.paragraphs[paragraph.0].tab_stops
    }

    pub fn paragraph_section_break(&self, paragraph: ParagraphHandle) -> Option<&SectionProperties> {
        self.paragraphs[paragraph.0].section_break.as_ref()
    }

    pub fn run_content(&self, run: RunHandle) -> &[RunContent] {
        &self.runs[run.0].content
    }

    pub fn run_style(&self, run: RunHandle) -> Option<&Style> {
        self.runs[run.0].style.as_ref()
    }

    /// Section properties stamped into body paragraphs, in document order.
    pub fn section_breaks(&self) -> Vec<&SectionProperties> {
        self.body_paragraphs()
            .into_iter()
            .filter_map(|p| self.paragraphs[p.0].section_break.as_ref())
            .collect()
    }

    /// Properties of the last (body-level) section.
    pub fn final_section(&self) -> &SectionProperties {
        &self.section
    }

    pub fn pictures(&self) -> &[EmbeddedPicture] {
        &self.pictures
    }

    pub fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }
}

impl DocumentModel for DocxPackage {
    fn create_paragraph(&mut self) -> ParagraphHandle {
        let p = self.new_paragraph();
        self.body.push(Block::Paragraph(p));
        p
    }

    fn create_header_paragraph(&mut self) -> ParagraphHandle {
        let p = self.new_paragraph();
        self.header.push(Block::Paragraph(p));
        p
    }

    fn create_footer_paragraph(&mut self) -> ParagraphHandle {
        let p = self.new_paragraph();
        self.footer.push(Block::Paragraph(p));
        p
    }

    fn create_table(
        &mut self,
        rows: usize,
        cols: usize,
        location: TableLocation,
        properties: TableProperties,
    ) -> TableHandle {
        let cells = (0..rows * cols).map(|_| self.new_paragraph()).collect();
        self.tables.push(TableData {
            rows,
            cols,
            location,
            properties,
            cells,
        });
        let handle = TableHandle(self.tables.len() - 1);
        match location {
            TableLocation::Header => self.header.push(Block::Table(handle)),
            TableLocation::Footer => self.footer.push(Block::Table(handle)),
            TableLocation::Body => self.body.push(Block::Table(handle)),
        }
        handle
    }

    fn table_cell(&self, table: TableHandle, row: usize, col: usize) -> Result<CellHandle, Error> {
        let Some(t) = self.tables.get(table.0) else {
            return Err(Error::build(
                format!("unknown table handle {}", table.0),
                "table was not created by this document",
            ));
        };
        if row >= t.rows || col >= t.cols {
            return Err(Error::build(
                format!("cell ({row}, {col}) outside a {}x{} table", t.rows, t.cols),
                "cell index out of range",
            ));
        }
        Ok(CellHandle { table, row, col })
    }

    fn cell_paragraph(&self, cell: CellHandle) -> ParagraphHandle {
        let t = &self.tables[cell.table.0];
        t.cells[cell.row * t.cols + cell.col]
    }

    fn add_run(&mut self, paragraph: ParagraphHandle, text: &str) -> RunHandle {
        let mut run = RunData::default();
        if !text.is_empty() {
            run.content.push(RunContent::Text(text.to_string()));
        }
        self.runs.push(run);
        let handle = RunHandle(self.runs.len() - 1);
        self.paragraphs[paragraph.0].runs.push(handle);
        handle
    }

    fn runs(&self, paragraph: ParagraphHandle) -> Vec<RunHandle> {
        self.paragraphs[paragraph.0].runs.clone()
    }

    fn add_tab(&mut self, run: RunHandle) {
        self.runs[run.0].content.push(RunContent::Tab);
    }

    fn add_break(&mut self, run: RunHandle, kind: BreakType) {
        self.runs[run.0].content.push(RunContent::Break(kind));
    }

    fn set_run_style(&mut self, run: RunHandle, style: &Style) {
        self.runs[run.0].style = Some(style.clone());
    }

    fn embed_picture(&mut self, run: RunHandle, picture: EmbeddedPicture) {
        self.pictures.push(picture);
        let index = self.pictures.len() - 1;
        self.runs[run.0].content.push(RunContent::Picture(index));
    }

    fn set_paragraph_alignment(&mut self, paragraph: ParagraphHandle, alignment: Alignment) {
        self.paragraphs[paragraph.0].alignment = Some(alignment);
    }

    fn set_spacing_after(&mut self, paragraph: ParagraphHandle, twips: u32) {
        self.paragraphs[paragraph.0].spacing_after = Some(twips);
    }

    fn add_tab_stop(&mut self, paragraph: ParagraphHandle, offset: u32) {
        self.paragraphs[paragraph.0].tab_stops.push(offset);
    }

    fn set_page_size(&mut self, size: PageSize) {
        self.section.page_size = Some(size);
    }

    fn set_margins(&mut self, margins: Margins) {
        let current = &mut self.section.margins;
        current.top = margins.top.or(current.top);
        current.right = margins.right.or(current.right);
        current.bottom = margins.bottom.or(current.bottom);
        current.left = margins.left.or(current.left);
    }

    fn set_columns(&mut self, columns: u8) {
        self.section.columns = columns;
    }

    fn insert_section_break(&mut self, paragraph: ParagraphHandle) {
        self.paragraphs[paragraph.0].section_break = Some(self.section.clone());
    }

    fn serialize(&self) -> Result<Vec<u8>, Error> {
        super::writer::write_package(self)
    }
}
