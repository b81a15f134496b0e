//! Turns a validated [`BuildRequest`] into instructions against a [`DocumentModel`].

pub mod picture;
pub mod placement;
pub mod section;
pub mod style;
pub mod table;

use crate::docx::{DocumentModel, ParagraphHandle};
use crate::error::Error;
use crate::model::{BlockKind, BuildRequest, BuildWarning, ContentBlock, Placement, Style};

use picture::{PICTURE_IN_TABLE_NOTE, PictureResolver};
use table::TableGrid;

/// One step of the build: a source block, or the blank spacer that follows
/// the single-column heading break.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanEntry {
    Source(usize),
    Spacer,
}

/// Source indices in order, with a spacer right after `break_index` when a
/// break is planned. The request itself is never touched.
pub fn working_plan(content_len: usize, break_index: Option<usize>) -> Vec<PlanEntry> {
    let mut plan = Vec::with_capacity(content_len + 1);
    for index in 0..content_len {
        plan.push(PlanEntry::Source(index));
        if Some(index) == break_index {
            plan.push(PlanEntry::Spacer);
        }
    }
    plan
}

/// Per-call build state. Owns the model and the table cache for exactly one build.
pub struct DocumentBuilder<'a, M: DocumentModel> {
    request: &'a BuildRequest,
    model: M,
    grid: TableGrid,
    kinds: Vec<BlockKind>,
    warnings: Vec<BuildWarning>,
}

impl<'a, M: DocumentModel> DocumentBuilder<'a, M> {
    /// Validates `request`. Nothing is issued to `model` when validation fails.
    pub fn new(request: &'a BuildRequest, model: M) -> Result<Self, Error> {
        let regions = request.validate()?;
        let kinds = request
            .content
            .iter()
            .map(|b| b.as_ref().map_or(BlockKind::PlainText, |b| BlockKind::classify(&b.text)))
            .collect();
        Ok(Self {
            request,
            model,
            grid: TableGrid::new(regions, request.len()),
            kinds,
            warnings: Vec::new(),
        })
    }

    pub fn build(mut self) -> Result<(M, Vec<BuildWarning>), Error> {
        let request = self.request;

        self.model.set_page_size(section::plan_orientation(request.landscape));
        self.model.set_margins(section::document_margins());

        let (columns, clamped) = section::plan_columns(request.num_columns);
        self.warnings.extend(clamped);
        let break_index = section::plan_section_break_index(request.num_single_column_lines, columns);

        log::info!(
            "Building {} blocks: {} table regions, {} columns, landscape={}, heading break={:?}",
            request.len(),
            self.grid.regions().len(),
            columns,
            request.landscape,
            break_index
        );

        for entry in working_plan(request.len(), break_index) {
            match entry {
                PlanEntry::Source(index) => {
                    let paragraph = self.add_block(index)?;
                    if Some(index) == break_index {
                        self.end_heading_section(index, paragraph);
                    }
                }
                PlanEntry::Spacer => self.add_spacer(),
            }
        }

        self.model.set_columns(columns);
        log::debug!("Created {} tables", self.grid.created_tables());

        Ok((self.model, self.warnings))
    }

    /// Emits the block at `index`. Returns the body paragraph if one was created.
    fn add_block(&mut self, index: usize) -> Result<Option<ParagraphHandle>, Error> {
        let request = self.request;
        let (placement, block) = placement::resolve_block(
            index,
            request.content.get(index).and_then(Option::as_ref),
            request.len(),
            self.grid.regions(),
        )?;
        log::debug!("BLOCK index={index} placement={placement:?}");

        match placement {
            Placement::Omitted => Ok(None),
            Placement::Header => {
                let p = self.model.create_header_paragraph();
                self.fill_paragraph(p, index, block)?;
                Ok(None)
            }
            Placement::Footer => {
                let p = self.model.create_footer_paragraph();
                self.fill_paragraph(p, index, block)?;
                Ok(None)
            }
            Placement::Body => {
                let p = self.model.create_paragraph();
                self.fill_paragraph(p, index, block)?;
                Ok(Some(p))
            }
            Placement::TableCell { region, .. } => {
                let first_style = self
                    .grid
                    .regions()
                    .get(region)
                    .and_then(|r| request.content.get(r.start_index))
                    .and_then(Option::as_ref)
                    .map_or(&block.style, |b| &b.style);
                let p = self
                    .grid
                    .cell_paragraph(&mut self.model, region, index, first_style)?;

                if let BlockKind::PictureRef(name) = &self.kinds[index] {
                    if picture::picture_format(name).is_none() {
                        return Err(Error::UnsupportedPictureType(name.clone()));
                    }
                    log::warn!(
                        "Cannot add picture '{}' inside a table (index {index}), adding plain text instead",
                        block.text.trim()
                    );
                    self.warnings.push(BuildWarning::PictureInsideTable { index });
                    let text = format!("{}{PICTURE_IN_TABLE_NOTE}", block.text);
                    self.model.add_run(p, &text);
                } else {
                    style::write_text(&mut self.model, p, &block.text);
                }
                style::apply(&mut self.model, Some(p), Some(&block.style));
                Ok(None)
            }
        }
    }

    fn fill_paragraph(&mut self, p: ParagraphHandle, index: usize, block: &ContentBlock) -> Result<(), Error> {
        match &self.kinds[index] {
            BlockKind::PictureRef(name) => {
                let picture = PictureResolver::new(&self.request.pictures).resolve_name(name)?;
                let run = self.model.add_run(p, "");
                self.model.embed_picture(run, picture);
            }
            BlockKind::PlainText | BlockKind::TabRun => {
                style::write_text(&mut self.model, p, &block.text);
            }
        }
        style::apply(&mut self.model, Some(p), Some(&block.style));
        Ok(())
    }

    /// Ends the single-column section after `index`. When `index` produced
    /// no body paragraph the break gets an empty paragraph of its own.
    fn end_heading_section(&mut self, index: usize, paragraph: Option<ParagraphHandle>) {
        let paragraph = match paragraph {
            Some(p) => p,
            None => {
                let p = self.model.create_paragraph();
                self.model.add_run(p, "");
                p
            }
        };
        log::debug!("SECTION break after index={index}");
        self.model.insert_section_break(paragraph);
    }

    fn add_spacer(&mut self) {
        let p = self.model.create_paragraph();
        self.model.add_run(p, "");
        style::apply(&mut self.model, Some(p), Some(&Style::default()));
    }
}
