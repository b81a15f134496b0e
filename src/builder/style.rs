use crate::docx::{DocumentModel, ParagraphHandle};
use crate::model::{Style, TAB_MARKER};

pub const TAB_STOP_COUNT: u32 = 17;
/// Tab stop spacing per point of font size.
pub const TAB_STOP_FACTOR: u32 = 36;
/// Spacing after each paragraph, in twips.
pub const NO_LINE_SPACE: u32 = 1;

/// Offsets of the tab stop ladder for a font size.
pub fn tab_stops(font_size: u32) -> impl Iterator<Item = u32> {
    (1..=TAB_STOP_COUNT).map(move |i| (i * TAB_STOP_FACTOR).saturating_mul(font_size))
}

/// Writes `text` into `paragraph`, turning every tab marker into a tab advance
/// at the end of the run before it.
pub fn write_text<M: DocumentModel>(model: &mut M, paragraph: ParagraphHandle, text: &str) {
    let mut segments = text.split(TAB_MARKER);
    let first = segments.next().unwrap_or_default();
    let mut run = model.add_run(paragraph, first);
    for segment in segments {
        model.add_tab(run);
        if !segment.is_empty() {
            run = model.add_run(paragraph, segment);
        }
    }
}

/// Styles every run of `paragraph` and sets its paragraph properties.
/// Does nothing when either argument is missing.
pub fn apply<M: DocumentModel>(model: &mut M, paragraph: Option<ParagraphHandle>, style: Option<&Style>) {
    let (Some(paragraph), Some(style)) = (paragraph, style) else {
        return;
    };

    for run in model.runs(paragraph) {
        model.set_run_style(run, style);
        if let Some(kind) = style.break_type {
            model.add_break(run, kind);
        }
    }

    model.set_paragraph_alignment(paragraph, style.text_align);
    model.set_spacing_after(paragraph, NO_LINE_SPACE);
    for offset in tab_stops(style.font_size) {
        model.add_tab_stop(paragraph, offset);
    }
}
