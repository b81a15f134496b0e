#![allow(dead_code)]

use std::io::{Cursor, Read};

use docxide_build::docx::{
    CellHandle, DocumentModel, Margins, PageSize, ParagraphHandle, RunHandle, TableHandle,
    TableLocation, TableProperties,
};
use docxide_build::model::{Alignment, BreakType, EmbeddedPicture};
use docxide_build::{BuildRequest, ContentBlock, Error, Style};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn style() -> Style {
    Style::default()
}

pub fn aligned(alignment: Alignment) -> Style {
    Style {
        text_align: alignment,
        ..Style::default()
    }
}

pub fn block(text: &str) -> ContentBlock {
    ContentBlock::new(text, style())
}

pub fn blocks(texts: &[&str]) -> Vec<ContentBlock> {
    texts.iter().map(|t| block(t)).collect()
}

pub fn request(texts: &[&str]) -> BuildRequest {
    BuildRequest::new(blocks(texts))
}

/// `n` body-looking blocks named `b0`, `b1`, ...
pub fn numbered(n: usize) -> BuildRequest {
    BuildRequest::new((0..n).map(|i| block(&format!("b{i}"))).collect())
}

/// A solid-color PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 40, 200]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Jpeg)
        .expect("encode jpeg");
    out.into_inner()
}

pub fn part_names(docx: &[u8]) -> Vec<String> {
    let zip = zip::ZipArchive::new(Cursor::new(docx)).expect("open package");
    zip.file_names().map(str::to_string).collect()
}

pub fn read_part(docx: &[u8], name: &str) -> Option<String> {
    let mut zip = zip::ZipArchive::new(Cursor::new(docx)).expect("open package");
    let mut content = String::new();
    zip.by_name(name).ok()?.read_to_string(&mut content).ok()?;
    Some(content)
}

/// Number of `w:<local>` elements in an XML part.
pub fn count_elements(xml: &str, local: &str) -> usize {
    let doc = roxmltree::Document::parse(xml).expect("parse part");
    doc.descendants()
        .filter(|n| n.tag_name().name() == local)
        .count()
}

/// `w:val`-style attribute values of every `w:<local>` element.
pub fn attribute_values(xml: &str, local: &str, attr: &str) -> Vec<String> {
    let doc = roxmltree::Document::parse(xml).expect("parse part");
    doc.descendants()
        .filter(|n| n.tag_name().name() == local)
        .filter_map(|n| {
            n.attributes()
                .find(|a| a.name() == attr)
                .map(|a| a.value().to_string())
        })
        .collect()
}

/// Minimal `.docx` with a body and, optionally, a styles part.
pub fn template_docx(styles_xml: Option<&str>) -> Vec<u8> {
    template_docx_with_body("<w:p/>", styles_xml)
}

/// Base `.docx` whose `w:body` holds `body_xml`.
pub fn template_docx_with_body(body_xml: &str, styles_xml: Option<&str>) -> Vec<u8> {
    use std::io::Write;
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    zip.start_file("word/document.xml", options).unwrap();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{body_xml}</w:body></w:document>"#
    );
    zip.write_all(document.as_bytes()).unwrap();
    if let Some(styles) = styles_xml {
        zip.start_file("word/styles.xml", options).unwrap();
        zip.write_all(styles.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Model that fails the test on any instruction.
pub struct UntouchableModel;

impl DocumentModel for UntouchableModel {
    fn create_paragraph(&mut self) -> ParagraphHandle {
        panic!("create_paragraph called")
    }
    fn create_header_paragraph(&mut self) -> ParagraphHandle {
        panic!("create_header_paragraph called")
    }
    fn create_footer_paragraph(&mut self) -> ParagraphHandle {
        panic!("create_footer_paragraph called")
    }
    fn create_table(&mut self, _: usize, _: usize, _: TableLocation, _: TableProperties) -> TableHandle {
        panic!("create_table called")
    }
    fn table_cell(&self, _: TableHandle, _: usize, _: usize) -> Result<CellHandle, Error> {
        panic!("table_cell called")
    }
    fn cell_paragraph(&self, _: CellHandle) -> ParagraphHandle {
        panic!("cell_paragraph called")
    }
    fn add_run(&mut self, _: ParagraphHandle, _: &str) -> RunHandle {
        panic!("add_run called")
    }
    fn runs(&self, _: ParagraphHandle) -> Vec<RunHandle> {
        panic!("runs called")
    }
    fn add_tab(&mut self, _: RunHandle) {
        panic!("add_tab called")
    }
    fn add_break(&mut self, _: RunHandle, _: BreakType) {
        panic!("add_break called")
    }
    fn set_run_style(&mut self, _: RunHandle, _: &Style) {
        panic!("set_run_style called")
    }
    fn embed_picture(&mut self, _: RunHandle, _: EmbeddedPicture) {
        panic!("embed_picture called")
    }
    fn set_paragraph_alignment(&mut self, _: ParagraphHandle, _: Alignment) {
        panic!("set_paragraph_alignment called")
    }
    fn set_spacing_after(&mut self, _: ParagraphHandle, _: u32) {
        panic!("set_spacing_after called")
    }
    fn add_tab_stop(&mut self, _: ParagraphHandle, _: u32) {
        panic!("add_tab_stop called")
    }
    fn set_page_size(&mut self, _: PageSize) {
        panic!("set_page_size called")
    }
    fn set_margins(&mut self, _: Margins) {
        panic!("set_margins called")
    }
    fn set_columns(&mut self, _: u8) {
        panic!("set_columns called")
    }
    fn insert_section_break(&mut self, _: ParagraphHandle) {
        panic!("insert_section_break called")
    }
    fn serialize(&self) -> Result<Vec<u8>, Error> {
        panic!("serialize called")
    }
}
