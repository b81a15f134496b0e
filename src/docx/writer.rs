use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Error;
use crate::model::{Alignment, BreakType, EmbeddedPicture};

use super::package::{Block, DocxPackage, RunContent};
use super::{
    DML_NS, PIC_NS, ParagraphHandle, REL_NS, RunHandle, SectionProperties, TableAlignment,
    TableHandle, WML_NS, WPD_NS,
};

const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CT_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_HEADER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
const REL_FOOTER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

const CT_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
const CT_HEADER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml";
const CT_FOOTER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

// Word's defaults for anything the engine leaves unset, in twips.
const DEFAULT_MARGIN: u32 = 1440;
const DEFAULT_HEADER_FOOTER_DISTANCE: u32 = 720;
const DEFAULT_COLUMN_SPACE: u32 = 720;
const TABLE_BORDER_SIZE: u32 = 4; // eighths of a point

const DEFAULT_STYLES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
    r#"<w:docDefaults><w:rPrDefault><w:rPr>"#,
    r#"<w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/>"#,
    r#"<w:sz w:val="22"/><w:szCs w:val="22"/>"#,
    r#"</w:rPr></w:rPrDefault><w:pPrDefault/></w:docDefaults>"#,
    r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>"#,
    r#"</w:styles>"#,
);

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn media_name(index: usize, picture: &EmbeddedPicture) -> String {
    format!("image{}.{}", index + 1, picture.format.extension())
}

fn root_namespaces() -> String {
    format!(
        r#"xmlns:w="{WML_NS}" xmlns:r="{REL_NS}" xmlns:wp="{WPD_NS}" xmlns:a="{DML_NS}" xmlns:pic="{PIC_NS}""#
    )
}

#[derive(Default)]
struct PartRels {
    entries: Vec<(String, &'static str, String)>,
}

impl PartRels {
    fn add(&mut self, rel_type: &'static str, target: String) -> String {
        let id = format!("rId{}", self.entries.len() + 1);
        self.entries.push((id.clone(), rel_type, target));
        id
    }

    fn to_xml(&self) -> String {
        let mut xml = format!(r#"{XML_DECL}<Relationships xmlns="{PKG_REL_NS}">"#);
        for (id, rel_type, target) in &self.entries {
            let _ = write!(
                xml,
                r#"<Relationship Id="{id}" Type="{rel_type}" Target="{}"/>"#,
                escape_xml(target)
            );
        }
        xml.push_str("</Relationships>");
        xml
    }
}

/// Header/footer references written into every section.
#[derive(Clone, Default)]
struct SectionRefs {
    header: Option<String>,
    footer: Option<String>,
}

/// Serializes one XML part (document, header or footer) and collects its relationships.
struct PartWriter<'a> {
    pkg: &'a DocxPackage,
    xml: String,
    rels: PartRels,
    refs: SectionRefs,
}

impl<'a> PartWriter<'a> {
    fn new(pkg: &'a DocxPackage) -> Self {
        Self {
            pkg,
            xml: String::new(),
            rels: PartRels::default(),
            refs: SectionRefs::default(),
        }
    }

    fn write_blocks(&mut self, blocks: &[Block]) {
        for block in blocks {
            match *block {
                Block::Paragraph(p) => self.write_paragraph(p),
                Block::Table(t) => self.write_table(t),
                Block::Raw(i) => self.xml.push_str(&self.pkg.raw[i]),
            }
        }
    }

    fn write_paragraph(&mut self, paragraph: ParagraphHandle) {
        let pkg = self.pkg;
        let data = &pkg.paragraphs[paragraph.0];
        self.xml.push_str("<w:p>");

        let mut ppr = String::new();
        if !data.tab_stops.is_empty() {
            ppr.push_str("<w:tabs>");
            for pos in &data.tab_stops {
                let _ = write!(ppr, r#"<w:tab w:val="left" w:pos="{pos}"/>"#);
            }
            ppr.push_str("</w:tabs>");
        }
        if let Some(after) = data.spacing_after {
            let _ = write!(ppr, r#"<w:spacing w:after="{after}"/>"#);
        }
        if let Some(alignment) = data.alignment {
            let jc = match alignment {
                Alignment::Left => "left",
                Alignment::Center => "center",
                Alignment::Right => "right",
                Alignment::Justify => "both",
            };
            let _ = write!(ppr, r#"<w:jc w:val="{jc}"/>"#);
        }
        if let Some(ref section) = data.section_break {
            ppr.push_str(&sect_pr_xml(section, &self.refs));
        }
        if !ppr.is_empty() {
            let _ = write!(self.xml, "<w:pPr>{ppr}</w:pPr>");
        }

        for run in &data.runs {
            self.write_run(*run);
        }
        self.xml.push_str("</w:p>");
    }

    fn write_run(&mut self, run: RunHandle) {
        let pkg = self.pkg;
        let data = &pkg.runs[run.0];
        self.xml.push_str("<w:r>");

        if let Some(ref style) = data.style {
            let font = escape_xml(&style.font_family);
            let half_points = style.font_size.saturating_mul(2);
            self.xml.push_str("<w:rPr>");
            let _ = write!(
                self.xml,
                r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/>"#
            );
            if style.bold {
                self.xml.push_str("<w:b/>");
            }
            if style.italic {
                self.xml.push_str("<w:i/>");
            }
            let _ = write!(
                self.xml,
                r#"<w:color w:val="{}"/><w:sz w:val="{half_points}"/><w:szCs w:val="{half_points}"/>"#,
                style.hex_color()
            );
            if style.underline {
                self.xml.push_str(r#"<w:u w:val="single"/>"#);
            }
            self.xml.push_str("</w:rPr>");
        }

        for content in &data.content {
            match content {
                RunContent::Text(text) => {
                    let _ = write!(
                        self.xml,
                        r#"<w:t xml:space="preserve">{}</w:t>"#,
                        escape_xml(text)
                    );
                }
                RunContent::Tab => self.xml.push_str("<w:tab/>"),
                RunContent::Break(BreakType::Line) => self.xml.push_str("<w:br/>"),
                RunContent::Break(BreakType::Page) => {
                    self.xml.push_str(r#"<w:br w:type="page"/>"#)
                }
                RunContent::Break(BreakType::Column) => {
                    self.xml.push_str(r#"<w:br w:type="column"/>"#)
                }
                RunContent::Picture(index) => self.write_drawing(*index),
            }
        }
        self.xml.push_str("</w:r>");
    }

    fn write_drawing(&mut self, index: usize) {
        let pkg = self.pkg;
        let picture = &pkg.pictures[index];
        let rid = self
            .rels
            .add(REL_IMAGE, format!("media/{}", media_name(index, picture)));
        let id = index + 1;
        let name = escape_xml(&picture.name);
        let (cx, cy) = (picture.width_emu, picture.height_emu);
        let _ = write!(
            self.xml,
            concat!(
                r#"<w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0">"#,
                r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
                r#"<wp:docPr id="{id}" name="Picture {id}"/>"#,
                r#"<a:graphic><a:graphicData uri="{pic_ns}"><pic:pic>"#,
                r#"<pic:nvPicPr><pic:cNvPr id="{id}" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
                r#"<pic:blipFill><a:blip r:embed="{rid}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
                r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
                r#"</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>"#,
            ),
            cx = cx,
            cy = cy,
            id = id,
            name = name,
            rid = rid,
            pic_ns = PIC_NS,
        );
    }

    fn write_table(&mut self, table: TableHandle) {
        let pkg = self.pkg;
        let data = &pkg.tables[table.0];
        let props = data.properties;
        let col_width = props.width / data.cols.max(1) as u32;
        let jc = match props.alignment {
            TableAlignment::Left => "left",
            TableAlignment::Center => "center",
            TableAlignment::Right => "right",
        };

        let _ = write!(
            self.xml,
            r#"<w:tbl><w:tblPr><w:tblW w:w="{}" w:type="dxa"/><w:jc w:val="{jc}"/>"#,
            props.width
        );
        self.xml.push_str("<w:tblBorders>");
        for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            let _ = write!(
                self.xml,
                r#"<w:{edge} w:val="single" w:sz="{TABLE_BORDER_SIZE}" w:space="0" w:color="auto"/>"#
            );
        }
        self.xml
            .push_str(r#"</w:tblBorders><w:tblLayout w:type="fixed"/><w:tblCellMar>"#);
        for edge in ["top", "left", "bottom", "right"] {
            let _ = write!(
                self.xml,
                r#"<w:{edge} w:w="{}" w:type="dxa"/>"#,
                props.cell_margin
            );
        }
        self.xml.push_str("</w:tblCellMar></w:tblPr><w:tblGrid>");
        for _ in 0..data.cols {
            let _ = write!(self.xml, r#"<w:gridCol w:w="{col_width}"/>"#);
        }
        self.xml.push_str("</w:tblGrid>");

        for row in 0..data.rows {
            self.xml.push_str("<w:tr>");
            for col in 0..data.cols {
                let _ = write!(
                    self.xml,
                    r#"<w:tc><w:tcPr><w:tcW w:w="{col_width}" w:type="dxa"/></w:tcPr>"#
                );
                self.write_paragraph(data.cells[row * data.cols + col]);
                self.xml.push_str("</w:tc>");
            }
            self.xml.push_str("</w:tr>");
        }
        self.xml.push_str("</w:tbl>");
    }
}

fn sect_pr_xml(section: &SectionProperties, refs: &SectionRefs) -> String {
    let mut xml = String::from("<w:sectPr>");
    if let Some(ref rid) = refs.header {
        let _ = write!(xml, r#"<w:headerReference w:type="default" r:id="{rid}"/>"#);
    }
    if let Some(ref rid) = refs.footer {
        let _ = write!(xml, r#"<w:footerReference w:type="default" r:id="{rid}"/>"#);
    }
    xml.push_str(r#"<w:type w:val="continuous"/>"#);
    if let Some(size) = section.page_size {
        let orient = if size.is_landscape() { "landscape" } else { "portrait" };
        let _ = write!(
            xml,
            r#"<w:pgSz w:w="{}" w:h="{}" w:orient="{orient}"/>"#,
            size.width, size.height
        );
    }
    let m = section.margins;
    let _ = write!(
        xml,
        r#"<w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="{hf}" w:footer="{hf}" w:gutter="0"/>"#,
        m.top.unwrap_or(DEFAULT_MARGIN),
        m.right.unwrap_or(DEFAULT_MARGIN),
        m.bottom.unwrap_or(DEFAULT_MARGIN),
        m.left.unwrap_or(DEFAULT_MARGIN),
        hf = DEFAULT_HEADER_FOOTER_DISTANCE,
    );
    let _ = write!(
        xml,
        r#"<w:cols w:num="{}" w:space="{DEFAULT_COLUMN_SPACE}"/>"#,
        section.columns
    );
    xml.push_str("</w:sectPr>");
    xml
}

/// Serializes a header or footer container. Returns `(part xml, part rels)`.
fn write_header_footer(pkg: &DocxPackage, blocks: &[Block], root: &str) -> (String, PartRels) {
    let mut part = PartWriter::new(pkg);
    part.write_blocks(blocks);
    // A header/footer part has to end with a paragraph.
    if matches!(blocks.last(), Some(Block::Table(_))) {
        part.xml.push_str("<w:p/>");
    }
    let xml = format!(
        "{XML_DECL}<w:{root} {}>{}</w:{root}>",
        root_namespaces(),
        part.xml
    );
    (xml, part.rels)
}

fn content_types_xml(pkg: &DocxPackage) -> String {
    let mut xml = format!(
        concat!(
            r#"{}<Types xmlns="{}">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        ),
        XML_DECL, CT_NS
    );
    let formats: BTreeSet<(&str, &str)> = pkg
        .pictures
        .iter()
        .map(|p| (p.format.extension(), p.format.content_type()))
        .collect();
    for (ext, content_type) in formats {
        let _ = write!(
            xml,
            r#"<Default Extension="{ext}" ContentType="{content_type}"/>"#
        );
    }
    let _ = write!(
        xml,
        r#"<Override PartName="/word/document.xml" ContentType="{CT_DOCUMENT}"/>"#
    );
    let _ = write!(
        xml,
        r#"<Override PartName="/word/styles.xml" ContentType="{CT_STYLES}"/>"#
    );
    if !pkg.header.is_empty() {
        let _ = write!(
            xml,
            r#"<Override PartName="/word/header1.xml" ContentType="{CT_HEADER}"/>"#
        );
    }
    if !pkg.footer.is_empty() {
        let _ = write!(
            xml,
            r#"<Override PartName="/word/footer1.xml" ContentType="{CT_FOOTER}"/>"#
        );
    }
    xml.push_str("</Types>");
    xml
}

fn put(zip: &mut ZipWriter<Cursor<Vec<u8>>>, name: &str, bytes: &[u8]) -> Result<(), Error> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(name, options)?;
    zip.write_all(bytes)?;
    Ok(())
}

pub(super) fn write_package(pkg: &DocxPackage) -> Result<Vec<u8>, Error> {
    let mut document = PartWriter::new(pkg);
    document.rels.add(REL_STYLES, "styles.xml".to_string());

    let mut header_part = None;
    if !pkg.header.is_empty() {
        document.refs.header = Some(document.rels.add(REL_HEADER, "header1.xml".to_string()));
        header_part = Some(write_header_footer(pkg, &pkg.header, "hdr"));
    }
    let mut footer_part = None;
    if !pkg.footer.is_empty() {
        document.refs.footer = Some(document.rels.add(REL_FOOTER, "footer1.xml".to_string()));
        footer_part = Some(write_header_footer(pkg, &pkg.footer, "ftr"));
    }

    document.write_blocks(&pkg.body);
    let final_sect_pr = sect_pr_xml(&pkg.section, &document.refs);
    let document_xml = format!(
        "{XML_DECL}<w:document {}><w:body>{}{final_sect_pr}</w:body></w:document>",
        root_namespaces(),
        document.xml
    );

    let root_rels = {
        let mut rels = PartRels::default();
        rels.add(REL_OFFICE_DOCUMENT, "word/document.xml".to_string());
        rels
    };

    let styles_xml = pkg
        .template
        .as_ref()
        .and_then(|t| t.styles_xml())
        .unwrap_or(DEFAULT_STYLES_XML);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    put(&mut zip, "[Content_Types].xml", content_types_xml(pkg).as_bytes())?;
    put(&mut zip, "_rels/.rels", root_rels.to_xml().as_bytes())?;
    put(&mut zip, "word/document.xml", document_xml.as_bytes())?;
    put(&mut zip, "word/_rels/document.xml.rels", document.rels.to_xml().as_bytes())?;
    put(&mut zip, "word/styles.xml", styles_xml.as_bytes())?;
    if let Some((xml, rels)) = header_part {
        put(&mut zip, "word/header1.xml", xml.as_bytes())?;
        put(&mut zip, "word/_rels/header1.xml.rels", rels.to_xml().as_bytes())?;
    }
    if let Some((xml, rels)) = footer_part {
        put(&mut zip, "word/footer1.xml", xml.as_bytes())?;
        put(&mut zip, "word/_rels/footer1.xml.rels", rels.to_xml().as_bytes())?;
    }
    for (index, picture) in pkg.pictures.iter().enumerate() {
        let name = format!("word/media/{}", media_name(index, picture));
        put(&mut zip, &name, &picture.data)?;
    }

    Ok(zip.finish()?.into_inner())
}
