use std::fmt::Write as _;
use std::io::{Cursor, Read};

use roxmltree::Node;

use crate::error::Error;

use super::{DML_NS, Margins, PIC_NS, PageSize, REL_NS, SectionProperties, WML_NS, WPD_NS};

type Archive<'a> = zip::ZipArchive<Cursor<&'a [u8]>>;

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Parts of a base document that are carried into generated packages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Template {
    pub(super) styles_xml: Option<String>,
    /// Body blocks kept ahead of the generated content, as WML fragments.
    pub(super) body: Vec<String>,
    /// Final section properties of the template body.
    pub(super) section: Option<SectionProperties>,
}

fn read_zip_text(zip: &mut Archive<'_>, name: &str) -> Option<String> {
    let mut content = String::new();
    zip.by_name(name).ok()?.read_to_string(&mut content).ok()?;
    Some(content)
}

fn prefix_for(namespace: Option<&str>) -> Option<&'static str> {
    match namespace? {
        WML_NS => Some("w"),
        REL_NS => Some("r"),
        WPD_NS => Some("wp"),
        DML_NS => Some("a"),
        PIC_NS => Some("pic"),
        XML_NS => Some("xml"),
        _ => None,
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Writes `node` with the generated document's prefixes. Elements and
/// attributes from other namespaces are dropped.
fn write_fragment(node: Node<'_, '_>, out: &mut String) {
    if node.is_text() {
        out.push_str(&escape(node.text().unwrap_or_default()));
        return;
    }
    if !node.is_element() {
        return;
    }
    let Some(prefix) = prefix_for(node.tag_name().namespace()) else {
        return;
    };
    let name = node.tag_name().name();
    let _ = write!(out, "<{prefix}:{name}");
    for attr in node.attributes() {
        match attr.namespace() {
            None => {
                let _ = write!(out, r#" {}="{}""#, attr.name(), escape(attr.value()));
            }
            ns => {
                if let Some(p) = prefix_for(ns) {
                    let _ = write!(out, r#" {p}:{}="{}""#, attr.name(), escape(attr.value()));
                }
            }
        }
    }
    if !node.has_children() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in node.children() {
        write_fragment(child, out);
    }
    let _ = write!(out, "</{prefix}:{name}>");
}

/// Relationship ids point into template parts that are not carried over.
fn uses_relationships(node: Node<'_, '_>) -> bool {
    node.descendants()
        .any(|n| n.attributes().any(|a| a.namespace() == Some(REL_NS)))
}

fn is_wml(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

fn twips(node: Node<'_, '_>, name: &str) -> Option<u32> {
    node.attribute((WML_NS, name))?.parse().ok()
}

fn read_section(sect_pr: Node<'_, '_>) -> SectionProperties {
    let mut section = SectionProperties::default();
    for child in sect_pr.children() {
        if is_wml(&child, "pgSz") {
            if let (Some(width), Some(height)) = (twips(child, "w"), twips(child, "h")) {
                section.page_size = Some(PageSize { width, height });
            }
        } else if is_wml(&child, "pgMar") {
            section.margins = Margins {
                top: twips(child, "top"),
                right: twips(child, "right"),
                bottom: twips(child, "bottom"),
                left: twips(child, "left"),
            };
        } else if is_wml(&child, "cols") {
            section.columns = child
                .attribute((WML_NS, "num"))
                .and_then(|n| n.parse().ok())
                .unwrap_or(1);
        }
    }
    section
}

impl Template {
    /// Reads a base `.docx`. The document part must parse and have a body;
    /// the styles part is optional.
    ///
    /// The first body block is dropped and the rest are kept to be written
    /// ahead of the generated content. Blocks that reference other template
    /// parts are skipped.
    pub fn read(bytes: &[u8]) -> Result<Self, Error> {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes))?;

        let document_xml = read_zip_text(&mut zip, "word/document.xml").ok_or_else(|| {
            Error::build(
                "template has no word/document.xml",
                "missing document part (is this a DOCX file?)",
            )
        })?;
        let xml = roxmltree::Document::parse(&document_xml)?;
        let Some(body) = xml.root_element().children().find(|n| is_wml(n, "body")) else {
            return Err(Error::build("template document part", "missing w:body"));
        };

        let section = body
            .children()
            .filter(|n| is_wml(n, "sectPr"))
            .last()
            .map(read_section);

        let mut kept = Vec::new();
        for block in body
            .children()
            .filter(|n| n.is_element() && !is_wml(n, "sectPr"))
            .skip(1)
        {
            if uses_relationships(block) {
                log::debug!("Skipping template block <{}> with relationship ids", block.tag_name().name());
                continue;
            }
            let mut fragment = String::new();
            write_fragment(block, &mut fragment);
            if !fragment.is_empty() {
                kept.push(fragment);
            }
        }

        let styles_xml = read_zip_text(&mut zip, "word/styles.xml")
            .filter(|s| roxmltree::Document::parse(s).is_ok());
        if styles_xml.is_none() {
            log::debug!("Template has no usable word/styles.xml, keeping default styles");
        }
        log::debug!("Template carries {} body blocks, section={section:?}", kept.len());

        Ok(Self {
            styles_xml,
            body: kept,
            section,
        })
    }

    pub fn styles_xml(&self) -> Option<&str> {
        self.styles_xml.as_deref()
    }

    pub fn body_blocks(&self) -> &[String] {
        &self.body
    }

    pub fn section(&self) -> Option<&SectionProperties> {
        self.section.as_ref()
    }
}
