mod common;

use std::collections::HashMap;

use rayon::prelude::*;

use docxide_build::builder::DocumentBuilder;
use docxide_build::builder::picture::{PictureResolver, pixels_to_emu};
use docxide_build::builder::placement::resolve_all;
use docxide_build::docx::{DocxPackage, TableLocation};
use docxide_build::model::{PictureFormat, Placement, RegionId};
use docxide_build::{Error, TableRegion, build_document};

use common::{UntouchableModel, attribute_values, count_elements, numbered, png_bytes, read_part, request};

#[test]
fn header_two_paragraphs_footer() {
    common::init_logging();
    let req = request(&["header", "p1", "p2", "footer"]);

    let regions = req.validate().unwrap();
    assert_eq!(
        resolve_all(&req, &regions).unwrap(),
        vec![
            Placement::Header,
            Placement::Body,
            Placement::Body,
            Placement::Footer
        ]
    );

    let (model, warnings) = DocumentBuilder::new(&req, DocxPackage::new())
        .unwrap()
        .build()
        .unwrap();
    assert!(warnings.is_empty());
    assert_eq!(model.body_paragraphs().len(), 2);
    assert_eq!(model.paragraph_text(model.header_paragraphs()[0]), "header");
    assert_eq!(model.paragraph_text(model.footer_paragraphs()[0]), "footer");

    let doc = build_document(&req).unwrap();
    assert_eq!(doc.file_name, "document.docx");
    let document = read_part(&doc.bytes, "word/document.xml").unwrap();
    assert_eq!(count_elements(&document, "p"), 2);
    let header = read_part(&doc.bytes, "word/header1.xml").unwrap();
    assert!(header.contains("header"));
    let footer = read_part(&doc.bytes, "word/footer1.xml").unwrap();
    assert!(footer.contains("footer"));
    assert_eq!(count_elements(&document, "headerReference"), 1);
    assert_eq!(count_elements(&document, "footerReference"), 1);
}

#[test]
fn single_cell_region_creates_one_table() {
    let req = numbered(5).with_table_regions(vec![TableRegion::new(3, 3, 2, 2)]);
    let regions = req.validate().unwrap();
    assert_eq!(
        resolve_all(&req, &regions).unwrap()[2],
        Placement::TableCell {
            region: RegionId(0),
            row: 0,
            col: 0
        }
    );

    let (model, _) = DocumentBuilder::new(&req, DocxPackage::new())
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(model.table_count(), 1);
}

#[test]
fn table_is_reused_across_its_indices() {
    let req = numbered(8).with_table_regions(vec![TableRegion::new(3, 3, 2, 6)]);
    let (model, _) = DocumentBuilder::new(&req, DocxPackage::new())
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(model.table_count(), 1);
    let table = model.tables_in(TableLocation::Body)[0];
    assert_eq!(model.table_dimensions(table), (3, 3));
    // b0 and b7 sit in header and footer, b2..b6 in the table
    assert_eq!(model.body_paragraphs().len(), 1);
    assert_eq!(model.footer_paragraphs().len(), 1);
}

#[test]
fn overlapping_regions_never_reach_the_model() {
    let req = numbered(8).with_table_regions(vec![
        TableRegion::new(3, 1, 1, 3),
        TableRegion::new(4, 1, 2, 5),
    ]);
    assert!(matches!(
        DocumentBuilder::new(&req, UntouchableModel).map(|_| ()),
        Err(Error::OverlappingTableRegions { .. })
    ));
    assert!(matches!(
        build_document(&req),
        Err(Error::OverlappingTableRegions { .. })
    ));
}

#[test]
fn logo_reference_resolves_to_png() {
    let mut pictures = HashMap::new();
    pictures.insert("logo.png".to_string(), png_bytes(64, 32));

    let picture = PictureResolver::new(&pictures).resolve("${logo.png}").unwrap();
    assert_eq!(picture.format, PictureFormat::Png);
    assert_eq!(picture.width_emu, pixels_to_emu(64));
    assert_eq!(picture.height_emu, pixels_to_emu(32));
    assert_eq!(picture.width_emu, 81_280);
}

#[test]
fn header_picture_lives_in_the_header_part() {
    let req = request(&["${logo.png}", "body", "footer"]).with_picture("logo.png", png_bytes(10, 10));
    let doc = build_document(&req).unwrap();

    let header = read_part(&doc.bytes, "word/header1.xml").unwrap();
    assert_eq!(count_elements(&header, "drawing"), 1);
    let header_rels = read_part(&doc.bytes, "word/_rels/header1.xml.rels").unwrap();
    assert!(header_rels.contains("media/image1.png"));
}

#[test]
fn two_column_body_below_the_heading() {
    let req = numbered(10).with_columns(2).with_single_column_lines(3);
    let doc = build_document(&req).unwrap();

    let document = read_part(&doc.bytes, "word/document.xml").unwrap();
    assert_eq!(count_elements(&document, "sectPr"), 2);
    assert_eq!(attribute_values(&document, "cols", "num"), vec!["1", "2"]);
    assert_eq!(attribute_values(&document, "type", "val"), vec!["continuous", "continuous"]);
}

#[test]
fn table_in_header_part_ends_with_a_paragraph() {
    let req = numbered(5).with_table_regions(vec![TableRegion::new(2, 1, 0, 1)]);
    let doc = build_document(&req).unwrap();

    let header = read_part(&doc.bytes, "word/header1.xml").unwrap();
    let xml = roxmltree::Document::parse(&header).unwrap();
    let last = xml.root_element().children().filter(|n| n.is_element()).last().unwrap();
    assert_eq!(last.tag_name().name(), "p");
    assert_eq!(count_elements(&header, "tbl"), 1);

    let document = read_part(&doc.bytes, "word/document.xml").unwrap();
    assert_eq!(count_elements(&document, "tbl"), 0);
}

#[test]
fn package_parts_are_well_formed() {
    let req = request(&["head", "${logo.png}", "a\\tb", "foot"])
        .with_picture("logo.png", png_bytes(5, 5))
        .with_landscape(true);
    let doc = build_document(&req).unwrap();

    for name in common::part_names(&doc.bytes) {
        if name.ends_with(".xml") || name.ends_with(".rels") {
            let xml = read_part(&doc.bytes, &name).unwrap();
            assert!(roxmltree::Document::parse(&xml).is_ok(), "{name}");
        }
    }
    let document = read_part(&doc.bytes, "word/document.xml").unwrap();
    assert_eq!(attribute_values(&document, "pgSz", "orient"), vec!["landscape"]);
}

#[test]
fn concurrent_builds_are_independent() {
    let requests: Vec<_> = (0..16)
        .map(|i| {
            numbered(6 + i)
                .with_columns(1 + (i as i32 % 3))
                .with_table_regions(vec![TableRegion::new(2, 2, 2, 4)])
        })
        .collect();

    let docs: Vec<_> = requests
        .par_iter()
        .map(|req| build_document(req).unwrap())
        .collect();

    for (i, doc) in docs.iter().enumerate() {
        let document = read_part(&doc.bytes, "word/document.xml").unwrap();
        assert_eq!(count_elements(&document, "tbl"), 1);
        let expected = (1 + i % 3).to_string();
        assert_eq!(attribute_values(&document, "cols", "num"), vec![expected]);
    }
}
