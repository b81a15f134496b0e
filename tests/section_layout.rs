mod common;

use docxide_build::builder::section::{
    MINIMUM_MARGIN_BOTTOM, MINIMUM_MARGIN_TOP, PAGE_LONG_SIDE, PAGE_SHORT_SIDE, plan_columns,
    plan_orientation, plan_section_break_index,
};
use docxide_build::builder::{DocumentBuilder, PlanEntry, working_plan};
use docxide_build::docx::{DocumentModel, DocxPackage, TableLocation};
use docxide_build::model::BuildWarning;
use docxide_build::{BuildRequest, TableRegion};

use common::numbered;

fn build(req: &BuildRequest) -> (DocxPackage, Vec<BuildWarning>) {
    DocumentBuilder::new(req, DocxPackage::new())
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn landscape_swaps_width_and_height() {
    let portrait = plan_orientation(false);
    let landscape = plan_orientation(true);
    assert_eq!(landscape.width, portrait.height);
    assert_eq!(landscape.height, portrait.width);
    assert_eq!(portrait.width, PAGE_SHORT_SIDE);
    assert_eq!(portrait.height, PAGE_LONG_SIDE);
    assert!(landscape.is_landscape());
    assert!(!portrait.is_landscape());
}

#[test]
fn last_orientation_wins() {
    assert_eq!(plan_orientation(true), plan_orientation(true));

    let mut model = DocxPackage::new();
    model.set_page_size(plan_orientation(true));
    model.set_page_size(plan_orientation(false));
    assert_eq!(model.final_section().page_size, Some(plan_orientation(false)));
}

#[test]
fn columns_outside_range_fall_back_to_one() {
    assert_eq!(plan_columns(1), (1, None));
    assert_eq!(plan_columns(3), (3, None));
    for requested in [0, -2, 4, 300] {
        assert_eq!(
            plan_columns(requested),
            (1, Some(BuildWarning::ColumnsClamped { requested }))
        );
    }
}

#[test]
fn heading_break_needs_lines_and_columns() {
    assert_eq!(plan_section_break_index(3, 2), Some(3));
    assert_eq!(plan_section_break_index(1, 3), Some(1));
    assert_eq!(plan_section_break_index(0, 2), None);
    assert_eq!(plan_section_break_index(3, 1), None);
}

#[test]
fn spacer_follows_the_break_index() {
    use PlanEntry::*;
    assert_eq!(
        working_plan(5, Some(2)),
        vec![Source(0), Source(1), Source(2), Spacer, Source(3), Source(4)]
    );
    assert_eq!(working_plan(3, None), vec![Source(0), Source(1), Source(2)]);
}

#[test]
fn page_setup_is_applied() {
    let (model, warnings) = build(&numbered(3).with_landscape(true));
    assert!(warnings.is_empty());

    let section = model.final_section();
    assert_eq!(section.page_size, Some(plan_orientation(true)));
    assert_eq!(section.margins.top, Some(MINIMUM_MARGIN_TOP));
    assert_eq!(section.margins.bottom, Some(MINIMUM_MARGIN_BOTTOM));
    assert_eq!(section.margins.left, None);
    assert_eq!(section.margins.right, None);
    assert_eq!(section.columns, 1);
}

#[test]
fn heading_section_stays_single_column() {
    let req = numbered(10).with_columns(2).with_single_column_lines(3);
    let (model, _) = build(&req);

    let breaks = model.section_breaks();
    assert_eq!(breaks.len(), 1);
    assert_eq!(breaks[0].columns, 1);
    assert_eq!(model.final_section().columns, 2);

    // b1..b8 plus the spacer
    let body = model.body_paragraphs();
    assert_eq!(body.len(), 9);
    assert_eq!(model.paragraph_text(body[2]), "b3");
    assert!(model.paragraph_section_break(body[2]).is_some());
    assert_eq!(model.paragraph_text(body[3]), "");
    assert_eq!(model.paragraph_text(body[4]), "b4");
}

#[test]
fn caller_content_is_not_changed() {
    let req = numbered(10).with_columns(2).with_single_column_lines(3);
    let before = req.content.clone();
    build(&req);
    assert_eq!(req.content, before);
}

#[test]
fn spacer_does_not_shift_the_footer() {
    let req = numbered(6).with_columns(3).with_single_column_lines(2);
    let (model, _) = build(&req);

    let footer = model.footer_paragraphs();
    assert_eq!(footer.len(), 1);
    assert_eq!(model.paragraph_text(footer[0]), "b5");
}

#[test]
fn no_break_with_a_single_column() {
    let req = numbered(6).with_single_column_lines(3);
    let (model, _) = build(&req);
    assert!(model.section_breaks().is_empty());
    assert_eq!(model.body_paragraphs().len(), 4);
}

#[test]
fn clamped_columns_are_reported() {
    let req = numbered(6).with_columns(7).with_single_column_lines(2);
    let (model, warnings) = build(&req);
    assert_eq!(warnings, vec![BuildWarning::ColumnsClamped { requested: 7 }]);
    assert_eq!(model.final_section().columns, 1);
    assert!(model.section_breaks().is_empty());
}

#[test]
fn break_inside_a_table_gets_its_own_paragraph() {
    let req = numbered(10)
        .with_table_regions(vec![TableRegion::new(2, 1, 3, 4)])
        .with_columns(2)
        .with_single_column_lines(3);
    let (model, _) = build(&req);

    let body = model.body_paragraphs();
    let texts: Vec<String> = body.iter().map(|p| model.paragraph_text(*p)).collect();
    assert_eq!(texts, vec!["b1", "b2", "", "", "b5", "b6", "b7", "b8"]);
    assert!(model.paragraph_section_break(body[2]).is_some());
    assert!(model.paragraph_section_break(body[3]).is_none());
    assert_eq!(model.tables_in(TableLocation::Body).len(), 1);
}

#[test]
fn break_on_the_footer_index_stays_in_the_body() {
    let req = numbered(4).with_columns(2).with_single_column_lines(3);
    let (model, _) = build(&req);

    assert_eq!(model.footer_paragraphs().len(), 1);
    let body = model.body_paragraphs();
    assert_eq!(body.len(), 4);
    assert!(model.paragraph_section_break(body[2]).is_some());
    assert_eq!(model.section_breaks().len(), 1);
}
