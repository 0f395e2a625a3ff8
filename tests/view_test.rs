//! Integration tests for the read model and snapshot persistence.

use docpatch::{
    batch_update, BatchOptions, Block, Document, Drawing, Editor, Fragment, Operation, Table,
};

fn report() -> Document {
    let mut doc = Document::new();
    doc.add_block(Block::heading("Annual Report", 1));
    doc.add_block(Block::with_text("Summary of the year."));
    doc.add_block(Block::heading("Financials", 2));
    let mut chart = Block::with_text("Figure 1: revenue");
    chart.add_fragment(Fragment::Drawing(Drawing::with_size(12.0, 8.0)));
    doc.add_block(chart);
    let mut logo = Block::new();
    logo.add_fragment(Fragment::Drawing(Drawing::with_size(2.0, 2.0)));
    doc.add_block(logo);
    doc.add_table(Table::from_rows([
        ["Quarter", "Revenue"],
        ["Q1", "120"],
        ["Q2", "140"],
    ]));
    doc
}

#[test]
fn outline_lists_headings_in_document_order() {
    let doc = report();
    let outline = doc.outline();

    assert_eq!(outline.total, 5);
    let levels: Vec<(usize, u8)> = outline.headings.iter().map(|h| (h.index, h.level)).collect();
    assert_eq!(levels, vec![(0, 1), (2, 2)]);
    assert_eq!(outline.headings[0].text, "Annual Report");
}

#[test]
fn read_content_reports_classification() {
    let doc = report();
    let infos = doc.read_content(&[3, 4]);

    assert_eq!(infos.len(), 2);
    assert!(!infos[0].is_empty);
    assert!(infos[0].has_embedded);

    assert!(infos[1].is_empty);
    assert!(infos[1].has_embedded);
    assert!(!infos[1].is_truly_empty);
}

#[test]
fn table_views() {
    let doc = report();
    let outline = doc.tables_outline();
    assert_eq!(outline.len(), 1);
    assert_eq!(outline[0].rows, 3);
    assert_eq!(outline[0].cols, 2);
    assert_eq!(outline[0].preview, "Quarter");

    let grid = doc.read_table(0).unwrap();
    assert_eq!(grid.data[2], vec!["Q2".to_string(), "140".to_string()]);
    assert!(doc.read_table(1).is_err());
}

#[test]
fn image_ordinals_follow_document_scan_order() {
    let doc = report();
    let images = doc.images_outline();

    assert_eq!(images.len(), 2);
    assert_eq!(images[0].image_index, 0);
    assert_eq!(images[0].block_index, 3);
    assert_eq!(images[1].image_index, 1);
    assert_eq!(images[1].block_index, 4);
}

#[test]
fn image_ordinals_recompute_after_mutation() {
    let mut doc = report();

    // Removing the first image promotes the second to ordinal 0 on the
    // next query.
    let result = batch_update(
        &mut doc,
        &[Operation::DeleteImage { image_index: 0 }],
        &BatchOptions::new(),
    )
    .unwrap();
    assert!(result.is_success());

    let images = doc.images_outline();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].image_index, 0);
    assert_eq!(images[0].block_index, 4);
    assert_eq!(images[0].width, Some(2.0));
}

#[test]
fn snapshot_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");

    let doc = report();
    doc.save(&path).unwrap();

    let restored = Document::load(&path).unwrap();
    assert_eq!(restored.plain_text(), doc.plain_text());
    assert_eq!(restored.table_count(), 1);
    assert_eq!(restored.images_outline(), doc.images_outline());
    assert_eq!(
        restored.outline().headings.len(),
        doc.outline().headings.len()
    );
}

#[test]
fn editor_edit_save_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    report().save(&path).unwrap();

    let mut editor = Editor::open(&path).unwrap();
    let result = editor
        .batch_update(&[Operation::SetText {
            index: 1,
            text: "Revised summary.".to_string(),
        }])
        .unwrap();
    assert!(result.is_success());
    editor.save(&path).unwrap();

    let reloaded = Document::load(&path).unwrap();
    assert_eq!(
        reloaded.read_content(&[1])[0].text,
        "Revised summary."
    );
}
