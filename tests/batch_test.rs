//! Integration tests for batch execution semantics.

use docpatch::{
    batch_update, batch_update_records, BatchOptions, Document, Drawing, Error, ExecError,
    Fragment, OpStatus, Operation, Position, ValidationError,
};
use serde_json::json;

fn delete(index: usize) -> Operation {
    Operation::Delete {
        index,
        force: false,
    }
}

fn apply(doc: &mut Document, ops: &[Operation]) -> docpatch::BatchResult {
    batch_update(doc, ops, &BatchOptions::new()).unwrap()
}

#[test]
fn deleting_distinct_indices_is_order_independent() {
    let texts = ["P0", "P1", "P2", "P3", "P4", "P5"];
    let targets = [0usize, 2, 5];

    // The expected result removes all targets simultaneously.
    let expected: Vec<&str> = texts
        .iter()
        .enumerate()
        .filter(|(i, _)| !targets.contains(i))
        .map(|(_, t)| *t)
        .collect();
    let expected = expected.join("\n");

    let orders: [Vec<usize>; 4] = [
        vec![0, 2, 5],
        vec![5, 2, 0],
        vec![2, 5, 0],
        vec![5, 0, 2],
    ];
    for order in orders {
        let mut doc = Document::from_texts(texts);
        let ops: Vec<Operation> = order.iter().map(|&i| delete(i)).collect();
        let result = apply(&mut doc, &ops);

        assert!(result.is_success());
        assert_eq!(doc.plain_text(), expected, "submission order {:?}", order);
    }
}

#[test]
fn double_delete_scenario() {
    // [{delete 0}, {delete 2}] on [A,B,C,D] yields [B,D], either order.
    for order in [[0usize, 2], [2, 0]] {
        let mut doc = Document::from_texts(["A", "B", "C", "D"]);
        let ops: Vec<Operation> = order.iter().map(|&i| delete(i)).collect();
        apply(&mut doc, &ops);
        assert_eq!(doc.plain_text(), "B\nD");
    }
}

#[test]
fn insert_placement() {
    // Insert after index i lands between Pi and Pi+1.
    let mut doc = Document::from_texts(["P0", "P1", "P2"]);
    apply(
        &mut doc,
        &[Operation::Insert {
            index: 1,
            text: "X".to_string(),
            position: Position::After,
            style: None,
        }],
    );
    assert_eq!(doc.plain_text(), "P0\nP1\nX\nP2");

    // Insert before index 0 becomes the new first block.
    let mut doc = Document::from_texts(["P0", "P1"]);
    apply(
        &mut doc,
        &[Operation::Insert {
            index: 0,
            text: "X".to_string(),
            position: Position::Before,
            style: None,
        }],
    );
    assert_eq!(doc.plain_text(), "X\nP0\nP1");
}

#[test]
fn mixed_inserts_and_deletes_need_no_index_adjustment() {
    // All indices name invocation-start positions.
    let mut doc = Document::from_texts(["A", "B", "C", "D"]);
    let ops = [
        Operation::Insert {
            index: 0,
            text: "start".to_string(),
            position: Position::Before,
            style: None,
        },
        delete(2),
        Operation::Insert {
            index: 3,
            text: "end".to_string(),
            position: Position::After,
            style: None,
        },
    ];
    apply(&mut doc, &ops);
    assert_eq!(doc.plain_text(), "start\nA\nB\nD\nend");
}

#[test]
fn delete_then_insert_at_same_index_reads_as_replace() {
    let mut doc = Document::from_texts(["A", "B", "C"]);
    let ops = [
        Operation::Insert {
            index: 1,
            text: "B2".to_string(),
            position: Position::Before,
            style: None,
        },
        delete(1),
    ];
    apply(&mut doc, &ops);
    assert_eq!(doc.plain_text(), "A\nB2\nC");
}

#[test]
fn protection_invariant() {
    let mut doc = Document::from_texts(["text", "", "more"]);
    doc.blocks[1].add_fragment(Fragment::Drawing(Drawing::with_size(5.0, 5.0)));

    // Unforced delete fails with a protected-deletion error and the
    // block track is unchanged.
    let result = apply(&mut doc, &[delete(1)]);
    assert_eq!(result.failed, 1);
    match &result.outcomes[0].status {
        OpStatus::Failed(ExecError::Protected { index }) => assert_eq!(*index, 1),
        other => panic!("expected protected-deletion failure, got {:?}", other),
    }
    assert_eq!(doc.block_count(), 3);
    assert_eq!(doc.images().len(), 1);

    // Forced delete succeeds and removes it.
    let result = apply(
        &mut doc,
        &[Operation::Delete {
            index: 1,
            force: true,
        }],
    );
    assert!(result.is_success());
    assert_eq!(doc.plain_text(), "text\nmore");
    assert!(doc.images().is_empty());
}

#[test]
fn track_independence() {
    let mut doc = Document::from_texts(["one", "two", "three"]);
    doc.add_table(docpatch::Table::from_rows([["x"]]));
    doc.blocks[2].add_fragment(Fragment::Drawing(Drawing::with_size(1.0, 2.0)));

    // Deleting a block leaves table and image ordinals alone when the
    // deleted block backs neither.
    apply(&mut doc, &[delete(0)]);

    assert_eq!(doc.table_count(), 1);
    assert_eq!(doc.read_table(0).unwrap().data[0][0], "x");
    let images = doc.images_outline();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].image_index, 0);
    // The owning block shifted, the image ordinal did not.
    assert_eq!(images[0].block_index, 1);
}

#[test]
fn aspect_preservation() {
    let mut doc = Document::from_texts([""]);
    doc.blocks[0].add_fragment(Fragment::Drawing(Drawing::with_size(16.0, 10.0)));

    apply(
        &mut doc,
        &[Operation::ResizeImage {
            image_index: 0,
            width: Some(8.0),
            height: None,
        }],
    );

    let image = doc.image(0).unwrap();
    let ratio = 16.0 / 10.0;
    assert_eq!(image.width, Some(8.0));
    assert!((image.height.unwrap() - 8.0 / ratio).abs() < 1e-4);
}

#[test]
fn numbered_paragraph_flattening_scenario() {
    let mut doc = Document::from_texts(["Intro", "(1) Body text", "Conclusion"]);
    doc.blocks[1].flags = vec!["numPr".to_string()];

    // clean_xml leaves visible text alone but clears the numbering flag.
    apply(
        &mut doc,
        &[Operation::CleanXml {
            index: 1,
            remove: vec!["numPr".to_string()],
            style: None,
            indent: None,
        }],
    );
    assert_eq!(doc.blocks[1].text(), "(1) Body text");
    assert!(doc.blocks[1].flags.is_empty());

    // A follow-up regex replace strips the literal number prefix.
    apply(
        &mut doc,
        &[Operation::ReplaceText {
            index: 1,
            pattern: r"^\(\d\)\s*".to_string(),
            replacement: String::new(),
            regex: true,
        }],
    );
    assert_eq!(doc.plain_text(), "Intro\nBody text\nConclusion");
}

#[test]
fn table_row_update_and_length_mismatch() {
    let mut doc = Document::new();
    doc.add_table(docpatch::Table::from_rows([["a", "b"], ["c", "d"]]));

    // Correct length: both cells of row 1 are set.
    apply(
        &mut doc,
        &[Operation::UpdateTableRow {
            table_index: 0,
            row: 1,
            texts: vec!["x".to_string(), "y".to_string()],
        }],
    );
    assert_eq!(doc.read_table(0).unwrap().data[1], vec!["x", "y"]);

    // Length mismatch fails validation; nothing in the batch runs, the
    // table is unchanged.
    let ops = [
        Operation::UpdateTableCell {
            table_index: 0,
            row: 0,
            col: 0,
            text: "should not land".to_string(),
        },
        Operation::UpdateTableRow {
            table_index: 0,
            row: 1,
            texts: vec!["only one".to_string()],
        },
    ];
    let err = batch_update(&mut doc, &ops, &BatchOptions::new()).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::LengthMismatch {
            expected: 2,
            got: 1
        })
    ));
    assert_eq!(doc.read_table(0).unwrap().data[0], vec!["a", "b"]);
    assert_eq!(doc.read_table(0).unwrap().data[1], vec!["x", "y"]);
}

#[test]
fn raw_records_round_trip() {
    let mut doc = Document::from_texts(["one old", "two"]);
    let records = [
        json!({"op": "replace_text_global", "pattern": "old", "replacement": "new"}),
        json!({"op": "insert", "index": 1, "text": "three", "position": "after",
               "note": "unknown extra fields are ignored"}),
        json!({"op": "update_fields_on_open"}),
    ];

    let result = batch_update_records(&mut doc, &records, &BatchOptions::new()).unwrap();
    assert_eq!(result.applied, 3);
    assert_eq!(doc.plain_text(), "one new\ntwo\nthree");
    assert!(doc.update_fields_on_open);
}

#[test]
fn abort_mode_returns_partial_result() {
    let mut doc = Document::from_texts(["keep", "also keep"]);
    doc.blocks[0].add_fragment(Fragment::Drawing(Drawing::with_size(1.0, 1.0)));

    // Structural deletes run descending, so delete(1) succeeds before
    // the protected delete(0) fails and aborts.
    let result = apply(&mut doc, &[delete(0), delete(1)]);
    assert_eq!(result.applied, 1);
    assert_eq!(result.failed, 1);
    assert_eq!(result.outcomes.len(), 2);
    assert_eq!(doc.plain_text(), "keep");
}

#[test]
fn continue_mode_runs_everything() {
    let mut doc = Document::from_texts(["keep", "drop", "rename"]);
    doc.blocks[0].add_fragment(Fragment::Drawing(Drawing::with_size(1.0, 1.0)));

    let options = BatchOptions::new().continue_on_error();
    let ops = [
        delete(0), // protected, fails
        delete(1),
        Operation::SetText {
            index: 2,
            text: "renamed".to_string(),
        },
    ];
    let result = batch_update(&mut doc, &ops, &options).unwrap();

    assert_eq!(result.applied, 2);
    assert_eq!(result.failed, 1);
    assert_eq!(doc.plain_text(), "keep\nrenamed");
}

#[test]
fn insert_image_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("figure.png");
    std::fs::write(&path, b"\x89PNG\r\n").unwrap();

    let mut doc = Document::from_texts(["caption"]);
    let result = apply(
        &mut doc,
        &[Operation::InsertImage {
            index: 0,
            path: path.to_string_lossy().into_owned(),
            width: Some(6.0),
            height: Some(4.0),
        }],
    );

    assert!(result.is_success());
    let images = doc.images_outline();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].width, Some(6.0));
    assert!(doc.blocks[0].has_embedded());
}

#[test]
fn image_delete_uses_invocation_start_ordinals() {
    let mut doc = Document::from_texts(["a", "b"]);
    doc.blocks[0].add_fragment(Fragment::Drawing(Drawing::with_size(1.0, 1.0)));
    doc.blocks[1].add_fragment(Fragment::Drawing(Drawing::with_size(2.0, 2.0)));

    // Deleting images 0 and 1 in one batch removes both regardless of
    // submission order.
    let ops = [
        Operation::DeleteImage { image_index: 0 },
        Operation::DeleteImage { image_index: 1 },
    ];
    let result = apply(&mut doc, &ops);
    assert!(result.is_success());
    assert!(doc.images().is_empty());
}
