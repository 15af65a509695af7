//! Tests for recovered-model parsing

use rsbench_core::benchmark::error::{BenchError, ParseError};
use rsbench_core::benchmark::fingerprint::Fingerprinter;
use rsbench_core::benchmark::model::{FieldType, StructGraph};
use rsbench_core::benchmark::recovered::{parse_recovered, stat_header};

const RECOVERED: &str = "\
struct rs_1 {
    int32_t _0;
    float _1;
};
struct rs_2 {
    rs_1* _0;
    uint8_t _1;
    _padding_2 _2;
};
";

fn parse(text: &str) -> StructGraph {
    parse_recovered(text).expect("recovered model should parse")
}

fn parse_error(text: &str) -> ParseError {
    match parse_recovered(text) {
        Err(BenchError::Parse(error)) => error,
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn test_parse_two_structs() {
    let graph = parse(RECOVERED);
    assert_eq!(graph.len(), 2);

    let first = graph.get(1).unwrap();
    assert_eq!(first.name, "rs_1");
    let types: Vec<FieldType> = first.fields.iter().map(|f| f.ty).collect();
    assert_eq!(
        types,
        vec![FieldType::Int { width: 4 }, FieldType::Float { width: 4 }]
    );

    let second = graph.get(2).unwrap();
    assert_eq!(second.name, "rs_2");
    let types: Vec<FieldType> = second.fields.iter().map(|f| f.ty).collect();
    assert_eq!(
        types,
        vec![
            FieldType::Pointer { target: Some(1) },
            FieldType::UInt { width: 1 }
        ]
    );
}

#[test]
fn test_referenced_width_changes_fingerprint() {
    let original = parse(RECOVERED);
    let widened = parse(&RECOVERED.replace("int32_t _0", "int64_t _0"));

    let before = Fingerprinter::new(&original).fingerprint(2);
    let after = Fingerprinter::new(&widened).fingerprint(2);
    assert!(before.is_some());
    assert_ne!(before, after);
}

#[test]
fn test_forward_pointer_reference() {
    let graph = parse(
        "struct node {\n    next* _0;\n};\nstruct next {\n    double _0;\n    node* _1;\n};\n",
    );
    assert_eq!(graph.len(), 2);

    let next = graph.get(2).unwrap();
    assert_eq!(next.name, "next");
    assert_eq!(next.fields.len(), 2);
    assert_eq!(
        graph.get(1).unwrap().fields[0].ty,
        FieldType::Pointer { target: Some(2) }
    );
}

#[test]
fn test_embedded_and_untyped_members() {
    let graph = parse(concat!(
        "struct a {\n    uint16_t _0;\n};\n",
        "struct b {\n    a _0;\n    struct a _1;\n    void* _2;\n    f64_t _3;\n};\n",
    ));
    let types: Vec<FieldType> = graph.get(2).unwrap().fields.iter().map(|f| f.ty).collect();
    assert_eq!(
        types,
        vec![
            FieldType::EmbeddedStruct { target: 1 },
            FieldType::EmbeddedStruct { target: 1 },
            FieldType::Pointer { target: None },
            FieldType::Float { width: 8 },
        ]
    );
}

#[test]
fn test_header_and_noise_are_ignored() {
    let text = format!(
        "// recovered 2 structs\n// 0.12s\n#pragma once\n\n{}\nstruct rs_3;\n",
        RECOVERED
    );
    let graph = parse(&text);
    // forward declaration without a definition stays as an empty placeholder
    assert_eq!(graph.len(), 3);
    assert!(graph.get(3).unwrap().fields.is_empty());
    assert_eq!(stat_header(&text), vec!["recovered 2 structs", "0.12s"]);
}

#[test]
fn test_empty_input() {
    assert!(parse("").is_empty());
}

#[test]
fn test_unmatched_close() {
    let error = parse_error("};\n");
    assert!(matches!(
        error,
        ParseError::UnmatchedClose { ref location } if location.line == 1
    ));
}

#[test]
fn test_nested_open() {
    let error = parse_error("struct a {\nstruct b {\n};\n};\n");
    match error {
        ParseError::NestedOpen {
            open,
            inner,
            location,
        } => {
            assert_eq!(open, "a");
            assert_eq!(inner, "b");
            assert_eq!(location.line, 2);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_malformed_open() {
    assert!(matches!(
        parse_error("struct {\n};\n"),
        ParseError::MalformedOpen { .. }
    ));
}

#[test]
fn test_unrecognized_field() {
    assert!(matches!(
        parse_error("struct a {\n    unsigned long _0;\n};\n"),
        ParseError::UnrecognizedField { .. }
    ));
    // bare names only resolve to structs seen before
    assert!(matches!(
        parse_error("struct a {\n    later _0;\n};\n"),
        ParseError::UnrecognizedField { .. }
    ));
}

#[test]
fn test_invalid_width() {
    assert!(matches!(
        parse_error("struct a {\n    int24_t _0;\n};\n"),
        ParseError::InvalidWidth { bits: 24, .. }
    ));
}

#[test]
fn test_duplicate_struct() {
    let error = parse_error("struct a {\n};\nstruct a {\n};\n");
    assert!(matches!(
        error,
        ParseError::DuplicateStruct { ref name, ref location } if name == "a" && location.line == 3
    ));
}

#[test]
fn test_unterminated_struct() {
    assert_eq!(
        parse_error("struct a {\n    int8_t _0;\n"),
        ParseError::UnterminatedStruct {
            name: "a".to_string()
        }
    );
}
