//! Tests for structural fingerprints and recovery evaluation

use rsbench_core::benchmark::emitter::Emitter;
use rsbench_core::benchmark::error::BenchError;
use rsbench_core::benchmark::fingerprint::{evaluate, fingerprint_set, Fingerprinter};
use rsbench_core::benchmark::generator::generate_program;
use rsbench_core::benchmark::model::{Field, FieldType, Program, Struct, StructGraph, StructId};
use rsbench_core::benchmark::recovered::parse_recovered;
use rsbench_core::config::GeneratorConfig;

fn generated(structs: usize, seed: u64) -> Program {
    generate_program(structs, 0, GeneratorConfig::default().with_seed(seed))
        .expect("generation should succeed")
}

fn create_struct(id: StructId, fields: &[FieldType]) -> Struct {
    let mut s = Struct::generated(id);
    for (i, ty) in fields.iter().enumerate() {
        s.push_field(Field::new(format!("_{}", i), *ty));
    }
    s
}

/// Same layouts under different names and a reversed id order.
fn renamed(graph: &StructGraph) -> StructGraph {
    let count = graph.len() as StructId;
    let remap = |id: StructId| count + 1 - id;
    graph
        .iter()
        .map(|s| {
            let mut copy = Struct::new(remap(s.id), format!("recovered_{}", s.id * 7));
            for (i, field) in s.fields.iter().enumerate() {
                let ty = match field.ty {
                    FieldType::Pointer { target } => FieldType::Pointer {
                        target: target.map(remap),
                    },
                    FieldType::EmbeddedStruct { target } => FieldType::EmbeddedStruct {
                        target: remap(target),
                    },
                    primitive => primitive,
                };
                copy.push_field(Field::new(format!("field_{}", i), ty));
            }
            copy
        })
        .collect()
}

/// Struct definitions only, as a recovery tool would print them.
fn struct_listing(program: &Program) -> String {
    let mut emitter = Emitter::new(program);
    program
        .structs
        .iter()
        .map(|s| emitter.emit_struct(s))
        .collect()
}

#[test]
fn test_renaming_invariance() {
    let program = generated(30, 12);
    assert_eq!(
        fingerprint_set(&program.structs),
        fingerprint_set(&renamed(&program.structs))
    );
}

#[test]
fn test_emitted_structs_parse_back() {
    for seed in [1, 2, 3] {
        let program = generated(25, seed);
        let recovered = parse_recovered(&struct_listing(&program)).expect("listing should parse");

        assert_eq!(recovered.len(), program.structs.len());
        assert_eq!(fingerprint_set(&recovered), fingerprint_set(&program.structs));
    }
}

#[test]
fn test_field_order_matters() {
    let a: StructGraph = [create_struct(
        1,
        &[FieldType::Int { width: 4 }, FieldType::Float { width: 4 }],
    )]
    .into_iter()
    .collect();
    let b: StructGraph = [create_struct(
        1,
        &[FieldType::Float { width: 4 }, FieldType::Int { width: 4 }],
    )]
    .into_iter()
    .collect();
    assert_ne!(fingerprint_set(&a), fingerprint_set(&b));
}

#[test]
fn test_signedness_and_width_matter() {
    let fingerprint = |ty: FieldType| {
        let graph: StructGraph = [create_struct(1, &[ty])].into_iter().collect();
        Fingerprinter::new(&graph).fingerprint(1)
    };
    assert_ne!(
        fingerprint(FieldType::Int { width: 4 }),
        fingerprint(FieldType::UInt { width: 4 })
    );
    assert_ne!(
        fingerprint(FieldType::Int { width: 4 }),
        fingerprint(FieldType::Int { width: 8 })
    );
}

#[test]
fn test_unknown_struct_has_no_fingerprint() {
    let graph = StructGraph::new();
    assert_eq!(Fingerprinter::new(&graph).fingerprint(1), None);
}

#[test]
fn test_fingerprint_hex() {
    let graph: StructGraph = [create_struct(1, &[FieldType::UInt { width: 2 }])]
        .into_iter()
        .collect();
    let fingerprint = Fingerprinter::new(&graph).fingerprint(1).unwrap();
    let hex = fingerprint.to_hex();
    assert_eq!(hex.len(), 64);
    assert_eq!(hex, fingerprint.to_string());
}

#[test]
fn test_perfect_recovery() {
    let program = generated(20, 4);
    let evaluation = evaluate(&program.structs, &renamed(&program.structs)).unwrap();
    assert_eq!(evaluation.recovered_ratio, 1.0);
    assert_eq!(evaluation.garbage_ratio, 0.0);
    assert_eq!(evaluation.matched, evaluation.generated);
}

#[test]
fn test_nothing_recovered() {
    let program = generated(20, 4);
    let evaluation = evaluate(&program.structs, &StructGraph::new()).unwrap();
    assert_eq!(evaluation.recovered_ratio, 0.0);
    assert_eq!(evaluation.garbage_ratio, 1.0);
    assert_eq!(evaluation.recovered, 0);
}

#[test]
fn test_partial_recovery() {
    let truth: StructGraph = [
        create_struct(1, &[FieldType::Int { width: 1 }]),
        create_struct(2, &[FieldType::Int { width: 2 }]),
        create_struct(3, &[FieldType::Int { width: 4 }]),
        create_struct(4, &[FieldType::Int { width: 8 }]),
    ]
    .into_iter()
    .collect();
    let recovered: StructGraph = [
        create_struct(1, &[FieldType::Int { width: 4 }]),
        create_struct(2, &[FieldType::Float { width: 8 }]),
    ]
    .into_iter()
    .collect();

    let evaluation = evaluate(&truth, &recovered).unwrap();
    assert_eq!(evaluation.generated, 4);
    assert_eq!(evaluation.recovered, 2);
    assert_eq!(evaluation.matched, 1);
    assert_eq!(evaluation.recovered_ratio, 0.25);
    assert_eq!(evaluation.garbage_ratio, 0.75);
}

#[test]
fn test_empty_ground_truth() {
    let recovered: StructGraph = [create_struct(1, &[FieldType::Int { width: 1 }])]
        .into_iter()
        .collect();
    assert_eq!(
        evaluate(&StructGraph::new(), &recovered),
        Err(BenchError::EmptyGroundTruth)
    );
}
