//! Structural Fingerprints and Recovery Evaluation
//!
//! A fingerprint identifies a struct layout independently of every name and id:
//! field count, field order, type tags, widths, and recursively the layout of
//! each referenced struct.
//!
//! # Encoding
//! SHA-256 over the field sequence. Each field contributes its tag byte and width
//! byte; a reference contributes the referenced struct's digest in place of its
//! name. Recovered graphs may contain pointer cycles, so a reference back to a
//! struct still being fingerprinted is encoded as its distance up the visit stack.
//! Only structs outside every cycle are cached.
//!
//! # Evaluation
//! Both ratios are normalized by the ground-truth set, so the garbage ratio counts
//! missed ground truth, not spurious recovered structs.

use crate::benchmark::error::{BenchError, BenchResult};
use crate::benchmark::model::{FieldType, StructGraph, StructId, TypeTag};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;

const REF_NONE: u8 = 0;
const REF_STRUCT: u8 = 1;
const REF_BACK: u8 = 2;
const REF_MISSING: u8 = 3;

/// 256-bit structural digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint {
    bytes: [u8; 32],
}

impl Fingerprint {
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn tag_byte(tag: TypeTag) -> u8 {
    match tag {
        TypeTag::Int => 0,
        TypeTag::UInt => 1,
        TypeTag::Float => 2,
        TypeTag::Pointer => 3,
        TypeTag::EmbeddedStruct => 4,
    }
}

/// Memoizing fingerprint computation over one graph.
pub struct Fingerprinter<'g> {
    graph: &'g StructGraph,
    cache: HashMap<StructId, Fingerprint>,
}

impl<'g> Fingerprinter<'g> {
    pub fn new(graph: &'g StructGraph) -> Self {
        Self {
            graph,
            cache: HashMap::new(),
        }
    }

    /// Fingerprint of struct `id`, or `None` if the graph has no such struct.
    pub fn fingerprint(&mut self, id: StructId) -> Option<Fingerprint> {
        if !self.graph.contains(id) {
            return None;
        }
        let mut stack = Vec::new();
        Some(self.visit(id, &mut stack).0)
    }

    /// Fingerprints of every struct in the graph.
    pub fn fingerprint_set(&mut self) -> HashSet<Fingerprint> {
        let graph = self.graph;
        graph.ids().filter_map(|id| self.fingerprint(id)).collect()
    }

    /// Returns the digest and the lowest stack position it refers back to.
    fn visit(&mut self, id: StructId, stack: &mut Vec<StructId>) -> (Fingerprint, Option<usize>) {
        if let Some(fingerprint) = self.cache.get(&id) {
            return (*fingerprint, None);
        }
        let graph = self.graph;
        let Some(structure) = graph.get(id) else {
            return (Fingerprint { bytes: [0; 32] }, None);
        };

        let frame = stack.len();
        stack.push(id);

        let mut hasher = Sha256::new();
        hasher.update((structure.fields.len() as u32).to_le_bytes());
        let mut lowest: Option<usize> = None;

        for field in &structure.fields {
            hasher.update([tag_byte(field.ty.tag()), field.ty.width().unwrap_or(0)]);
            match field.ty {
                FieldType::Int { .. } | FieldType::UInt { .. } | FieldType::Float { .. } => {}
                FieldType::Pointer { target: None } => hasher.update([REF_NONE]),
                FieldType::Pointer { target: Some(target) }
                | FieldType::EmbeddedStruct { target } => {
                    if let Some(position) = stack.iter().position(|&s| s == target) {
                        hasher.update([REF_BACK]);
                        hasher.update(((stack.len() - position) as u32).to_le_bytes());
                        lowest = min_position(lowest, Some(position));
                    } else if graph.contains(target) {
                        let (inner, escapes) = self.visit(target, stack);
                        hasher.update([REF_STRUCT]);
                        hasher.update(inner.as_bytes());
                        lowest = min_position(lowest, escapes);
                    } else {
                        hasher.update([REF_MISSING]);
                    }
                }
            }
        }

        stack.pop();
        let fingerprint = Fingerprint {
            bytes: hasher.finalize().into(),
        };

        // Any back reference means this struct sits on a cycle and its digest
        // depends on where the walk entered it.
        if lowest.is_none() {
            self.cache.insert(id, fingerprint);
        }
        (fingerprint, lowest.filter(|&position| position < frame))
    }
}

fn min_position(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Fingerprints of every struct in `graph`.
pub fn fingerprint_set(graph: &StructGraph) -> HashSet<Fingerprint> {
    Fingerprinter::new(graph).fingerprint_set()
}

/// Outcome of comparing a recovered graph against ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Share of ground-truth layouts present in the recovered set
    pub recovered_ratio: f64,
    /// Share of ground-truth layouts missing from the recovered set
    pub garbage_ratio: f64,
    /// Distinct ground-truth fingerprints
    pub generated: usize,
    /// Distinct recovered fingerprints
    pub recovered: usize,
    /// Fingerprints present in both sets
    pub matched: usize,
}

/// Compare `recovered` against `generated` by fingerprint set intersection.
///
/// # Errors
/// Returns [`BenchError::EmptyGroundTruth`] when `generated` has no structs.
pub fn evaluate(generated: &StructGraph, recovered: &StructGraph) -> BenchResult<Evaluation> {
    let truth = fingerprint_set(generated);
    if truth.is_empty() {
        return Err(BenchError::EmptyGroundTruth);
    }
    let found = fingerprint_set(recovered);
    let matched = truth.intersection(&found).count();

    let total = truth.len() as f64;
    let evaluation = Evaluation {
        recovered_ratio: matched as f64 / total,
        garbage_ratio: (truth.len() - matched) as f64 / total,
        generated: truth.len(),
        recovered: found.len(),
        matched,
    };
    log::info!(
        "Matched {} of {} ground-truth layouts ({} recovered)",
        matched,
        truth.len(),
        found.len()
    );
    Ok(evaluation)
}
