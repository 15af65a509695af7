//! Program Generation
//!
//! This module builds a randomized ground-truth program: an acyclic struct graph
//! and a set of functions whose bodies read every reachable field and call each
//! other with type-correct arguments.
//!
//! # Generation Order
//! 1. **Structs**: ids 1..=N, each field may only reference a smaller id
//! 2. **Signatures**: ids 1..=M, arguments drawn over the finished struct set
//! 3. **Bodies**: use statements, then one call to every other function
//! 4. **Entry**: id 0, calls every function with default arguments
//!
//! All randomness comes from one seeded RNG owned by [`ProgramBuilder`], so a seed
//! and a pair of counts always reproduce the same program.

pub mod functions;
pub mod structs;

pub use functions::{reachable_paths, ReachablePath, TypePathIndex};

use crate::benchmark::error::BenchResult;
use crate::benchmark::model::{
    Function, FunctionId, Program, StructGraph, StructId, ENTRY_FUNCTION,
};
use crate::config::{validate_config, CountRange, GeneratorConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// Per-run generation context.
///
/// Owns the id counters, the registries and the RNG; nothing outlives the run.
pub struct ProgramBuilder {
    config: GeneratorConfig,
    rng: StdRng,
    structs: StructGraph,
    functions: BTreeMap<FunctionId, Function>,
    next_struct_id: StructId,
    next_function_id: FunctionId,
}

impl ProgramBuilder {
    /// Create a builder, rejecting unusable configurations.
    pub fn new(config: GeneratorConfig) -> BenchResult<Self> {
        validate_config(&config)?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            rng,
            structs: StructGraph::new(),
            functions: BTreeMap::new(),
            next_struct_id: 1,
            next_function_id: ENTRY_FUNCTION + 1,
        })
    }

    /// Synthesize every body plus the entry function and hand over the program.
    pub fn finish(mut self) -> Program {
        self.synthesize_bodies();
        let entry = self.build_entry();
        self.functions.insert(ENTRY_FUNCTION, entry);
        Program {
            structs: self.structs,
            functions: self.functions,
        }
    }

    fn draw_count(&mut self, range: CountRange) -> usize {
        self.rng.gen_range(range.min..=range.max)
    }
}

/// Generate a complete program with `struct_count` structs and `func_count`
/// non-entry functions.
///
/// # Examples
/// ```rust
/// use rsbench_core::benchmark::generator::generate_program;
/// use rsbench_core::config::GeneratorConfig;
///
/// let program = generate_program(10, 100, GeneratorConfig::default().with_seed(7))?;
/// assert_eq!(program.structs.len(), 10);
/// assert_eq!(program.functions.len(), 101);
/// # Ok::<(), rsbench_core::benchmark::error::BenchError>(())
/// ```
pub fn generate_program(
    struct_count: usize,
    func_count: usize,
    config: GeneratorConfig,
) -> BenchResult<Program> {
    log::info!(
        "Generating {} structs and {} functions (seed {})",
        struct_count,
        func_count,
        config.seed
    );
    let mut builder = ProgramBuilder::new(config)?;
    builder.generate_structs(struct_count)?;
    builder.generate_functions(func_count)?;
    Ok(builder.finish())
}
