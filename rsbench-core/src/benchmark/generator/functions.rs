//! Function Generation
//!
//! Generates signatures over the finished struct graph, then synthesizes bodies.
//!
//! # Body Shape
//! - One `use` statement per primitive leaf reachable from the arguments, so the
//!   compiled code reads and writes every field
//! - One call to every other non-entry function, in ascending id order; each
//!   parameter gets a random caller path of the same type name, or a zero value
//!   when the caller has none

use super::ProgramBuilder;
use crate::benchmark::error::{BenchError, BenchResult};
use crate::benchmark::model::{
    member_name, Argument, FieldType, Function, FunctionId, Operand, Statement, StructGraph,
    StructId, TypeTag, ENTRY_FUNCTION,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

/// A typed access path rooted at a function argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachablePath {
    pub ty: FieldType,
    pub path: String,
}

/// Expand `root` and every field path reachable through it.
///
/// The root comes first, followed by its fields in declaration order, depth
/// first. Pointers continue with `->`, embedded structs with `.`. Terminates
/// because generated struct graphs are acyclic.
pub fn reachable_paths(graph: &StructGraph, root: &str, ty: &FieldType) -> Vec<ReachablePath> {
    let mut paths = vec![ReachablePath {
        ty: *ty,
        path: root.to_string(),
    }];

    let separator = match ty {
        FieldType::Pointer { target: Some(_) } => "->",
        FieldType::EmbeddedStruct { .. } => ".",
        _ => return paths,
    };
    let Some(structure) = ty.target().and_then(|id| graph.get(id)) else {
        return paths;
    };

    for field in &structure.fields {
        let path = format!("{}{}{}", root, separator, field.name);
        paths.extend(reachable_paths(graph, &path, &field.ty));
    }
    paths
}

/// Per-function map from rendered type name to the paths of that type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypePathIndex {
    paths: BTreeMap<String, Vec<String>>,
}

impl TypePathIndex {
    /// Index every path reachable from `args`, in argument order.
    pub fn for_arguments(graph: &StructGraph, args: &[Argument]) -> Self {
        let mut index = Self::default();
        for arg in args {
            for reachable in reachable_paths(graph, &arg.name, &arg.ty) {
                index.register(graph.type_name(&reachable.ty), reachable.path);
            }
        }
        index
    }

    pub fn register(&mut self, type_name: String, path: String) {
        self.paths.entry(type_name).or_default().push(path);
    }

    /// Paths registered under `type_name`; empty when there are none.
    pub fn candidates(&self, type_name: &str) -> &[String] {
        self.paths.get(type_name).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl ProgramBuilder {
    /// Append `count` functions with random signatures.
    ///
    /// Bodies are synthesized by [`ProgramBuilder::finish`] once every signature exists.
    pub fn generate_functions(&mut self, count: usize) -> BenchResult<()> {
        for _ in 0..count {
            self.generate_signature()?;
        }
        log::debug!("Generated {} function signatures", self.functions.len());
        Ok(())
    }

    fn generate_signature(&mut self) -> BenchResult<FunctionId> {
        let id = self.next_function_id;
        self.next_function_id += 1;

        // Without structs a pointer argument would have nothing to observe.
        let tags: &[TypeTag] = if self.structs.is_empty() {
            &TypeTag::PRIMITIVE
        } else {
            &TypeTag::ARGUMENT
        };

        let arg_count = self.draw_count(self.config.arg_count);
        let mut function = Function::new(id);
        for index in 0..arg_count {
            let tag = *tags
                .choose(&mut self.rng)
                .ok_or_else(|| BenchError::invariant(0, index, "no argument tags to choose from"))?;
            let ty = match tag.primitive() {
                Some(kind) => self.random_primitive(kind),
                None => FieldType::Pointer {
                    target: Some(self.random_struct(index)?),
                },
            };
            function.args.push(Argument::new(member_name(index), ty));
        }

        self.functions.insert(id, function);
        Ok(id)
    }

    fn random_struct(&mut self, index: usize) -> BenchResult<StructId> {
        let ids: Vec<StructId> = self.structs.ids().collect();
        ids.choose(&mut self.rng)
            .copied()
            .ok_or_else(|| BenchError::invariant(0, index, "pointer argument requires a struct"))
    }

    /// Fill in the body of every non-entry function, in ascending id order.
    pub(super) fn synthesize_bodies(&mut self) {
        let ids: Vec<FunctionId> = self.functions.keys().copied().collect();
        for id in ids {
            let body = match self.functions.get(&id) {
                Some(caller) => {
                    synthesize_body(&self.structs, &self.functions, caller, &mut self.rng)
                }
                None => continue,
            };
            if let Some(function) = self.functions.get_mut(&id) {
                function.body = body;
            }
        }
    }

    /// The entry point has no arguments, so every call uses zero values.
    pub(super) fn build_entry(&mut self) -> Function {
        let mut entry = Function::new(ENTRY_FUNCTION);
        entry.body = synthesize_body(&self.structs, &self.functions, &entry, &mut self.rng);
        entry
    }
}

fn synthesize_body(
    graph: &StructGraph,
    functions: &BTreeMap<FunctionId, Function>,
    caller: &Function,
    rng: &mut StdRng,
) -> Vec<Statement> {
    let mut body: Vec<Statement> = caller
        .args
        .iter()
        .flat_map(|arg| reachable_paths(graph, &arg.name, &arg.ty))
        .filter(|reachable| reachable.ty.is_primitive())
        .map(|reachable| Statement::Use {
            path: reachable.path,
        })
        .collect();
    let index = TypePathIndex::for_arguments(graph, &caller.args);

    for callee in functions.values() {
        if callee.is_entry() || callee.id == caller.id {
            continue;
        }
        let args = callee
            .args
            .iter()
            .map(|param| {
                let candidates = index.candidates(&graph.type_name(&param.ty));
                match candidates.choose(rng) {
                    Some(path) => Operand::Path(path.clone()),
                    None => Operand::Default(param.ty),
                }
            })
            .collect();
        body.push(Statement::Call {
            callee: callee.id,
            args,
        });
    }
    body
}
