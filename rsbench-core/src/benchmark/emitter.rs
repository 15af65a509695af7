//! C++ Source Emitter
//!
//! This module renders a generated [`Program`] as a single translation unit that an
//! off-the-shelf C++17 compiler accepts unmodified.
//!
//! # Layout
//! 1. Boilerplate header (defines the fixed-width aliases and `use`)
//! 2. Struct definitions, ascending id; references only point backwards
//! 3. Prototypes for functions 1..=M, so bodies may call in any direction
//! 4. Function bodies, ascending id
//! 5. `int main()` last
//!
//! Emission draws no randomness: the same program always renders the same text.

use crate::benchmark::model::{
    function_name, FieldType, Function, Operand, Program, Statement, Struct, StructGraph,
};

/// Default boilerplate header.
pub const DEFAULT_PREAMBLE: &str = include_str!("../../assets/preamble.cxx");

/// Source emitter for a generated program.
pub struct Emitter<'p> {
    program: &'p Program,
    preamble: &'p str,
    indent_level: usize,
}

impl<'p> Emitter<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            preamble: DEFAULT_PREAMBLE,
            indent_level: 0,
        }
    }

    /// Replace the boilerplate header.
    pub fn with_preamble(mut self, preamble: &'p str) -> Self {
        self.preamble = preamble;
        self
    }

    /// Render the whole translation unit.
    pub fn emit(&mut self) -> String {
        let program = self.program;
        let graph = &program.structs;
        let mut code = String::with_capacity(self.preamble.len() + 4096);

        code.push_str(self.preamble);
        code.push('\n');

        let structs: Vec<String> = graph.iter().map(|s| self.emit_struct(s)).collect();
        code.push_str(&structs.join("\n"));
        code.push('\n');

        for function in program.callable_functions() {
            code.push_str(&self.signature(function));
            code.push_str(";\n");
        }
        code.push('\n');

        let bodies: Vec<String> = program
            .callable_functions()
            .map(|f| self.emit_function(f))
            .collect();
        code.push_str(&bodies.join("\n"));
        code.push('\n');

        if let Some(entry) = program.entry() {
            code.push_str(&self.emit_function(entry));
        }
        code
    }

    /// `struct rs_N { ... };`
    pub fn emit_struct(&mut self, structure: &Struct) -> String {
        let program = self.program;
        let graph = &program.structs;
        let mut code = format!("struct {} {{\n", structure.name);
        self.indent_level += 1;
        for field in &structure.fields {
            code.push_str(&self.indent());
            code.push_str(&format!("{} {};\n", graph.type_name(&field.ty), field.name));
        }
        self.indent_level -= 1;
        code.push_str("};\n");
        code
    }

    fn signature(&self, function: &Function) -> String {
        if function.is_entry() {
            return "int main()".to_string();
        }
        let graph = &self.program.structs;
        let params: Vec<String> = function
            .args
            .iter()
            .map(|arg| format!("{} {}", graph.type_name(&arg.ty), arg.name))
            .collect();
        format!("void {}({})", function_name(function.id), params.join(", "))
    }

    fn emit_function(&mut self, function: &Function) -> String {
        let program = self.program;
        let graph = &program.structs;
        let mut code = self.signature(function);
        code.push_str(" {\n");
        self.indent_level += 1;

        for statement in &function.body {
            code.push_str(&self.indent());
            match statement {
                Statement::Use { path } => {
                    code.push_str(&format!("{0} = use({0});\n", path));
                }
                Statement::Call { callee, args } => {
                    let args: Vec<String> = args.iter().map(|a| render_operand(graph, a)).collect();
                    code.push_str(&format!("{}({});\n", function_name(*callee), args.join(", ")));
                }
            }
        }

        if function.is_entry() {
            code.push_str(&self.indent());
            code.push_str("return 0;\n");
        }

        self.indent_level -= 1;
        code.push_str("}\n");
        code
    }

    fn indent(&self) -> String {
        "    ".repeat(self.indent_level)
    }
}

/// Render `program` with the default header.
pub fn emit_program(program: &Program) -> String {
    Emitter::new(program).emit()
}

/// Zero literal for a parameter with no matching caller path.
fn render_operand(graph: &StructGraph, operand: &Operand) -> String {
    match operand {
        Operand::Path(path) => path.clone(),
        Operand::Default(ty) => match ty {
            FieldType::Int { .. } | FieldType::UInt { .. } => "0".to_string(),
            FieldType::Float { width: 4 } => "0.0f".to_string(),
            FieldType::Float { .. } => "0.0".to_string(),
            FieldType::Pointer { .. } => "nullptr".to_string(),
            FieldType::EmbeddedStruct { target } => format!("{}()", graph.struct_name(*target)),
        },
    }
}
