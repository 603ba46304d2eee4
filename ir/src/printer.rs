//! Textual form of a module, in MLIR generic-operation style.
//!
//! ```text
//! %0 = memref.alloc() {name = "sum_rv"} : () -> memref<1xi32>
//! affine.for(%1) {lower_bound = affine_map<() -> (0)>, ..} ({
//! ^bb1(%2: index):
//!   ...
//! })
//! ```

use std::collections::HashMap;
use std::fmt::{self, Write};

use crate::module::{BlockId, Module, OpId, Value};
use crate::types::Type;

struct Printer<'m> {
    module: &'m Module,
    names: HashMap<Value, usize>,
}

impl Printer<'_> {
    fn name(&mut self, value: Value) -> String {
        let next = self.names.len();
        format!("%{}", self.names.entry(value).or_insert(next))
    }

    fn operand(&self, value: Value) -> String {
        match self.names.get(&value) {
            Some(n) => format!("%{n}"),
            None => format!("<{value}>"),
        }
    }

    fn block(&mut self, out: &mut String, block: BlockId, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        let module = self.module;
        let args = &module.block(block).args;
        if !args.is_empty() {
            let mut header = Vec::with_capacity(args.len());
            for (i, ty) in args.iter().enumerate() {
                let name = self.name(Value::Arg { block, index: i as u32 });
                header.push(format!("{name}: {ty}"));
            }
            writeln!(out, "{indent}{block}({}):", header.join(", "))?;
        }
        for &op in &module.block(block).ops {
            self.op(out, op, depth + 1)?;
        }
        Ok(())
    }

    fn op(&mut self, out: &mut String, id: OpId, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        let module = self.module;
        let op = module.op(id);

        let operands: Vec<_> = op.operands.iter().map(|&v| self.operand(v)).collect();
        let operand_types: Vec<_> = op.operands.iter().map(|&v| module.value_type(v).to_string()).collect();

        write!(out, "{indent}")?;
        if !op.results.is_empty() {
            let results: Vec<_> =
                (0..op.results.len()).map(|i| self.name(Value::Result { op: id, index: i as u32 })).collect();
            write!(out, "{} = ", results.join(", "))?;
        }
        write!(out, "{}({})", op.kind, operands.join(", "))?;

        if !op.attributes.is_empty() {
            let attrs: Vec<_> = op.attributes.iter().map(|(key, attr)| format!("{key} = {attr}")).collect();
            write!(out, " {{{}}}", attrs.join(", "))?;
        }

        if !op.regions.is_empty() {
            for &region in &op.regions {
                writeln!(out, " ({{")?;
                self.block(out, region, depth)?;
                write!(out, "{indent}}})")?;
            }
        }

        let results: Vec<_> = op.results.iter().map(Type::to_string).collect();
        match results.as_slice() {
            [] if operand_types.is_empty() => writeln!(out),
            [] => writeln!(out, " : ({}) -> ()", operand_types.join(", ")),
            [single] => writeln!(out, " : ({}) -> {single}", operand_types.join(", ")),
            _ => writeln!(out, " : ({}) -> ({})", operand_types.join(", "), results.join(", ")),
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer { module: self, names: HashMap::new() };
        let mut out = String::new();
        writeln!(out, "module {{")?;
        printer.block(&mut out, self.body(), 0)?;
        writeln!(out, "}}")?;
        f.write_str(&out)
    }
}
