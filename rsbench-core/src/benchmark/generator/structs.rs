//! Struct Graph Generation
//!
//! Structs are created in id order. A pointer or embedded field of struct `i`
//! references a uniformly chosen id in `1..i`, which keeps the graph acyclic and
//! makes creation order a valid emission order.

use super::ProgramBuilder;
use crate::benchmark::error::{BenchError, BenchResult};
use crate::benchmark::model::{
    member_name, Field, FieldType, PrimitiveKind, Struct, StructId, TypeTag,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Structs with an id up to this bound only get primitive fields.
const PRIMITIVE_ONLY_STRUCTS: StructId = 2;

impl ProgramBuilder {
    /// Append `count` randomly shaped structs to the graph.
    pub fn generate_structs(&mut self, count: usize) -> BenchResult<()> {
        for _ in 0..count {
            self.generate_struct()?;
        }
        log::debug!("Struct graph holds {} structs", self.structs.len());
        Ok(())
    }

    fn generate_struct(&mut self) -> BenchResult<StructId> {
        let id = self.next_struct_id;
        self.next_struct_id += 1;

        let field_count = self.draw_count(self.config.field_count);
        let mut structure = Struct::generated(id);
        for index in 0..field_count {
            let ty = self.random_field_type(id, index)?;
            structure.push_field(Field::new(member_name(index), ty));
        }

        log::debug!("Generated {} with {} fields", structure.name, field_count);
        self.structs.insert(structure);
        Ok(id)
    }

    fn random_field_type(&mut self, id: StructId, index: usize) -> BenchResult<FieldType> {
        let tags: &[TypeTag] = if id <= PRIMITIVE_ONLY_STRUCTS {
            &TypeTag::PRIMITIVE
        } else {
            &TypeTag::ALL
        };
        let tag = *tags
            .choose(&mut self.rng)
            .ok_or_else(|| BenchError::invariant(id, index, "no type tags to choose from"))?;

        match tag {
            TypeTag::Int => Ok(self.random_primitive(PrimitiveKind::Int)),
            TypeTag::UInt => Ok(self.random_primitive(PrimitiveKind::UInt)),
            TypeTag::Float => Ok(self.random_primitive(PrimitiveKind::Float)),
            TypeTag::Pointer => Ok(FieldType::Pointer {
                target: Some(self.random_earlier_struct(id, index)?),
            }),
            TypeTag::EmbeddedStruct => Ok(FieldType::EmbeddedStruct {
                target: self.random_earlier_struct(id, index)?,
            }),
        }
    }

    /// Uniform pick among `1..id`; empty for the first struct.
    fn random_earlier_struct(&mut self, id: StructId, index: usize) -> BenchResult<StructId> {
        if id <= 1 {
            return Err(BenchError::invariant(
                id,
                index,
                "struct reference required but no earlier struct exists",
            ));
        }
        let target = self.rng.gen_range(1..id);
        if !self.structs.contains(target) {
            return Err(BenchError::invariant(
                id,
                index,
                format!("referenced struct {} was never created", target),
            ));
        }
        Ok(target)
    }

    /// Primitive type with a random width: 1/2/4/8 bytes for integers, 4/8 for floats.
    pub(super) fn random_primitive(&mut self, kind: PrimitiveKind) -> FieldType {
        match kind {
            PrimitiveKind::Int => FieldType::Int {
                width: 1u8 << self.rng.gen_range(0..=3u32),
            },
            PrimitiveKind::UInt => FieldType::UInt {
                width: 1u8 << self.rng.gen_range(0..=3u32),
            },
            PrimitiveKind::Float => FieldType::Float {
                width: 1u8 << self.rng.gen_range(2..=3u32),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;

    fn builder() -> ProgramBuilder {
        ProgramBuilder::new(GeneratorConfig::default()).expect("default config is valid")
    }

    #[test]
    fn test_first_struct_has_no_earlier_struct() {
        let mut builder = builder();
        assert!(matches!(
            builder.random_earlier_struct(1, 0),
            Err(BenchError::GenerationInvariantViolation {
                struct_id: 1,
                field: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_reference_to_missing_struct() {
        // Ids 1 and 2 were never generated.
        let mut builder = builder();
        assert!(matches!(
            builder.random_earlier_struct(3, 4),
            Err(BenchError::GenerationInvariantViolation {
                struct_id: 3,
                field: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_earlier_struct_after_generation() {
        let mut builder = builder();
        builder.generate_structs(4).expect("generation should succeed");
        for _ in 0..32 {
            let target = builder
                .random_earlier_struct(5, 0)
                .expect("earlier structs exist");
            assert!((1..5).contains(&target));
        }
    }

    #[test]
    fn test_primitive_widths() {
        let mut builder = builder();
        for _ in 0..64 {
            match builder.random_primitive(PrimitiveKind::Float) {
                FieldType::Float { width } => assert!(width == 4 || width == 8),
                other => panic!("expected a float, got {:?}", other),
            }
            match builder.random_primitive(PrimitiveKind::UInt) {
                FieldType::UInt { width } => assert!([1, 2, 4, 8].contains(&width)),
                other => panic!("expected an unsigned integer, got {:?}", other),
            }
        }
    }
}
