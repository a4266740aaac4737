//! Semantic type -> [`PortableType`].
//!
//! Classification is an ordered list of predicates; the first one that
//! matches decides the translation. Class and interface types are turned
//! into registry entries and referenced by name.

use tracing::warn;

use crate::context::GenerationContext;
use crate::model::{LiteralValue, ObjectFlags, SemanticModel, TypeFlags, flag_names};
use crate::types::{InterfaceDeclaration, PortableType, Property};

/// Keyword types, checked before anything else. `boolean` is a union of its
/// two literals, so it has to be caught here.
const PRIMITIVES: [(TypeFlags, PortableType); 7] = [
    (TypeFlags::BOOLEAN, PortableType::Boolean),
    (TypeFlags::STRING, PortableType::String),
    (TypeFlags::NUMBER, PortableType::Number),
    (TypeFlags::UNDEFINED, PortableType::Undefined),
    (TypeFlags::NULL, PortableType::Null),
    (TypeFlags::ANY, PortableType::Any),
    (TypeFlags::UNKNOWN, PortableType::Unknown),
];

impl<M: SemanticModel> GenerationContext<'_, M> {
    /// Translate `ty`. `None` means the type has no portable form (function
    /// types, or a union or intersection made only of them); callers drop
    /// whatever carried it.
    pub(crate) fn translate(&mut self, ty: M::Type) -> Option<PortableType> {
        let model = self.model;
        let flags = model.type_flags(ty);

        if let Some((_, primitive)) = PRIMITIVES.iter().find(|(f, _)| flags.intersects(*f)) {
            return Some(primitive.clone());
        }
        if flags.contains(TypeFlags::UNION) {
            let members = self.translate_all(model.constituents(ty));
            return (!members.is_empty()).then_some(PortableType::Union(members));
        }
        if model.is_class_or_interface(ty) {
            return Some(PortableType::InterfaceRef(self.build_interface(ty)));
        }
        if flags.contains(TypeFlags::INTERSECTION) {
            let members = self.translate_all(model.constituents(ty));
            return (!members.is_empty()).then_some(PortableType::Intersection(members));
        }
        match model.literal_value(ty) {
            Some(LiteralValue::String(value)) if flags.contains(TypeFlags::STRING_LITERAL) => {
                return Some(PortableType::StringLiteral(value));
            }
            Some(LiteralValue::Number(value)) if flags.contains(TypeFlags::NUMBER_LITERAL) => {
                return Some(PortableType::NumberLiteral(value));
            }
            _ => {}
        }
        if flags.contains(TypeFlags::OBJECT) {
            let object_flags = model.object_flags(ty);
            if object_flags.contains(ObjectFlags::ANONYMOUS) {
                return self.translate_anonymous(ty);
            }
            warn!(
                object_flags = %flag_names(&object_flags),
                "Unsupported object type, falling back to any."
            );
            return Some(PortableType::Any);
        }

        warn!(flags = %flag_names(&flags), "Unsupported type, falling back to any.");
        Some(PortableType::Any)
    }

    fn translate_all(&mut self, types: Vec<M::Type>) -> Vec<PortableType> {
        types.into_iter().filter_map(|t| self.translate(t)).collect()
    }

    fn translate_anonymous(&mut self, ty: M::Type) -> Option<PortableType> {
        if !self.model.call_signatures(ty).is_empty() {
            return None;
        }
        if self.visiting.contains(&ty) {
            warn!("Recursive anonymous object type, falling back to any.");
            return Some(PortableType::Any);
        }

        self.visiting.push(ty);
        let properties = self.translate_members(ty);
        self.visiting.pop();

        Some(PortableType::ObjectShape(properties))
    }

    /// Own members of `ty` that have a value declaration and a portable type.
    fn translate_members(&mut self, ty: M::Type) -> Vec<Property> {
        let model = self.model;
        let mut properties = Vec::new();

        for symbol in model.members(ty) {
            let name = model.symbol_name(symbol);
            let Some(member_type) = model.type_of_symbol(symbol) else {
                warn!(member = name, "Member has no value declaration, skipping.");
                continue;
            };
            if let Some(ty) = self.translate(member_type) {
                properties.push(Property {
                    name: name.to_string(),
                    ty,
                });
            }
        }

        properties
    }

    /// Register `ty` (and its bases) as interfaces; returns the name.
    ///
    /// The name is reserved before members are translated, so a member that
    /// refers back to `ty` resolves to a reference instead of recursing.
    pub(crate) fn build_interface(&mut self, ty: M::Type) -> String {
        let model = self.model;
        let name = model.type_name(ty).unwrap_or("__type").to_string();
        if !self.registry.reserve(&name) {
            return name;
        }

        let properties = self.translate_members(ty);

        let mut base_interfaces = Vec::new();
        for base in model.base_types(ty) {
            if model.is_class_or_interface(base) {
                base_interfaces.push(self.build_interface(base));
            } else {
                warn!(
                    interface = %name,
                    flags = %flag_names(&model.type_flags(base)),
                    "Base type is not a class or interface, skipping."
                );
            }
        }

        self.registry.register(InterfaceDeclaration {
            name: name.clone(),
            properties,
            base_interfaces,
        });
        name
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::context::GenerateOptions;
    use crate::testing::FakeModel;
    use tracing_test::traced_test;

    fn translate(model: &FakeModel, ty: usize) -> (Option<PortableType>, Vec<InterfaceDeclaration>) {
        let options = GenerateOptions::default();
        let mut ctx = GenerationContext::new(model, &options);
        let out = ctx.translate(ty);
        (out, ctx.registry.declarations().cloned().collect())
    }

    #[test]
    fn test_boolean_wins_over_union() {
        let mut model = FakeModel::new();
        let boolean = model.flags(TypeFlags::BOOLEAN | TypeFlags::UNION);
        assert_eq!(translate(&model, boolean).0, Some(PortableType::Boolean));
    }

    #[test]
    fn test_union_drops_function_members() {
        let mut model = FakeModel::new();
        let string = model.flags(TypeFlags::STRING);
        let null = model.flags(TypeFlags::NULL);
        let void = model.flags(TypeFlags::VOID);
        let callback = model.function(&[(&[], void)]);
        let union = model.union(&[string, callback, null]);
        assert_eq!(
            translate(&model, union).0,
            Some(PortableType::Union(vec![PortableType::String, PortableType::Null]))
        );
    }

    #[test]
    fn test_union_of_only_functions_has_no_portable_form() {
        let mut model = FakeModel::new();
        let void = model.flags(TypeFlags::VOID);
        let number = model.flags(TypeFlags::NUMBER);
        let nullary = model.function(&[(&[], void)]);
        let unary = model.function(&[(&[("x", Some(number))], void)]);
        let union = model.union(&[nullary, unary]);
        assert_eq!(translate(&model, union).0, None);

        let intersection = model.intersection(&[nullary, unary]);
        assert_eq!(translate(&model, intersection).0, None);
    }

    #[test]
    fn test_literals_and_intersection() {
        let mut model = FakeModel::new();
        let a = model.string_literal("a");
        let one = model.number_literal(1.0);
        let both = model.intersection(&[a, one]);
        assert_eq!(
            translate(&model, both).0,
            Some(PortableType::Intersection(vec![
                PortableType::StringLiteral("a".into()),
                PortableType::NumberLiteral(1.0),
            ]))
        );
    }

    #[test]
    fn test_anonymous_object_becomes_shape() {
        let mut model = FakeModel::new();
        let number = model.flags(TypeFlags::NUMBER);
        let void = model.flags(TypeFlags::VOID);
        let method = model.function(&[(&[], void)]);
        let shape = model.object(
            ObjectFlags::ANONYMOUS,
            None,
            &[("count", Some(number)), ("run", Some(method))],
        );
        let (out, registered) = translate(&model, shape);
        assert_eq!(
            out,
            Some(PortableType::ObjectShape(vec![Property {
                name: "count".into(),
                ty: PortableType::Number,
            }]))
        );
        assert!(registered.is_empty());
    }

    #[test]
    fn test_self_referencing_interface_registers_once() {
        let mut model = FakeModel::new();
        let number = model.flags(TypeFlags::NUMBER);
        let node = model.interface("TreeNode", &[]);
        model.set_members(node, &[("value", Some(number)), ("next", Some(node))]);

        let (out, registered) = translate(&model, node);
        assert_eq!(out, Some(PortableType::InterfaceRef("TreeNode".into())));
        assert_eq!(registered.len(), 1);
        assert_eq!(
            registered[0].properties[1],
            Property {
                name: "next".into(),
                ty: PortableType::InterfaceRef("TreeNode".into()),
            }
        );
    }

    #[test]
    fn test_bases_are_built_in_order() {
        let mut model = FakeModel::new();
        let string = model.flags(TypeFlags::STRING);
        let a = model.interface("A", &[("a", Some(string))]);
        let b = model.interface("B", &[("b", Some(string))]);
        let c = model.interface("C", &[]);
        model.add_base(c, a);
        model.add_base(c, b);

        let (_, registered) = translate(&model, c);
        let names: Vec<&str> = registered.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["C", "A", "B"]);
        assert_eq!(registered[0].base_interfaces, ["A", "B"]);
    }

    #[test]
    #[traced_test]
    fn test_member_without_declaration_is_skipped() {
        let mut model = FakeModel::new();
        let string = model.flags(TypeFlags::STRING);
        let bag = model.interface("Bag", &[("__index", None), ("name", Some(string))]);

        let (_, registered) = translate(&model, bag);
        assert_eq!(registered[0].properties.len(), 1);
        assert!(logs_contain("Member has no value declaration, skipping."));
    }

    #[test]
    #[traced_test]
    fn test_recursive_anonymous_shape_falls_back_to_any() {
        let mut model = FakeModel::new();
        let shape = model.object(ObjectFlags::ANONYMOUS, None, &[]);
        model.set_members(shape, &[("inner", Some(shape))]);

        assert_eq!(
            translate(&model, shape).0,
            Some(PortableType::ObjectShape(vec![Property {
                name: "inner".into(),
                ty: PortableType::Any,
            }]))
        );
        assert!(logs_contain("Recursive anonymous object type"));
    }

    #[test]
    #[traced_test]
    fn test_unsupported_types_fall_back_to_any() {
        let mut model = FakeModel::new();
        let param = model.flags(TypeFlags::TYPE_PARAMETER);
        let array = model.object(ObjectFlags::REFERENCE, Some("Array"), &[]);

        assert_eq!(translate(&model, param).0, Some(PortableType::Any));
        assert!(logs_contain("Unsupported type, falling back to any."));
        assert!(logs_contain("TYPE_PARAMETER"));

        assert_eq!(translate(&model, array).0, Some(PortableType::Any));
        assert!(logs_contain("Unsupported object type, falling back to any."));
        assert!(logs_contain("REFERENCE"));
    }

    #[test]
    #[traced_test]
    fn test_non_interface_base_is_skipped() {
        let mut model = FakeModel::new();
        let any = model.flags(TypeFlags::ANY);
        let derived = model.interface("Derived", &[]);
        model.add_base(derived, any);

        let (_, registered) = translate(&model, derived);
        assert!(registered[0].base_interfaces.is_empty());
        assert!(logs_contain("Base type is not a class or interface, skipping."));
    }
}
