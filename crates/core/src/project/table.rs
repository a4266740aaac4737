//! Arena of types, symbols and signatures.

use crate::model::{ObjectFlags, TypeFlags};

/// Semantic type handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

/// Symbol handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub(crate) u32);

/// Call signature handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureId(pub(crate) u32);

#[derive(Debug, Clone)]
pub(crate) enum TypeKind {
    Intrinsic(TypeFlags),
    /// `true | false`
    Boolean,
    /// `true` or `false`; the two are told apart by id.
    BooleanLiteral,
    StringLiteral(String),
    NumberLiteral(f64),
    Union(Vec<TypeId>),
    Intersection(Vec<TypeId>),
    Object(ObjectType),
    TypeParameter(String),
    Enum(String),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ObjectType {
    pub(crate) flags: ObjectFlags,
    pub(crate) name: Option<String>,
    pub(crate) members: Vec<SymbolId>,
    pub(crate) bases: Vec<TypeId>,
    pub(crate) call_signatures: Vec<SignatureId>,
}

#[derive(Debug, Clone)]
pub(crate) struct SymbolData {
    pub(crate) name: String,
    /// `None` for symbols without a value declaration (index signatures).
    pub(crate) ty: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub(crate) struct SignatureData {
    pub(crate) parameters: Vec<SymbolId>,
    pub(crate) return_type: TypeId,
}

/// Well-known types, allocated first by [`TypeTable::new`].
pub(crate) mod intrinsic {
    use super::TypeId;

    pub(crate) const ANY: TypeId = TypeId(0);
    pub(crate) const UNKNOWN: TypeId = TypeId(1);
    pub(crate) const STRING: TypeId = TypeId(2);
    pub(crate) const NUMBER: TypeId = TypeId(3);
    pub(crate) const BOOLEAN: TypeId = TypeId(4);
    pub(crate) const TRUE: TypeId = TypeId(5);
    pub(crate) const FALSE: TypeId = TypeId(6);
    pub(crate) const VOID: TypeId = TypeId(7);
    pub(crate) const UNDEFINED: TypeId = TypeId(8);
    pub(crate) const NULL: TypeId = TypeId(9);
    pub(crate) const NEVER: TypeId = TypeId(10);
    pub(crate) const OBJECT: TypeId = TypeId(11);
    pub(crate) const BIG_INT: TypeId = TypeId(12);
    pub(crate) const SYMBOL: TypeId = TypeId(13);
    /// Result of an unresolved name; behaves like `any`.
    pub(crate) const ERROR: TypeId = TypeId(14);
}

#[derive(Debug)]
pub(crate) struct TypeTable {
    types: Vec<TypeKind>,
    symbols: Vec<SymbolData>,
    signatures: Vec<SignatureData>,
}

impl TypeTable {
    pub(crate) fn new() -> Self {
        let types = vec![
            TypeKind::Intrinsic(TypeFlags::ANY),
            TypeKind::Intrinsic(TypeFlags::UNKNOWN),
            TypeKind::Intrinsic(TypeFlags::STRING),
            TypeKind::Intrinsic(TypeFlags::NUMBER),
            TypeKind::Boolean,
            TypeKind::BooleanLiteral,
            TypeKind::BooleanLiteral,
            TypeKind::Intrinsic(TypeFlags::VOID),
            TypeKind::Intrinsic(TypeFlags::UNDEFINED),
            TypeKind::Intrinsic(TypeFlags::NULL),
            TypeKind::Intrinsic(TypeFlags::NEVER),
            TypeKind::Intrinsic(TypeFlags::NON_PRIMITIVE),
            TypeKind::Intrinsic(TypeFlags::BIG_INT),
            TypeKind::Intrinsic(TypeFlags::ES_SYMBOL),
            TypeKind::Intrinsic(TypeFlags::ANY),
        ];
        Self {
            types,
            symbols: Vec::new(),
            signatures: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, kind: TypeKind) -> TypeId {
        self.types.push(kind);
        TypeId(self.types.len() as u32 - 1)
    }

    /// Overwrite a slot reserved with [`TypeTable::alloc`].
    pub(crate) fn set(&mut self, id: TypeId, kind: TypeKind) {
        self.types[id.0 as usize] = kind;
    }

    pub(crate) fn kind(&self, id: TypeId) -> &TypeKind {
        &self.types[id.0 as usize]
    }

    pub(crate) fn object(&self, id: TypeId) -> Option<&ObjectType> {
        match self.kind(id) {
            TypeKind::Object(object) => Some(object),
            _ => None,
        }
    }

    pub(crate) fn object_mut(&mut self, id: TypeId) -> Option<&mut ObjectType> {
        match &mut self.types[id.0 as usize] {
            TypeKind::Object(object) => Some(object),
            _ => None,
        }
    }

    pub(crate) fn add_symbol(&mut self, name: impl Into<String>, ty: Option<TypeId>) -> SymbolId {
        self.symbols.push(SymbolData {
            name: name.into(),
            ty,
        });
        SymbolId(self.symbols.len() as u32 - 1)
    }

    pub(crate) fn symbol(&self, id: SymbolId) -> &SymbolData {
        &self.symbols[id.0 as usize]
    }

    pub(crate) fn add_signature(&mut self, parameters: Vec<SymbolId>, return_type: TypeId) -> SignatureId {
        self.signatures.push(SignatureData {
            parameters,
            return_type,
        });
        SignatureId(self.signatures.len() as u32 - 1)
    }

    pub(crate) fn signature(&self, id: SignatureId) -> &SignatureData {
        &self.signatures[id.0 as usize]
    }

    /// Anonymous object type with a single call signature.
    pub(crate) fn function_type(&mut self, parameters: Vec<SymbolId>, return_type: TypeId) -> TypeId {
        let signature = self.add_signature(parameters, return_type);
        self.alloc(TypeKind::Object(ObjectType {
            flags: ObjectFlags::ANONYMOUS,
            call_signatures: vec![signature],
            ..ObjectType::default()
        }))
    }

    /// Generic instantiation or built-in container, reported as a reference.
    pub(crate) fn reference(&mut self, name: &str) -> TypeId {
        self.alloc(TypeKind::Object(ObjectType {
            flags: ObjectFlags::REFERENCE,
            name: Some(name.to_string()),
            ..ObjectType::default()
        }))
    }

    /// Union of `types`, flattening nested unions and dropping duplicates.
    ///
    /// `boolean` stays a single member. A single remaining member is returned
    /// as is; an empty union is `never`.
    pub(crate) fn union(&mut self, types: impl IntoIterator<Item = TypeId>) -> TypeId {
        let mut members: Vec<TypeId> = Vec::new();
        let push = |members: &mut Vec<TypeId>, id: TypeId| {
            if !members.contains(&id) {
                members.push(id);
            }
        };
        for id in types {
            match self.kind(id) {
                TypeKind::Union(inner) => {
                    for inner_id in inner.clone() {
                        push(&mut members, inner_id);
                    }
                }
                _ => push(&mut members, id),
            }
        }

        if members.contains(&intrinsic::ANY) {
            return intrinsic::ANY;
        }
        if members.contains(&intrinsic::BOOLEAN) {
            members.retain(|m| *m != intrinsic::TRUE && *m != intrinsic::FALSE);
        } else if members.contains(&intrinsic::TRUE) && members.contains(&intrinsic::FALSE) {
            let at = members
                .iter()
                .position(|m| *m == intrinsic::TRUE || *m == intrinsic::FALSE)
                .unwrap_or(0);
            members.retain(|m| *m != intrinsic::TRUE && *m != intrinsic::FALSE);
            members.insert(at.min(members.len()), intrinsic::BOOLEAN);
        }
        members.retain(|m| *m != intrinsic::NEVER);

        match members.len() {
            0 => intrinsic::NEVER,
            1 => members[0],
            _ => self.alloc(TypeKind::Union(members)),
        }
    }

    /// Remove `null` and `undefined` members.
    pub(crate) fn non_nullable(&mut self, id: TypeId) -> TypeId {
        match self.kind(id) {
            TypeKind::Union(members) => {
                let kept: Vec<TypeId> = members
                    .iter()
                    .copied()
                    .filter(|m| *m != intrinsic::NULL && *m != intrinsic::UNDEFINED)
                    .collect();
                if kept.len() == members.len() {
                    id
                } else {
                    self.union(kept)
                }
            }
            _ => id,
        }
    }

    pub(crate) fn flags(&self, id: TypeId) -> TypeFlags {
        match self.kind(id) {
            TypeKind::Intrinsic(flags) => *flags,
            TypeKind::Boolean => TypeFlags::BOOLEAN | TypeFlags::UNION,
            TypeKind::BooleanLiteral => TypeFlags::BOOLEAN_LITERAL,
            TypeKind::StringLiteral(_) => TypeFlags::STRING_LITERAL,
            TypeKind::NumberLiteral(_) => TypeFlags::NUMBER_LITERAL,
            TypeKind::Union(_) => TypeFlags::UNION,
            TypeKind::Intersection(_) => TypeFlags::INTERSECTION,
            TypeKind::Object(_) => TypeFlags::OBJECT,
            TypeKind::TypeParameter(_) => TypeFlags::TYPE_PARAMETER,
            TypeKind::Enum(_) => TypeFlags::ENUM,
        }
    }

    /// Literal types -> their primitive; `null`/`undefined` -> `any` when
    /// null checks are off.
    pub(crate) fn widen(&mut self, id: TypeId, strict_null_checks: bool) -> TypeId {
        match self.kind(id) {
            TypeKind::StringLiteral(_) => intrinsic::STRING,
            TypeKind::NumberLiteral(_) => intrinsic::NUMBER,
            TypeKind::BooleanLiteral => intrinsic::BOOLEAN,
            TypeKind::Intrinsic(flags)
                if !strict_null_checks && flags.intersects(TypeFlags::NULL | TypeFlags::UNDEFINED) =>
            {
                intrinsic::ANY
            }
            TypeKind::Union(members) => {
                let members = members.clone();
                let widened: Vec<TypeId> = members
                    .into_iter()
                    .map(|m| self.widen(m, strict_null_checks))
                    .collect();
                self.union(widened)
            }
            _ => id,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::intrinsic::{ANY, BOOLEAN, FALSE, NULL, NUMBER, STRING, TRUE, UNDEFINED};
    use super::*;

    #[test]
    fn test_union_flattens_and_dedups() {
        let mut table = TypeTable::new();
        let inner = table.union([STRING, NUMBER]);
        let outer = table.union([inner, STRING, NULL]);
        match table.kind(outer) {
            TypeKind::Union(members) => assert_eq!(members, &[STRING, NUMBER, NULL]),
            other => panic!("expected union, got {other:?}"),
        }
    }

    #[test]
    fn test_union_collapses_boolean_literals() {
        let mut table = TypeTable::new();
        let ty = table.union([STRING, TRUE, FALSE]);
        match table.kind(ty) {
            TypeKind::Union(members) => assert_eq!(members, &[STRING, BOOLEAN]),
            other => panic!("expected union, got {other:?}"),
        }
        assert_eq!(table.union([TRUE, FALSE]), BOOLEAN);
    }

    #[test]
    fn test_union_with_any_is_any() {
        let mut table = TypeTable::new();
        assert_eq!(table.union([STRING, ANY]), ANY);
        assert_eq!(table.union([STRING]), STRING);
    }

    #[test]
    fn test_widen_literals() {
        let mut table = TypeTable::new();
        let lit = table.alloc(TypeKind::StringLiteral("a".into()));
        assert_eq!(table.widen(lit, true), STRING);
        assert_eq!(table.widen(NULL, true), NULL);
        assert_eq!(table.widen(NULL, false), ANY);
        assert_eq!(table.widen(UNDEFINED, false), ANY);
    }

    #[test]
    fn test_non_nullable() {
        let mut table = TypeTable::new();
        let ty = table.union([STRING, NULL, UNDEFINED]);
        assert_eq!(table.non_nullable(ty), STRING);
    }

    #[test]
    fn test_boolean_flags() {
        let table = TypeTable::new();
        assert!(table.flags(BOOLEAN).contains(TypeFlags::BOOLEAN | TypeFlags::UNION));
        assert_eq!(table.flags(TRUE), TypeFlags::BOOLEAN_LITERAL);
    }
}
