//! Contract between the generator and whatever understands TypeScript.
//!
//! The generator never touches syntax trees or type-checker internals
//! directly. It walks statements, asks for the semantic type behind a node
//! and interrogates that type through [`SemanticModel`]. The bundled
//! implementation is [`crate::project::Project`]; tests may supply their own.

use std::fmt::Debug;
use std::hash::Hash;
use std::path::Path;

bitflags::bitflags! {
    /// Classification of a semantic type, named after the checker vocabulary.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u32 {
        /// `any`
        const ANY = 1;
        /// `unknown`
        const UNKNOWN = 1 << 1;
        /// `string`
        const STRING = 1 << 2;
        /// `number`
        const NUMBER = 1 << 3;
        /// `boolean`, itself the union `true | false`
        const BOOLEAN = 1 << 4;
        /// An enum type.
        const ENUM = 1 << 5;
        /// `bigint`
        const BIG_INT = 1 << 6;
        /// `"foo"`
        const STRING_LITERAL = 1 << 7;
        /// `42`
        const NUMBER_LITERAL = 1 << 8;
        /// `true` or `false`
        const BOOLEAN_LITERAL = 1 << 9;
        /// One enum member.
        const ENUM_LITERAL = 1 << 10;
        /// `42n`
        const BIG_INT_LITERAL = 1 << 11;
        /// `symbol`
        const ES_SYMBOL = 1 << 12;
        /// `void`
        const VOID = 1 << 13;
        /// `undefined`
        const UNDEFINED = 1 << 14;
        /// `null`
        const NULL = 1 << 15;
        /// `never`
        const NEVER = 1 << 16;
        /// A generic type parameter.
        const TYPE_PARAMETER = 1 << 17;
        /// Any object type; see [`ObjectFlags`].
        const OBJECT = 1 << 18;
        /// `A | B`
        const UNION = 1 << 19;
        /// `A & B`
        const INTERSECTION = 1 << 20;
        /// `object`
        const NON_PRIMITIVE = 1 << 21;
        /// `` `a${string}` ``
        const TEMPLATE_LITERAL = 1 << 22;
    }
}

bitflags::bitflags! {
    /// Refinement of [`TypeFlags::OBJECT`] types.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u32 {
        /// Instance type of a class.
        const CLASS = 1;
        /// Declared interface.
        const INTERFACE = 1 << 1;
        /// Instantiation of a generic type.
        const REFERENCE = 1 << 2;
        /// `[A, B]`
        const TUPLE = 1 << 3;
        /// Function types and type literals.
        const ANONYMOUS = 1 << 4;
        /// `{ [K in T]: U }`
        const MAPPED = 1 << 5;
        /// Type of an object literal expression.
        const OBJECT_LITERAL = 1 << 6;
    }
}

impl Default for ObjectFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Render a flag set as `A | B` using the constant names.
pub fn flag_names<F: bitflags::Flags>(flags: &F) -> String {
    let names: Vec<&str> = flags.iter_names().map(|(name, _)| name).collect();
    if names.is_empty() {
        "NONE".to_string()
    } else {
        names.join(" | ")
    }
}

/// Value carried by a literal type.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// `"foo"`
    String(String),
    /// `42`
    Number(f64),
}

/// `export` / `default` keywords on a declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Carries the `export` keyword.
    pub export: bool,
    /// Carries the `default` keyword.
    pub default: bool,
}

impl Modifiers {
    /// Exported by name: `export` without `default`.
    pub fn is_named_export(self) -> bool {
        self.export && !self.default
    }
}

/// One declarator of a variable statement.
#[derive(Debug, Clone)]
pub struct VariableDeclaration<N> {
    /// Declared identifier.
    pub name: String,
    /// Node whose type is the declared variable type, absent when the
    /// declarator has no initializer.
    pub initializer: Option<N>,
}

/// One `name` or `local as name` entry of an `export { ... }` clause.
#[derive(Debug, Clone)]
pub struct ExportSpecifier<N> {
    /// Name seen by importers.
    pub name: String,
    /// Node standing for the referenced local symbol.
    pub local: N,
}

/// The syntactic shapes the endpoint collector cares about.
#[derive(Debug, Clone)]
pub enum Syntax<N> {
    /// `<object>.<property> = <value>` as an expression statement.
    PropertyAssignment {
        /// Identifier on the left of the dot.
        object: String,
        /// Property name being assigned.
        property: String,
        /// Right-hand side expression.
        value: N,
    },
    /// `const a = ..., b = ...;`
    VariableStatement {
        /// Statement modifiers.
        modifiers: Modifiers,
        /// Declarators in source order.
        declarations: Vec<VariableDeclaration<N>>,
    },
    /// `function name(...) {}`; the node's own type is the function type.
    FunctionDeclaration {
        /// Declaration modifiers.
        modifiers: Modifiers,
        /// Declared name, if any.
        name: Option<String>,
    },
    /// `export { a, b as c };`
    NamedExports {
        /// Specifiers in source order.
        specifiers: Vec<ExportSpecifier<N>>,
    },
    /// Anything else.
    Other,
}

/// Read-only view of a type-checked program.
///
/// Handles are small copyable ids owned by the implementation. Every query
/// is total: unknown handles never occur because they only come from the
/// model itself.
pub trait SemanticModel {
    /// Syntax node handle.
    type Node: Copy + Debug;
    /// Semantic type handle; identity is used for recursion detection.
    type Type: Copy + Eq + Hash + Debug;
    /// Symbol handle (properties and parameters).
    type Symbol: Copy + Debug;
    /// Call signature handle.
    type Signature: Copy + Debug;

    /// Top-level statements of `file`, or `None` when the file is not part
    /// of the program.
    fn source_statements(&self, file: &Path) -> Option<Vec<Self::Node>>;
    /// Direct syntactic children of `node` that may themselves be statements.
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;
    /// Shape of `node`.
    fn syntax(&self, node: Self::Node) -> Syntax<Self::Node>;
    /// Source text of `node`.
    fn node_text(&self, node: Self::Node) -> String;

    /// Semantic type at `node`.
    fn type_at(&self, node: Self::Node) -> Self::Type;
    /// Classification flags of `ty`.
    fn type_flags(&self, ty: Self::Type) -> TypeFlags;
    /// Object flags of `ty` (empty for non-object types).
    fn object_flags(&self, ty: Self::Type) -> ObjectFlags;
    /// Declared name of a class, interface or reference type.
    fn type_name(&self, ty: Self::Type) -> Option<&str>;
    /// Members of a union or intersection type.
    fn constituents(&self, ty: Self::Type) -> Vec<Self::Type>;
    /// Value of a literal type.
    fn literal_value(&self, ty: Self::Type) -> Option<LiteralValue>;
    /// Call signatures of `ty`, in declaration order.
    fn call_signatures(&self, ty: Self::Type) -> Vec<Self::Signature>;
    /// Declared base types of a class or interface, in declaration order.
    fn base_types(&self, ty: Self::Type) -> Vec<Self::Type>;
    /// Own member symbols of an object type (inherited members excluded).
    fn members(&self, ty: Self::Type) -> Vec<Self::Symbol>;

    /// Name of `symbol`.
    fn symbol_name(&self, symbol: Self::Symbol) -> &str;
    /// Type of `symbol` at its value declaration, `None` when it has none.
    fn type_of_symbol(&self, symbol: Self::Symbol) -> Option<Self::Type>;

    /// Parameter symbols of `signature`.
    fn signature_parameters(&self, signature: Self::Signature) -> Vec<Self::Symbol>;
    /// Return type of `signature`.
    fn signature_return_type(&self, signature: Self::Signature) -> Self::Type;

    /// Whether `ty` is a class or interface type.
    fn is_class_or_interface(&self, ty: Self::Type) -> bool {
        self.object_flags(ty)
            .intersects(ObjectFlags::CLASS | ObjectFlags::INTERFACE)
    }
}
