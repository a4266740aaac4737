//! Declaration-file IR.
//!
//! Mirrors only what ambient declarations need:
//! - TsType: type expressions (primitives, literals, unions, objects, functions)
//! - TsMember: interface members (properties, methods, index signatures)
//! - TsInterface: a top-level `interface` declaration

/// TypeScript type expression
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    /// Keyword types: string, number, boolean, null, undefined, void, any, unknown, object
    Primitive(TsPrimitive),
    /// Literal type: "foo", 42
    Literal(TsLiteral),
    /// Array type: T[]
    Array(Box<TsType>),
    /// Union type: A | B | C
    Union(Vec<TsType>),
    /// Intersection type: A & B & C
    Intersection(Vec<TsType>),
    /// Inline object type, emitted one member per line
    Object(Vec<TsProp>),
    /// Function type: (a: A, b?: B) => R
    Function {
        /// Parameters in order.
        params: Vec<TsParam>,
        /// Type after the arrow.
        return_type: Box<TsType>,
        /// `(a: A)=>R`, without spaces around the arrow
        compact: bool,
    },
    /// Named type reference, emitted verbatim
    Ref(String),
}

/// TypeScript keyword types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// `void`
    Void,
    /// `any`
    Any,
    /// `unknown`
    Unknown,
    /// `object`
    Object,
}

/// TypeScript literal values
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    /// Quoted on emission.
    String(String),
    /// Emitted without a trailing `.0`.
    Number(f64),
}

/// Object or interface property
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    /// Property name, quoted on emission when it is not an identifier.
    pub name: String,
    /// Property type.
    pub ty: TsType,
    /// Emits `name?:`.
    pub optional: bool,
}

/// Function or method parameter
#[derive(Debug, Clone, PartialEq)]
pub struct TsParam {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub ty: TsType,
    /// Emits `name?:`.
    pub optional: bool,
    /// Emits `...name:`.
    pub rest: bool,
}

impl TsParam {
    /// Plain required parameter.
    pub fn required(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            rest: false,
        }
    }

    /// `name?: ty`
    pub fn optional(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            optional: true,
            ..Self::required(name, ty)
        }
    }

    /// `...name: ty`
    pub fn rest(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            rest: true,
            ..Self::required(name, ty)
        }
    }
}

/// Method member: `name(params): ret;`
#[derive(Debug, Clone, PartialEq)]
pub struct TsMethod {
    /// Method name.
    pub name: String,
    /// Parameters in order.
    pub params: Vec<TsParam>,
    /// Declared return type.
    pub return_type: TsType,
    /// JSDoc lines, emitted as a `/** ... */` block above the method
    pub doc: Vec<String>,
}

/// Interface member
#[derive(Debug, Clone, PartialEq)]
pub enum TsMember {
    /// `name: T;`
    Property(TsProp),
    /// `name(params): R;`
    Method(TsMethod),
    /// `[key: K]: V;`
    IndexSignature {
        /// Name of the key binding.
        key: String,
        /// Type of the key, `string` or `number`.
        key_type: TsType,
        /// Type of every value.
        value: TsType,
    },
}

/// `interface Name extends A, B { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct TsInterface {
    /// Interface name.
    pub name: String,
    /// Base interface names.
    pub extends: Vec<String>,
    /// Members in emission order.
    pub members: Vec<TsMember>,
}
