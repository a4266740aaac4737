//! Portable declaration model produced by translation.
//!
//! These values carry no checker handles and outlive the semantic model:
//! - PortableType: closed set of type shapes the output can express
//! - EndpointMethod / Parameter: one callable server function
//! - InterfaceDeclaration: a named interface reconstructed from a class or interface

/// A type expressible in the generated declaration file.
#[derive(Debug, Clone, PartialEq)]
pub enum PortableType {
    /// `boolean`
    Boolean,
    /// `string`
    String,
    /// `number`
    Number,
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// `any`, also the stand-in for anything untranslatable
    Any,
    /// `unknown`
    Unknown,
    /// `"foo"`
    StringLiteral(String),
    /// `42`
    NumberLiteral(f64),
    /// `A | B`
    Union(Vec<PortableType>),
    /// `A & B`
    Intersection(Vec<PortableType>),
    /// Inline object type: `{ foo: string }`
    ObjectShape(Vec<Property>),
    /// Reference to a registered interface by name
    InterfaceRef(String),
}

/// Named member of an object shape or interface.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name as declared.
    pub name: String,
    /// Declared type of the property.
    pub ty: PortableType,
}

/// Function parameter of an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name, or `argN` for destructured parameters.
    pub name: String,
    /// Declared type of the parameter.
    pub ty: PortableType,
}

/// Return type of an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnType {
    /// Rendered as `void`.
    Void,
    /// Kept return type, only with `non_void_return_type`.
    Type(PortableType),
}

/// A server function callable from the client.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointMethod {
    /// Name the client calls it by.
    pub name: String,
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// What the generated method returns.
    pub return_type: ReturnType,
}

/// Interface reconstructed from a class or interface type.
///
/// Base interfaces are referenced by name; each of them is registered in
/// the same registry.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDeclaration {
    /// Interface name, unique within a registry.
    pub name: String,
    /// Own properties in declaration order.
    pub properties: Vec<Property>,
    /// Names listed after `extends`.
    pub base_interfaces: Vec<String>,
}
