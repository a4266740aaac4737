//! Declaration emission via the Emit trait.
//!
//! Layout follows the usual declaration-file conventions: four spaces per
//! level, one member per line, inline object types expanded over several
//! lines, JSDoc blocks above documented members.

use super::types::{TsInterface, TsLiteral, TsMember, TsMethod, TsParam, TsPrimitive, TsProp, TsType};
use super::utils::{INDENT, quote, quote_if_needed};

/// Trait for emitting declaration text from IR nodes.
pub trait Emit {
    /// Convert the node to its TypeScript string representation.
    fn emit(&self) -> String;
}

// =============================================================================
// Primitive Types
// =============================================================================

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string",
            TsPrimitive::Number => "number",
            TsPrimitive::Boolean => "boolean",
            TsPrimitive::Null => "null",
            TsPrimitive::Undefined => "undefined",
            TsPrimitive::Void => "void",
            TsPrimitive::Any => "any",
            TsPrimitive::Unknown => "unknown",
            TsPrimitive::Object => "object",
        }
        .to_string()
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => quote(s),
            TsLiteral::Number(n) => n.to_string(),
        }
    }
}

// =============================================================================
// Types
// =============================================================================

impl Emit for TsType {
    fn emit(&self) -> String {
        self.emit_indented(0)
    }
}

impl TsType {
    /// Emit a type that appears on a line indented by `indent` levels.
    ///
    /// Only object types span lines; their closing brace lines up with the
    /// member that owns them.
    pub fn emit_indented(&self, indent: usize) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Literal(lit) => lit.emit(),
            TsType::Array(inner) => {
                let inner_str = inner.emit_indented(indent);
                if matches!(
                    **inner,
                    TsType::Union(_) | TsType::Intersection(_) | TsType::Function { .. }
                ) {
                    format!("({inner_str})[]")
                } else {
                    format!("{inner_str}[]")
                }
            }
            TsType::Union(types) => types
                .iter()
                .map(|t| t.emit_indented(indent))
                .collect::<Vec<_>>()
                .join(" | "),
            TsType::Intersection(types) => types
                .iter()
                .map(|t| {
                    let s = t.emit_indented(indent);
                    if matches!(t, TsType::Union(_)) {
                        format!("({s})")
                    } else {
                        s
                    }
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Object(props) => {
                if props.is_empty() {
                    return "{}".to_string();
                }
                let mut output = String::from("{\n");
                for prop in props {
                    output.push_str(&prop.emit_indented(indent + 1));
                }
                output.push_str(&INDENT.repeat(indent));
                output.push('}');
                output
            }
            TsType::Function {
                params,
                return_type,
                compact,
            } => {
                let params_str = params
                    .iter()
                    .map(|p| p.emit_indented(indent))
                    .collect::<Vec<_>>()
                    .join(", ");
                let arrow = if *compact { "=>" } else { " => " };
                format!("({params_str}){arrow}{}", return_type.emit_indented(indent))
            }
            TsType::Ref(name) => name.clone(),
        }
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        self.emit_indented(0)
    }
}

impl TsProp {
    /// Emit as a full member line (`name: type;\n`) at `indent` levels.
    pub fn emit_indented(&self, indent: usize) -> String {
        let opt = if self.optional { "?" } else { "" };
        format!(
            "{}{}{}: {};\n",
            INDENT.repeat(indent),
            quote_if_needed(&self.name),
            opt,
            self.ty.emit_indented(indent)
        )
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        self.emit_indented(0)
    }
}

impl TsParam {
    fn emit_indented(&self, indent: usize) -> String {
        let rest = if self.rest { "..." } else { "" };
        let opt = if self.optional { "?" } else { "" };
        format!("{rest}{}{opt}: {}", self.name, self.ty.emit_indented(indent))
    }
}

// =============================================================================
// Members
// =============================================================================

/// JSDoc block, one ` * ` line per doc line.
fn emit_doc(doc: &[String], indent: usize) -> String {
    if doc.is_empty() {
        return String::new();
    }
    let prefix = INDENT.repeat(indent);
    let mut output = format!("{prefix}/**\n");
    for line in doc {
        output.push_str(&format!("{prefix} * {line}\n"));
    }
    output.push_str(&format!("{prefix} */\n"));
    output
}

impl TsMethod {
    fn emit_indented(&self, indent: usize) -> String {
        let params_str = self
            .params
            .iter()
            .map(|p| p.emit_indented(indent))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{}{}{}({}): {};\n",
            emit_doc(&self.doc, indent),
            INDENT.repeat(indent),
            self.name,
            params_str,
            self.return_type.emit_indented(indent)
        )
    }
}

impl TsMember {
    /// Emit one member line (plus its JSDoc) at `indent` levels.
    pub fn emit_indented(&self, indent: usize) -> String {
        match self {
            TsMember::Property(prop) => prop.emit_indented(indent),
            TsMember::Method(method) => method.emit_indented(indent),
            TsMember::IndexSignature {
                key,
                key_type,
                value,
            } => format!(
                "{}[{}: {}]: {};\n",
                INDENT.repeat(indent),
                key,
                key_type.emit_indented(indent),
                value.emit_indented(indent)
            ),
        }
    }
}

// =============================================================================
// Declarations
// =============================================================================

impl Emit for TsInterface {
    fn emit(&self) -> String {
        let mut output = format!("interface {}", self.name);
        if !self.extends.is_empty() {
            output.push_str(" extends ");
            output.push_str(&self.extends.join(", "));
        }
        output.push_str(" {\n");
        for member in &self.members {
            output.push_str(&member.emit_indented(1));
        }
        output.push_str("}\n");
        output
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn prop(name: &str, ty: TsType) -> TsProp {
        TsProp {
            name: name.into(),
            ty,
            optional: false,
        }
    }

    #[test]
    fn test_emit_primitive() {
        assert_eq!(TsPrimitive::String.emit(), "string");
        assert_eq!(TsPrimitive::Undefined.emit(), "undefined");
        assert_eq!(TsPrimitive::Void.emit(), "void");
        assert_eq!(TsPrimitive::Any.emit(), "any");
        assert_eq!(TsPrimitive::Object.emit(), "object");
    }

    #[test]
    fn test_emit_literal() {
        assert_eq!(TsLiteral::String("on".into()).emit(), "\"on\"");
        assert_eq!(TsLiteral::Number(42.0).emit(), "42");
        assert_eq!(TsLiteral::Number(1.5).emit(), "1.5");
        assert_eq!(TsLiteral::Number(-3.0).emit(), "-3");
    }

    #[test]
    fn test_emit_union_and_intersection() {
        let union = TsType::Union(vec![
            TsType::Primitive(TsPrimitive::String),
            TsType::Primitive(TsPrimitive::Null),
        ]);
        assert_eq!(union.emit(), "string | null");

        let inter = TsType::Intersection(vec![union, TsType::Ref("A".into())]);
        assert_eq!(inter.emit(), "(string | null) & A");
    }

    fn any_function(compact: bool) -> TsType {
        TsType::Function {
            params: vec![TsParam::rest(
                "args",
                TsType::Array(Box::new(TsType::Primitive(TsPrimitive::Any))),
            )],
            return_type: Box::new(TsType::Primitive(TsPrimitive::Any)),
            compact,
        }
    }

    #[test]
    fn test_emit_array_rest_param() {
        let param = TsParam::rest(
            "args",
            TsType::Array(Box::new(TsType::Primitive(TsPrimitive::Any))),
        );
        assert_eq!(param.emit(), "...args: any[]");

        let callbacks = TsType::Array(Box::new(any_function(false)));
        assert_eq!(callbacks.emit(), "((...args: any[]) => any)[]");
    }

    #[test]
    fn test_emit_compact_function_type() {
        assert_eq!(any_function(true).emit(), "(...args: any[])=>any");
        assert_eq!(any_function(false).emit(), "(...args: any[]) => any");
    }

    #[test]
    fn test_emit_function_type() {
        let ty = TsType::Function {
            params: vec![
                TsParam::required("error", TsType::Ref("Error".into())),
                TsParam::optional("object", TsType::Primitive(TsPrimitive::Any)),
            ],
            return_type: Box::new(TsType::Primitive(TsPrimitive::Void)),
            compact: false,
        };
        assert_eq!(ty.emit(), "(error: Error, object?: any) => void");
    }

    #[test]
    fn test_emit_nested_object_type() {
        let ty = TsType::Object(vec![
            prop("attr1", TsType::Primitive(TsPrimitive::String)),
            prop(
                "attr3",
                TsType::Object(vec![prop("value", TsType::Primitive(TsPrimitive::Boolean))]),
            ),
        ]);
        let expected = "{\n    attr1: string;\n    attr3: {\n        value: boolean;\n    };\n}";
        assert_eq!(ty.emit(), expected);
        assert_eq!(TsType::Object(vec![]).emit(), "{}");
    }

    #[test]
    fn test_emit_quoted_property() {
        let p = TsProp {
            name: "content-type".into(),
            ty: TsType::Primitive(TsPrimitive::String),
            optional: true,
        };
        assert_eq!(p.emit(), "\"content-type\"?: string;\n");
    }

    #[test]
    fn test_emit_interface() {
        let iface = TsInterface {
            name: "IParams2".into(),
            extends: vec!["IParams1".into(), "Base".into()],
            members: vec![
                TsMember::IndexSignature {
                    key: "key".into(),
                    key_type: TsType::Primitive(TsPrimitive::String),
                    value: any_function(true),
                },
                TsMember::Property(prop("attr4", TsType::Primitive(TsPrimitive::String))),
                TsMember::Method(TsMethod {
                    name: "run".into(),
                    params: vec![TsParam::required(
                        "params",
                        TsType::Ref("IParams1".into()),
                    )],
                    return_type: TsType::Primitive(TsPrimitive::Void),
                    doc: vec!["Runs it.".into(), "@param params input".into()],
                }),
            ],
        };
        let expected = "interface IParams2 extends IParams1, Base {\n\
                        \x20   [key: string]: (...args: any[])=>any;\n\
                        \x20   attr4: string;\n\
                        \x20   /**\n\
                        \x20    * Runs it.\n\
                        \x20    * @param params input\n\
                        \x20    */\n\
                        \x20   run(params: IParams1): void;\n\
                        }\n";
        assert_eq!(iface.emit(), expected);
    }

    #[test]
    fn test_emit_method_returning_object() {
        let method = TsMember::Method(TsMethod {
            name: "objectReturnFunc".into(),
            params: vec![],
            return_type: TsType::Object(vec![prop("a", TsType::Primitive(TsPrimitive::Number))]),
            doc: vec![],
        });
        assert_eq!(
            method.emit_indented(1),
            "    objectReturnFunc(): {\n        a: number;\n    };\n"
        );
    }
}
