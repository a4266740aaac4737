//! Collected endpoints + registry -> declaration IR.

use crate::dts::{TsInterface, TsLiteral, TsMember, TsMethod, TsParam, TsPrimitive, TsProp, TsType};
use crate::registry::InterfaceRegistry;
use crate::types::{EndpointMethod, InterfaceDeclaration, PortableType, Property, ReturnType};

/// Interface listing the endpoints together with the `google.script.run` builder methods.
pub const RUNNER_INTERFACE: &str = "IRun";
/// Interface listing the endpoints only.
pub const ENDPOINTS_INTERFACE: &str = "PublicEndpoints";

/// Everything placed inside `namespace script`.
#[derive(Debug, Clone, PartialEq)]
pub struct Declarations {
    /// `IRun` or `PublicEndpoints`.
    pub top: TsInterface,
    /// Registered interfaces in registration order.
    pub interfaces: Vec<TsInterface>,
}

/// Build the top-level interface and its sibling declarations.
pub fn assemble(
    methods: &[EndpointMethod],
    registry: &InterfaceRegistry,
    endpoints_only: bool,
) -> Declarations {
    let endpoints = methods.iter().map(|m| TsMember::Method(method(m)));

    let top = if endpoints_only {
        TsInterface {
            name: ENDPOINTS_INTERFACE.to_string(),
            extends: vec![],
            members: std::iter::once(any_endpoint_signature())
                .chain(endpoints)
                .collect(),
        }
    } else {
        TsInterface {
            name: RUNNER_INTERFACE.to_string(),
            extends: vec![],
            members: endpoints.chain(runner_methods()).collect(),
        }
    };

    Declarations {
        top,
        interfaces: registry.declarations().map(interface).collect(),
    }
}

fn method(m: &EndpointMethod) -> TsMethod {
    TsMethod {
        name: m.name.clone(),
        params: m
            .parameters
            .iter()
            .map(|p| TsParam::required(p.name.clone(), ts_type(&p.ty)))
            .collect(),
        return_type: match &m.return_type {
            ReturnType::Void => TsType::Primitive(TsPrimitive::Void),
            ReturnType::Type(ty) => ts_type(ty),
        },
        doc: vec![],
    }
}

fn interface(decl: &InterfaceDeclaration) -> TsInterface {
    TsInterface {
        name: decl.name.clone(),
        extends: decl.base_interfaces.clone(),
        members: decl
            .properties
            .iter()
            .map(|p| TsMember::Property(prop(p)))
            .collect(),
    }
}

fn prop(p: &Property) -> TsProp {
    TsProp {
        name: p.name.clone(),
        ty: ts_type(&p.ty),
        optional: false,
    }
}

/// Map a portable type onto the declaration IR.
pub fn ts_type(ty: &PortableType) -> TsType {
    match ty {
        PortableType::Boolean => TsType::Primitive(TsPrimitive::Boolean),
        PortableType::String => TsType::Primitive(TsPrimitive::String),
        PortableType::Number => TsType::Primitive(TsPrimitive::Number),
        PortableType::Undefined => TsType::Primitive(TsPrimitive::Undefined),
        PortableType::Null => TsType::Primitive(TsPrimitive::Null),
        PortableType::Any => TsType::Primitive(TsPrimitive::Any),
        PortableType::Unknown => TsType::Primitive(TsPrimitive::Unknown),
        PortableType::StringLiteral(s) => TsType::Literal(TsLiteral::String(s.clone())),
        PortableType::NumberLiteral(n) => TsType::Literal(TsLiteral::Number(*n)),
        PortableType::Union(types) => TsType::Union(types.iter().map(ts_type).collect()),
        PortableType::Intersection(types) => {
            TsType::Intersection(types.iter().map(ts_type).collect())
        }
        PortableType::ObjectShape(props) => TsType::Object(props.iter().map(prop).collect()),
        PortableType::InterfaceRef(name) => TsType::Ref(name.clone()),
    }
}

/// `[key: string]: (...args: any[])=>any;`
fn any_endpoint_signature() -> TsMember {
    TsMember::IndexSignature {
        key: "key".to_string(),
        key_type: TsType::Primitive(TsPrimitive::String),
        value: TsType::Function {
            params: vec![TsParam::rest(
                "args",
                TsType::Array(Box::new(TsType::Primitive(TsPrimitive::Any))),
            )],
            return_type: Box::new(TsType::Primitive(TsPrimitive::Any)),
            compact: true,
        },
    }
}

fn doc(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|l| (*l).to_string()).collect()
}

/// `withFailureHandler`, `withSuccessHandler`, `withUserObject`.
fn runner_methods() -> [TsMember; 3] {
    let any = || TsType::Primitive(TsPrimitive::Any);
    let runner = || TsType::Ref(RUNNER_INTERFACE.to_string());

    let failure = TsMethod {
        name: "withFailureHandler".to_string(),
        params: vec![TsParam::required(
            "callback",
            TsType::Function {
                params: vec![
                    TsParam::required("error", TsType::Ref("Error".to_string())),
                    TsParam::optional("object", any()),
                ],
                return_type: Box::new(TsType::Primitive(TsPrimitive::Void)),
                compact: false,
            },
        )],
        return_type: runner(),
        doc: doc(&[
            "Sets a callback function to run if the server-side function throws an exception. Without a failure handler, failures are logged to the JavaScript console. To override this, call withFailureHandler(null) or supply a failure handler that does nothing.",
            "@param callback a client-side callback function to run if the server-side function throws an exception; the Error object is passed to the function as the first argument, and the user object (if any) is passed as a second argument",
        ]),
    };

    let success = TsMethod {
        name: "withSuccessHandler".to_string(),
        params: vec![TsParam::required(
            "callback",
            TsType::Function {
                params: vec![
                    TsParam::required("value", any()),
                    TsParam::optional("object", any()),
                ],
                return_type: Box::new(TsType::Primitive(TsPrimitive::Void)),
                compact: false,
            },
        )],
        return_type: runner(),
        doc: doc(&[
            "Sets a callback function to run if the server-side function returns successfully.",
            "@param callback a client-side callback function to run if the server-side function returns successfully; the server's return value is passed to the function as the first argument, and the user object (if any) is passed as a second argument",
        ]),
    };

    let user_object = TsMethod {
        name: "withUserObject".to_string(),
        params: vec![TsParam::required(
            "object",
            TsType::Primitive(TsPrimitive::Object),
        )],
        return_type: runner(),
        doc: doc(&[
            "Sets an object to pass as a second parameter to the success and failure handlers.",
            "@param {Object} object an object to pass as a second parameter to the success and failure handlers; because user objects are not sent to the server, they are not subject to the restrictions on parameters and return values for server calls. User objects cannot, however, be objects constructed with the new operator",
        ]),
    };

    [
        TsMember::Method(failure),
        TsMember::Method(success),
        TsMember::Method(user_object),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::types::Parameter;

    fn endpoint(name: &str) -> EndpointMethod {
        EndpointMethod {
            name: name.into(),
            parameters: vec![Parameter {
                name: "id".into(),
                ty: PortableType::Number,
            }],
            return_type: ReturnType::Void,
        }
    }

    fn member_names(iface: &TsInterface) -> Vec<String> {
        iface
            .members
            .iter()
            .map(|m| match m {
                TsMember::Method(m) => m.name.clone(),
                TsMember::Property(p) => p.name.clone(),
                TsMember::IndexSignature { key, .. } => format!("[{key}]"),
            })
            .collect()
    }

    #[test]
    fn test_legacy_mode_appends_builder_methods() {
        let decls = assemble(&[endpoint("a"), endpoint("b")], &InterfaceRegistry::new(), false);
        assert_eq!(decls.top.name, "IRun");
        assert_eq!(
            member_names(&decls.top),
            ["a", "b", "withFailureHandler", "withSuccessHandler", "withUserObject"]
        );
    }

    #[test]
    fn test_endpoints_only_mode_starts_with_index_signature() {
        let decls = assemble(&[endpoint("a")], &InterfaceRegistry::new(), true);
        assert_eq!(decls.top.name, "PublicEndpoints");
        assert_eq!(member_names(&decls.top), ["[key]", "a"]);
        assert_eq!(
            decls.top.members[0].emit_indented(0),
            "[key: string]: (...args: any[])=>any;\n"
        );
    }

    #[test]
    fn test_duplicate_endpoints_are_kept() {
        let decls = assemble(&[endpoint("a"), endpoint("a")], &InterfaceRegistry::new(), true);
        assert_eq!(member_names(&decls.top), ["[key]", "a", "a"]);
    }

    #[test]
    fn test_registered_interfaces_become_siblings() {
        let mut registry = InterfaceRegistry::new();
        registry.register(InterfaceDeclaration {
            name: "IParams2".into(),
            properties: vec![Property {
                name: "attr4".into(),
                ty: PortableType::String,
            }],
            base_interfaces: vec!["IParams1".into()],
        });

        let decls = assemble(&[], &registry, true);
        assert_eq!(decls.interfaces.len(), 1);
        assert_eq!(decls.interfaces[0].extends, ["IParams1"]);
    }

    #[test]
    fn test_ts_type_mapping() {
        let ty = PortableType::Union(vec![
            PortableType::StringLiteral("a".into()),
            PortableType::NumberLiteral(1.0),
            PortableType::InterfaceRef("User".into()),
        ]);
        assert_eq!(
            ts_type(&ty),
            TsType::Union(vec![
                TsType::Literal(TsLiteral::String("a".into())),
                TsType::Literal(TsLiteral::Number(1.0)),
                TsType::Ref("User".into()),
            ])
        );
    }
}
