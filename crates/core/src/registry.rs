//! Name-keyed, insertion-ordered store of interface declarations.

use indexmap::IndexMap;

use crate::types::InterfaceDeclaration;

/// Write-once interface store.
///
/// A name is reserved before its members are translated so that recursive
/// references resolve to the name instead of recursing forever. Reserved
/// slots keep their position; the completed declaration fills them later.
#[derive(Debug, Default)]
pub struct InterfaceRegistry {
    entries: IndexMap<String, Option<InterfaceDeclaration>>,
}

impl InterfaceRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` is reserved or registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Reserve `name` for a declaration under construction.
    ///
    /// Returns `false` if the name is already taken.
    pub fn reserve(&mut self, name: &str) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        self.entries.insert(name.to_string(), None);
        true
    }

    /// Register a completed declaration.
    ///
    /// Fills a reserved slot or appends a new entry. A declaration whose
    /// name is already registered is discarded and `false` is returned.
    pub fn register(&mut self, declaration: InterfaceDeclaration) -> bool {
        match self.entries.get_mut(&declaration.name) {
            Some(slot) if slot.is_some() => false,
            Some(slot) => {
                *slot = Some(declaration);
                true
            }
            None => {
                self.entries
                    .insert(declaration.name.clone(), Some(declaration));
                true
            }
        }
    }

    /// Completed declaration named `name`; reserved slots yield `None`.
    pub fn get(&self, name: &str) -> Option<&InterfaceDeclaration> {
        self.entries.get(name).and_then(Option::as_ref)
    }

    /// Completed declarations in registration order.
    pub fn declarations(&self) -> impl Iterator<Item = &InterfaceDeclaration> {
        self.entries.values().flatten()
    }

    /// Number of names taken, reserved ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is reserved or registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::types::{PortableType, Property};

    fn decl(name: &str, prop: &str) -> InterfaceDeclaration {
        InterfaceDeclaration {
            name: name.into(),
            properties: vec![Property {
                name: prop.into(),
                ty: PortableType::String,
            }],
            base_interfaces: vec![],
        }
    }

    #[test]
    fn test_first_registration_wins() {
        let mut registry = InterfaceRegistry::new();
        assert!(registry.register(decl("User", "first")));
        assert!(!registry.register(decl("User", "second")));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("User").unwrap().properties[0].name, "first");
    }

    #[test]
    fn test_reserved_slot_keeps_position() {
        let mut registry = InterfaceRegistry::new();
        assert!(registry.reserve("Outer"));
        assert!(registry.contains("Outer"));
        assert!(registry.get("Outer").is_none());

        registry.register(decl("Inner", "a"));
        registry.register(decl("Outer", "b"));

        let names: Vec<_> = registry.declarations().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["Outer", "Inner"]);
    }

    #[test]
    fn test_reserve_twice_fails() {
        let mut registry = InterfaceRegistry::new();
        assert!(registry.reserve("A"));
        assert!(!registry.reserve("A"));
    }

    #[test]
    fn test_unfinished_reservation_is_not_listed() {
        let mut registry = InterfaceRegistry::new();
        registry.reserve("Pending");
        assert_eq!(registry.declarations().count(), 0);
        assert!(!registry.is_empty());
    }
}
