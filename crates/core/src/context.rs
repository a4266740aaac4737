use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::model::SemanticModel;
use crate::registry::InterfaceRegistry;
use crate::types::EndpointMethod;

/// Knobs of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Files whose named exports are endpoints too (matched by exact path).
    pub named_exports_files: BTreeSet<PathBuf>,
    /// Emit only `PublicEndpoints` instead of the full `google.script.run` API.
    pub endpoints_only: bool,
    /// Translate return types instead of rendering every method as `void`.
    pub non_void_return_type: bool,
}

/// State of a single generation run.
///
/// Borrows the model and options, owns everything it produces. Dropped once
/// the document is rendered.
pub(crate) struct GenerationContext<'a, M: SemanticModel> {
    pub(crate) model: &'a M,
    pub(crate) options: &'a GenerateOptions,
    pub(crate) methods: Vec<EndpointMethod>,
    pub(crate) registry: InterfaceRegistry,
    /// Anonymous object types currently being expanded.
    pub(crate) visiting: Vec<M::Type>,
}

impl<'a, M: SemanticModel> GenerationContext<'a, M> {
    pub(crate) fn new(model: &'a M, options: &'a GenerateOptions) -> Self {
        Self {
            model,
            options,
            methods: Vec::new(),
            registry: InterfaceRegistry::new(),
            visiting: Vec::new(),
        }
    }
}
