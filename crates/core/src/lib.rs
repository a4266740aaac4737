//! Generator for `google.script.d.ts`, the typings of the `google.script.run`
//! client API of an Apps Script project.
//!
//! Server functions become endpoints when they are assigned to a property of
//! `global` or, for selected files, exported by name. Their parameter and
//! return types are translated into portable interfaces and rendered inside
//! `declare namespace google { namespace script { ... } }`.
//!
//! ```no_run
//! use std::path::PathBuf;
//! use dtsgen_core::{CompilerConfig, GenerateOptions, generate};
//!
//! let files = vec![PathBuf::from("src/main.ts")];
//! let config = CompilerConfig::strict();
//! let text = generate(&files, &config, &GenerateOptions::default())?;
//! # Ok::<(), dtsgen_core::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(warnings, unused_must_use, dead_code, missing_debug_implementations)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

use std::path::PathBuf;

use tracing::debug;

pub mod assemble;
mod collect;
pub mod config;
mod context;
pub mod dts;
mod error;
pub mod model;
pub mod project;
pub mod registry;
pub mod render;
#[cfg(test)]
mod testing;
mod translate;
pub mod types;

pub use collect::GLOBAL_OBJECT;
pub use config::{CompilerConfig, CompilerOptions};
pub use context::GenerateOptions;
pub use error::{Error, Result};
pub use model::SemanticModel;
pub use project::Project;

/// File name of the generated declarations.
pub const OUTPUT_FILE_NAME: &str = "google.script.d.ts";

/// Load `files` into a [`Project`] and generate the declaration text.
pub fn generate(files: &[PathBuf], config: &CompilerConfig, options: &GenerateOptions) -> Result<String> {
    let project = Project::load(files, config)?;
    Ok(generate_with_model(&project, files, options))
}

/// Generate the declaration text from an already checked program.
///
/// Files are visited in the given order, so endpoint order follows it.
pub fn generate_with_model<M: SemanticModel>(model: &M, files: &[PathBuf], options: &GenerateOptions) -> String {
    let mut ctx = context::GenerationContext::new(model, options);
    for file in files {
        ctx.collect_file(file);
    }
    debug!(
        endpoints = ctx.methods.len(),
        interfaces = ctx.registry.len(),
        "Collected endpoints."
    );

    let declarations = assemble::assemble(&ctx.methods, &ctx.registry, options.endpoints_only);
    render::render(&declarations, options.endpoints_only)
}
