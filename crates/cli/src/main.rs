//! `dts-gen`: writes `google.script.d.ts` for the server sources of an Apps
//! Script project.

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

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use dtsgen_core::{CompilerConfig, GenerateOptions, OUTPUT_FILE_NAME};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod error;
mod sources;

use error::CliError;

#[derive(Parser, Debug)]
#[command(
    name = "dts-gen",
    version,
    about = "Generate google.script.d.ts for the google.script.run endpoints of an Apps Script project"
)]
struct Args {
    #[arg(
        short = 's',
        long = "sourcesDir",
        value_name = "DIR",
        required = true,
        help = "Directory holding server sources; every .ts file below it is read. Repeatable"
    )]
    sources_dir: Vec<PathBuf>,

    #[arg(
        short = 'o',
        long = "outputDir",
        value_name = "DIR",
        help = "Directory that receives google.script.d.ts"
    )]
    output_dir: PathBuf,

    #[arg(
        long = "namedExportsFiles",
        value_name = "GLOB",
        help = "Files whose named function exports are endpoints too. Repeatable"
    )]
    named_exports_files: Vec<String>,

    #[arg(
        long = "endpointsOnly",
        help = "Emit only the endpoint interface instead of the full google.script typings"
    )]
    endpoints_only: bool,

    #[arg(
        long = "nonVoidReturnType",
        help = "Keep endpoint return types instead of declaring them void"
    )]
    non_void_return_type: bool,
}

fn main() {
    init_tracing();
    std::process::exit(run(Args::parse()));
}

fn run(args: Args) -> i32 {
    match run_inner(args) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn run_inner(args: Args) -> Result<(), CliError> {
    let cwd = std::env::current_dir().map_err(CliError::CurrentDir)?;

    let source_dirs: Vec<PathBuf> = args
        .sources_dir
        .iter()
        .map(|dir| sources::absolute(&cwd, dir))
        .collect();
    let root = sources::deepest_shared_root(&source_dirs);
    let config_path = sources::find_config(&root).ok_or_else(|| {
        debug!(root = %root.display(), "No tsconfig.json above the source root.");
        CliError::ConfigNotFound
    })?;
    debug!(config = %config_path.display(), "Using compiler configuration.");
    let config = CompilerConfig::load(&config_path)?;

    let files = sources::collect_sources(&source_dirs)?;
    let named_exports_files =
        sources::match_named_exports(&cwd, &args.named_exports_files, &files)?;

    let options = GenerateOptions {
        named_exports_files,
        endpoints_only: args.endpoints_only,
        non_void_return_type: args.non_void_return_type,
    };
    let text = dtsgen_core::generate(&files, &config, &options)?;

    let output_dir = sources::absolute(&cwd, &args.output_dir);
    fs::create_dir_all(&output_dir).map_err(|source| CliError::Write {
        path: output_dir.clone(),
        source,
    })?;
    let output = output_dir.join(OUTPUT_FILE_NAME);
    fs::write(&output, text).map_err(|source| CliError::Write {
        path: output.clone(),
        source,
    })?;

    info!(path = %output.display(), files = files.len(), "Wrote declarations.");
    Ok(())
}

fn init_tracing() {
    let crate_root = module_path!();

    // DTS_GEN_LOG takes a plain level ("debug", "warn", ...) applied to this
    // tool and the generator, or a full filter spec.
    let filter = match std::env::var("DTS_GEN_LOG") {
        Ok(level) if is_plain_level(&level) => {
            format!("{crate_root}={level},dtsgen_core={level}")
        }
        Ok(spec) => spec,
        Err(_) => format!("{crate_root}=warn,dtsgen_core=warn"),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
