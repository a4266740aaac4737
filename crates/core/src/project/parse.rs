use std::path::{Path, PathBuf};

use swc_core::common::sync::Lrc;
use swc_core::common::{BytePos, FileName, SourceMap, Span};
use swc_core::ecma::ast::{EsVersion, Module};
use swc_core::ecma::parser::{Syntax, TsSyntax, parse_file_as_module};
use tracing::warn;

use crate::error::{Error, Result};

/// A parsed source file.
pub(crate) struct SourceUnit {
    pub(crate) path: PathBuf,
    pub(crate) text: SourceText,
    pub(crate) module: Module,
}

/// Source text plus the offset of its first byte in the source map.
#[derive(Debug, Clone)]
pub(crate) struct SourceText {
    text: String,
    start: BytePos,
}

impl SourceText {
    /// Text covered by `span`, empty if the span lies outside this file.
    pub(crate) fn snippet(&self, span: Span) -> &str {
        let lo = span.lo.0.saturating_sub(self.start.0) as usize;
        let hi = span.hi.0.saturating_sub(self.start.0) as usize;
        self.text.get(lo..hi).unwrap_or_default()
    }
}

fn syntax_for(path: &Path) -> Syntax {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Syntax::Typescript(TsSyntax {
        tsx: name.ends_with(".tsx"),
        dts: name.ends_with(".d.ts"),
        ..Default::default()
    })
}

/// Parse `text` as a TypeScript module registered under `path`.
pub(crate) fn parse(cm: &Lrc<SourceMap>, path: &Path, text: String) -> Result<SourceUnit> {
    let fm = cm.new_source_file(FileName::Real(path.to_path_buf()).into(), text.clone());

    let mut recovered = Vec::new();
    let module = parse_file_as_module(&fm, syntax_for(path), EsVersion::EsNext, None, &mut recovered)
        .map_err(|err| Error::Parse {
            path: path.to_path_buf(),
            message: err.kind().msg().into_owned(),
        })?;

    for err in &recovered {
        warn!(
            file = %path.display(),
            error = %err.kind().msg(),
            "Recovered from a syntax error."
        );
    }

    Ok(SourceUnit {
        path: path.to_path_buf(),
        text: SourceText {
            text,
            start: fm.start_pos,
        },
        module,
    })
}
