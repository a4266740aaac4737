//! Declaration IR -> final `google.script.d.ts` text.

use crate::assemble::Declarations;
use crate::dts::Emit;
use crate::dts::utils::{indent, normalize_newlines};

/// Declarations of `google.script` that do not depend on the project:
/// `IUrlLocation`, `run`, `history`, `host` and `url`.
const SCRIPT_MISC: &str = include_str!("assets/script_misc.d.ts");

/// Indentation of everything inside `namespace script`.
const BODY_INDENT: usize = 8;

/// Place the declarations into the `google.script` namespace.
///
/// The auxiliary `google.script` API is appended unless `endpoints_only`.
pub fn render(declarations: &Declarations, endpoints_only: bool) -> String {
    let top = block(&format!("{}\n", declarations.top.emit()));
    let interfaces = declarations
        .interfaces
        .iter()
        .map(|i| block(&format!("{}\n", i.emit())))
        .collect::<Vec<_>>()
        .join("\n");
    let misc = if endpoints_only {
        String::new()
    } else {
        block(SCRIPT_MISC.trim_end())
    };

    normalize_newlines(&format!(
        "declare namespace google {{
    /**
     * Methods available to Google Apps Script
     */
    namespace script {{
{top}
{interfaces}
{misc}
    }}
}}
"
    ))
}

fn block(text: &str) -> String {
    indent(&normalize_newlines(text), BODY_INDENT)
}
