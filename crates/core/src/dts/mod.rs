//! Declaration-file IR and its emission.
//!
//! - `types`: TsType, TsMember, TsInterface
//! - `emit`: IR -> text (via the Emit trait)
//! - `utils`: quoting and indentation helpers

mod emit;
mod types;
pub mod utils;

pub use emit::Emit;
pub use types::{TsInterface, TsLiteral, TsMember, TsMethod, TsParam, TsPrimitive, TsProp, TsType};
