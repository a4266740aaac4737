//! `tsconfig.json` loading.
//!
//! Only the options that change declared types are read. Files may contain
//! comments and trailing commas and may `extends` other configurations.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Compiler options relevant to type translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    /// `strict`, the umbrella for the strict family of checks.
    pub strict: Option<bool>,
    /// `strictNullChecks`; overrides `strict` when set.
    pub strict_null_checks: Option<bool>,
}

impl CompilerOptions {
    /// `strictNullChecks`, defaulting to `strict`.
    pub fn strict_null_checks(&self) -> bool {
        self.strict_null_checks
            .or(self.strict)
            .unwrap_or(false)
    }

    /// Fill unset options from `base`.
    fn inherit(self, base: Self) -> Self {
        Self {
            strict: self.strict.or(base.strict),
            strict_null_checks: self.strict_null_checks.or(base.strict_null_checks),
        }
    }
}

/// A loaded compiler configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerConfig {
    /// File the configuration was read from, if any.
    pub path: Option<PathBuf>,
    /// Options merged along the `extends` chain.
    pub compiler_options: CompilerOptions,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Extends {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    extends: Option<Extends>,
    #[serde(default)]
    compiler_options: CompilerOptions,
}

impl CompilerConfig {
    /// Configuration with `strict` enabled.
    pub fn strict() -> Self {
        Self {
            path: None,
            compiler_options: CompilerOptions {
                strict: Some(true),
                strict_null_checks: None,
            },
        }
    }

    /// Read `path`, following its `extends` chain.
    pub fn load(path: &Path) -> Result<Self> {
        let mut chain = Vec::new();
        let compiler_options = load_options(path, &mut chain)?;
        debug!(
            path = %path.display(),
            strict_null_checks = compiler_options.strict_null_checks(),
            "Loaded compiler configuration."
        );
        Ok(Self {
            path: Some(path.to_path_buf()),
            compiler_options,
        })
    }

    /// Whether `null` and `undefined` stay in declared types.
    pub fn strict_null_checks(&self) -> bool {
        self.compiler_options.strict_null_checks()
    }
}

fn load_options(path: &Path, chain: &mut Vec<PathBuf>) -> Result<CompilerOptions> {
    let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if chain.contains(&key) {
        return Err(Error::ConfigCycle(path.to_path_buf()));
    }
    chain.push(key);

    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawConfig =
        serde_json::from_str(&strip_comments(&text)).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;

    let parents = match raw.extends {
        None => vec![],
        Some(Extends::One(spec)) => vec![spec],
        Some(Extends::Many(specs)) => specs,
    };

    // Later entries of an `extends` array override earlier ones.
    let mut options = raw.compiler_options;
    for spec in parents.iter().rev() {
        match resolve_extends(path, spec) {
            Some(parent) => options = options.inherit(load_options(&parent, chain)?),
            None => warn!(config = %path.display(), extends = %spec, "Cannot resolve extended configuration, ignoring."),
        }
    }

    chain.pop();
    Ok(options)
}

/// Locate the file named by an `extends` entry of the config at `from`.
fn resolve_extends(from: &Path, spec: &str) -> Option<PathBuf> {
    let dir = from.parent().unwrap_or_else(|| Path::new("."));
    let with_extension = |p: PathBuf| {
        if p.extension().is_some_and(|e| e == "json") {
            p
        } else {
            let mut name = p.into_os_string();
            name.push(".json");
            PathBuf::from(name)
        }
    };

    if spec.starts_with("./") || spec.starts_with("../") || Path::new(spec).is_absolute() {
        let candidate = with_extension(dir.join(spec));
        return candidate.is_file().then_some(candidate);
    }

    // Package reference: look in node_modules of every ancestor.
    dir.ancestors().find_map(|ancestor| {
        let base = ancestor.join("node_modules").join(spec);
        [with_extension(base.clone()), base.join("tsconfig.json")]
            .into_iter()
            .find(|p| p.is_file())
    })
}

/// Drop `//` and `/* */` comments and trailing commas, leaving strings intact.
pub(crate) fn strip_comments(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                out.push(c);
                i += 1;
                while i < chars.len() {
                    out.push(chars[i]);
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        out.push(chars[i + 1]);
                        i += 2;
                        continue;
                    }
                    i += 1;
                    if chars[i - 1] == '"' {
                        break;
                    }
                }
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
            }
            ',' => {
                if !matches!(next_significant(&chars, i + 1), Some('}' | ']')) {
                    out.push(c);
                }
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// First character at or after `i` that is neither whitespace nor inside a comment.
fn next_significant(chars: &[char], mut i: usize) -> Option<char> {
    while i < chars.len() {
        match (chars[i], chars.get(i + 1)) {
            (c, _) if c.is_whitespace() => i += 1,
            ('/', Some('/')) => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            ('/', Some('*')) => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
            }
            (c, _) => return Some(c),
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_strip_comments() {
        let text = r#"{
            // line comment
            "a": "http://x/*y*/", /* block */
            "b": [1, 2,],
            "c": { "d": 1, // trailing
            },
        }"#;
        let value: serde_json::Value = serde_json::from_str(&strip_comments(text)).unwrap();
        assert_eq!(value["a"], "http://x/*y*/");
        assert_eq!(value["b"], serde_json::json!([1, 2]));
        assert_eq!(value["c"]["d"], 1);
    }

    #[test]
    fn test_strict_implies_strict_null_checks() {
        let options = CompilerOptions {
            strict: Some(true),
            strict_null_checks: None,
        };
        assert!(options.strict_null_checks());

        let options = CompilerOptions {
            strict: Some(true),
            strict_null_checks: Some(false),
        };
        assert!(!options.strict_null_checks());
        assert!(!CompilerOptions::default().strict_null_checks());
    }

    #[test]
    fn test_load_follows_extends() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "base.json",
            r#"{ "compilerOptions": { "strict": true } }"#,
        );
        let path = write(
            dir.path(),
            "tsconfig.json",
            r#"{
                // inherits strict mode
                "extends": "./base",
                "compilerOptions": { "target": "es2019", }
            }"#,
        );

        let config = CompilerConfig::load(&path).unwrap();
        assert!(config.strict_null_checks());
        assert_eq!(config.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_child_overrides_parent() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "node_modules/@tsconfig/base/tsconfig.json",
            r#"{ "compilerOptions": { "strict": true } }"#,
        );
        let path = write(
            dir.path(),
            "tsconfig.json",
            r#"{ "extends": "@tsconfig/base", "compilerOptions": { "strictNullChecks": false } }"#,
        );

        let config = CompilerConfig::load(&path).unwrap();
        assert_eq!(config.compiler_options.strict, Some(true));
        assert!(!config.strict_null_checks());
    }

    #[test]
    fn test_extends_cycle_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", r#"{ "extends": "./b.json" }"#);
        let b = write(dir.path(), "b.json", r#"{ "extends": "./a.json" }"#);

        let err = CompilerConfig::load(&b).unwrap_err();
        assert!(matches!(err, Error::ConfigCycle(_)));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "tsconfig.json", "{ nope }");
        assert!(matches!(
            CompilerConfig::load(&path).unwrap_err(),
            Error::Config { .. }
        ));
    }
}
