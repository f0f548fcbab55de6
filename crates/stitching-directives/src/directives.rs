use std::fmt::Write as _;

use crate::Error;

/// The directive vocabulary a stitching gateway recognizes.
///
/// Every directive can be renamed, for example to avoid clashing with the federation `@key`
/// when a gateway reads both dialects:
///
/// ```toml
/// [directives]
/// key = "stitchingKey"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StitchingDirectives {
    /// Marks a merged type and the selection set identifying it.
    pub key: String,
    /// Marks a field that needs other fields of its parent to be resolved.
    pub computed: String,
    /// Marks a root field the gateway uses to fetch merged types.
    pub merge: String,
    /// Marks the canonical definition of an element shared between services.
    pub canonical: String,
}

impl Default for StitchingDirectives {
    fn default() -> Self {
        StitchingDirectives {
            key: "key".to_string(),
            computed: "computed".to_string(),
            merge: "merge".to_string(),
            canonical: "canonical".to_string(),
        }
    }
}

impl StitchingDirectives {
    pub fn with_key_directive(mut self, name: impl Into<String>) -> Self {
        self.key = name.into();
        self
    }

    pub fn with_computed_directive(mut self, name: impl Into<String>) -> Self {
        self.computed = name.into();
        self
    }

    pub fn with_merge_directive(mut self, name: impl Into<String>) -> Self {
        self.merge = name.into();
        self
    }

    pub fn with_canonical_directive(mut self, name: impl Into<String>) -> Self {
        self.canonical = name.into();
        self
    }

    /// Checks that every configured name can be used as a directive name.
    pub fn validate(&self) -> Result<(), Error> {
        for name in [&self.key, &self.computed, &self.merge, &self.canonical] {
            if !is_valid_name(name) {
                return Err(Error::InvalidDirectiveName(name.clone()));
            }
        }

        Ok(())
    }

    /// The definitions of the stitching directives, one per line.
    pub fn type_defs(&self) -> String {
        let StitchingDirectives {
            key,
            computed,
            merge,
            canonical,
        } = self;

        let mut sdl = String::new();

        // Writing into a String cannot fail.
        writeln!(sdl, "directive @{key}(selectionSet: String!) on OBJECT").ok();
        writeln!(sdl, "directive @{computed}(selectionSet: String!) on FIELD_DEFINITION").ok();
        writeln!(
            sdl,
            "directive @{merge}(argsExpr: String, keyArg: String, keyField: String, key: [String!], additionalArgs: String) on FIELD_DEFINITION"
        )
        .ok();
        writeln!(
            sdl,
            "directive @{canonical} on OBJECT | INTERFACE | INPUT_OBJECT | UNION | ENUM | SCALAR | FIELD_DEFINITION | INPUT_FIELD_DEFINITION"
        )
        .ok();

        sdl
    }
}

pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}
