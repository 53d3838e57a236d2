//! Per-call emission context.
//!
//! Everything an emitter needs besides the type node itself: the target
//! language and C dialect, the protocol tokens, the names supplied by the
//! orchestrator, and the [`Site`] describing where the fragment lands.

use super::protocol::Protocol;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// One level of indentation in generated code.
pub const TAB: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Language {
    /// Manual-memory C over `HdfSBuf`.
    C,
    /// C++ over the owned-buffer `MessageParcel`.
    Cpp,
    /// Garbage-collected Java over `MessageParcel`.
    Java,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::C, Language::Cpp, Language::Java];

    pub fn file_extension(self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Java => "java",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Java => "Java",
        };
        f.write_str(name)
    }
}

/// C dialect selector. Only loop-counter declarations and the string
/// duplication primitive depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    #[default]
    User,
    /// Kernel-space C: loop counters are declared once per function.
    Kernel,
}

impl Dialect {
    pub fn from_kernel_flag(kernel: bool) -> Self {
        if kernel {
            Dialect::Kernel
        } else {
            Dialect::User
        }
    }

    pub fn is_kernel(self) -> bool {
        self == Dialect::Kernel
    }
}

/// Names and switches supplied by the orchestrator for one emission call.
#[derive(Debug, Clone, Copy)]
pub struct EmitContext<'a> {
    pub dialect: Dialect,
    pub protocol: &'a Protocol,
    /// Parcel handle expression (`data`, `reply`, ...).
    pub parcel: &'a str,
    /// Error-code variable assigned before jumping to the failure label.
    pub error_var: &'a str,
    pub error_label: &'a str,
}

impl<'a> EmitContext<'a> {
    pub fn new(protocol: &'a Protocol, dialect: Dialect) -> Self {
        Self {
            dialect,
            protocol,
            parcel: "data",
            error_var: "ec",
            error_label: "FINISHED",
        }
    }

    pub fn with_parcel(mut self, parcel: &'a str) -> Self {
        self.parcel = parcel;
        self
    }

    pub fn with_error_var(mut self, error_var: &'a str) -> Self {
        self.error_var = error_var;
        self
    }

    pub fn with_error_label(mut self, error_label: &'a str) -> Self {
        self.error_label = error_label;
        self
    }
}

/// Where a fragment is emitted: the value expression, the indentation
/// prefix and the recursion depth used to derive unique temporaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    /// Lvalue expression of the value (`values`, `dataBlock->name`, `*out`).
    pub name: String,
    pub prefix: String,
    pub depth: usize,
}

impl Site {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: String::new(),
            depth: 0,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn inner_prefix(&self) -> String {
        format!("{}{}", self.prefix, TAB)
    }

    /* Same value, one level deeper in the text only */
    pub fn indented(&self) -> Site {
        Site {
            name: self.name.clone(),
            prefix: self.inner_prefix(),
            depth: self.depth,
        }
    }

    /* Child value of a composite: deeper text and a fresh depth */
    pub fn nested(&self, name: impl Into<String>) -> Site {
        Site {
            name: name.into(),
            prefix: self.inner_prefix(),
            depth: self.depth + 1,
        }
    }

    /* Identifier-safe stem of the value name, for temporaries */
    pub fn ident(&self) -> String {
        base_ident(&self.name)
    }

    pub fn loop_counter(&self) -> String {
        loop_counter(self.depth)
    }

    pub fn unwind_counter(&self) -> String {
        unwind_counter(self.depth)
    }
}

/* `i`, `i1`, `i2`, ... */
pub fn loop_counter(depth: usize) -> String {
    if depth == 0 {
        "i".to_string()
    } else {
        format!("i{}", depth)
    }
}

/* `j`, `j1`, `j2`, ... counters of release loops */
pub fn unwind_counter(depth: usize) -> String {
    if depth == 0 {
        "j".to_string()
    } else {
        format!("j{}", depth)
    }
}

/// Reduce a value expression to an identifier stem:
/// `dataBlock->values[i]` → `values`, `*out` → `out`, `&x.y` → `y`.
pub fn base_ident(name: &str) -> String {
    let trimmed = name.trim_start_matches(['*', '&', '(']);
    let without_index = trimmed.split('[').next().unwrap_or(trimmed);
    let last = without_index
        .rsplit(|c| c == '.' || c == '>')
        .next()
        .unwrap_or(without_index);
    let ident: String = last
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if ident.is_empty() {
        "value".to_string()
    } else {
        ident
    }
}

/// Address of an lvalue expression: `*out` → `out`, `x[i]` → `&x[i]`.
pub fn address_of(name: &str) -> String {
    match name.strip_prefix('*') {
        Some(pointer) if !pointer.contains(['[', '-', '.']) => pointer.to_string(),
        _ => format!("&{}", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn base_ident_strips_access_paths() {
        assert_eq!(base_ident("values"), "values");
        assert_eq!(base_ident("dataBlock->values"), "values");
        assert_eq!(base_ident("values[i]"), "values");
        assert_eq!(base_ident("*out"), "out");
        assert_eq!(base_ident("dataBlock.label"), "label");
        assert_eq!(base_ident("&dataBlock->points[j - 1]"), "points");
    }

    #[test]
    fn address_of_collapses_dereference() {
        assert_eq!(address_of("*out"), "out");
        assert_eq!(address_of("values[i]"), "&values[i]");
        assert_eq!(address_of("dataBlock->point"), "&dataBlock->point");
    }

    #[test]
    fn nested_sites_increase_depth() {
        let site = Site::new("values");
        let element = site.nested("values[i]");
        assert_eq!(element.depth, 1);
        assert_eq!(element.prefix, TAB);
        assert_eq!(site.loop_counter(), "i");
        assert_eq!(element.loop_counter(), "i1");
        assert_eq!(element.unwind_counter(), "j1");
        assert_eq!(site.indented().depth, 0);
    }
}
