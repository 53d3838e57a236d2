//! Language-independent entry point of the wire codec emitters.
//!
//! An orchestrator calls [`TypeEmitter::emit`] once per (field, role,
//! direction). The emitter picks the backend, which walks the type tree and
//! appends the fragment to the caller's sink.

use super::shared::{native_type, CleanupStack, EmitContext, EmitResult, Language, Releases, Site};
use super::{c_gen, cpp_gen, java_gen};
use hdi_types::{Type, TypeMode};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Operation family of one emission call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Family {
    /// Write a value already resident in memory.
    WriteVar,
    /// Proxy announces the capacity of a caller-allocated out buffer.
    ProxyWriteOutVar,
    /// Proxy reads a reply into caller-allocated storage.
    ProxyReadVar,
    /// Stub reads an in-parameter into storage it allocates.
    StubReadVar,
    /// Proxy reads a count, bounds-checks it and allocates `*name`.
    ProxyReadOutVar,
    /// Stub reads a count, bounds-checks it and allocates its out buffer.
    StubReadOutVar,
    /// Standalone object write.
    Marshal,
    /// Standalone object read.
    Unmarshal,
    /// Release everything a value owns. `client` selects the
    /// pointer-to-length form used for proxy out parameters.
    MemoryRecycle { client: bool },
}

impl Family {
    pub const ALL: [Family; 10] = [
        Family::WriteVar,
        Family::ProxyWriteOutVar,
        Family::ProxyReadVar,
        Family::StubReadVar,
        Family::ProxyReadOutVar,
        Family::StubReadOutVar,
        Family::Marshal,
        Family::Unmarshal,
        Family::MemoryRecycle { client: false },
        Family::MemoryRecycle { client: true },
    ];

    /* Standalone object families report failure as a boolean */
    pub fn is_block(self) -> bool {
        matches!(self, Family::Marshal | Family::Unmarshal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Family::WriteVar => "write-var",
            Family::ProxyWriteOutVar => "proxy-write-out-var",
            Family::ProxyReadVar => "proxy-read-var",
            Family::StubReadVar => "stub-read-var",
            Family::ProxyReadOutVar => "proxy-read-out-var",
            Family::StubReadOutVar => "stub-read-out-var",
            Family::Marshal => "marshal",
            Family::Unmarshal => "unmarshal",
            Family::MemoryRecycle { client: false } => "memory-recycle",
            Family::MemoryRecycle { client: true } => "client-memory-recycle",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Proxy,
    Stub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    In,
    Out,
}

impl Role {
    /// Families a generated routine of this role runs for one parameter, in
    /// the order they appear in the routine body.
    pub fn families(self, direction: Direction) -> &'static [Family] {
        match (self, direction) {
            (Role::Proxy, Direction::In) => &[Family::WriteVar],
            (Role::Proxy, Direction::Out) => &[Family::ProxyWriteOutVar, Family::ProxyReadVar],
            (Role::Stub, Direction::In) => &[Family::StubReadVar],
            (Role::Stub, Direction::Out) => &[Family::StubReadOutVar, Family::WriteVar],
        }
    }
}

/// Stateless front end over the three backends.
#[derive(Debug, Clone, Copy)]
pub struct TypeEmitter<'a> {
    language: Language,
    cx: EmitContext<'a>,
}

impl<'a> TypeEmitter<'a> {
    pub fn new(language: Language, cx: EmitContext<'a>) -> Self {
        Self { language, cx }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn context(&self) -> &EmitContext<'a> {
        &self.cx
    }

    pub fn native_type(&self, ty: &Type, mode: TypeMode) -> EmitResult<String> {
        native_type(ty, self.language, mode)
    }

    /// Append the fragment of `family` for `ty` at `site`.
    ///
    /// On the C path `cleanup` holds the releases pending in the enclosing
    /// scopes; the returned [`Releases`] are the ones the value still owns
    /// and should be composed into the stack for following siblings. The
    /// other backends ignore `cleanup` and return no releases.
    pub fn emit(
        &self,
        ty: &Type,
        family: Family,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<Releases> {
        trace!(
            language = %self.language,
            family = %family,
            ty = %ty,
            name = %site.name,
            "emitting fragment"
        );
        match self.language {
            Language::C => c_gen::emit(&self.cx, family, ty, site, cleanup, output),
            Language::Cpp => {
                cpp_gen::emit(&self.cx, family, ty, site, output)?;
                Ok(Releases::none())
            }
            Language::Java => {
                java_gen::emit(&self.cx, family, ty, site, output)?;
                Ok(Releases::none())
            }
        }
    }

    /* Convenience for a top-level call with an empty stack */
    pub fn emit_to_string(&self, ty: &Type, family: Family, site: &Site) -> EmitResult<String> {
        let mut output = String::new();
        self.emit(ty, family, site, &CleanupStack::new(), &mut output)?;
        Ok(output)
    }
}
