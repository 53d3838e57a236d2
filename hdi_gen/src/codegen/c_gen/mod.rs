//! Manual-memory C backend over `HdfSBuf`.
//!
//! Every read that allocates hands back the releases it still owns, and
//! every failure branch writes the whole cleanup stack before leaving.

pub mod block;
pub mod composite;
pub mod container;
pub mod helpers;
pub mod scalar;
pub mod string;

pub use block::{emit_declarations, emit_prototypes, CDeclarations};
pub use helpers::{CEmitter, Failure, Storage};

use crate::codegen::emitter::Family;
use crate::codegen::shared::{
    CleanupStack, EmitContext, EmitError, EmitResult, Language, Releases, Site,
};
use hdi_types::{Type, TypeKind};

pub fn emit(
    cx: &EmitContext<'_>,
    family: Family,
    ty: &Type,
    site: &Site,
    cleanup: &CleanupStack,
    output: &mut String,
) -> EmitResult<Releases> {
    let emitter = CEmitter::for_family(cx, family);
    match family {
        Family::WriteVar | Family::Marshal => {
            emitter.write(ty, site, cleanup, output)?;
            Ok(Releases::none())
        }
        Family::ProxyWriteOutVar => {
            emitter.write_capacity(ty, site, cleanup, output)?;
            Ok(Releases::none())
        }
        Family::ProxyReadVar => emitter.read(ty, site, Storage::Caller, cleanup, output),
        Family::StubReadVar | Family::Unmarshal => {
            emitter.read(ty, site, Storage::Owned, cleanup, output)
        }
        Family::ProxyReadOutVar => emitter.read_out(ty, site, true, cleanup, output),
        Family::StubReadOutVar => emitter.read_out(ty, site, false, cleanup, output),
        Family::MemoryRecycle { client } => {
            emitter.recycle(ty, site, client, output)?;
            Ok(Releases::none())
        }
    }
}

impl<'a> CEmitter<'a> {
    pub fn write(
        &self,
        ty: &Type,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        match ty {
            Type::String => self.write_string(site, cleanup, output),
            Type::FileDescriptor => self.write_file_descriptor(site, cleanup, output),
            Type::Enum(_) => self.write_enum(site, cleanup, output),
            Type::Struct(s) => self.write_struct(s, site, cleanup, output),
            Type::Union(u) => self.write_union(u, site, cleanup, output),
            Type::List(_) | Type::Array(_) => self.write_container(ty, site, cleanup, output),
            Type::Interface(_) => self.write_interface(site, cleanup, output),
            Type::Sequenceable(_) => Err(unsupported_sequenceable()),
            scalar => self.write_scalar(scalar, site, cleanup, output),
        }
    }

    pub fn write_capacity(
        &self,
        ty: &Type,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        match ty {
            Type::String => self.write_string_capacity(site, cleanup, output),
            Type::List(_) | Type::Array(_) => {
                self.write_container_capacity(ty, site, cleanup, output)
            }
            Type::Sequenceable(_) => Err(unsupported_sequenceable()),
            _ => Ok(()),
        }
    }

    pub fn read(
        &self,
        ty: &Type,
        site: &Site,
        storage: Storage,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<Releases> {
        match ty {
            Type::String => self.read_string(site, storage, cleanup, output),
            Type::List(_) | Type::Array(_) => {
                self.read_container(ty, site, storage, cleanup, output)
            }
            Type::Struct(s) => self.read_struct(s, site, cleanup, output),
            Type::FileDescriptor => {
                self.read_file_descriptor(site, cleanup, output)?;
                Ok(Releases::none())
            }
            Type::Enum(e) => {
                self.read_enum(e, site, cleanup, output)?;
                Ok(Releases::none())
            }
            Type::Union(u) => {
                self.read_union(u, site, cleanup, output)?;
                Ok(Releases::none())
            }
            Type::Interface(i) => {
                self.read_interface(i, site, cleanup, output)?;
                Ok(Releases::none())
            }
            Type::Sequenceable(_) => Err(unsupported_sequenceable()),
            scalar => {
                self.read_scalar(scalar, site, cleanup, output)?;
                Ok(Releases::none())
            }
        }
    }

    /* Only strings and containers need an out buffer before the call */
    pub fn read_out(
        &self,
        ty: &Type,
        site: &Site,
        client: bool,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<Releases> {
        match ty {
            Type::String if !client => self.read_out_string(site, cleanup, output),
            Type::List(_) | Type::Array(_) => {
                self.read_out_container(ty, site, client, cleanup, output)
            }
            Type::Sequenceable(_) => Err(unsupported_sequenceable()),
            _ => Ok(Releases::none()),
        }
    }

    pub fn recycle(
        &self,
        ty: &Type,
        site: &Site,
        client: bool,
        output: &mut String,
    ) -> EmitResult<()> {
        match ty {
            Type::String => self.recycle_string(site, output),
            Type::List(_) | Type::Array(_) => self.recycle_container(ty, site, client, output),
            Type::Struct(s) => self.recycle_struct(s, site, output),
            Type::Sequenceable(_) => Err(unsupported_sequenceable()),
            _ => Ok(()),
        }
    }
}

fn unsupported_sequenceable() -> EmitError {
    EmitError::unsupported(TypeKind::Sequenceable, Language::C)
}
