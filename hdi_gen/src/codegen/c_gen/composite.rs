use super::helpers::CEmitter;
use crate::codegen::shared::context::address_of;
use crate::codegen::shared::{CleanupStack, EmitResult, ErrorCode, Release, Releases, Site};
use hdi_types::{InterfaceType, StructType, UnionType};
use std::fmt::Write;

impl<'a> CEmitter<'a> {
    /* Structs are populated in place by their generated block functions */
    pub fn write_struct(
        &self,
        struct_type: &StructType,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        self.check(
            output,
            &site.prefix,
            &format!(
                "!{}BlockMarshalling({}, {})",
                struct_type.name,
                self.parcel(),
                address_of(&site.name)
            ),
            &format!("write {} failed!", site.name),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        Ok(())
    }

    pub fn read_struct(
        &self,
        struct_type: &StructType,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<Releases> {
        self.check(
            output,
            &site.prefix,
            &format!(
                "!{}BlockUnmarshalling({}, {})",
                struct_type.name,
                self.parcel(),
                address_of(&site.name)
            ),
            &format!("read {} failed!", site.name),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        if owns_storage(struct_type) {
            Ok(Releases::one(Release::line(struct_free(struct_type, &site.name))))
        } else {
            Ok(Releases::none())
        }
    }

    pub fn recycle_struct(
        &self,
        struct_type: &StructType,
        site: &Site,
        output: &mut String,
    ) -> EmitResult<()> {
        if owns_storage(struct_type) {
            writeln!(output, "{}{}", site.prefix, struct_free(struct_type, &site.name))?;
        }
        Ok(())
    }

    /* Unions are copied as raw bytes of their exact size */
    pub fn write_union(
        &self,
        union_type: &UnionType,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        self.check(
            output,
            &site.prefix,
            &format!(
                "!HdfSbufWriteUnpadBuffer({}, (const uint8_t *){}, sizeof(union {}))",
                self.parcel(),
                address_of(&site.name),
                union_type.name
            ),
            &format!("write {} failed!", site.name),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        Ok(())
    }

    /// The transport cannot target union storage, so the bytes are staged in
    /// a parcel-owned temporary and copied with `memcpy_s`.
    pub fn read_union(
        &self,
        union_type: &UnionType,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        let union_name = format!("union {}", union_type.name);
        let staged = format!("{}Cp", site.ident());
        writeln!(
            output,
            "{}const {} *{} = (const {} *)HdfSbufReadUnpadBuffer({}, sizeof({}));",
            site.prefix,
            union_name,
            staged,
            union_name,
            self.parcel(),
            union_name
        )?;
        self.check(
            output,
            &site.prefix,
            &format!("{} == NULL", staged),
            &format!("read {} failed!", site.name),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        writeln!(
            output,
            "{}(void)memcpy_s({}, sizeof({}), {}, sizeof({}));",
            site.prefix,
            address_of(&site.name),
            union_name,
            staged,
            union_name
        )?;
        Ok(())
    }

    pub fn write_interface(
        &self,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        self.check(
            output,
            &site.prefix,
            &format!(
                "HdfSbufWriteRemoteService({}, {}->AsObject({})) != {}",
                self.parcel(),
                site.name,
                site.name,
                self.cx.protocol.code(ErrorCode::Success)
            ),
            &format!("write {} failed!", site.name),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        Ok(())
    }

    pub fn read_interface(
        &self,
        interface: &InterfaceType,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        let remote = format!("{}Remote", site.ident());
        writeln!(
            output,
            "{}struct HdfRemoteService *{} = HdfSbufReadRemoteService({});",
            site.prefix,
            remote,
            self.parcel()
        )?;
        self.check(
            output,
            &site.prefix,
            &format!("{} == NULL", remote),
            &format!("read {} failed!", site.name),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        writeln!(
            output,
            "{}{} = {}AsInterface({});",
            site.prefix, site.name, interface.name, remote
        )?;
        Ok(())
    }
}

fn owns_storage(struct_type: &StructType) -> bool {
    struct_type
        .fields
        .iter()
        .any(|field| field.field_type.owns_storage())
}

/* Release of a struct value's members; the struct itself is not freed */
fn struct_free(struct_type: &StructType, name: &str) -> String {
    format!("{}Free({}, false);", struct_type.name, address_of(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::emitter::Family;
    use crate::codegen::shared::{Dialect, EmitContext, Protocol};
    use hdi_types::Type;
    use pretty_assertions::assert_eq;

    #[test]
    fn union_read_stages_and_copies() {
        let protocol = Protocol::default();
        let cx = EmitContext::new(&protocol, Dialect::User);
        let emitter = CEmitter::for_family(&cx, Family::StubReadVar);
        let cell = UnionType::new("Cell").field("raw", Type::ULong);
        let mut text = String::new();
        emitter
            .read_union(&cell, &Site::new("cells[i]"), &CleanupStack::new(), &mut text)
            .unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "const union Cell *cellsCp = (const union Cell *)HdfSbufReadUnpadBuffer(data, sizeof(union Cell));"
        );
        assert_eq!(
            lines.last().copied(),
            Some("(void)memcpy_s(&cells[i], sizeof(union Cell), cellsCp, sizeof(union Cell));")
        );
    }

    #[test]
    fn plain_struct_hands_back_no_release() {
        let protocol = Protocol::default();
        let cx = EmitContext::new(&protocol, Dialect::User);
        let emitter = CEmitter::for_family(&cx, Family::StubReadVar);
        let point = StructType::new("Point").field("x", Type::Int);
        let named = StructType::new("Named").field("name", Type::String);

        let mut text = String::new();
        let releases = emitter
            .read_struct(&point, &Site::new("origin"), &CleanupStack::new(), &mut text)
            .unwrap();
        assert!(releases.is_empty());
        assert!(text.starts_with("if (!PointBlockUnmarshalling(data, &origin)) {\n"));

        let releases = emitter
            .read_struct(&named, &Site::new("*owner"), &CleanupStack::new(), &mut text)
            .unwrap();
        let lines: Vec<&Release> = releases.iter().collect();
        assert_eq!(lines[0].lines(), &["NamedFree(owner, false);".to_string()]);
    }

    #[test]
    fn interface_write_compares_against_success_token() {
        let protocol = Protocol {
            success: "MY_OK".to_string(),
            ..Protocol::default()
        };
        let cx = EmitContext::new(&protocol, Dialect::User);
        let emitter = CEmitter::for_family(&cx, Family::WriteVar);

        let mut text = String::new();
        emitter
            .write_interface(&Site::new("cb"), &CleanupStack::new(), &mut text)
            .unwrap();
        assert!(text.starts_with("if (HdfSbufWriteRemoteService(data, cb->AsObject(cb)) != MY_OK) {\n"));
    }
}
