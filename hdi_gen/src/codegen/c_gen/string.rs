use super::helpers::{len_name, CEmitter, Storage};
use crate::codegen::shared::{CleanupStack, EmitResult, ErrorCode, Release, Releases, Site, TAB};
use std::fmt::Write;

impl<'a> CEmitter<'a> {
    pub fn write_string(
        &self,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        self.check(
            output,
            &site.prefix,
            &format!("!HdfSbufWriteString({}, {})", self.parcel(), site.name),
            &format!("write {} failed!", site.name),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        Ok(())
    }

    /* Proxy side of a string out parameter: announce the buffer size */
    pub fn write_string_capacity(
        &self,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        let len = len_name(&site.name);
        self.check(
            output,
            &site.prefix,
            &format!("!HdfSbufWriteUint32({}, {})", self.parcel(), len),
            &format!("write {} failed!", len),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        Ok(())
    }

    /// Stage the transport-owned string, then copy it into storage that is
    /// never aliased to the parcel.
    pub fn read_string(
        &self,
        site: &Site,
        storage: Storage,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<Releases> {
        let prefix = &site.prefix;
        let staged = format!("{}Cp", site.ident());
        writeln!(
            output,
            "{}const char *{} = HdfSbufReadString({});",
            prefix,
            staged,
            self.parcel()
        )?;
        self.check(
            output,
            prefix,
            &format!("{} == NULL", staged),
            &format!("read {} failed!", staged),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;

        match storage {
            Storage::Caller => {
                self.check(
                    output,
                    prefix,
                    &format!(
                        "strcpy_s({}, {}, {}) != EOK",
                        site.name,
                        len_name(&site.name),
                        staged
                    ),
                    &format!("read {} failed!", site.name),
                    ErrorCode::InvalidParameter,
                    cleanup,
                )?;
                Ok(Releases::none())
            }
            Storage::Owned => {
                self.duplicate_string(site, &staged, cleanup, output)?;
                Ok(Releases::one(Release::free(&self.cx.protocol.free_fn, &site.name)))
            }
        }
    }

    /* The only statement pair that depends on the dialect besides loop counters */
    fn duplicate_string(
        &self,
        site: &Site,
        staged: &str,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        let prefix = &site.prefix;
        let protocol = self.cx.protocol;
        if self.kernel() {
            writeln!(
                output,
                "{}{} = (char *){}(strlen({}) + 1);",
                prefix, site.name, protocol.alloc_fn, staged
            )?;
        } else {
            writeln!(output, "{}{} = strdup({});", prefix, site.name, staged)?;
        }
        self.check(
            output,
            prefix,
            &format!("{} == NULL", site.name),
            &format!("malloc {} failed!", site.name),
            ErrorCode::MallocFailure,
            cleanup,
        )?;

        if self.kernel() {
            let owned = cleanup.push(Release::free(&protocol.free_fn, &site.name));
            self.check(
                output,
                prefix,
                &format!(
                    "strcpy_s({}, strlen({}) + 1, {}) != EOK",
                    site.name, staged, staged
                ),
                &format!("copy {} failed!", site.name),
                ErrorCode::InvalidParameter,
                &owned,
            )?;
        }
        Ok(())
    }

    /* Stub side of a string out parameter: allocate the buffer the service fills */
    pub fn read_out_string(
        &self,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<Releases> {
        let prefix = &site.prefix;
        let inner = format!("{}{}", prefix, TAB);
        let len = len_name(&site.name);
        let protocol = self.cx.protocol;

        self.check(
            output,
            prefix,
            &format!("!HdfSbufReadUint32({}, &{})", self.parcel(), len),
            &format!("read {} failed!", len),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        self.check(
            output,
            prefix,
            &format!("{} > {} / sizeof(char)", len, protocol.max_buff_size),
            &format!("{} is invalid data", len),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        writeln!(output, "{}if ({} > 0) {{", prefix, len)?;
        writeln!(
            output,
            "{}{} = (char *){}({});",
            inner, site.name, protocol.alloc_fn, len
        )?;
        self.check(
            output,
            &inner,
            &format!("{} == NULL", site.name),
            &format!("malloc {} failed!", site.name),
            ErrorCode::MallocFailure,
            cleanup,
        )?;
        writeln!(output, "{}}}", prefix)?;
        Ok(Releases::one(Release::free(&protocol.free_fn, &site.name)))
    }

    pub fn recycle_string(&self, site: &Site, output: &mut String) -> EmitResult<()> {
        let inner = format!("{}{}", site.prefix, TAB);
        writeln!(output, "{}if ({} != NULL) {{", site.prefix, site.name)?;
        writeln!(output, "{}{}({});", inner, self.cx.protocol.free_fn, site.name)?;
        writeln!(output, "{}{} = NULL;", inner, site.name)?;
        writeln!(output, "{}}}", site.prefix)?;
        Ok(())
    }
}
