use super::helpers::{len_name, CEmitter, Storage};
use crate::codegen::shared::decoration::c_type;
use crate::codegen::shared::{
    CleanupStack, EmitError, EmitResult, ErrorCode, Language, Release, Releases, Site, TAB,
};
use hdi_types::{Type, TypeMode};
use std::fmt::Write;

/* Element type of a list or array; nested containers have no C layout */
fn container_element(ty: &Type) -> EmitResult<&Type> {
    let element = ty
        .element_type()
        .ok_or_else(|| EmitError::unsupported(ty.classify(), Language::C))?;
    if element.is_container() {
        return Err(EmitError::NestedContainer {
            description: ty.describe(),
            language: Language::C,
        });
    }
    Ok(element)
}

/* Slot of the loop's current element, one level deeper than the loop header */
fn element_site(site: &Site, index: &str, prefix: String) -> Site {
    Site {
        name: format!("{}[{}]", site.name, index),
        prefix,
        depth: site.depth + 1,
    }
}

impl<'a> CEmitter<'a> {
    pub fn write_container(
        &self,
        ty: &Type,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        let element = container_element(ty)?;
        let len = len_name(&site.name);
        let counter = site.loop_counter();

        self.check(
            output,
            &site.prefix,
            &format!("!HdfSbufWriteUint32({}, {})", self.parcel(), len),
            &format!("write {} failed!", len),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        writeln!(output, "{}{}", site.prefix, self.loop_header(&counter, &len))?;
        let slot = element_site(site, &counter, site.inner_prefix());
        self.write(element, &slot, cleanup, output)?;
        writeln!(output, "{}}}", site.prefix)?;
        Ok(())
    }

    /* Proxy announces how many elements its out buffer holds */
    pub fn write_container_capacity(
        &self,
        ty: &Type,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        container_element(ty)?;
        let len = len_name(&site.name);
        self.check(
            output,
            &site.prefix,
            &format!("!HdfSbufWriteUint32({}, *{})", self.parcel(), len),
            &format!("write {} failed!", len),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        Ok(())
    }

    pub fn read_container(
        &self,
        ty: &Type,
        site: &Site,
        storage: Storage,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<Releases> {
        let element = container_element(ty)?;
        match storage {
            Storage::Caller => self.read_into_caller_buffer(element, site, cleanup, output),
            Storage::Owned => self.read_into_owned_buffer(element, site, cleanup, output),
        }
    }

    /* The caller sized the buffer: the wire count may not exceed `*nameLen` */
    fn read_into_caller_buffer(
        &self,
        element: &Type,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<Releases> {
        let prefix = &site.prefix;
        let len = len_name(&site.name);
        let count = format!("{}Count", site.ident());
        let counter = site.loop_counter();

        writeln!(output, "{}uint32_t {} = 0;", prefix, count)?;
        self.check(
            output,
            prefix,
            &format!("!HdfSbufReadUint32({}, &{})", self.parcel(), count),
            &format!("read {} size failed!", site.name),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        self.check(
            output,
            prefix,
            &format!("{} > *{}", count, len),
            &format!("{} is invalid data", len),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        writeln!(output, "{}*{} = {};", prefix, len, count)?;

        let loop_stack = if element.owns_storage() {
            cleanup.push(self.element_unwind(element, site)?)
        } else {
            cleanup.clone()
        };
        let bound = format!("*{}", len);
        writeln!(output, "{}{}", prefix, self.loop_header(&counter, &bound))?;
        let slot = element_site(site, &counter, site.inner_prefix());
        self.read(element, &slot, Storage::Owned, &loop_stack, output)?;
        writeln!(output, "{}}}", prefix)?;

        if !element.owns_storage() {
            return Ok(Releases::none());
        }
        let mut text = String::new();
        writeln!(text, "{}", self.loop_header(&counter, &bound))?;
        let slot = element_site(site, &counter, TAB.to_string());
        self.recycle(element, &slot, false, &mut text)?;
        writeln!(text, "}}")?;
        Ok(Releases::one(release_from_text(&text)))
    }

    /// Read count, bound it, allocate, then decode every element in place.
    ///
    /// The buffer release is pushed right after the allocation; when the
    /// elements own storage a second release frees the elements decoded so
    /// far, in reverse index order, so a failure at element `i` unwinds
    /// elements `[0, i)` before the buffer itself.
    fn read_into_owned_buffer(
        &self,
        element: &Type,
        site: &Site,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<Releases> {
        let prefix = &site.prefix;
        let inner = site.inner_prefix();
        let len = len_name(&site.name);
        let counter = site.loop_counter();

        self.check(
            output,
            prefix,
            &format!("!HdfSbufReadUint32({}, &{})", self.parcel(), len),
            &format!("read {} failed!", len),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        self.bound_check(element, &len, prefix, cleanup, output)?;

        writeln!(output, "{}if ({} > 0) {{", prefix, len)?;
        self.allocate(element, &site.name, &len, &inner, cleanup, output)?;
        let buffer_stack = cleanup.push(Release::free(&self.cx.protocol.free_fn, &site.name));
        let loop_stack = if element.owns_storage() {
            buffer_stack.push(self.element_unwind(element, site)?)
        } else {
            buffer_stack
        };

        writeln!(output, "{}{}", inner, self.loop_header(&counter, &len))?;
        let slot = element_site(site, &counter, format!("{}{}", inner, TAB));
        self.read(element, &slot, Storage::Owned, &loop_stack, output)?;
        writeln!(output, "{}}}", inner)?;
        writeln!(output, "{}}}", prefix)?;

        let mut text = String::new();
        let whole = Site::new(site.name.clone()).with_depth(site.depth);
        self.recycle_container_elements(element, &whole, &len, &mut text)?;
        Ok(Releases::one(release_from_text(&text)))
    }

    /// Out-buffer allocation without reading contents. `client` is the proxy
    /// form, where both the buffer and its length are reached through
    /// pointers.
    pub fn read_out_container(
        &self,
        ty: &Type,
        site: &Site,
        client: bool,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<Releases> {
        let element = container_element(ty)?;
        let prefix = &site.prefix;
        let inner = site.inner_prefix();
        let len = len_name(&site.name);
        let (buffer, count, target) = if client {
            (format!("*{}", site.name), format!("*{}", len), len.clone())
        } else {
            (site.name.clone(), len.clone(), format!("&{}", len))
        };

        self.check(
            output,
            prefix,
            &format!("!HdfSbufReadUint32({}, {})", self.parcel(), target),
            &format!("read {} failed!", len),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        self.bound_check(element, &count, prefix, cleanup, output)?;
        writeln!(output, "{}if ({} > 0) {{", prefix, count)?;
        self.allocate(element, &buffer, &count, &inner, cleanup, output)?;
        writeln!(output, "{}}}", prefix)?;
        Ok(Releases::one(Release::free(&self.cx.protocol.free_fn, &buffer)))
    }

    pub fn recycle_container(
        &self,
        ty: &Type,
        site: &Site,
        client: bool,
        output: &mut String,
    ) -> EmitResult<()> {
        let element = container_element(ty)?;
        let len = len_name(&site.name);
        let count = if client { format!("*{}", len) } else { len };
        self.recycle_container_elements(element, site, &count, output)
    }

    fn recycle_container_elements(
        &self,
        element: &Type,
        site: &Site,
        count: &str,
        output: &mut String,
    ) -> EmitResult<()> {
        let prefix = &site.prefix;
        let inner = site.inner_prefix();
        let counter = site.loop_counter();

        writeln!(output, "{}if ({} > 0 && {} != NULL) {{", prefix, count, site.name)?;
        if element.owns_storage() {
            writeln!(output, "{}{}", inner, self.loop_header(&counter, count))?;
            let slot = element_site(site, &counter, format!("{}{}", inner, TAB));
            self.recycle(element, &slot, false, output)?;
            writeln!(output, "{}}}", inner)?;
        }
        writeln!(output, "{}{}({});", inner, self.cx.protocol.free_fn, site.name)?;
        writeln!(output, "{}{} = NULL;", inner, site.name)?;
        writeln!(output, "{}}}", prefix)?;
        Ok(())
    }

    /* Frees elements [0, i) of the buffer in reverse index order */
    fn element_unwind(&self, element: &Type, site: &Site) -> EmitResult<Release> {
        let counter = site.loop_counter();
        let unwind = site.unwind_counter();
        let mut text = String::new();
        writeln!(text, "{}", self.unwind_header(&unwind, &counter))?;
        let slot = element_site(site, &format!("{} - 1", unwind), TAB.to_string());
        self.recycle(element, &slot, false, &mut text)?;
        writeln!(text, "}}")?;
        Ok(release_from_text(&text))
    }

    /* `count * sizeof(element) <= MAX` checked before any allocation */
    fn bound_check(
        &self,
        element: &Type,
        count: &str,
        prefix: &str,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        let element_type = c_type(element, TypeMode::NoMode)?;
        self.check(
            output,
            prefix,
            &format!(
                "{} > {} / sizeof({})",
                count, self.cx.protocol.max_buff_size, element_type
            ),
            &format!("{} is invalid data", count.trim_start_matches('*')),
            ErrorCode::InvalidParameter,
            cleanup,
        )?;
        Ok(())
    }

    fn allocate(
        &self,
        element: &Type,
        buffer: &str,
        count: &str,
        prefix: &str,
        cleanup: &CleanupStack,
        output: &mut String,
    ) -> EmitResult<()> {
        let element_type = c_type(element, TypeMode::NoMode)?;
        writeln!(
            output,
            "{}{} = ({}*){}(sizeof({}) * ({}));",
            prefix, buffer, element_type, self.cx.protocol.alloc_fn, element_type, count
        )?;
        self.check(
            output,
            prefix,
            &format!("{} == NULL", buffer),
            &format!("malloc {} failed!", buffer.trim_start_matches('*')),
            ErrorCode::MallocFailure,
            cleanup,
        )?;
        Ok(())
    }
}

fn release_from_text(text: &str) -> Release {
    Release::new(text.lines().map(str::to_string).collect())
}
