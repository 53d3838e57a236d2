use crate::codegen::emitter::Family;
use crate::codegen::shared::{CleanupStack, EmitContext, ErrorCode, TAB};
use hdi_types::TypeKind;
use std::fmt::Write;

/* How a failure branch leaves the generated routine */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure<'a> {
    /* RPC bodies: assign the error variable, unwind, jump */
    Status { error_var: &'a str, label: &'a str },
    /* Standalone unmarshalling: unwind, jump */
    Goto { label: &'a str },
    /* Standalone marshalling owns nothing */
    ReturnFalse,
}

/* Where a read places the value */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /* Caller pre-sized the buffer; lengths are pointers to capacity */
    Caller,
    /* The generated routine allocates and owns the storage */
    Owned,
}

/* HdfSbuf accessor suffix and C width of a scalar kind */
#[derive(Debug, Clone, Copy)]
pub struct ScalarSpec {
    pub method: &'static str,
    pub c_type: &'static str,
}

pub fn scalar_spec(kind: TypeKind) -> Option<ScalarSpec> {
    let (method, c_type) = match kind {
        TypeKind::Bool => ("Int8", "int8_t"),
        TypeKind::Byte => ("Int8", "int8_t"),
        TypeKind::Short => ("Int16", "int16_t"),
        TypeKind::Int => ("Int32", "int32_t"),
        TypeKind::Long => ("Int64", "int64_t"),
        TypeKind::UInt => ("Uint32", "uint32_t"),
        TypeKind::UShort => ("Uint16", "uint16_t"),
        TypeKind::ULong => ("Uint64", "uint64_t"),
        TypeKind::Float => ("Float", "float"),
        TypeKind::Double => ("Double", "double"),
        _ => return None,
    };
    Some(ScalarSpec { method, c_type })
}

/// Per-call C emitter: the context plus the failure shape of the family.
#[derive(Debug, Clone, Copy)]
pub struct CEmitter<'a> {
    pub cx: &'a EmitContext<'a>,
    pub failure: Failure<'a>,
}

impl<'a> CEmitter<'a> {
    pub fn for_family(cx: &'a EmitContext<'a>, family: Family) -> Self {
        let failure = match family {
            Family::Marshal => Failure::ReturnFalse,
            Family::Unmarshal => Failure::Goto {
                label: cx.error_label,
            },
            _ => Failure::Status {
                error_var: cx.error_var,
                label: cx.error_label,
            },
        };
        Self { cx, failure }
    }

    pub fn parcel(&self) -> &'a str {
        self.cx.parcel
    }

    pub fn kernel(&self) -> bool {
        self.cx.dialect.is_kernel()
    }

    /* Body of a failure branch, written at `prefix` */
    pub fn write_failure(
        &self,
        output: &mut String,
        prefix: &str,
        message: &str,
        code: ErrorCode,
        cleanup: &CleanupStack,
    ) -> std::fmt::Result {
        let protocol = self.cx.protocol;
        writeln!(output, "{}{}", prefix, protocol.log_line(message))?;
        match self.failure {
            Failure::Status { error_var, label } => {
                writeln!(output, "{}{} = {};", prefix, error_var, protocol.code(code))?;
                cleanup.write_unwind(output, prefix)?;
                writeln!(output, "{}goto {};", prefix, label)
            }
            Failure::Goto { label } => {
                cleanup.write_unwind(output, prefix)?;
                writeln!(output, "{}goto {};", prefix, label)
            }
            Failure::ReturnFalse => {
                cleanup.write_unwind(output, prefix)?;
                writeln!(output, "{}return false;", prefix)
            }
        }
    }

    /* `if (condition) { <failure> }` */
    pub fn check(
        &self,
        output: &mut String,
        prefix: &str,
        condition: &str,
        message: &str,
        code: ErrorCode,
        cleanup: &CleanupStack,
    ) -> std::fmt::Result {
        writeln!(output, "{}if ({}) {{", prefix, condition)?;
        self.write_failure(output, &format!("{}{}", prefix, TAB), message, code, cleanup)?;
        writeln!(output, "{}}}", prefix)
    }

    /* Ascending loop header; the kernel dialect reuses pre-declared counters */
    pub fn loop_header(&self, counter: &str, bound: &str) -> String {
        if self.kernel() {
            format!("for ({c} = 0; {c} < {b}; {c}++) {{", c = counter, b = bound)
        } else {
            format!("for (uint32_t {c} = 0; {c} < {b}; {c}++) {{", c = counter, b = bound)
        }
    }

    /* Descending loop over the elements already decoded before `counter` */
    pub fn unwind_header(&self, unwind: &str, counter: &str) -> String {
        if self.kernel() {
            format!("for ({u} = {c}; {u} > 0; {u}--) {{", u = unwind, c = counter)
        } else {
            format!("for (uint32_t {u} = {c}; {u} > 0; {u}--) {{", u = unwind, c = counter)
        }
    }
}

/* Length companion of a container or string value (`values` -> `valuesLen`) */
pub fn len_name(name: &str) -> String {
    format!("{}Len", name)
}

pub fn escape_c_keyword(name: &str) -> String {
    const C_KEYWORDS: &[&str] = &[
        "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
        "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
        "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch",
        "typedef", "union", "unsigned", "void", "volatile", "while", "bool", "data",
        "dataBlock", "NULL",
    ];

    let mut sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        sanitized.push('_');
    }

    if sanitized
        .chars()
        .next()
        .map(|c| c.is_ascii_digit())
        .unwrap_or(false)
    {
        sanitized.insert(0, '_');
    }

    if C_KEYWORDS.contains(&sanitized.as_str()) {
        sanitized.push('_');
    }

    sanitized
}
