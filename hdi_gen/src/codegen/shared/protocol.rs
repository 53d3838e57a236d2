//! Protocol tokens spliced verbatim into generated code.
//!
//! The generator never interprets these strings; it only places them. They
//! default to the names used by the HDF driver framework and can be
//! overridden from a YAML file so the same engine can target a renamed
//! runtime.

use serde_derive::{Deserialize, Serialize};

/// Error codes a generated routine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed or oversized wire data, or a transport primitive failed.
    InvalidParameter,
    /// Allocation failure in the manual-memory backend.
    MallocFailure,
    Success,
}

/// Token table shared by every backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Protocol {
    /// Upper bound, in bytes, for any buffer sized from wire data.
    pub max_buff_size: String,
    pub err_invalid_param: String,
    pub err_malloc_fail: String,
    pub success: String,
    /// Diagnostic logging macro, called as `LOG("%{public}s: ...", __func__)`.
    pub log_macro: String,
    /// Zero-initializing allocator of the C backend.
    pub alloc_fn: String,
    pub free_fn: String,
}

impl Default for Protocol {
    fn default() -> Self {
        Self {
            max_buff_size: "HDI_BUFF_MAX_SIZE".to_string(),
            err_invalid_param: "HDF_ERR_INVALID_PARAM".to_string(),
            err_malloc_fail: "HDF_ERR_MALLOC_FAIL".to_string(),
            success: "HDF_SUCCESS".to_string(),
            log_macro: "HDF_LOGE".to_string(),
            alloc_fn: "OsalMemCalloc".to_string(),
            free_fn: "OsalMemFree".to_string(),
        }
    }
}

impl Protocol {
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(content)
    }

    pub fn code(&self, code: ErrorCode) -> &str {
        match code {
            ErrorCode::InvalidParameter => &self.err_invalid_param,
            ErrorCode::MallocFailure => &self.err_malloc_fail,
            ErrorCode::Success => &self.success,
        }
    }

    /* `LOG("%{public}s: <message>", __func__);` */
    pub fn log_line(&self, message: &str) -> String {
        format!("{}(\"%{{public}}s: {}\", __func__);", self.log_macro, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_override_keeps_defaults() {
        let protocol = Protocol::from_yaml_str("max-buff-size: MY_MAX\nlog-macro: MY_LOG\n")
            .expect("override parses");
        assert_eq!(protocol.max_buff_size, "MY_MAX");
        assert_eq!(protocol.err_invalid_param, "HDF_ERR_INVALID_PARAM");
        assert_eq!(
            protocol.log_line("read x failed!"),
            "MY_LOG(\"%{public}s: read x failed!\", __func__);"
        );
    }

    #[test]
    fn error_codes_map_to_tokens() {
        let protocol = Protocol::default();
        assert_eq!(protocol.code(ErrorCode::MallocFailure), "HDF_ERR_MALLOC_FAIL");
        assert_eq!(protocol.code(ErrorCode::Success), "HDF_SUCCESS");
    }
}
