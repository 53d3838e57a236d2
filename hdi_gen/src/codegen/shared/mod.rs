pub mod cleanup;
pub mod context;
pub mod declarations;
pub mod decoration;
pub mod error;
pub mod protocol;

pub use cleanup::{CleanupStack, Release, Releases};
pub use context::{Dialect, EmitContext, Language, Site, TAB};
pub use declarations::ordered_declarations;
pub use decoration::native_type;
pub use error::{EmitError, EmitResult};
pub use protocol::{ErrorCode, Protocol};
