pub mod error;
pub mod registry;
pub mod types;

pub use error::LinkingError;
pub use registry::LinkingRegistry;
pub use types::{CodeState, LinkedIdentity, LinkingCode};
