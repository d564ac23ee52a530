//! Application layer: document sessions
//!
//! This layer drives the domain tree on behalf of a controller, addressing
//! nodes by id rather than by arena handle.

pub mod error;
pub mod session;

pub use error::{ApplicationError, ApplicationResult};
pub use session::{EditCommand, OutlineSession};
