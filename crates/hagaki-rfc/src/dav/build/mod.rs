//! DAV response serialization.

mod multistatus;

pub use multistatus::{BuildError, serialize_multistatus};
