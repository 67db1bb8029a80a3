//! vCard serialization.

mod escape;
mod fold;
mod serializer;

pub use escape::{escape_component, escape_param_value, escape_text};
pub use fold::fold_line;
pub use serializer::{serialize, serialize_property, serialize_single};
