// Mon Oct 19 2026 - Alex

pub mod builder;
pub mod cache;
pub mod error;
pub mod field;
pub mod layout;
pub mod typed;

pub use builder::{LayoutRow, TypedLayoutSetBuilder};
pub use cache::{InMemoryMappingCache, MappingCache};
pub use error::LayoutError;
pub use field::{FieldKind, FieldSpec};
pub use layout::Layout;
pub use typed::{line_record_type, record_type_of, TypedLayoutSet};
