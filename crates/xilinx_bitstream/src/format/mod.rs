//! The format catalog: an immutable, in-memory description of the wire
//! format (register layouts, per-device FDRI layouts, sync word),
//! populated once by an external loader (§4.1 / §6.2).

mod catalog;
mod fdri;
pub mod schema;
mod register;

pub use catalog::{FormatCatalog, FormatCatalogBuilder, DEFAULT_SYNC_WORD};
pub use fdri::{FdriFormat, FdriIoPin, FdriMajorFormat};
pub use register::{AttributeValueDoc, RegisterAttributeFormat, RegisterFormat};
