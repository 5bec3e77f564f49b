//! Parsing, inspection and re-emission of Xilinx FPGA configuration
//! bitstreams.
//!
//! The format-driven codec at the heart of this crate is a lazy,
//! substitutable, re-packable object tree (see [`data_object`]) whose
//! shape is dictated by an external, data-driven [`format::FormatCatalog`]:
//! register layouts, per-device FDRI frame geometry, and IO-pin offsets.
//! None of that data is baked in — callers build a catalog via
//! [`format::FormatCatalogBuilder`] from whatever external source they load
//! it from (this crate never reads a file or parses JSON itself).
//!
//! Typical usage:
//!
//! ```no_run
//! use xilinx_bitstream::context::Context;
//! use xilinx_bitstream::format::FormatCatalogBuilder;
//! use xilinx_bitstream::analyzers::analyze_device;
//!
//! # fn run() -> xilinx_bitstream::error::Result<()> {
//! let catalog = FormatCatalogBuilder::new().build().unwrap();
//! let context = Context::new(catalog);
//! let raw = std::fs::read("bitstream.bit").unwrap();
//! let root = context.bitstream(&raw);
//! analyze_device(&context, &root)?;
//! let out = root.pack()?;
//! # Ok(())
//! # }
//! ```

pub mod analyzers;
pub mod codec;
pub mod context;
pub mod data_object;
pub mod error;
pub mod format;
pub mod model;
pub mod modifiers;
