//! Deserialization targets for the format catalog's wire schema (§6.2).
//!
//! These types describe what an external loader hands to
//! [`crate::format::FormatCatalogBuilder`]; this crate never reads a file or
//! parses JSON text itself — that's the loader's job, out of scope here.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AttributeValueSchema {
    pub value: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterAttributeSchema {
    pub name: String,
    pub bit_size: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub values: Vec<AttributeValueSchema>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterFormatSchema {
    pub address: u8,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub attributes: Vec<RegisterAttributeSchema>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FdriMajorFormatSchema {
    pub name: String,
    pub frame_size: usize,
    pub frame_count: usize,
    #[serde(default)]
    pub frame_descriptions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FdriFormatSchema {
    pub device_name: String,
    pub logic_block_size: usize,
    pub bram_block_size: usize,
    pub io_block_size: usize,
    pub crc_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FdriLogicBlockFormatSchema {
    pub device_name: String,
    /// Outer = rows, inner = majors; entries are major names resolved
    /// against `fdri_major_formats` at build time.
    pub logic_block_format: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FdriIoPinSchema {
    pub pin_name: String,
    pub offset: usize,
    #[serde(default)]
    pub on_value: Option<String>,
    #[serde(default)]
    pub off_value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FdriIoBlockFormatSchema {
    pub device_name: String,
    pub io_block_format: Vec<FdriIoPinSchema>,
}
