use std::collections::HashMap;

use super::fdri::{FdriFormat, FdriIoPin, FdriMajorFormat};
use super::register::{AttributeValueDoc, RegisterAttributeFormat, RegisterFormat};
use super::schema::{
    FdriFormatSchema, FdriIoBlockFormatSchema, FdriLogicBlockFormatSchema, FdriMajorFormatSchema,
    RegisterFormatSchema,
};

/// Default sync word (§6.1), used unless the catalog overrides it.
pub const DEFAULT_SYNC_WORD: [u8; 4] = [0xAA, 0x99, 0x55, 0x66];

/// Decodes a hex string like `"3D18"` into raw bytes. Returns `None` on
/// malformed input rather than panicking — catalog data comes from an
/// external loader and shouldn't be trusted blindly.
fn hex_to_bytes(s: &str) -> Option<Vec<u8>> {
    let s = s.trim();
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

/// Immutable, in-memory description of the wire format: populated once by
/// an external loader via [`FormatCatalogBuilder`], then looked up from
/// throughout the codec.
#[derive(Debug, Clone)]
pub struct FormatCatalog {
    registers_by_address: HashMap<u8, RegisterFormat>,
    registers_by_name: HashMap<String, RegisterFormat>,
    fdri_formats: HashMap<String, FdriFormat>,
    sync_word: [u8; 4],
    visualizer_config: Option<String>,
}

impl FormatCatalog {
    pub fn register_format_by_address(&self, addr: u8) -> Option<&RegisterFormat> {
        self.registers_by_address.get(&addr)
    }

    pub fn register_format_by_name(&self, name: &str) -> Option<&RegisterFormat> {
        self.registers_by_name.get(name)
    }

    pub fn fdri_format_by_device(&self, device_name: &str) -> Option<&FdriFormat> {
        self.fdri_formats.get(device_name)
    }

    pub fn sync_word(&self) -> &[u8; 4] {
        &self.sync_word
    }

    /// Opaque pass-through; the core never interprets this (§4.4 of
    /// SPEC_FULL.md).
    pub fn visualizer_config(&self) -> Option<&str> {
        self.visualizer_config.as_deref()
    }
}

/// Accumulates schema values from an external loader and cross-references
/// them into an immutable [`FormatCatalog`]. Grounded on
/// `bal_xilinx.format.XilinxFormatBuilder`.
#[derive(Default)]
pub struct FormatCatalogBuilder {
    registers: Vec<RegisterFormatSchema>,
    major_formats: Vec<FdriMajorFormatSchema>,
    fdri_formats: Vec<FdriFormatSchema>,
    logic_block_formats: Vec<FdriLogicBlockFormatSchema>,
    io_block_formats: Vec<FdriIoBlockFormatSchema>,
    sync_word: Option<[u8; 4]>,
    visualizer_config: Option<String>,
}

impl FormatCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_register(mut self, register: RegisterFormatSchema) -> Self {
        self.registers.push(register);
        self
    }

    pub fn add_fdri_major_format(mut self, major: FdriMajorFormatSchema) -> Self {
        self.major_formats.push(major);
        self
    }

    pub fn add_fdri_format(mut self, fdri: FdriFormatSchema) -> Self {
        self.fdri_formats.push(fdri);
        self
    }

    pub fn add_fdri_logic_block_format(mut self, format: FdriLogicBlockFormatSchema) -> Self {
        self.logic_block_formats.push(format);
        self
    }

    pub fn add_fdri_io_block_format(mut self, format: FdriIoBlockFormatSchema) -> Self {
        self.io_block_formats.push(format);
        self
    }

    pub fn sync_word(mut self, word: [u8; 4]) -> Self {
        self.sync_word = Some(word);
        self
    }

    pub fn visualizer_config(mut self, raw: impl Into<String>) -> Self {
        self.visualizer_config = Some(raw.into());
        self
    }

    /// Cross-references accumulated schema data into the final catalog.
    ///
    /// Returns `None` if any register's attribute widths don't sum to a
    /// multiple of 8 bits, or if a logic-block format references an
    /// unknown major name.
    pub fn build(self) -> Option<FormatCatalog> {
        let mut registers_by_address = HashMap::new();
        let mut registers_by_name = HashMap::new();

        for reg in &self.registers {
            let attributes = reg
                .attributes
                .iter()
                .map(|a| {
                    let values = a
                        .values
                        .iter()
                        .map(|v| AttributeValueDoc {
                            value: v.value,
                            name: v.name.clone(),
                            description: v.description.clone(),
                        })
                        .collect();
                    RegisterAttributeFormat::new(&a.name, a.bit_size, &a.description, values)
                })
                .collect();

            let format = RegisterFormat::new(reg.address, &reg.name, &reg.description, attributes)?;
            registers_by_address.insert(format.address, format.clone());
            registers_by_name.insert(format.name.clone(), format);
        }

        let majors_by_name: HashMap<&str, &FdriMajorFormatSchema> = self
            .major_formats
            .iter()
            .map(|m| (m.name.as_str(), m))
            .collect();

        let mut fdri_formats = HashMap::new();
        for fdri in &self.fdri_formats {
            let logic_block_format = self
                .logic_block_formats
                .iter()
                .find(|f| f.device_name == fdri.device_name)
                .map(|f| {
                    f.logic_block_format
                        .iter()
                        .map(|row| {
                            row.iter()
                                .map(|name| majors_by_name.get(name.as_str()).map(|m| FdriMajorFormat {
                                    name: m.name.clone(),
                                    frame_size: m.frame_size,
                                    frame_count: m.frame_count,
                                    frame_descriptions: m.frame_descriptions.clone(),
                                }))
                                .collect::<Option<Vec<_>>>()
                        })
                        .collect::<Option<Vec<_>>>()
                })
                .unwrap_or(Some(Vec::new()))?;

            let io_block_format = self
                .io_block_formats
                .iter()
                .find(|f| f.device_name == fdri.device_name)
                .map(|f| {
                    f.io_block_format
                        .iter()
                        .map(|pin| FdriIoPin {
                            name: pin.pin_name.clone(),
                            offset: pin.offset,
                            on_value: pin.on_value.as_deref().and_then(hex_to_bytes),
                            off_value: pin.off_value.as_deref().and_then(hex_to_bytes),
                        })
                        .collect()
                })
                .unwrap_or_default();

            fdri_formats.insert(
                fdri.device_name.clone(),
                FdriFormat {
                    device_name: fdri.device_name.clone(),
                    logic_block_size: fdri.logic_block_size,
                    bram_block_size: fdri.bram_block_size,
                    io_block_size: fdri.io_block_size,
                    crc_size: fdri.crc_size,
                    logic_block_format,
                    io_block_format,
                },
            );
        }

        Some(FormatCatalog {
            registers_by_address,
            registers_by_name,
            fdri_formats,
            sync_word: self.sync_word.unwrap_or(DEFAULT_SYNC_WORD),
            visualizer_config: self.visualizer_config,
        })
    }
}
