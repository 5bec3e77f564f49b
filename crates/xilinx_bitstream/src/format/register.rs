use std::collections::HashMap;

/// Documentation for one concrete value an attribute can take.
#[derive(Debug, Clone)]
pub struct AttributeValueDoc {
    pub value: u64,
    pub name: String,
    pub description: String,
}

/// One bit-field of a register, in wire order (most-significant field first).
#[derive(Debug, Clone)]
pub struct RegisterAttributeFormat {
    pub name: String,
    pub bit_size: u32,
    pub description: String,
    values: HashMap<u64, AttributeValueDoc>,
}

impl RegisterAttributeFormat {
    pub fn new(
        name: impl Into<String>,
        bit_size: u32,
        description: impl Into<String>,
        values: Vec<AttributeValueDoc>,
    ) -> Self {
        Self {
            name: name.into(),
            bit_size,
            description: description.into(),
            values: values.into_iter().map(|v| (v.value, v)).collect(),
        }
    }

    pub fn value_doc(&self, value: u64) -> Option<&AttributeValueDoc> {
        self.values.get(&value)
    }
}

/// A named hardware register: address, ordered attribute layout, and the
/// precomputed total payload size in bytes.
#[derive(Debug, Clone)]
pub struct RegisterFormat {
    pub address: u8,
    pub name: String,
    pub description: String,
    pub attributes: Vec<RegisterAttributeFormat>,
    /// The attribute bit widths rounded up to the next 32-bit word, in
    /// bytes — registers are always a whole number of configuration words
    /// wide even when their declared attributes don't fill the last one
    /// (see §4.5's "padded to a 4-byte multiple before bit extraction").
    pub size: usize,
}

impl RegisterFormat {
    /// Builds a register format, computing `size` from the attribute list.
    ///
    /// Returns `None` if the attribute bit widths don't sum to a multiple
    /// of 8 (see spec.md §3.2).
    pub fn new(
        address: u8,
        name: impl Into<String>,
        description: impl Into<String>,
        attributes: Vec<RegisterAttributeFormat>,
    ) -> Option<Self> {
        let total_bits: u32 = attributes.iter().map(|a| a.bit_size).sum();
        if total_bits % 8 != 0 {
            return None;
        }
        let size = (xilinx_utils::align(total_bits as u64, 32) / 8) as usize;
        Some(Self {
            address,
            name: name.into(),
            description: description.into(),
            attributes,
            size,
        })
    }

    pub fn attribute_by_name(&self, name: &str) -> Option<&RegisterAttributeFormat> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_rounds_up_to_a_32_bit_word() {
        let attrs = vec![
            RegisterAttributeFormat::new("drive_awake", 1, "", vec![]),
            RegisterAttributeFormat::new("reserved", 10, "", vec![]),
            RegisterAttributeFormat::new("crc_bypass", 1, "", vec![]),
            RegisterAttributeFormat::new("done_pipe", 1, "", vec![]),
            RegisterAttributeFormat::new("drive_done", 1, "", vec![]),
            RegisterAttributeFormat::new("ssclksrc", 2, "", vec![]),
        ];
        let format = RegisterFormat::new(0x09, "Cor1", "", attrs).unwrap();
        assert_eq!(format.size, 4);
    }

    #[test]
    fn rejects_bit_widths_not_a_multiple_of_8() {
        let attrs = vec![RegisterAttributeFormat::new("x", 3, "", vec![])];
        assert!(RegisterFormat::new(0, "Bad", "", attrs).is_none());
    }
}
