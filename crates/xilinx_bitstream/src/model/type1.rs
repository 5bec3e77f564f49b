use std::rc::Rc;

use crate::codec::bits::{read_bits, write_bits};
use crate::data_object::NodeModel;
use crate::error::{BitstreamError, Result};
use crate::format::RegisterFormat;

/// One decoded bit-field of a register write.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub value: u64,
    pub value_name: Option<String>,
    pub description: Option<String>,
    pub bit_size: u32,
}

/// A register write body: an ordered mapping `attribute_name → Attribute`,
/// decoded against a [`RegisterFormat`] (§4.5).
#[derive(Debug, Clone)]
pub struct Type1Payload {
    pub register_format: Rc<RegisterFormat>,
    attributes: Vec<(String, Attribute)>,
}

impl Type1Payload {
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Attribute)> {
        self.attributes.iter()
    }

    pub fn set_value(&mut self, name: &str, value: u64) -> bool {
        if let Some((_, attr)) = self.attributes.iter_mut().find(|(n, _)| n == name) {
            attr.value = value;
            let format = self.register_format.attribute_by_name(name);
            attr.value_name = format
                .and_then(|f| f.value_doc(value))
                .map(|doc| doc.name.clone());
            true
        } else {
            false
        }
    }
}

impl NodeModel for Type1Payload {
    type DecodeArgs = Rc<RegisterFormat>;

    fn decode(bytes: &[u8], register_format: &Rc<RegisterFormat>) -> Result<Self> {
        if bytes.len() != register_format.size {
            return Err(BitstreamError::SizeMismatch {
                expected: register_format.size,
                actual: bytes.len(),
                context: format!("type-1 payload for register {}", register_format.name),
            });
        }

        let mut bit_offset = 0usize;
        let mut attributes = Vec::with_capacity(register_format.attributes.len());
        for attr_format in &register_format.attributes {
            let raw = read_bits(bytes, bit_offset, attr_format.bit_size);
            bit_offset += attr_format.bit_size as usize;
            let doc = attr_format.value_doc(raw);
            attributes.push((
                attr_format.name.to_lowercase(),
                Attribute {
                    value: raw,
                    value_name: doc.map(|d| d.name.clone()),
                    description: doc
                        .map(|d| d.description.clone())
                        .or_else(|| Some(attr_format.description.clone())),
                    bit_size: attr_format.bit_size,
                },
            ));
        }

        Ok(Type1Payload {
            register_format: register_format.clone(),
            attributes,
        })
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; self.register_format.size];
        let mut bit_offset = 0usize;
        for (_, attr) in &self.attributes {
            write_bits(&mut buffer, bit_offset, attr.bit_size, attr.value);
            bit_offset += attr.bit_size as usize;
        }
        Ok(buffer)
    }
}
