use std::rc::Rc;

use crate::codec::header::encode_header;
use crate::context::IdCodeCell;
use crate::data_object::{DataObject, NodeModel};
use crate::error::{BitstreamError, Result};
use crate::format::FormatCatalog;
use crate::model::fdri::FdriPayload;
use crate::model::opaque::Opaque;
use crate::model::type1::Type1Payload;

/// What a single [`Packet`] needs to resolve register formats and,
/// transitively, to let a nested FDRI payload resolve its device layout
/// lazily (§4.1, §4.6).
#[derive(Clone)]
pub struct PacketDecodeArgs {
    pub catalog: Rc<FormatCatalog>,
    pub id_code: IdCodeCell,
}

/// Decoded 16-bit packet control word (§3.1, §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub packet_type: u8,
    pub opcode: u8,
    pub register_address: u8,
    pub word_count: u8,
}

impl PacketHeader {
    pub fn type_name(&self) -> &'static str {
        match self.packet_type {
            0 => "NOOP",
            1 => "Type1",
            2 => "Type2",
            _ => "Unknown",
        }
    }

    pub fn opcode_name(&self) -> &'static str {
        match self.opcode {
            0 => "NOOP",
            1 => "READ",
            2 => "WRITE",
            _ => "Unknown",
        }
    }
}

/// The decoded payload of a packet, carrying enough to re-encode it.
pub enum PacketPayload {
    None,
    Type1(Rc<DataObject<Type1Payload>>),
    /// Opaque type-2 payload (not dispatched to the FDRI codec).
    Type2Opaque(Rc<DataObject<Opaque>>),
    Fdri(Rc<DataObject<FdriPayload>>),
}

/// One configuration command: header plus optional payload (§3.1).
/// Register name/opcode/type decorations for display are derived from the
/// header and the format catalog rather than stored redundantly.
pub struct Packet {
    pub header: PacketHeader,
    pub register_name: Option<String>,
    pub payload: PacketPayload,
}

impl Packet {
    pub fn payload_len(&self) -> Result<usize> {
        Ok(match &self.payload {
            PacketPayload::None => 0,
            PacketPayload::Type1(p) => p.pack()?.len(),
            PacketPayload::Type2Opaque(p) => p.pack()?.len(),
            PacketPayload::Fdri(p) => p.pack()?.len(),
        })
    }
}

impl NodeModel for Packet {
    type DecodeArgs = PacketDecodeArgs;

    /// Decodes a single, already-isolated packet's bytes. The stateful
    /// stream parser in [`crate::codec::packets`] is what actually drives
    /// packet boundary discovery; this exists for trait conformance and
    /// for decoding/round-tripping one packet in isolation (e.g. tests).
    fn decode(bytes: &[u8], args: &PacketDecodeArgs) -> Result<Self> {
        let (packet, consumed, _end_of_stream) =
            crate::codec::packets::parse_one_packet(args, bytes, None)?;
        if consumed != bytes.len() {
            return Err(BitstreamError::SizeMismatch {
                expected: consumed,
                actual: bytes.len(),
                context: "single packet decode".into(),
            });
        }
        Ok(packet)
    }

    fn encode(&self) -> Result<Vec<u8>> {
        match self.header.packet_type {
            1 => {
                let payload_bytes = match &self.payload {
                    PacketPayload::Type1(payload) => payload.pack()?,
                    _ => Vec::new(),
                };
                let word_count = (payload_bytes.len() / 4) as u8;
                let mut out = encode_header(&PacketHeader {
                    word_count,
                    ..self.header
                })
                .to_be_bytes()
                .to_vec();
                out.extend(payload_bytes);
                Ok(out)
            }
            2 => {
                let payload_bytes = match &self.payload {
                    PacketPayload::Fdri(p) => p.pack()?,
                    PacketPayload::Type2Opaque(p) => p.pack()?,
                    _ => Vec::new(),
                };
                let word_len = payload_bytes.len() / 4;
                let length_field =
                    (word_len as u32)
                        .checked_sub(2)
                        .ok_or_else(|| BitstreamError::SizeMismatch {
                            expected: 8,
                            actual: payload_bytes.len(),
                            context: "type-2 payload too short to encode length field".into(),
                        })?;
                let mut out = encode_header(&PacketHeader {
                    word_count: 0,
                    ..self.header
                })
                .to_be_bytes()
                .to_vec();
                out.extend(length_field.to_be_bytes());
                out.extend(payload_bytes);
                Ok(out)
            }
            _ => Ok(encode_header(&self.header).to_be_bytes().to_vec()),
        }
    }

    fn synchronize_children(&self) -> Result<bool> {
        Ok(match &self.payload {
            PacketPayload::None => false,
            PacketPayload::Type1(p) => p.synchronize()?,
            PacketPayload::Type2Opaque(p) => p.synchronize()?,
            PacketPayload::Fdri(p) => p.synchronize()?,
        })
    }
}
