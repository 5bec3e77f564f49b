//! The root model (§3.1, §4.3) plus the packet-sequence wrapper that
//! builds the register-name index on first unpack (§3.3).

use std::collections::HashMap;
use std::rc::Rc;

use crate::codec::packets::{parse_packet_stream, serialize_packet_stream};
use crate::context::IdCodeCell;
use crate::data_object::{DataObject, NodeModel};
use crate::error::{BitstreamError, Result};
use crate::format::FormatCatalog;
use crate::model::opaque::Opaque;
use crate::model::packet::{Packet, PacketDecodeArgs};

/// An ordered packet stream plus whatever opaque bytes trail a DESYNC
/// (§3.1). Builds a `register name → packets` index eagerly on decode so
/// analyzers don't have to linearly rescan (§3.3) — the payloads
/// themselves stay packed until something actually asks for them.
pub struct PacketSequence {
    items: Vec<Rc<DataObject<Packet>>>,
    tail: Vec<u8>,
    by_register_name: HashMap<String, Vec<Rc<DataObject<Packet>>>>,
}

impl PacketSequence {
    pub fn items(&self) -> &[Rc<DataObject<Packet>>] {
        &self.items
    }

    pub fn tail(&self) -> &[u8] {
        &self.tail
    }

    pub fn packets_named(&self, register_name: &str) -> &[Rc<DataObject<Packet>>] {
        self.by_register_name
            .get(register_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Finds the single packet for `register_name`, failing if there is
    /// more than one or none at all (the shape the analyzers need, §4.7).
    pub fn single_packet_named(&self, register_name: &str) -> Result<&Rc<DataObject<Packet>>> {
        let matches = self.packets_named(register_name);
        match matches {
            [one] => Ok(one),
            other => Err(BitstreamError::AmbiguousRegisterPacket {
                name: register_name.to_string(),
                count: other.len(),
            }),
        }
    }
}

impl NodeModel for PacketSequence {
    type DecodeArgs = PacketDecodeArgs;

    fn decode(bytes: &[u8], args: &PacketDecodeArgs) -> Result<Self> {
        let (items, tail) = parse_packet_stream(args, bytes)?;

        let mut by_register_name: HashMap<String, Vec<Rc<DataObject<Packet>>>> = HashMap::new();
        for packet in &items {
            // Register names are known from the header at parse time; this
            // doesn't force the payload to unpack.
            packet.with_model(|p| {
                if let Some(name) = &p.register_name {
                    by_register_name.entry(name.clone()).or_default().push(packet.clone());
                }
            })?;
        }

        Ok(PacketSequence {
            items,
            tail,
            by_register_name,
        })
    }

    fn encode(&self) -> Result<Vec<u8>> {
        serialize_packet_stream(&self.items, &self.tail)
    }

    fn synchronize_children(&self) -> Result<bool> {
        let mut any_dirty = false;
        for packet in &self.items {
            any_dirty |= packet.synchronize()?;
        }
        Ok(any_dirty)
    }
}

/// What [`Bitstream::decode`] needs: the catalog (to locate the sync word
/// and resolve register/FDRI formats) and the shared id-code cell handed
/// down to packets and, transitively, FDRI payloads.
#[derive(Clone)]
pub struct BitstreamDecodeArgs {
    pub catalog: Rc<FormatCatalog>,
    pub id_code: IdCodeCell,
}

/// The root of the tree: opaque header, sync marker, and the packet
/// region (§3.1, §4.3).
pub struct Bitstream {
    pub header: Rc<DataObject<Opaque>>,
    pub sync_marker: Rc<DataObject<Opaque>>,
    pub packets: Rc<DataObject<PacketSequence>>,
    sync_word: Vec<u8>,
}

impl Bitstream {
    pub fn header_bytes(&self) -> Result<Vec<u8>> {
        self.header.pack()
    }
}

impl NodeModel for Bitstream {
    type DecodeArgs = BitstreamDecodeArgs;

    /// Locates the sync word's first occurrence; everything before it is
    /// the opaque header, everything after is the packet region (§4.3).
    fn decode(bytes: &[u8], args: &BitstreamDecodeArgs) -> Result<Self> {
        let sync_word = args.catalog.sync_word();
        let sync_offset = bytes
            .windows(sync_word.len())
            .position(|w| w == sync_word)
            .ok_or(BitstreamError::SyncMarkerMissing)?;

        let packets_offset = sync_offset + sync_word.len();
        if bytes.len() < packets_offset + 4 {
            return Err(BitstreamError::TruncatedInput {
                expected: packets_offset + 4,
                actual: bytes.len(),
            });
        }

        let header_bytes = &bytes[..sync_offset];
        let sync_bytes = &bytes[sync_offset..packets_offset];
        let packets_bytes = &bytes[packets_offset..];

        let packet_args = PacketDecodeArgs {
            catalog: args.catalog.clone(),
            id_code: args.id_code.clone(),
        };

        Ok(Bitstream {
            header: Rc::new(DataObject::new_packed(header_bytes.to_vec(), ())),
            sync_marker: Rc::new(DataObject::new_packed(sync_bytes.to_vec(), ())),
            packets: Rc::new(DataObject::new_packed(packets_bytes.to_vec(), packet_args)),
            sync_word: sync_word.to_vec(),
        })
    }

    /// Concatenates `header.pack() ‖ sync_word ‖ packets.pack()`. Notably
    /// re-emits the catalog's sync word directly rather than re-packing
    /// `sync_marker` — the root never treats the marker as mutable content.
    fn encode(&self) -> Result<Vec<u8>> {
        let mut out = self.header.pack()?;
        out.extend_from_slice(&self.sync_word);
        out.extend(self.packets.pack()?);
        Ok(out)
    }

    fn synchronize_children(&self) -> Result<bool> {
        let mut any_dirty = self.header.synchronize()?;
        any_dirty |= self.sync_marker.synchronize()?;
        any_dirty |= self.packets.synchronize()?;
        Ok(any_dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::schema::{RegisterAttributeSchema, RegisterFormatSchema};
    use crate::format::FormatCatalogBuilder;
    use std::cell::RefCell;

    fn args_with_cmd_register() -> BitstreamDecodeArgs {
        let catalog = FormatCatalogBuilder::new()
            .add_register(RegisterFormatSchema {
                address: 4,
                name: "Cmd".into(),
                description: String::new(),
                attributes: vec![RegisterAttributeSchema {
                    name: "command".into(),
                    bit_size: 32,
                    description: String::new(),
                    values: vec![crate::format::schema::AttributeValueSchema {
                        value: 0x0D,
                        name: "DESYNC".into(),
                        description: String::new(),
                    }],
                }],
            })
            .build()
            .unwrap();
        BitstreamDecodeArgs {
            catalog: Rc::new(catalog),
            id_code: Rc::new(RefCell::new(None)),
        }
    }

    #[test]
    fn splits_header_sync_and_packets() {
        let args = args_with_cmd_register();
        // header(2 junk bytes) ++ sync word ++ two NOOP packets (one full word)
        let mut bytes = vec![0xDE, 0xAD];
        bytes.extend_from_slice(&crate::format::DEFAULT_SYNC_WORD);
        bytes.extend_from_slice(&[0x00, 0x00]); // NOOP header: type=0
        bytes.extend_from_slice(&[0x00, 0x00]); // NOOP header: type=0

        let model = Bitstream::decode(&bytes, &args).unwrap();
        assert_eq!(model.header.pack().unwrap(), vec![0xDE, 0xAD]);
        assert_eq!(model.sync_marker.pack().unwrap(), crate::format::DEFAULT_SYNC_WORD);
        assert_eq!(model.encode().unwrap(), bytes);
    }

    #[test]
    fn desync_preserves_trailing_bytes() {
        let args = args_with_cmd_register();
        let mut bytes = vec![0xDE, 0xAD];
        bytes.extend_from_slice(&crate::format::DEFAULT_SYNC_WORD);
        // type=1, opcode=WRITE(2), register_address=4 (Cmd), word_count=1
        bytes.extend_from_slice(&[0x30, 0x81]);
        bytes.extend_from_slice(&0x0Du32.to_be_bytes());
        bytes.extend_from_slice(&[0xCA, 0xFE, 0xBA, 0xBE]); // trailing tail

        let model = Bitstream::decode(&bytes, &args).unwrap();
        let tail = model.packets.with_model(|p| p.tail().to_vec()).unwrap();
        assert_eq!(tail, vec![0xCA, 0xFE, 0xBA, 0xBE]);
        assert_eq!(model.encode().unwrap(), bytes);
    }

    #[test]
    fn missing_sync_word_fails() {
        let args = args_with_cmd_register();
        assert!(matches!(
            Bitstream::decode(&[0u8; 8], &args),
            Err(BitstreamError::SyncMarkerMissing)
        ));
    }
}
