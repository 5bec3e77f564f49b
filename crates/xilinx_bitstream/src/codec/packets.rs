//! The stateful packet-stream parser/serializer (§4.4) — the most subtle
//! part of the codec: type-1/type-2 dispatch, the type-2-must-follow-
//! type-1 rule, the FarMaj/FarMajExtended corner case, the LX45T spurious-
//! small-FDRI-packet guard, and DESYNC-tail handling.

use std::rc::Rc;

use byteorder::{BigEndian, ByteOrder};

use super::header::decode_header;
use crate::data_object::DataObject;
use crate::error::{BitstreamError, Result};
use crate::format::RegisterFormat;
use crate::model::fdri::{FdriDecodeArgs, FdriPayload};
use crate::model::packet::{Packet, PacketDecodeArgs, PacketPayload};
use crate::model::type1::Type1Payload;

/// The `< 500` byte guard that routes an undersized Fdri type-2 payload to
/// opaque handling instead of the FDRI codec — a device-specific quirk
/// (LX45T emits a spurious small FDRI packet). Preserved verbatim; see
/// SPEC_FULL.md §9 / DESIGN.md for why this isn't "fixed".
pub const FDRI_SIZE_GUARD: usize = 500;

/// Resolves the register format governing a header, including the
/// `FarMaj`/`FarMajExtended` corner case (§4.1): if the address names
/// `FarMaj` but `word_count > 1`, the extended format is used instead.
fn resolve_register_format<'a>(
    args: &'a PacketDecodeArgs,
    address: u8,
    word_count: u8,
) -> Result<&'a RegisterFormat> {
    let format = args
        .catalog
        .register_format_by_address(address)
        .ok_or(BitstreamError::UnknownRegister(address))?;

    if format.name == "FarMaj" && word_count > 1 {
        log::debug!("FarMaj with word_count={word_count} > 1, using FarMajExtended");
        return args
            .catalog
            .register_format_by_name("FarMajExtended")
            .ok_or(BitstreamError::UnknownRegister(address));
    }
    Ok(format)
}

/// Parses one packet starting at `bytes[0]`. Returns the packet, the
/// number of bytes it consumed, and whether this packet sets end-of-
/// stream (a DESYNC command).
pub fn parse_one_packet(
    args: &PacketDecodeArgs,
    bytes: &[u8],
    previous_packet_type: Option<u8>,
) -> Result<(Packet, usize, bool)> {
    if bytes.len() < 2 {
        return Err(BitstreamError::TruncatedInput {
            expected: 2,
            actual: bytes.len(),
        });
    }
    let header = decode_header(BigEndian::read_u16(&bytes[0..2]));
    let register_format = resolve_register_format(args, header.register_address, header.word_count)?;
    let register_name = Some(register_format.name.clone());

    match header.packet_type {
        0 => Ok((
            Packet {
                header,
                register_name,
                payload: PacketPayload::None,
            },
            2,
            false,
        )),

        1 => {
            let payload_len = header.word_count as usize * 4;
            if header.opcode == 0 && payload_len > 0 {
                return Err(BitstreamError::NoopWithPayload);
            }
            if payload_len == 0 {
                return Ok((
                    Packet {
                        header,
                        register_name,
                        payload: PacketPayload::None,
                    },
                    2,
                    false,
                ));
            }

            let payload_bytes = bytes.get(2..2 + payload_len).ok_or(BitstreamError::TruncatedInput {
                expected: 2 + payload_len,
                actual: bytes.len(),
            })?;
            let register_format = Rc::new(register_format.clone());
            let type1 = Type1Payload::decode(payload_bytes, &register_format)?;

            let mut end_of_stream = false;
            if register_format.name == "Cmd" {
                if let Some(command) = type1.get("command") {
                    if command.value_name.as_deref() == Some("DESYNC") {
                        log::debug!("DESYNC command observed, terminating packet stream");
                        end_of_stream = true;
                    }
                }
            }

            let payload = Rc::new(DataObject::new_unpacked(type1)?);
            Ok((
                Packet {
                    header,
                    register_name,
                    payload: PacketPayload::Type1(payload),
                },
                2 + payload_len,
                end_of_stream,
            ))
        }

        2 => {
            if previous_packet_type != Some(1) {
                return Err(BitstreamError::UnexpectedType2AfterType(previous_packet_type));
            }
            let length_field = bytes
                .get(2..6)
                .ok_or(BitstreamError::TruncatedInput {
                    expected: 6,
                    actual: bytes.len(),
                })?;
            let n = BigEndian::read_u32(length_field) as usize;
            let payload_len = (n + 2) * 4;
            let payload_bytes = bytes
                .get(6..6 + payload_len)
                .ok_or(BitstreamError::TruncatedInput {
                    expected: 6 + payload_len,
                    actual: bytes.len(),
                })?;

            let payload = if register_format.name == "Fdri" && payload_bytes.len() >= FDRI_SIZE_GUARD {
                let fdri_args = FdriDecodeArgs {
                    catalog: args.catalog.clone(),
                    id_code: args.id_code.clone(),
                };
                PacketPayload::Fdri(Rc::new(DataObject::<FdriPayload>::new_packed(
                    payload_bytes.to_vec(),
                    fdri_args,
                )))
            } else {
                log::debug!(
                    "type-2 payload for {} ({} bytes) treated as opaque",
                    register_format.name,
                    payload_bytes.len()
                );
                PacketPayload::Type2Opaque(Rc::new(DataObject::new_packed(
                    payload_bytes.to_vec(),
                    (),
                )))
            };

            Ok((
                Packet {
                    header,
                    register_name,
                    payload,
                },
                6 + payload_len,
                false,
            ))
        }

        other => Err(BitstreamError::UnexpectedPacketType(other)),
    }
}

/// Parses the full packet region: repeatedly calls [`parse_one_packet`]
/// until end-of-stream (DESYNC) or input exhaustion, then returns the
/// parsed packets plus any opaque trailing bytes.
pub fn parse_packet_stream(
    args: &PacketDecodeArgs,
    bytes: &[u8],
) -> Result<(Vec<Rc<DataObject<Packet>>>, Vec<u8>)> {
    let mut offset = 0;
    let mut previous_packet_type = None;
    let mut packets = Vec::new();

    while offset < bytes.len() {
        let (packet, consumed, end_of_stream) =
            parse_one_packet(args, &bytes[offset..], previous_packet_type)?;
        previous_packet_type = Some(packet.header.packet_type);
        offset += consumed;
        packets.push(Rc::new(DataObject::new_unpacked(packet)?));
        if end_of_stream {
            break;
        }
    }

    let tail = bytes[offset..].to_vec();
    Ok((packets, tail))
}

/// Re-serializes a packet sequence plus its opaque tail back to bytes.
pub fn serialize_packet_stream(packets: &[Rc<DataObject<Packet>>], tail: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for packet in packets {
        out.extend(packet.pack()?);
    }
    out.extend_from_slice(tail);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::schema::{RegisterAttributeSchema, RegisterFormatSchema};
    use crate::format::FormatCatalogBuilder;

    fn test_args() -> PacketDecodeArgs {
        let catalog = FormatCatalogBuilder::new()
            .add_register(RegisterFormatSchema {
                address: 5,
                name: "Cor1".into(),
                description: String::new(),
                attributes: vec![
                    RegisterAttributeSchema {
                        name: "drive_awake".into(),
                        bit_size: 1,
                        description: String::new(),
                        values: vec![],
                    },
                    RegisterAttributeSchema {
                        name: "reserved".into(),
                        bit_size: 10,
                        description: String::new(),
                        values: vec![],
                    },
                    RegisterAttributeSchema {
                        name: "crc_bypass".into(),
                        bit_size: 1,
                        description: String::new(),
                        values: vec![],
                    },
                    RegisterAttributeSchema {
                        name: "done_pipe".into(),
                        bit_size: 1,
                        description: String::new(),
                        values: vec![],
                    },
                    RegisterAttributeSchema {
                        name: "drive_done".into(),
                        bit_size: 1,
                        description: String::new(),
                        values: vec![],
                    },
                    RegisterAttributeSchema {
                        name: "ssclksrc".into(),
                        bit_size: 2,
                        description: String::new(),
                        values: vec![],
                    },
                ],
            })
            .build()
            .unwrap();
        PacketDecodeArgs {
            catalog: Rc::new(catalog),
            id_code: Rc::new(std::cell::RefCell::new(None)),
        }
    }

    #[test]
    fn decodes_scenario_1_packet() {
        let args = test_args();
        let bytes = [0x30u8, 0xA1, 0x00, 0x00, 0x00, 0x00];
        let (packet, consumed, end_of_stream) = parse_one_packet(&args, &bytes, None).unwrap();
        assert_eq!(packet.header.packet_type, 1);
        assert_eq!(packet.header.opcode, 2);
        assert_eq!(packet.header.register_address, 5);
        assert_eq!(packet.header.word_count, 1);
        assert_eq!(consumed, 6);
        assert!(!end_of_stream);
    }

    #[test]
    fn rejects_type2_not_following_type1() {
        let args = test_args();
        let bytes = [0x50u8, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert!(matches!(
            parse_one_packet(&args, &bytes, None),
            Err(BitstreamError::UnexpectedType2AfterType(None))
        ));
    }

    #[test]
    fn unknown_register_fails() {
        let args = test_args();
        let bytes = [0x0Fu8, 0xE0];
        assert!(matches!(
            parse_one_packet(&args, &bytes, None),
            Err(BitstreamError::UnknownRegister(_))
        ));
    }
}
