//! Small, read-mostly consumers of a parsed tree (§4.7): device
//! identification and encryption detection. Neither mutates the tree;
//! the device analyzer's only side effect is caching its result on the
//! [`Context`].

use log::info;

use crate::context::Context;
use crate::data_object::DataObject;
use crate::error::{BitstreamError, Result};
use crate::model::{Bitstream, PacketPayload};

/// Reads the single `Idcode` packet, resolves its decoded value name (the
/// device name, e.g. `"LX9"`), and caches it on the context so the FDRI
/// codec can resolve its device layout (§4.7, §4.6).
pub fn analyze_device(context: &Context, bitstream: &DataObject<Bitstream>) -> Result<String> {
    bitstream.unpack()?;
    let device_name = bitstream.with_model(|model| -> Result<String> {
        model.packets.unpack()?;
        model.packets.with_model(|sequence| -> Result<String> {
            let packet = sequence.single_packet_named("Idcode")?;
            packet.with_model(|p| -> Result<String> {
                match &p.payload {
                    PacketPayload::Type1(payload) => payload.with_model(|type1| {
                        type1
                            .get("idcode")
                            .and_then(|a| a.value_name.clone())
                            .ok_or(BitstreamError::AmbiguousRegisterPacket {
                                name: "Idcode".into(),
                                count: 0,
                            })
                    })?,
                    _ => Err(BitstreamError::AmbiguousRegisterPacket {
                        name: "Idcode".into(),
                        count: 0,
                    }),
                }
            })?
        })?
    })??;

    info!("identified device: {device_name}");
    context.set_id_code(device_name.clone());
    Ok(device_name)
}

/// Returns whether any `Ctl` packet has its `dec` attribute set, meaning
/// the bitstream's FDRI payload is encrypted and should not be descended
/// into (§4.7, §9).
pub fn analyze_encryption(bitstream: &DataObject<Bitstream>) -> Result<bool> {
    bitstream.unpack()?;
    bitstream.with_model(|model| -> Result<bool> {
        model.packets.unpack()?;
        model.packets.with_model(|sequence| -> Result<bool> {
            for packet in sequence.packets_named("Ctl") {
                let encrypted = packet.with_model(|p| -> Result<bool> {
                    match &p.payload {
                        PacketPayload::Type1(payload) => {
                            payload.with_model(|type1| type1.get("dec").map(|a| a.value == 1).unwrap_or(false))
                        }
                        _ => Ok(false),
                    }
                })??;
                if encrypted {
                    return Ok(true);
                }
            }
            Ok(false)
        })?
    })?
}
