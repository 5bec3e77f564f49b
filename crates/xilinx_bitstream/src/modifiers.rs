//! The IO-pin modifier (§4.8): a low-level byte-range patch of the FDRI
//! IO block, keyed by a named pin and an on/off state.

use log::debug;

use crate::context::Context;
use crate::data_object::DataObject;
use crate::error::{BitstreamError, Result};
use crate::model::{Bitstream, PacketPayload};

/// Sets `pin_name` to `on` (true) or `off` (false) by patching the single
/// FDRI packet's IO block with the pin's pre-recorded on/off bytes.
/// Requires `context.id_code` to already be set (§4.8 step 1).
pub fn set_io_pin(context: &Context, bitstream: &DataObject<Bitstream>, pin_name: &str, on: bool) -> Result<()> {
    let id_code = context.id_code().ok_or(BitstreamError::MissingIdCode)?;
    let format = context
        .catalog
        .fdri_format_by_device(&id_code)
        .ok_or_else(|| BitstreamError::UnknownDevice(id_code.clone()))?;
    let pin = format
        .get_io_pin_by_name(pin_name)
        .ok_or_else(|| BitstreamError::UnknownIoPin(pin_name.to_string()))?;

    let value = if on { &pin.on_value } else { &pin.off_value };
    let value = value.as_ref().ok_or_else(|| BitstreamError::PinValueUnavailable {
        name: pin_name.to_string(),
        state: if on { "on" } else { "off" },
    })?;

    bitstream.unpack()?;
    bitstream.with_model(|model| -> Result<()> {
        model.packets.unpack()?;
        model.packets.with_model(|sequence| -> Result<()> {
            let packet = sequence.single_packet_named("Fdri")?;
            packet.with_model(|p| -> Result<()> {
                match &p.payload {
                    PacketPayload::Fdri(payload) => {
                        payload.unpack()?;
                        payload.with_model(|fdri| fdri.patch_io_block(pin.offset, value))?
                    }
                    _ => Err(BitstreamError::AmbiguousRegisterPacket {
                        name: "Fdri".into(),
                        count: 0,
                    }),
                }
            })?
        })?
    })??;

    debug!("patched pin {pin_name} to {}", if on { "on" } else { "off" });
    Ok(())
}
