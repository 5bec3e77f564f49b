use std::rc::Rc;

use crate::context::IdCodeCell;
use crate::data_object::{DataObject, NodeModel};
use crate::error::{BitstreamError, Result};
use crate::format::{FdriFormat, FormatCatalog};
use crate::model::opaque::Opaque;

/// One fabric configuration frame: opaque bytes, individually addressable
/// so dirty-propagation can stay frame-granular.
pub type Frame = Rc<DataObject<Opaque>>;

/// A column of frames within a logic-block row.
#[derive(Clone)]
pub struct LogicMajor {
    pub name: String,
    pub frames: Vec<Frame>,
}

/// A row of majors within the logic block.
#[derive(Clone)]
pub struct LogicRow {
    pub majors: Vec<LogicMajor>,
}

/// Device fabric config: an ordered sequence of rows.
#[derive(Clone)]
pub struct LogicBlock {
    pub rows: Vec<LogicRow>,
}

impl LogicBlock {
    fn decode(bytes: &[u8], format: &FdriFormat) -> Result<Self> {
        let mut offset = 0;
        let mut rows = Vec::with_capacity(format.logic_block_format.len());
        for row_format in &format.logic_block_format {
            let mut majors = Vec::with_capacity(row_format.len());
            for major_format in row_format {
                let mut frames = Vec::with_capacity(major_format.frame_count);
                for _ in 0..major_format.frame_count {
                    let end = offset + major_format.frame_size;
                    let frame_bytes = bytes
                        .get(offset..end)
                        .ok_or_else(|| BitstreamError::SizeMismatch {
                            expected: end,
                            actual: bytes.len(),
                            context: format!("FDRI major {} frame", major_format.name),
                        })?;
                    frames.push(Rc::new(DataObject::new_packed(frame_bytes.to_vec(), ())));
                    offset = end;
                }
                majors.push(LogicMajor {
                    name: major_format.name.clone(),
                    frames,
                });
            }
            rows.push(LogicRow { majors });
        }

        if offset != bytes.len() {
            return Err(BitstreamError::SizeMismatch {
                expected: offset,
                actual: bytes.len(),
                context: "FDRI logic block".into(),
            });
        }
        Ok(LogicBlock { rows })
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for row in &self.rows {
            for major in &row.majors {
                for frame in &major.frames {
                    out.extend(frame.pack()?);
                }
            }
        }
        Ok(out)
    }

    fn synchronize(&self) -> Result<bool> {
        let mut any_dirty = false;
        for row in &self.rows {
            for major in &row.majors {
                for frame in &major.frames {
                    any_dirty |= frame.synchronize()?;
                }
            }
        }
        Ok(any_dirty)
    }
}

/// The type-2 payload for the FDRI register: logic block, RAM block, IO
/// block, and CRC tail, decomposed using the per-device layout (§4.6).
/// The FDRI codec requires `context.id_code` to already be set.
pub struct FdriPayload {
    pub logic_block: LogicBlock,
    pub ram_block: Rc<DataObject<Opaque>>,
    pub io_block: Rc<DataObject<Opaque>>,
    pub tail: Rc<DataObject<Opaque>>,
}

impl FdriPayload {
    pub fn io_block_bytes(&self) -> Result<Vec<u8>> {
        self.io_block.pack()
    }

    /// Splices `value` into the IO block at `offset`, failing if it would
    /// run past the block's end (§4.8 step 4). Marks the IO block dirty;
    /// propagation happens on the next `synchronize()`.
    pub fn patch_io_block(&self, offset: usize, value: &[u8]) -> Result<()> {
        let mut current = self.io_block.pack()?;
        if offset + value.len() > current.len() {
            return Err(BitstreamError::PinPatchOutOfRange {
                offset,
                len: value.len(),
                block_len: current.len(),
            });
        }
        current[offset..offset + value.len()].copy_from_slice(value);
        self.io_block.set_bytes(current, ());
        Ok(())
    }
}

/// What the FDRI codec needs to resolve a device layout lazily, at the
/// moment the payload is first unpacked — not at parse time, since the
/// device id code is usually only known after the device analyzer runs
/// (§4.6).
#[derive(Clone)]
pub struct FdriDecodeArgs {
    pub catalog: Rc<FormatCatalog>,
    pub id_code: IdCodeCell,
}

impl NodeModel for FdriPayload {
    type DecodeArgs = FdriDecodeArgs;

    fn decode(bytes: &[u8], args: &FdriDecodeArgs) -> Result<Self> {
        let id_code = args.id_code.borrow().clone().ok_or(BitstreamError::MissingIdCode)?;
        let format = args
            .catalog
            .fdri_format_by_device(&id_code)
            .ok_or_else(|| BitstreamError::UnknownDevice(id_code.clone()))?;
        let expected = format.expected_payload_size();
        if bytes.len() != expected {
            return Err(BitstreamError::SizeMismatch {
                expected,
                actual: bytes.len(),
                context: format!("FDRI payload for device {}", format.device_name),
            });
        }

        let (logic_bytes, rest) = bytes.split_at(format.logic_block_size);
        let (ram_bytes, rest) = rest.split_at(format.bram_block_size);
        let (io_bytes, crc_bytes) = rest.split_at(format.io_block_size);

        Ok(FdriPayload {
            logic_block: LogicBlock::decode(logic_bytes, format)?,
            ram_block: Rc::new(DataObject::new_packed(ram_bytes.to_vec(), ())),
            io_block: Rc::new(DataObject::new_packed(io_bytes.to_vec(), ())),
            tail: Rc::new(DataObject::new_packed(crc_bytes.to_vec(), ())),
        })
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let mut out = self.logic_block.encode()?;
        out.extend(self.ram_block.pack()?);
        out.extend(self.io_block.pack()?);
        out.extend(self.tail.pack()?);
        Ok(out)
    }

    fn synchronize_children(&self) -> Result<bool> {
        let mut any_dirty = self.logic_block.synchronize()?;
        any_dirty |= self.ram_block.synchronize()?;
        any_dirty |= self.io_block.synchronize()?;
        any_dirty |= self.tail.synchronize()?;
        Ok(any_dirty)
    }
}
