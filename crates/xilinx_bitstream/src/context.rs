use std::cell::RefCell;
use std::rc::Rc;

use crate::data_object::DataObject;
use crate::format::FormatCatalog;
use crate::model::{Bitstream, BitstreamDecodeArgs};

/// Shared handle to the context's resolved device id code. Children carry
/// a clone of this (not a back-pointer to `Context` itself) so the FDRI
/// codec can resolve the device layout lazily, at unpack time, without
/// owning the context (§3.3, §9).
pub type IdCodeCell = Rc<RefCell<Option<String>>>;

/// Shared, read-only lookup capability (the format catalog) plus the one
/// piece of cross-cutting mutable state the core needs: the resolved
/// device id code (§3.3, §4.6, §4.7). Children hold a reference to this,
/// never ownership — it is looked up, not owned.
pub struct Context {
    pub catalog: Rc<FormatCatalog>,
    id_code: IdCodeCell,
}

impl Context {
    pub fn new(catalog: FormatCatalog) -> Self {
        Self {
            catalog: Rc::new(catalog),
            id_code: Rc::new(RefCell::new(None)),
        }
    }

    pub fn id_code(&self) -> Option<String> {
        self.id_code.borrow().clone()
    }

    pub fn set_id_code(&self, id_code: impl Into<String>) {
        *self.id_code.borrow_mut() = Some(id_code.into());
    }

    /// A clone of the shared id-code cell, handed to children that need to
    /// resolve it lazily (the FDRI codec).
    pub fn id_code_cell(&self) -> IdCodeCell {
        self.id_code.clone()
    }

    /// Wraps `raw` as a packed root [`Bitstream`] DataObject (§6.3). Nothing
    /// is decoded yet; the header/sync split happens lazily on first
    /// `unpack()`/`pack()`.
    pub fn bitstream(&self, raw: &[u8]) -> Rc<DataObject<Bitstream>> {
        let args = BitstreamDecodeArgs {
            catalog: self.catalog.clone(),
            id_code: self.id_code.clone(),
        };
        Rc::new(DataObject::new_packed(raw.to_vec(), args))
    }

    /// Eagerly unpacks every level of the tree: the root, every packet,
    /// and every type-1/FDRI payload (including FDRI's fabric frames).
    /// FDRI payloads are skipped unless `id_code` is already known, since
    /// unpacking them would otherwise fail with `MissingIdCode`.
    pub fn unpack_all(&self, root: &DataObject<Bitstream>) -> crate::error::Result<()> {
        root.unpack()?;
        root.with_model(|bitstream| -> crate::error::Result<()> {
            bitstream.header.unpack()?;
            bitstream.sync_marker.unpack()?;
            bitstream.packets.unpack()?;
            bitstream.packets.with_model(|sequence| -> crate::error::Result<()> {
                for packet in sequence.items() {
                    packet.unpack()?;
                    packet.with_model(|p| -> crate::error::Result<()> {
                        match &p.payload {
                            crate::model::PacketPayload::Type1(payload) => {
                                payload.unpack()?;
                            }
                            crate::model::PacketPayload::Type2Opaque(payload) => {
                                payload.unpack()?;
                            }
                            crate::model::PacketPayload::Fdri(payload) => {
                                if self.id_code().is_some() {
                                    payload.unpack()?;
                                    payload.with_model(|fdri| -> crate::error::Result<()> {
                                        for row in &fdri.logic_block.rows {
                                            for major in &row.majors {
                                                for frame in &major.frames {
                                                    frame.unpack()?;
                                                }
                                            }
                                        }
                                        fdri.ram_block.unpack()?;
                                        fdri.io_block.unpack()?;
                                        fdri.tail.unpack()
                                    })??;
                                }
                            }
                            crate::model::PacketPayload::None => {}
                        }
                        Ok(())
                    })??;
                }
                Ok(())
            })?
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_code_starts_unset_and_is_settable() {
        let ctx = Context::new(crate::format::FormatCatalogBuilder::new().build().unwrap());
        assert_eq!(ctx.id_code(), None);
        ctx.set_id_code("LX9");
        assert_eq!(ctx.id_code(), Some("LX9".to_string()));
    }
}
