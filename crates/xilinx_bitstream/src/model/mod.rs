//! Concrete [`crate::data_object::NodeModel`] implementations for every
//! entity in the tree (§3.1).

pub mod bitstream;
pub mod fdri;
pub mod opaque;
pub mod packet;
pub mod type1;

pub use bitstream::{Bitstream, BitstreamDecodeArgs, PacketSequence};
pub use fdri::{FdriDecodeArgs, FdriPayload, LogicBlock, LogicMajor, LogicRow};
pub use opaque::Opaque;
pub use packet::{Packet, PacketDecodeArgs, PacketHeader, PacketPayload};
pub use type1::{Attribute, Type1Payload};
