use crate::data_object::NodeModel;
use crate::error::Result;

/// A model that never interprets its bytes: the header prefix, the sync
/// marker, RAM/CRC blocks, fabric frames, and the post-DESYNC tail are all
/// opaque at this level. Supports direct byte-range edits (§4.8) without
/// ever claiming to understand the content.
#[derive(Debug, Clone, Default)]
pub struct Opaque {
    bytes: Vec<u8>,
}

impl Opaque {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn set_bytes(&mut self, bytes: Vec<u8>) {
        self.bytes = bytes;
    }
}

impl NodeModel for Opaque {
    type DecodeArgs = ();

    fn decode(bytes: &[u8], _args: &()) -> Result<Self> {
        Ok(Opaque {
            bytes: bytes.to_vec(),
        })
    }

    fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_verbatim() {
        let model = Opaque::decode(&[1, 2, 3], &()).unwrap();
        assert_eq!(model.encode().unwrap(), vec![1, 2, 3]);
    }
}
