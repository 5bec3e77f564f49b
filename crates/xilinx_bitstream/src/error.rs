use thiserror::Error;

/// All fatal error kinds the codec can produce. Every variant carries enough
/// context (an address, a name, or a byte offset) to identify the offending
/// entity; there is no retry path, errors always propagate to the caller.
#[derive(Debug, Error)]
pub enum BitstreamError {
    #[error("sync marker not found in input")]
    SyncMarkerMissing,

    #[error("truncated input: expected at least {expected} bytes, got {actual}")]
    TruncatedInput { expected: usize, actual: usize },

    #[error("unknown register address {0}")]
    UnknownRegister(u8),

    #[error("unexpected packet type {0}")]
    UnexpectedPacketType(u8),

    #[error("type-2 packet not preceded by a type-1 packet (previous type: {0:?})")]
    UnexpectedType2AfterType(Option<u8>),

    #[error("NOOP packet carries a non-zero payload")]
    NoopWithPayload,

    #[error("size mismatch in {context}: expected {expected}, got {actual}")]
    SizeMismatch {
        expected: usize,
        actual: usize,
        context: String,
    },

    #[error("FDRI payload decoded before device identification (id_code missing)")]
    MissingIdCode,

    #[error("no FDRI layout registered for device {0}")]
    UnknownDevice(String),

    #[error("unknown IO pin {0}")]
    UnknownIoPin(String),

    #[error("pin {name} has no {state} value configured")]
    PinValueUnavailable { name: String, state: &'static str },

    #[error("pin patch out of range: offset {offset} + len {len} > block length {block_len}")]
    PinPatchOutOfRange {
        offset: usize,
        len: usize,
        block_len: usize,
    },

    #[error("expected exactly one {name} packet, found {count}")]
    AmbiguousRegisterPacket { name: String, count: usize },

    #[error("no codec registered for model kind {0}")]
    NoCodecForKind(&'static str),
}

pub type Result<T> = std::result::Result<T, BitstreamError>;
