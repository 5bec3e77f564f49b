//! The 16-bit packet header wire layout (§4.4):
//!
//! ```text
//!  bit 15..13 : type          (3 bits)
//!  bit 12..11 : opcode        (2 bits)
//!  bit 10..5  : register_addr (6 bits)
//!  bit  4..0  : word_count    (5 bits)
//! ```
//!
//! Decoded/encoded as a big-endian 16-bit integer via explicit shifts and
//! masks — never via native struct bit-fields, whose layout is
//! platform-dependent.

use crate::model::packet::PacketHeader;

pub fn decode_header(value: u16) -> PacketHeader {
    PacketHeader {
        packet_type: ((value >> 13) & 0b111) as u8,
        opcode: ((value >> 11) & 0b11) as u8,
        register_address: ((value >> 5) & 0b11_1111) as u8,
        word_count: (value & 0b1_1111) as u8,
    }
}

pub fn encode_header(header: &PacketHeader) -> u16 {
    ((header.packet_type as u16 & 0b111) << 13)
        | ((header.opcode as u16 & 0b11) << 11)
        | ((header.register_address as u16 & 0b11_1111) << 5)
        | (header.word_count as u16 & 0b1_1111)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_scenario_1() {
        let value = u16::from_be_bytes([0x30, 0xA1]);
        let header = decode_header(value);
        assert_eq!(header.packet_type, 1);
        assert_eq!(header.opcode, 2);
        assert_eq!(header.register_address, 5);
        assert_eq!(header.word_count, 1);
    }

    #[test]
    fn encodes_scenario_1() {
        let header = PacketHeader {
            packet_type: 1,
            opcode: 2,
            register_address: 5,
            word_count: 1,
        };
        assert_eq!(encode_header(&header).to_be_bytes(), [0x30, 0xA1]);
    }

    #[test]
    fn bijection_over_full_field_ranges() {
        for packet_type in 0..8u8 {
            for opcode in 0..4u8 {
                for register_address in 0..64u8 {
                    for word_count in 0..32u8 {
                        let header = PacketHeader {
                            packet_type,
                            opcode,
                            register_address,
                            word_count,
                        };
                        let encoded = encode_header(&header);
                        assert_eq!(decode_header(encoded), header);
                    }
                }
            }
        }
    }
}
