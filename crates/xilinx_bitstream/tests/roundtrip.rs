//! End-to-end exercise: parse a synthetic bitstream, identify the device,
//! patch an IO pin, and verify the whole thing round-trips byte-for-byte
//! apart from the one patched byte.

use xilinx_bitstream::analyzers::analyze_device;
use xilinx_bitstream::context::Context;
use xilinx_bitstream::format::schema::{
    AttributeValueSchema, FdriFormatSchema, FdriIoBlockFormatSchema, FdriIoPinSchema, RegisterAttributeSchema,
    RegisterFormatSchema,
};
use xilinx_bitstream::format::{FormatCatalog, FormatCatalogBuilder};
use xilinx_bitstream::modifiers::set_io_pin;

const IO_BLOCK_SIZE: usize = 500;

fn catalog() -> FormatCatalog {
    FormatCatalogBuilder::new()
        .add_register(RegisterFormatSchema {
            address: 12,
            name: "Idcode".into(),
            description: "device identification".into(),
            attributes: vec![RegisterAttributeSchema {
                name: "idcode".into(),
                bit_size: 32,
                description: String::new(),
                values: vec![AttributeValueSchema {
                    value: 67_113_107,
                    name: "LX9".into(),
                    description: String::new(),
                }],
            }],
        })
        .add_register(RegisterFormatSchema {
            address: 4,
            name: "Cmd".into(),
            description: String::new(),
            attributes: vec![RegisterAttributeSchema {
                name: "command".into(),
                bit_size: 32,
                description: String::new(),
                values: vec![AttributeValueSchema {
                    value: 0x0D,
                    name: "DESYNC".into(),
                    description: String::new(),
                }],
            }],
        })
        .add_register(RegisterFormatSchema {
            address: 2,
            name: "Fdri".into(),
            description: String::new(),
            attributes: vec![RegisterAttributeSchema {
                name: "data".into(),
                bit_size: 32,
                description: String::new(),
                values: vec![],
            }],
        })
        .add_fdri_format(FdriFormatSchema {
            device_name: "LX9".into(),
            logic_block_size: 0,
            bram_block_size: 0,
            io_block_size: IO_BLOCK_SIZE,
            crc_size: 0,
        })
        .add_fdri_io_block_format(FdriIoBlockFormatSchema {
            device_name: "LX9".into(),
            io_block_format: vec![FdriIoPinSchema {
                pin_name: "P134".into(),
                offset: 3,
                on_value: Some("FF".into()),
                off_value: Some("00".into()),
            }],
        })
        .build()
        .expect("catalog builds")
}

fn header(packet_type: u8, opcode: u8, register_address: u8, word_count: u8) -> [u8; 2] {
    let value = ((packet_type as u16) << 13)
        | ((opcode as u16) << 11)
        | ((register_address as u16) << 5)
        | word_count as u16;
    value.to_be_bytes()
}

fn sample_bitstream() -> Vec<u8> {
    let mut bytes = vec![0xDE, 0xAD, 0xBE, 0xEF]; // opaque vendor header
    bytes.extend_from_slice(&xilinx_bitstream::format::DEFAULT_SYNC_WORD);

    // Idcode write.
    bytes.extend_from_slice(&header(1, 2, 12, 1));
    bytes.extend_from_slice(&67_113_107u32.to_be_bytes());

    // Fdri write, preceded by its own type-1 NOOP so the type-2 rule holds.
    bytes.extend_from_slice(&header(1, 0, 2, 0));
    bytes.extend_from_slice(&header(2, 2, 2, 0));
    let word_count = (IO_BLOCK_SIZE / 4) as u32;
    bytes.extend_from_slice(&(word_count - 2).to_be_bytes());
    let mut io_block = vec![0u8; IO_BLOCK_SIZE];
    io_block[3] = 0xFF;
    bytes.extend_from_slice(&io_block);

    // Cmd/DESYNC, terminating the stream.
    bytes.extend_from_slice(&header(1, 2, 4, 1));
    bytes.extend_from_slice(&0x0Du32.to_be_bytes());

    // Trailing opaque bytes, preserved verbatim after DESYNC.
    bytes.extend_from_slice(&[0x01, 0x02, 0x03, 0x04]);

    bytes
}

#[test]
fn unpatched_bitstream_round_trips_byte_for_byte() {
    let context = Context::new(catalog());
    let raw = sample_bitstream();
    let root = context.bitstream(&raw);
    assert_eq!(root.pack().unwrap(), raw);
}

#[test]
fn device_identification_then_pin_patch_changes_only_the_pin_byte() {
    let context = Context::new(catalog());
    let raw = sample_bitstream();
    let root = context.bitstream(&raw);

    let device = analyze_device(&context, &root).unwrap();
    assert_eq!(device, "LX9");

    set_io_pin(&context, &root, "P134", false).unwrap();
    root.synchronize().unwrap();
    let patched = root.pack().unwrap();

    assert_eq!(patched.len(), raw.len());
    let differences: Vec<usize> = raw
        .iter()
        .zip(patched.iter())
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(i, _)| i)
        .collect();
    // header(4) + sync(4) + idcode packet(6) + noop(2) + fdri header(6) = 22,
    // plus the pin's offset within the io block.
    assert_eq!(differences, vec![22 + 3]);
    assert_eq!(patched[22 + 3], 0x00);

    // Trailing DESYNC tail is untouched.
    assert_eq!(&patched[patched.len() - 4..], &[0x01, 0x02, 0x03, 0x04]);
}
