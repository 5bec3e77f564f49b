/// One "major" column descriptor within a logic-block row.
#[derive(Debug, Clone)]
pub struct FdriMajorFormat {
    pub name: String,
    pub frame_size: usize,
    pub frame_count: usize,
    pub frame_descriptions: Vec<String>,
}

impl FdriMajorFormat {
    pub fn total_size(&self) -> usize {
        self.frame_size * self.frame_count
    }
}

/// A single IO pin's byte-range patch values within the FDRI IO block.
#[derive(Debug, Clone)]
pub struct FdriIoPin {
    pub name: String,
    pub offset: usize,
    pub on_value: Option<Vec<u8>>,
    pub off_value: Option<Vec<u8>>,
}

/// Per-device FDRI layout: block sizes, the logic-block row/major matrix,
/// and the IO-pin offset table.
#[derive(Debug, Clone)]
pub struct FdriFormat {
    pub device_name: String,
    pub logic_block_size: usize,
    pub bram_block_size: usize,
    pub io_block_size: usize,
    pub crc_size: usize,
    /// Outer = rows, inner = majors.
    pub logic_block_format: Vec<Vec<FdriMajorFormat>>,
    pub io_block_format: Vec<FdriIoPin>,
}

impl FdriFormat {
    pub fn expected_payload_size(&self) -> usize {
        self.logic_block_size + self.bram_block_size + self.io_block_size + self.crc_size
    }

    pub fn get_io_pin_by_name(&self, name: &str) -> Option<&FdriIoPin> {
        self.io_block_format.iter().find(|p| p.name == name)
    }
}
