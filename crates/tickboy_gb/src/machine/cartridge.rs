use crate::error::GbError;

/// Smallest image that still contains a complete header.
pub const MIN_CARTRIDGE_SIZE: usize = 0x150;

const TITLE: std::ops::Range<usize> = 0x134..0x144;
const CARTRIDGE_TYPE: usize = 0x147;
const ROM_SIZE: usize = 0x148;
const RAM_SIZE: usize = 0x149;
const HEADER_CHECKSUM: usize = 0x14D;
const GLOBAL_CHECKSUM: usize = 0x14E;

/// Fields parsed from the cartridge header at $0134-$014F.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartridgeHeader {
    pub title: String,
    pub cartridge_type: u8,
    pub rom_banks: usize,
    pub ram_banks: usize,
    pub header_checksum: u8,
    pub global_checksum: u16,
}

impl CartridgeHeader {
    fn parse(rom: &[u8]) -> Self {
        let title = rom[TITLE]
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect::<String>();

        let ram_banks = match rom[RAM_SIZE] {
            0x02 => 1,
            0x03 => 4,
            0x04 => 16,
            0x05 => 8,
            _ => 0,
        };

        Self {
            title,
            cartridge_type: rom[CARTRIDGE_TYPE],
            rom_banks: 2usize << rom[ROM_SIZE].min(8),
            ram_banks,
            header_checksum: rom[HEADER_CHECKSUM],
            global_checksum: u16::from_be_bytes([rom[GLOBAL_CHECKSUM], rom[GLOBAL_CHECKSUM + 1]]),
        }
    }
}

/// Header checksum as computed by the boot ROM over $0134-$014C.
pub fn header_checksum(rom: &[u8]) -> u8 {
    rom[0x134..=0x14C]
        .iter()
        .fold(0u8, |x, &b| x.wrapping_sub(b).wrapping_sub(1))
}

/// An immutable ROM image and its parsed header.
#[derive(Clone, Debug)]
pub struct Cartridge {
    rom: Vec<u8>,
    header: CartridgeHeader,
}

impl Cartridge {
    pub fn from_bytes(rom: Vec<u8>) -> Result<Self, GbError> {
        if rom.len() < MIN_CARTRIDGE_SIZE {
            return Err(GbError::InvalidCartridgeSize {
                actual: rom.len(),
                minimum: MIN_CARTRIDGE_SIZE,
            });
        }

        let header = CartridgeHeader::parse(&rom);
        let computed = header_checksum(&rom);
        if computed != header.header_checksum {
            log::warn!(
                "GB cartridge: header checksum mismatch (header=0x{:02X} computed=0x{:02X})",
                header.header_checksum,
                computed
            );
        }

        Ok(Self { rom, header })
    }

    pub fn rom(&self) -> &[u8] {
        &self.rom
    }

    pub fn header(&self) -> &CartridgeHeader {
        &self.header
    }

    pub fn title(&self) -> &str {
        &self.header.title
    }
}
