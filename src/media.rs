//! Tape geometry and the names of media, tape and text colour codes.

/// Printable pixels reported for a tape width that is not in the table.
pub const UNKNOWN_TAPE_PX: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapeSpec {
    /// Tape width in mm, as reported by the status record.
    pub mm: u8,
    /// Printable area in pixels across the tape.
    pub px: u32,
}

const TAPES: [TapeSpec; 8] = [
    TapeSpec { mm: 4, px: 24 }, // 3.5mm tape
    TapeSpec { mm: 6, px: 32 },
    TapeSpec { mm: 9, px: 52 },
    TapeSpec { mm: 12, px: 76 },
    TapeSpec { mm: 18, px: 120 },
    TapeSpec { mm: 21, px: 124 },
    TapeSpec { mm: 24, px: 128 },
    TapeSpec { mm: 36, px: 192 },
];

impl TapeSpec {
    pub fn from_mm(mm: u8) -> Option<Self> {
        TAPES.iter().find(|t| t.mm == mm).copied()
    }
}

/// Printable pixels for a tape width in mm.
pub fn tape_width_px(mm: u8) -> u32 {
    TapeSpec::from_mm(mm).map_or(UNKNOWN_TAPE_PX, |t| t.px)
}

pub fn media_type_name(code: u8) -> &'static str {
    match code {
        0x00 => "No media",
        0x01 => "Laminated tape",
        0x03 => "Non-laminated tape",
        0x04 => "Fabric tape",
        0x11 => "Heat-shrink tube",
        0x13 => "Fle tape",
        0x14 => "Flexible ID tape",
        0x15 => "Satin tape",
        0xff => "Incompatible tape",
        _ => "unknown",
    }
}

pub fn tape_color_name(code: u8) -> &'static str {
    match code {
        0x01 => "White",
        0x02 => "Other",
        0x03 => "Clear",
        0x04 => "Red",
        0x05 => "Blue",
        0x06 => "Yellow",
        0x07 => "Green",
        0x08 => "Black",
        0x09 => "Clear(White text)",
        0x20 => "Matte White",
        0x21 => "Matte Clear",
        0x22 => "Matte Silver",
        0x23 => "Satin Gold",
        0x24 => "Satin Silver",
        0x30 => "Blue(D)",
        0x31 => "Red(D)",
        0x40 => "Fluorescent Orange",
        0x41 => "Fluorescent Yellow",
        0x50 => "Berry Pink(S)",
        0x51 => "Light Gray(S)",
        0x52 => "Lime Green(S)",
        0x60 => "Yellow(F)",
        0x61 => "Pink(F)",
        0x62 => "Blue(F)",
        0x70 => "White(Heat-shrink Tube)",
        0x90 => "White(Flex. ID)",
        0x91 => "Yellow(Flex. ID)",
        0xf0 => "Cleaning",
        0xf1 => "Stencil",
        0xff => "Incompatible",
        _ => "unknown",
    }
}

pub fn text_color_name(code: u8) -> &'static str {
    match code {
        0x01 => "White",
        0x02 => "Other",
        0x04 => "Red",
        0x05 => "Blue",
        0x08 => "Black",
        0x0a => "Gold",
        0x62 => "Blue(F)",
        0xf0 => "Cleaning",
        0xf1 => "Stencil",
        0xff => "Incompatible",
        _ => "unknown",
    }
}
