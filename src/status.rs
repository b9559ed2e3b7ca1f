//! Status record returned by the printer.
//!
//! The record is decoded from explicit byte offsets, so the result does not
//! depend on host byte order or struct layout. Multi-byte fields are little
//! endian on the wire.

use std::fmt;

use crate::{
    error::{Error, PrinterError},
    media,
};

pub const STATUS_LEN: usize = 32;

/// Print head mark, first byte of every status record.
pub const STATUS_MARKER: u8 = 0x80;

const OFS_SIZE: usize = 1;
const OFS_BROTHER_CODE: usize = 2;
const OFS_SERIES_CODE: usize = 3;
const OFS_MODEL: usize = 4;
const OFS_COUNTRY: usize = 5;
const OFS_ERROR: usize = 8;
const OFS_MEDIA_WIDTH: usize = 10;
const OFS_MEDIA_TYPE: usize = 11;
const OFS_MODE: usize = 15;
const OFS_MEDIA_LEN: usize = 17;
const OFS_STATUS_TYPE: usize = 18;
const OFS_PHASE_TYPE: usize = 19;
const OFS_PHASE_NUMBER: usize = 20;
const OFS_NOTIFICATION: usize = 22;
const OFS_TAPE_COLOR: usize = 24;
const OFS_TEXT_COLOR: usize = 25;
const OFS_HW_SETTING: usize = 26;

///
/// Status received from the printer encoded to Rust friendly type.
///
/// A snapshot: any tape swap or error on the device makes it stale.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStatus {
    raw: [u8; STATUS_LEN],
    pub model: u8,
    pub error: u16,
    /// Installed tape width in mm.
    pub media_width: u8,
    pub media_type: u8,
    pub mode: u8,
    pub media_length: u8,
    pub status_type: StatusType,
    pub phase: Phase,
    pub notification: Notification,
    pub tape_color: u8,
    pub text_color: u8,
    pub hw_setting: u32,
}

impl DeviceStatus {
    /// Decode a status response.
    pub fn parse(buf: &[u8]) -> Result<Self, Error> {
        let marker = buf.first().copied().unwrap_or(0);
        if buf.len() != STATUS_LEN || marker != STATUS_MARKER || buf[OFS_SIZE] != STATUS_LEN as u8
        {
            return Err(Error::StatusMalformed {
                len: buf.len(),
                marker,
            });
        }

        let mut raw = [0u8; STATUS_LEN];
        raw.copy_from_slice(buf);

        Ok(DeviceStatus {
            raw,
            model: raw[OFS_MODEL],
            error: u16::from_le_bytes([raw[OFS_ERROR], raw[OFS_ERROR + 1]]),
            media_width: raw[OFS_MEDIA_WIDTH],
            media_type: raw[OFS_MEDIA_TYPE],
            mode: raw[OFS_MODE],
            media_length: raw[OFS_MEDIA_LEN],
            status_type: StatusType::from_code(raw[OFS_STATUS_TYPE]),
            phase: Phase::from_buf(&raw),
            notification: Notification::from_code(raw[OFS_NOTIFICATION]),
            tape_color: raw[OFS_TAPE_COLOR],
            text_color: raw[OFS_TEXT_COLOR],
            hw_setting: u32::from_le_bytes([
                raw[OFS_HW_SETTING],
                raw[OFS_HW_SETTING + 1],
                raw[OFS_HW_SETTING + 2],
                raw[OFS_HW_SETTING + 3],
            ]),
        })
    }

    /// The record exactly as received, reserved bytes included.
    pub fn raw(&self) -> &[u8; STATUS_LEN] {
        &self.raw
    }

    /// Identity bytes, `"B0"` on every P-Touch.
    pub fn series(&self) -> (char, char) {
        (
            self.raw[OFS_BROTHER_CODE] as char,
            self.raw[OFS_SERIES_CODE] as char,
        )
    }

    pub fn country(&self) -> u8 {
        self.raw[OFS_COUNTRY]
    }

    /// Printable pixels across the installed tape.
    pub fn tape_width_px(&self) -> u32 {
        media::tape_width_px(self.media_width)
    }

    pub fn errors(&self) -> Vec<PrinterError> {
        PrinterError::from_word(self.error)
    }

    /// Hex dump of the record, 16 bytes per row.
    pub fn hex_dump(&self) -> String {
        self.raw
            .chunks(16)
            .map(|row| {
                row.iter()
                    .map(|b| format!("{:02x}", b))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "maximum printing width for this tape is {}px",
            self.tape_width_px()
        )?;
        writeln!(
            f,
            "media type = {:02x} ({})",
            self.media_type,
            media::media_type_name(self.media_type)
        )?;
        writeln!(f, "media width = {} mm", self.media_width)?;
        writeln!(
            f,
            "tape color = {:02x} ({})",
            self.tape_color,
            media::tape_color_name(self.tape_color)
        )?;
        writeln!(
            f,
            "text color = {:02x} ({})",
            self.text_color,
            media::text_color_name(self.text_color)
        )?;
        write!(f, "error = {:04x}", self.error)
    }
}

// StatusType

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusType {
    ReplyToRequest,
    Completed,
    Error,
    Offline,
    Notification,
    PhaseChange,
    Unknown(u8),
}

impl StatusType {
    fn from_code(code: u8) -> StatusType {
        match code {
            0x00 => Self::ReplyToRequest,
            0x01 => Self::Completed,
            0x02 => Self::Error,
            0x04 => Self::Offline,
            0x05 => Self::Notification,
            0x06 => Self::PhaseChange,
            n => Self::Unknown(n),
        }
    }
}

// Phase

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Receiving(u16),
    Printing(u16),
    Other(u8, u16),
}

impl Phase {
    fn from_buf(buf: &[u8; STATUS_LEN]) -> Self {
        let number = u16::from_le_bytes([buf[OFS_PHASE_NUMBER], buf[OFS_PHASE_NUMBER + 1]]);
        match buf[OFS_PHASE_TYPE] {
            0x00 => Self::Receiving(number),
            0x01 => Self::Printing(number),
            n => Self::Other(n, number),
        }
    }
}

// Notification

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notification {
    NotAvailable,
    CoverOpen,
    CoverClosed,
}

impl Notification {
    fn from_code(code: u8) -> Self {
        match code {
            0x01 => Self::CoverOpen,
            0x02 => Self::CoverClosed,
            _ => Self::NotAvailable,
        }
    }
}
