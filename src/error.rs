//! Error types for P-Touch printer operations.
//!
//! This module defines all errors that can occur while composing a label,
//! talking to the printer and writing output files.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for P-Touch printer operations.
///
/// Every protocol step reports its own variant so the caller can name the
/// exact condition. Nothing in this crate retries on error.
#[derive(Error, Debug)]
pub enum Error {
    /// USB communication error.
    ///
    /// Wraps underlying rusb errors for device communication issues,
    /// timeouts, or permission problems.
    #[error(transparent)]
    UsbError(#[from] rusb::Error),

    /// No supported printer is attached.
    #[error("No P-Touch printer found on USB (remember to put switch to position E)")]
    DeviceNotFound,

    /// The printer was found but its interface could not be claimed.
    #[error("Printer {name} is busy: {source}")]
    DeviceBusy {
        name: &'static str,
        source: rusb::Error,
    },

    #[error("Can't read device list, permission issue ?")]
    DeviceListNotReadable,

    #[error("Device is missing endpoint")]
    MissingEndpoint,

    #[error("Status request return no response")]
    StatusTimeout,

    #[error("Malformed status response: {len} bytes, marker {marker:#04x}")]
    StatusMalformed { len: usize, marker: u8 },

    /// The model is known but its raster protocol is not.
    #[error("{0} is not supported (raster mode unknown)")]
    RasterModeUnsupported(&'static str),

    #[error("Image is too large ({length}px x {height}px), maximum printing width for this tape is {max}px")]
    CanvasTooWide { length: u32, height: u32, max: u32 },

    /// Short write to the printer. Fatal for the running job.
    #[error("Transmit error: wrote {written} of {expected} bytes")]
    TransmitError { written: usize, expected: usize },

    #[error("Font size {font_size} too large: text needs {needed}px on a {tape_width}px tape")]
    TextTooTall {
        font_size: u32,
        needed: u32,
        tape_width: u32,
    },

    #[error("Could not estimate needed font size for {0:?}")]
    NoFeasibleFontSize(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Failed to load image file {path:?}: {reason}")]
    ImageLoadFailed { path: PathBuf, reason: String },

    #[error("Writing image {path:?} failed: {reason}")]
    FileWriteFailed { path: PathBuf, reason: String },

    /// A protocol step was requested out of order.
    #[error("Can't {operation} while printer is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Invalid configuration parameter: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Process exit code for the command line tool.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DeviceNotFound | Self::DeviceBusy { .. } | Self::DeviceListNotReadable => 5,
            Self::StatusTimeout | Self::StatusMalformed { .. } => 3,
            Self::TransmitError { .. }
            | Self::RasterModeUnsupported(_)
            | Self::InvalidState { .. }
            | Self::MissingEndpoint
            | Self::UsbError(_) => 4,
            _ => 1,
        }
    }
}

/// Hardware-specific errors reported by the printer.
///
/// These are decoded from the 16-bit error word of the status record and
/// indicate physical problems that need user intervention.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrinterError {
    // Error information 1
    #[error("No media is installed")]
    NoMedia,

    #[error("End of media")]
    EndOfMedia,

    #[error("Cutter jam")]
    CutterJam,

    #[error("Weak batteries")]
    WeakBatteries,

    #[error("Printer is in use")]
    PrinterInUse,

    #[error("Printer was turned off")]
    TurnedOff,

    #[error("High-voltage adapter")]
    HighVoltageAdapter,

    #[error("Fan motor error")]
    FanMotorError,

    // Error information 2
    #[error("Installed media is not match")]
    InvalidMedia,

    #[error("Expansion buffer is full")]
    BufferFull,

    #[error("Communication error")]
    CommunicationError,

    #[error("Communication buffer is full")]
    CommunicationBufferFull,

    #[error("Cover is open")]
    CoverOpen,

    #[error("Overheating")]
    Overheating,

    #[error("Media can not be fed")]
    FeedMediaFail,

    #[error("System error")]
    SystemError,
}

impl PrinterError {
    const TABLE: [(u16, PrinterError); 16] = [
        (0x0001, Self::NoMedia),
        (0x0002, Self::EndOfMedia),
        (0x0004, Self::CutterJam),
        (0x0008, Self::WeakBatteries),
        (0x0010, Self::PrinterInUse),
        (0x0020, Self::TurnedOff),
        (0x0040, Self::HighVoltageAdapter),
        (0x0080, Self::FanMotorError),
        (0x0100, Self::InvalidMedia),
        (0x0200, Self::BufferFull),
        (0x0400, Self::CommunicationError),
        (0x0800, Self::CommunicationBufferFull),
        (0x1000, Self::CoverOpen),
        (0x2000, Self::Overheating),
        (0x4000, Self::FeedMediaFail),
        (0x8000, Self::SystemError),
    ];

    /// Decode every error set in the status error word.
    ///
    /// The low byte is "error information 1", the high byte "error information 2".
    pub fn from_word(word: u16) -> Vec<Self> {
        Self::TABLE
            .iter()
            .filter(|(bit, _)| word & bit != 0)
            .map(|(_, err)| *err)
            .collect()
    }
}
