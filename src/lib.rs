//! P-Touch Printer Driver
//!
//! This crate drives Brother P-Touch label printers over USB: it composes a
//! label from images, text, cut marks and padding, converts it to raster
//! lines and runs the printer's command protocol.
//!
//! # Example
//!
//! ```rust,no_run
//! use ptouch::{Compositor, FontRenderer, PrintJob, PrintJobOptions, Printer, RenderConfig};
//!
//! # fn main() -> Result<(), ptouch::Error> {
//! let mut printer = Printer::open()?;
//! printer.initialize()?;
//! let tape_width = printer.query_status()?.tape_width_px();
//!
//! let config = RenderConfig::new();
//! let font = FontRenderer::find(config.font_name())?;
//! let mut label = Compositor::new(tape_width, &config);
//! label.text(&["Hello".to_string()], &font)?.cutmark();
//!
//! if let Some(canvas) = label.finish() {
//!     PrintJob::new(&mut printer, PrintJobOptions::new()).run(&canvas)?;
//! }
//! printer.close()
//! # }
//! ```

pub mod canvas;
pub mod command;
pub mod compositor;
pub mod config;
mod error;
pub mod job;
pub mod media;
pub mod model;
pub mod printer;
pub mod raster;
pub mod status;
pub mod text;
pub mod transport;

pub use crate::{
    canvas::Canvas,
    command::{Feed, PageFlags},
    compositor::Compositor,
    config::RenderConfig,
    error::{Error, PrinterError},
    job::{PrintJob, PrintJobOptions},
    model::{DeviceIdentity, Quirk, QuirkProfile},
    printer::{PageSetup, Printer, State},
    raster::RasterEncoder,
    status::DeviceStatus,
    text::{FontRenderer, GlyphRenderer},
    transport::{Transport, UsbTransport},
};
