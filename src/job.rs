//! Print job orchestration.

use log::{debug, info};

use crate::{
    canvas::Canvas,
    command::Feed,
    error::Error,
    model::Quirk,
    printer::{PageSetup, Printer, State},
    transport::Transport,
};

/// Options for one print job
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintJobOptions {
    chain: bool,
    copies: u32,
    precut: bool,
    mirror: bool,
    forced_tape_width: Option<u32>,
}

impl Default for PrintJobOptions {
    fn default() -> Self {
        PrintJobOptions {
            chain: false,
            copies: 1,
            precut: true,
            mirror: false,
            forced_tape_width: None,
        }
    }
}

impl PrintJobOptions {
    /// One copy, cut after printing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Join all copies into one strip, no cut between them.
    pub fn chain(self, chain: bool) -> Self {
        PrintJobOptions { chain, ..self }
    }

    pub fn copies(self, copies: u32) -> Self {
        PrintJobOptions { copies, ..self }
    }

    pub fn precut(self, precut: bool) -> Self {
        PrintJobOptions { precut, ..self }
    }

    pub fn mirror(self, mirror: bool) -> Self {
        PrintJobOptions { mirror, ..self }
    }

    /// Use this tape width instead of asking the printer.
    pub fn force_tape_width(self, px: u32) -> Self {
        PrintJobOptions {
            forced_tape_width: Some(px),
            ..self
        }
    }

    pub fn is_chained(&self) -> bool {
        self.chain
    }

    pub fn copy_count(&self) -> u32 {
        self.copies
    }

    pub fn forced_tape_width(&self) -> Option<u32> {
        self.forced_tape_width
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.copies == 0 {
            return Err(Error::InvalidConfig("copies must be at least 1".to_string()));
        }
        if self.forced_tape_width == Some(0) {
            return Err(Error::InvalidConfig(
                "forced tape width must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Feed after copy `index` (zero based). Only the last copy is fed out.
    pub fn feed_after(&self, index: u32) -> Feed {
        if index + 1 < self.copies {
            Feed::None
        } else {
            Feed::Large
        }
    }
}

/// Drives a [`Printer`] through one complete job.
pub struct PrintJob<'a, T: Transport> {
    printer: &'a mut Printer<T>,
    options: PrintJobOptions,
}

impl<'a, T: Transport> PrintJob<'a, T> {
    pub fn new(printer: &'a mut Printer<T>, options: PrintJobOptions) -> Self {
        PrintJob { printer, options }
    }

    /// Tape width to print on, asking the printer unless it is forced.
    ///
    /// A status read by an earlier job may be stale, so it is always re-read.
    fn tape_width(&mut self) -> Result<u32, Error> {
        if self.printer.state() == State::Opened {
            self.printer.initialize()?;
        }
        match self.options.forced_tape_width {
            Some(px) => Ok(px),
            None => Ok(self.printer.query_status()?.tape_width_px()),
        }
    }

    /// Print `canvas` the requested number of times.
    ///
    /// The canvas is checked against the tape before anything is sent. A
    /// failed raster line ends the job, nothing more is sent to the printer.
    pub fn run(&mut self, canvas: &Canvas) -> Result<(), Error> {
        let profile = self.printer.profile();
        if profile.has(Quirk::UnsupportedRaster) {
            return Err(Error::RasterModeUnsupported(profile.name));
        }
        self.options.validate()?;
        if canvas.width() == 0 || canvas.height() == 0 {
            return Err(Error::InvalidConfig("nothing to print".to_string()));
        }

        let max = self.tape_width()?.min(profile.max_px);
        if canvas.height() > max {
            return Err(Error::CanvasTooWide {
                length: canvas.width(),
                height: canvas.height(),
                max,
            });
        }

        let encoder = *self.printer.encoder();
        let copies = self.options.copies;
        for index in 0..copies {
            let feed = self.options.feed_after(index);
            let last = index + 1 == copies;
            info!("printing copy {} of {}", index + 1, copies);

            self.printer.enter_raster_mode()?;
            self.printer.apply_preamble(&PageSetup {
                raster_lines: canvas.width(),
                chain: self.options.chain && !last,
                precut: self.options.precut,
                mirror: self.options.mirror,
            })?;
            for line in encoder.lines(canvas) {
                self.printer.send_raster_line(&line)?;
            }
            debug!("{} raster lines sent", canvas.width());
            self.printer.finalize(feed)?;
        }
        Ok(())
    }
}
