use log::{debug, info, warn};
use std::{fmt, thread, time::Duration};

use crate::{
    command::{self, Feed, PageFlags},
    error::Error,
    model::{Quirk, QuirkProfile},
    raster::RasterEncoder,
    status::{DeviceStatus, STATUS_LEN},
    transport::{Transport, UsbTransport},
};

/// Timeout of a single status read.
pub const STATUS_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Empty status reads tolerated before giving up.
pub const STATUS_POLLS: u32 = 10;

const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Where a [`Printer`] is in the print sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Closed,
    Opened,
    Initialized,
    StatusKnown,
    RasterMode,
    Transmitting,
    /// A raster line failed to transmit, only finalize or close remain.
    Aborted,
}

impl State {
    fn name(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Opened => "opened",
            Self::Initialized => "initialized",
            Self::StatusKnown => "status known",
            Self::RasterMode => "in raster mode",
            Self::Transmitting => "transmitting",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per page settings sent ahead of the raster data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageSetup {
    /// Number of raster lines that follow.
    pub raster_lines: u32,
    /// Continue the strip, no cut after this page.
    pub chain: bool,
    pub precut: bool,
    pub mirror: bool,
}

/// One optional command of the preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreambleStep {
    Information { media_width: u8, raster_lines: u32, magic: bool },
    Chain,
    Magic,
    PageMode(PageFlags),
}

impl PreambleStep {
    pub fn bytes(&self) -> Vec<u8> {
        match *self {
            Self::Information {
                media_width,
                raster_lines,
                magic,
            } => command::print_information(media_width, raster_lines, magic).to_vec(),
            Self::Chain => command::chain().to_vec(),
            Self::Magic => command::magic().to_vec(),
            Self::PageMode(flags) => command::page_mode(Feed::None, flags).to_vec(),
        }
    }
}

/// Commands a profile needs between raster mode and the first raster line.
///
/// The order is fixed: print information, chain, vendor magic, page mode.
pub fn plan_preamble(profile: &QuirkProfile, media_width: u8, page: &PageSetup) -> Vec<PreambleStep> {
    let mut steps = Vec::new();

    if profile.has(Quirk::InfoCommand) {
        steps.push(PreambleStep::Information {
            media_width,
            raster_lines: page.raster_lines,
            magic: profile.has(Quirk::D460btMagic),
        });
    }
    if profile.has(Quirk::D460btMagic) {
        if page.chain {
            steps.push(PreambleStep::Chain);
        }
        steps.push(PreambleStep::Magic);
    }
    if profile.has(Quirk::Precut) {
        let mut flags = PageFlags::empty();
        flags.set(PageFlags::AUTO_CUT, page.precut);
        flags.set(PageFlags::MIRROR, page.mirror);
        if !flags.is_empty() {
            steps.push(PreambleStep::PageMode(flags));
        }
    } else if page.precut || page.mirror {
        debug!("{} has no page mode command, precut/mirror ignored", profile.name);
    }
    steps
}

/// One connection to a P-Touch printer.
///
/// Protocol steps must be called in order: [`initialize`](Self::initialize),
/// [`query_status`](Self::query_status), [`enter_raster_mode`](Self::enter_raster_mode),
/// [`apply_preamble`](Self::apply_preamble), any number of
/// [`send_raster_line`](Self::send_raster_line), then [`finalize`](Self::finalize).
/// The device is released by [`close`](Self::close) or on drop.
pub struct Printer<T: Transport = UsbTransport> {
    transport: T,
    profile: &'static QuirkProfile,
    encoder: RasterEncoder,
    status: Option<DeviceStatus>,
    state: State,
    preamble_sent: bool,
}

impl Printer<UsbTransport> {
    /// Open the first supported printer attached over USB.
    pub fn open() -> Result<Self, Error> {
        let (transport, profile) = UsbTransport::open()?;
        Ok(Printer::new(transport, profile))
    }
}

impl<T: Transport> Printer<T> {
    pub fn new(transport: T, profile: &'static QuirkProfile) -> Self {
        Printer {
            transport,
            profile,
            encoder: RasterEncoder::for_profile(profile),
            status: None,
            state: State::Opened,
            preamble_sent: false,
        }
    }

    pub fn profile(&self) -> &'static QuirkProfile {
        self.profile
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn encoder(&self) -> &RasterEncoder {
        &self.encoder
    }

    /// Last status read from the device.
    pub fn status(&self) -> Option<&DeviceStatus> {
        self.status.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn expect_state(&self, operation: &'static str, allowed: &[State]) -> Result<(), Error> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                state: self.state.name(),
            })
        }
    }

    fn send(&mut self, buf: &[u8]) -> Result<(), Error> {
        let n = self.transport.write(buf)?;
        if n == buf.len() {
            Ok(())
        } else {
            debug!(
                "write error: bytes wrote {} != bytes supplied {}, possibly timeout ?",
                n,
                buf.len()
            );
            Err(Error::TransmitError {
                written: n,
                expected: buf.len(),
            })
        }
    }

    /// Invalidate whatever the printer holds and reset it.
    pub fn initialize(&mut self) -> Result<(), Error> {
        self.expect_state(
            "initialize",
            &[State::Opened, State::Initialized, State::StatusKnown],
        )?;
        debug!("send invalidate + initialize");
        self.send(&command::initialize())?;
        self.state = State::Initialized;
        Ok(())
    }

    /// Request and read the 32 byte status record.
    pub fn query_status(&mut self) -> Result<&DeviceStatus, Error> {
        self.expect_state("request status", &[State::Initialized, State::StatusKnown])?;
        debug!("request status");
        self.send(&command::status_request())?;

        let mut buf = [0u8; STATUS_LEN];
        let mut len = 0;
        for _ in 0..STATUS_POLLS {
            len = self.transport.read(&mut buf, STATUS_READ_TIMEOUT)?;
            if len > 0 {
                break;
            }
            thread::sleep(STATUS_POLL_INTERVAL);
        }
        if len == 0 {
            return Err(Error::StatusTimeout);
        }

        debug!("Raw status code: {:02X?}", &buf[..len]);
        let status = DeviceStatus::parse(&buf[..len])?;
        debug!("Parsed Status struct: {:?}", status);
        let (brother, series) = status.series();
        debug!(
            "status from {}{} model {:#04x}, country {:#04x}",
            brother,
            series,
            status.model,
            status.country()
        );

        if status.tape_width_px() == crate::media::UNKNOWN_TAPE_PX {
            warn!(
                "unknown tape width of {}mm, please report this.",
                status.media_width
            );
        }
        for err in status.errors() {
            warn!("printer reports: {}", err);
        }

        self.state = State::StatusKnown;
        Ok(&*self.status.insert(status))
    }

    /// Switch the printer to raster graphics mode.
    pub fn enter_raster_mode(&mut self) -> Result<(), Error> {
        if self.profile.has(Quirk::UnsupportedRaster) {
            return Err(Error::RasterModeUnsupported(self.profile.name));
        }
        self.expect_state(
            "enter raster mode",
            &[State::Initialized, State::StatusKnown],
        )?;

        if self.profile.has(Quirk::PackBits) {
            debug!("enable PackBits mode");
            self.send(&command::enable_packbits())?;
        }
        if self.profile.has(Quirk::Lite) {
            debug!("P-Lite device, already in raster mode");
        } else if self.profile.has(Quirk::P700Init) {
            self.send(&command::dynamic_raster_mode())?;
        } else {
            self.send(&command::raster_start())?;
        }

        self.state = State::RasterMode;
        self.preamble_sent = false;
        Ok(())
    }

    /// Send the model specific commands that must precede raster data.
    ///
    /// Allowed once per page, before the first raster line.
    pub fn apply_preamble(&mut self, page: &PageSetup) -> Result<(), Error> {
        self.expect_state("send preamble", &[State::RasterMode])?;
        if self.preamble_sent {
            return Err(Error::InvalidState {
                operation: "send preamble",
                state: "past preamble",
            });
        }

        let media_width = self.status.as_ref().map_or(0, |s| s.media_width);
        for step in plan_preamble(self.profile, media_width, page) {
            debug!("send {:?}", step);
            self.send(&step.bytes())?;
        }
        self.preamble_sent = true;
        Ok(())
    }

    /// Transmit one bit packed raster line.
    ///
    /// Any failure aborts the page: later lines are refused.
    pub fn send_raster_line(&mut self, line: &[u8]) -> Result<(), Error> {
        self.expect_state(
            "send raster line",
            &[State::RasterMode, State::Transmitting],
        )?;
        if line.len() != self.encoder.line_bytes() {
            return Err(Error::InvalidConfig(format!(
                "raster line is {} bytes, {} needs {}",
                line.len(),
                self.profile.name,
                self.encoder.line_bytes()
            )));
        }
        self.preamble_sent = true;

        let buf = command::raster_line(&self.encoder.frame(line));
        match self.transport.write(&buf) {
            Ok(n) if n == buf.len() => {
                self.state = State::Transmitting;
                Ok(())
            }
            Ok(n) => {
                self.state = State::Aborted;
                Err(Error::TransmitError {
                    written: n,
                    expected: buf.len(),
                })
            }
            Err(err) => {
                debug!("raster line failed: {:?}", err);
                self.state = State::Aborted;
                Err(Error::TransmitError {
                    written: 0,
                    expected: buf.len(),
                })
            }
        }
    }

    /// Print the page. `Feed::None` keeps the tape in place for chaining,
    /// any other feed ejects (and cuts, if enabled).
    pub fn finalize(&mut self, feed: Feed) -> Result<(), Error> {
        self.expect_state(
            "finalize",
            &[State::RasterMode, State::Transmitting, State::Aborted],
        )?;
        debug!("finalize with {:?}", feed);
        // the page is over whatever happens to the print command
        self.state = State::Initialized;
        self.send(&[command::print(feed)])
    }

    /// Cancel printing
    ///
    pub fn cancel(&mut self) -> Result<(), Error> {
        if self.state == State::Closed {
            return Err(Error::InvalidState {
                operation: "cancel",
                state: self.state.name(),
            });
        }
        info!("cancel, re-initialize printer");
        self.state = State::Initialized;
        self.send(&command::initialize())
    }

    /// Release the device. Calling it again is a no-op.
    pub fn close(&mut self) -> Result<(), Error> {
        if self.state == State::Closed {
            return Ok(());
        }
        self.state = State::Closed;
        self.transport.release()
    }
}

impl<T: Transport> Drop for Printer<T> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            debug!("close on drop failed: {:?}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{lookup, DeviceIdentity, BROTHER_VID};
    use pretty_assertions::assert_eq;

    fn profile(pid: u16) -> &'static QuirkProfile {
        lookup(DeviceIdentity::new(BROTHER_VID, pid)).unwrap()
    }

    fn page(chain: bool) -> PageSetup {
        PageSetup {
            raster_lines: 100,
            chain,
            precut: true,
            mirror: false,
        }
    }

    #[test]
    fn plain_profile_has_no_preamble() {
        assert_eq!(plan_preamble(profile(0x202c), 24, &page(true)), vec![]);
    }

    #[test]
    fn d460bt_preamble_order() {
        let steps = plan_preamble(profile(0x20e0), 24, &page(true));
        assert_eq!(
            steps,
            vec![
                PreambleStep::Information {
                    media_width: 24,
                    raster_lines: 100,
                    magic: true
                },
                PreambleStep::Chain,
                PreambleStep::Magic,
                PreambleStep::PageMode(PageFlags::AUTO_CUT),
            ]
        );
    }

    #[test]
    fn chain_command_only_when_chaining() {
        let steps = plan_preamble(profile(0x20e0), 24, &page(false));
        assert!(!steps.contains(&PreambleStep::Chain));
        assert!(steps.contains(&PreambleStep::Magic));
    }

    #[test]
    fn page_mode_carries_mirror_and_precut() {
        let setup = PageSetup {
            precut: false,
            mirror: true,
            ..page(false)
        };
        assert_eq!(
            plan_preamble(profile(0x2061), 12, &setup),
            vec![PreambleStep::PageMode(PageFlags::MIRROR)]
        );
    }

    #[test]
    fn information_step_bytes() {
        let step = PreambleStep::Information {
            media_width: 12,
            raster_lines: 300,
            magic: false,
        };
        assert_eq!(
            step.bytes(),
            vec![0x1B, 0x69, 0x7A, 0, 0, 12, 0, 0x2C, 0x01, 0, 0, 0, 0]
        );
    }
}
