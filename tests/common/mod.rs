//! Shared test doubles.

#![allow(dead_code)]

use std::{collections::VecDeque, time::Duration};

use ptouch::{
    model::{self, DeviceIdentity, BROTHER_VID},
    Error, Printer, QuirkProfile, Transport,
};

/// Transport that records every write and answers reads from a queue.
#[derive(Default)]
pub struct RecordingTransport {
    pub writes: Vec<Vec<u8>>,
    pub responses: VecDeque<Vec<u8>>,
    /// Index of the write call that comes back short.
    pub short_write_at: Option<usize>,
    /// Index of the write call that fails outright.
    pub fail_write_at: Option<usize>,
    pub releases: u32,
}

impl RecordingTransport {
    pub fn with_status(media_width_mm: u8) -> Self {
        RecordingTransport {
            responses: VecDeque::from(vec![status_record(media_width_mm)]),
            ..Default::default()
        }
    }

    /// Everything written after the status request.
    pub fn after_status(&self) -> &[Vec<u8>] {
        let pos = self
            .writes
            .iter()
            .position(|w| w.as_slice() == [0x1B, 0x69, 0x53])
            .expect("no status request");
        &self.writes[pos + 1..]
    }

    /// Single byte writes, the print commands closing each page.
    pub fn finalize_bytes(&self) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|w| w.len() == 1)
            .map(|w| w[0])
            .collect()
    }

    pub fn raster_lines(&self) -> Vec<&Vec<u8>> {
        self.writes.iter().filter(|w| w[0] == b'G').collect()
    }
}

impl Transport for RecordingTransport {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
        let index = self.writes.len();
        if self.fail_write_at == Some(index) {
            return Err(Error::UsbError(rusb::Error::Io));
        }
        self.writes.push(buf.to_vec());
        if self.short_write_at == Some(index) {
            return Ok(buf.len() / 2);
        }
        Ok(buf.len())
    }

    fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize, Error> {
        match self.responses.pop_front() {
            Some(response) => {
                let n = response.len().min(buf.len());
                buf[..n].copy_from_slice(&response[..n]);
                Ok(n)
            }
            None => Ok(0),
        }
    }

    fn release(&mut self) -> Result<(), Error> {
        self.releases += 1;
        Ok(())
    }
}

/// A plausible 32 byte status record for a given tape.
pub fn status_record(media_width_mm: u8) -> Vec<u8> {
    let mut buf = vec![0u8; 32];
    buf[0] = 0x80;
    buf[1] = 0x20;
    buf[2] = b'B';
    buf[3] = b'0';
    buf[4] = 0x71;
    buf[5] = 0x30;
    buf[10] = media_width_mm;
    buf[11] = 0x01; // laminated tape
    buf[24] = 0x01; // white
    buf[25] = 0x08; // black
    buf
}

pub fn profile(pid: u16) -> &'static QuirkProfile {
    model::lookup(DeviceIdentity::new(BROTHER_VID, pid)).expect("unknown test profile")
}

pub fn printer(pid: u16, transport: RecordingTransport) -> Printer<RecordingTransport> {
    Printer::new(transport, profile(pid))
}

pub const PT_1230PC: u16 = 0x202c;
pub const PT_1230PC_LITE: u16 = 0x2030;
pub const PT_E550W: u16 = 0x2060;
pub const PT_P700: u16 = 0x2061;
pub const PT_D460BT: u16 = 0x20e0;
