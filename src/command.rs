//! P-Touch raster command vocabulary.
//!
//! Each function returns the exact bytes of one command. Nothing here
//! touches the device; [`crate::Printer`] decides which commands are sent
//! and in what order.

use bitflags::bitflags;

pub const ESC: u8 = 0x1B;

/// Number of zero bytes sent before `ESC @` to flush any pending job.
pub const INVALIDATE_LEN: usize = 100;

/// FF : Print, the tape stays in place
const PRINT: u8 = 0x0C;

/// Control-Z : Print then feed and eject
const PRINT_EJECT: u8 = 0x1A;

/// Tape feed requested after a page is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    None = 0x00,
    Large = 0x1a,
}

bitflags! {
    /// Mode bits combined with the feed length in `ESC i M`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PageFlags: u8 {
        const AUTO_CUT = 1 << 6;
        const MIRROR = 1 << 7;
    }
}

/// Invalidate then initialize.
pub fn initialize() -> Vec<u8> {
    let mut buf = vec![0x00; INVALIDATE_LEN];
    buf.extend_from_slice(&[ESC, 0x40]); // ESC @
    buf
}

/// ESC i S : Status information request
pub fn status_request() -> [u8; 3] {
    [ESC, 0x69, 0x53]
}

/// M 02 : Select PackBits compression for raster data
pub fn enable_packbits() -> [u8; 2] {
    [0x4D, 0x02]
}

/// ESC i R 01 : Select graphics transfer mode = raster
pub fn raster_start() -> [u8; 4] {
    [ESC, 0x69, 0x52, 0x01]
}

/// ESC i a 01 : Switch dynamic command mode to raster
pub fn dynamic_raster_mode() -> [u8; 4] {
    [ESC, 0x69, 0x61, 0x01]
}

/// ESC i z : Print information command
///
/// Only the media width (n3) and the raster line count (n5..n8) are set.
/// Devices that need the vendor magic also want n9 = 2 so the end of the
/// label is fed and printing stops cleanly.
pub fn print_information(media_width_mm: u8, raster_lines: u32, magic: bool) -> [u8; 13] {
    let mut cmd = [0u8; 13];
    cmd[..3].copy_from_slice(&[ESC, 0x69, 0x7A]);
    cmd[5] = media_width_mm;
    cmd[7..11].copy_from_slice(&raster_lines.to_le_bytes());
    if magic {
        cmd[11] = 0x02;
    }
    cmd
}

/// ESC i K 00 : Expanded mode cleared, no cut at end of a chained strip
pub fn chain() -> [u8; 4] {
    [ESC, 0x69, 0x4B, 0x00]
}

/// ESC i d : Margin amount, with the vendor specific trailer
///
/// n1 n2 is the length margin in px (0x0E is what the vendor software uses),
/// n3 must be 0x4D or the print gets corrupted.
pub fn magic() -> [u8; 7] {
    [ESC, 0x69, 0x64, 0x0E, 0x00, 0x4D, 0x00]
}

/// ESC i M : Various mode settings (auto cut, mirror, feed)
pub fn page_mode(feed: Feed, flags: PageFlags) -> [u8; 4] {
    [ESC, 0x69, 0x4D, feed as u8 | flags.bits()]
}

/// G n1 n2 : Raster graphics transfer
pub fn raster_line(data: &[u8]) -> Vec<u8> {
    let len = (data.len() as u16).to_le_bytes();
    let mut buf = Vec::with_capacity(data.len() + 3);
    buf.push(0x47);
    buf.extend_from_slice(&len);
    buf.extend_from_slice(data);
    buf
}

/// Print command closing a page.
pub fn print(feed: Feed) -> u8 {
    match feed {
        Feed::None => PRINT,
        Feed::Large => PRINT_EJECT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn initialize_is_invalidate_then_esc_at() {
        let buf = initialize();
        assert_eq!(buf.len(), 102);
        assert!(buf[..100].iter().all(|&b| b == 0));
        assert_eq!(&buf[100..], &[0x1B, 0x40]);
    }

    #[test]
    fn print_information_layout() {
        assert_eq!(
            print_information(24, 0x0102, false),
            [0x1B, 0x69, 0x7A, 0, 0, 24, 0, 0x02, 0x01, 0, 0, 0, 0]
        );
        assert_eq!(print_information(12, 100, true)[11], 0x02);
    }

    #[test]
    fn page_mode_combines_feed_and_flags() {
        assert_eq!(
            page_mode(Feed::None, PageFlags::AUTO_CUT),
            [0x1B, 0x69, 0x4D, 0x40]
        );
        assert_eq!(
            page_mode(Feed::Large, PageFlags::AUTO_CUT | PageFlags::MIRROR),
            [0x1B, 0x69, 0x4D, 0xDA]
        );
    }

    #[test]
    fn raster_line_is_length_prefixed() {
        assert_eq!(raster_line(&[0xAA; 3]), vec![0x47, 3, 0, 0xAA, 0xAA, 0xAA]);
    }

    #[test]
    fn print_command_depends_on_feed() {
        assert_eq!(print(Feed::None), 0x0C);
        assert_eq!(print(Feed::Large), 0x1A);
    }
}
