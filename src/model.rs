//! Supported printer models and their protocol quirks.
//!
//! Every model is a row in a static table. Adding a printer means adding a
//! row here, the protocol code only ever asks a profile whether it has a quirk.

use std::fmt;

/// Brother Industries USB vendor id.
pub const BROTHER_VID: u16 = 0x04F9;

/// USB identity of a printer, used as the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    pub vid: u16,
    pub pid: u16,
}

impl DeviceIdentity {
    pub const fn new(vid: u16, pid: u16) -> Self {
        DeviceIdentity { vid, pid }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vid, self.pid)
    }
}

/// A per-model deviation from the baseline protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quirk {
    /// Raster protocol is unknown, the device can not be printed to.
    UnsupportedRaster,
    /// Raster lines must be sent PackBits encoded.
    PackBits,
    /// "P-Lite" mode: the device starts in raster mode, no switch command.
    Lite,
    /// Raster mode is entered with the `ESC i a` dynamic mode switch.
    P700Init,
    /// Print information command is required before raster data.
    InfoCommand,
    /// Device accepts the pre-cut / page mode command.
    Precut,
    /// Vendor magic (and chain) sequence of the D460BT family.
    D460btMagic,
}

/// Capabilities of one printer model.
#[derive(Debug, PartialEq, Eq)]
pub struct QuirkProfile {
    pub identity: DeviceIdentity,
    pub name: &'static str,
    /// Printhead width in pixels.
    pub max_px: u32,
    pub dpi: u32,
    pub quirks: &'static [Quirk],
}

impl QuirkProfile {
    pub fn has(&self, quirk: Quirk) -> bool {
        self.quirks.contains(&quirk)
    }

    /// Length in bytes of one raster line for this printhead.
    pub fn line_bytes(&self) -> usize {
        (self.max_px / 8) as usize
    }
}

use Quirk::*;

const fn profile(
    pid: u16,
    name: &'static str,
    max_px: u32,
    dpi: u32,
    quirks: &'static [Quirk],
) -> QuirkProfile {
    QuirkProfile {
        identity: DeviceIdentity::new(BROTHER_VID, pid),
        name,
        max_px,
        dpi,
        quirks,
    }
}

static PROFILES: &[QuirkProfile] = &[
    // 24mm models must send TIFF (PackBits) compressed pixel data
    profile(0x2007, "PT-2420PC", 128, 180, &[PackBits]),
    profile(0x2011, "PT-2450PC", 128, 180, &[PackBits]),
    profile(0x2019, "PT-1950", 128, 180, &[PackBits]),
    profile(0x201f, "PT-2700", 128, 180, &[Precut]),
    profile(0x202c, "PT-1230PC", 128, 180, &[]),
    profile(0x202d, "PT-2430PC", 128, 180, &[]),
    profile(0x2030, "PT-1230PC (PLite Mode)", 128, 180, &[Lite]),
    profile(0x2031, "PT-2430PC (PLite Mode)", 128, 180, &[Lite]),
    profile(0x2041, "PT-2730", 128, 180, &[]),
    profile(0x205e, "PT-H500", 128, 180, &[PackBits]),
    profile(0x205f, "PT-E500", 128, 180, &[PackBits]),
    profile(0x2060, "PT-E550W", 128, 180, &[UnsupportedRaster]),
    profile(0x2061, "PT-P700", 128, 180, &[PackBits, P700Init, Precut]),
    profile(0x2062, "PT-P750W", 128, 180, &[PackBits, P700Init]),
    profile(0x2064, "PT-P700 (PLite Mode)", 128, 180, &[Lite]),
    profile(0x2065, "PT-P750W (PLite Mode)", 128, 180, &[Lite]),
    profile(0x2073, "PT-D450", 128, 180, &[InfoCommand]),
    profile(0x2074, "PT-D600", 128, 180, &[PackBits]),
    profile(0x2085, "PT-P900W", 560, 360, &[PackBits, P700Init, InfoCommand]),
    profile(0x20af, "PT-P710BT", 128, 180, &[PackBits, Precut]),
    profile(0x20df, "PT-D410", 128, 180, &[InfoCommand, Precut, D460btMagic]),
    profile(
        0x20e0,
        "PT-D460BT",
        128,
        180,
        &[P700Init, InfoCommand, Precut, D460btMagic],
    ),
    profile(
        0x20e1,
        "PT-D610BT",
        128,
        180,
        &[P700Init, InfoCommand, Precut, D460btMagic],
    ),
    profile(
        0x2201,
        "PT-E310BT",
        128,
        180,
        &[P700Init, InfoCommand, D460btMagic],
    ),
    profile(0x2203, "PT-E560BT", 128, 180, &[PackBits, Precut]),
];

/// Find the profile for a USB identity. First exact match wins.
pub fn lookup(identity: DeviceIdentity) -> Option<&'static QuirkProfile> {
    PROFILES.iter().find(|p| p.identity == identity)
}

/// Every known profile, in table order.
pub fn profiles() -> &'static [QuirkProfile] {
    PROFILES
}

/// Profiles that can actually be printed to.
pub fn supported() -> impl Iterator<Item = &'static QuirkProfile> {
    PROFILES.iter().filter(|p| !p.has(UnsupportedRaster))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_exact_match() {
        let p = lookup(DeviceIdentity::new(BROTHER_VID, 0x2061)).unwrap();
        assert_eq!(p.name, "PT-P700");
        assert!(p.has(PackBits));
        assert!(p.has(Precut));
        assert!(!p.has(Lite));
        assert_eq!(p.line_bytes(), 16);
    }

    #[test]
    fn lookup_unknown_device() {
        assert!(lookup(DeviceIdentity::new(BROTHER_VID, 0xffff)).is_none());
        // same product id from a different vendor is not a match
        assert!(lookup(DeviceIdentity::new(0x1234, 0x2061)).is_none());
    }

    #[test]
    fn supported_list_skips_unsupported_raster() {
        assert!(supported().all(|p| p.name != "PT-E550W"));
        assert_eq!(supported().count(), profiles().len() - 1);
    }

    #[test]
    fn identities_are_unique() {
        for (i, a) in profiles().iter().enumerate() {
            for b in &profiles()[i + 1..] {
                assert_ne!(a.identity, b.identity, "{} / {}", a.name, b.name);
            }
        }
    }
}
