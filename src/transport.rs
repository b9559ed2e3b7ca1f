//! USB transport.
//!
//! [`Printer`](crate::Printer) only needs "bulk write" and "bulk read with a
//! timeout", so the device handle hides behind the [`Transport`] trait.

use log::{debug, info};
use rusb::{Context, Device, DeviceDescriptor, DeviceHandle, Direction, TransferType, UsbContext};
use std::time::Duration;

use crate::{
    error::Error,
    model::{self, DeviceIdentity, QuirkProfile},
};

/// Timeout for bulk writes. Status reads pass their own.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

pub trait Transport {
    /// Bulk write, returns the number of bytes accepted by the device.
    fn write(&mut self, buf: &[u8]) -> Result<usize, Error>;

    /// Bulk read, returns the number of bytes received.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Error>;

    /// Give the device back. Safe to call more than once.
    fn release(&mut self) -> Result<(), Error>;
}

#[derive(Debug, Clone, Copy)]
struct Endpoint {
    iface: u8,
    address: u8,
}

pub struct UsbTransport {
    handle: Option<DeviceHandle<Context>>,
    endpoint_out: Endpoint,
    endpoint_in: Endpoint,
}

impl UsbTransport {
    /// Open the first attached printer that has a profile.
    pub fn open() -> Result<(Self, &'static QuirkProfile), Error> {
        let context = Context::new()?;
        let devices = context.devices()?;

        if devices.len() == 0 {
            debug!("Failed to read device list");
            return Err(Error::DeviceListNotReadable);
        }

        for device in devices.iter() {
            let device_desc = match device.device_descriptor() {
                Ok(d) => d,
                Err(err) => {
                    debug!("{:?}", err);
                    continue;
                }
            };
            let identity = DeviceIdentity::new(device_desc.vendor_id(), device_desc.product_id());
            if let Some(profile) = model::lookup(identity) {
                info!(
                    "{} found on USB bus {}, device {}",
                    profile.name,
                    device.bus_number(),
                    device.address()
                );
                let transport = Self::claim(&device, &device_desc, profile)?;
                return Ok((transport, profile));
            }
        }

        debug!("No supported printer in device list");
        Err(Error::DeviceNotFound)
    }

    fn claim(
        device: &Device<Context>,
        device_desc: &DeviceDescriptor,
        profile: &'static QuirkProfile,
    ) -> Result<Self, Error> {
        let endpoint_in = Self::find_endpoint(device, device_desc, Direction::In)
            .ok_or(Error::MissingEndpoint)?;
        let endpoint_out = Self::find_endpoint(device, device_desc, Direction::Out)
            .ok_or(Error::MissingEndpoint)?;

        let busy = |source: rusb::Error| Error::DeviceBusy {
            name: profile.name,
            source,
        };
        let handle = device.open().map_err(busy)?;

        // some models come up with the usblp driver bound to the interface
        if handle.set_auto_detach_kernel_driver(true).is_err() {
            if let Ok(true) = handle.kernel_driver_active(endpoint_out.iface) {
                handle.detach_kernel_driver(endpoint_out.iface).map_err(busy)?;
            }
        }
        handle.claim_interface(endpoint_out.iface).map_err(busy)?;

        Ok(UsbTransport {
            handle: Some(handle),
            endpoint_out,
            endpoint_in,
        })
    }

    fn find_endpoint(
        device: &Device<Context>,
        device_desc: &DeviceDescriptor,
        direction: Direction,
    ) -> Option<Endpoint> {
        for n in 0..device_desc.num_configurations() {
            let config_desc = match device.config_descriptor(n) {
                Ok(c) => c,
                Err(_) => continue,
            };
            for interface in config_desc.interfaces() {
                for interface_desc in interface.descriptors() {
                    for endpoint_desc in interface_desc.endpoint_descriptors() {
                        if endpoint_desc.direction() == direction
                            && endpoint_desc.transfer_type() == TransferType::Bulk
                        {
                            return Some(Endpoint {
                                iface: interface_desc.interface_number(),
                                address: endpoint_desc.address(),
                            });
                        }
                    }
                }
            }
        }
        None
    }

    fn handle(&self) -> Result<&DeviceHandle<Context>, Error> {
        self.handle.as_ref().ok_or(Error::InvalidState {
            operation: "transfer",
            state: "closed",
        })
    }
}

impl Transport for UsbTransport {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
        let n = self
            .handle()?
            .write_bulk(self.endpoint_out.address, buf, WRITE_TIMEOUT)?;
        Ok(n)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Error> {
        match self.handle()?.read_bulk(self.endpoint_in.address, buf, timeout) {
            Ok(n) => Ok(n),
            Err(rusb::Error::Timeout) => Ok(0),
            Err(e) => Err(Error::UsbError(e)),
        }
    }

    fn release(&mut self) -> Result<(), Error> {
        if let Some(handle) = self.handle.take() {
            handle.release_interface(self.endpoint_out.iface)?;
        }
        Ok(())
    }
}

impl Drop for UsbTransport {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            debug!("release on drop failed: {:?}", err);
        }
    }
}
