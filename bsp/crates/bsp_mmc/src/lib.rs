//! MMC host protocol and the DesignWare eMMC controller behind it.
//!
//! [`MmcHost`] is the Rust side of the host protocol consumed by the MMC
//! bus driver, [`DwEmmc`] implements it for the DesignWare controller and
//! [`protocol`] exposes any [`HostInstance`] through the binary firmware
//! vtable.

#![no_std]

mod dw_emmc;
mod idmac;
pub mod protocol;
pub mod regs;

pub use dw_emmc::*;
pub use idmac::*;
pub use protocol::{EfiMmcHostProtocol, HostInstance};
use thiserror::Error;

pub const MMC_HOST_PROTOCOL_REVISION: u32 = 0x0001_0002;

/// Firmware status word returned across the vtable.
pub type EfiStatus = usize;

pub const EFI_SUCCESS: EfiStatus = 0;
const EFI_ERROR_BIT: EfiStatus = !(usize::MAX >> 1);
pub const EFI_INVALID_PARAMETER: EfiStatus = EFI_ERROR_BIT | 2;
pub const EFI_UNSUPPORTED: EfiStatus = EFI_ERROR_BIT | 3;
pub const EFI_BUFFER_TOO_SMALL: EfiStatus = EFI_ERROR_BIT | 5;
pub const EFI_NOT_READY: EfiStatus = EFI_ERROR_BIT | 6;
pub const EFI_DEVICE_ERROR: EfiStatus = EFI_ERROR_BIT | 7;
pub const EFI_NOT_FOUND: EfiStatus = EFI_ERROR_BIT | 14;
pub const EFI_TIMEOUT: EfiStatus = EFI_ERROR_BIT | 18;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum MmcError {
    #[error("invalid parameter")]
    InvalidParameter,
    #[error("unsupported {0}")]
    Unsupported(&'static str),
    #[error("buffer holds {available} bytes, {required} needed")]
    BufferTooSmall { required: usize, available: usize },
    #[error("{needed} DMA descriptors needed, {available} available")]
    DescriptorsExhausted { needed: usize, available: usize },
    #[error("address {0:#x} is not reachable by the DMA engine")]
    DmaAddress(usize),
    #[error("no divider reaches {0} Hz")]
    ClockNotFound(u32),
    #[error("no data command is pending")]
    NoPendingCommand,
    #[error("controller reported {rintsts:#010x} for CMD{index}")]
    Device { index: u32, rintsts: u32 },
    #[error("hardware locked error while updating the card clock")]
    ClockUpdate,
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
    #[error("host instance is not initialised")]
    NotReady,
}

impl MmcError {
    pub const fn efi_status(&self) -> EfiStatus {
        match self {
            Self::InvalidParameter | Self::NoPendingCommand => EFI_INVALID_PARAMETER,
            Self::Unsupported(_) => EFI_UNSUPPORTED,
            Self::BufferTooSmall { .. } | Self::DescriptorsExhausted { .. } => {
                EFI_BUFFER_TOO_SMALL
            }
            Self::ClockNotFound(_) => EFI_NOT_FOUND,
            Self::Device { .. } | Self::ClockUpdate | Self::DmaAddress(_) => EFI_DEVICE_ERROR,
            Self::Timeout(_) => EFI_TIMEOUT,
            Self::NotReady => EFI_NOT_READY,
        }
    }
}

/// Converts a driver result into a firmware status word.
pub fn status_of(result: Result<(), MmcError>) -> EfiStatus {
    match result {
        Ok(()) => EFI_SUCCESS,
        Err(e) => e.efi_status(),
    }
}

/// Command word passed down by the bus driver. Bits 5:0 hold the index.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(transparent)]
pub struct MmcCmd(pub u32);

impl MmcCmd {
    pub const fn new(index: u32) -> Self {
        Self(index & 0x3f)
    }

    pub const fn index(self) -> u32 {
        self.0 & 0x3f
    }
}

impl From<u32> for MmcCmd {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MmcState {
    Invalid = 0,
    HwInitialization,
    Idle,
    Ready,
    Identification,
    StandBy,
    Transfer,
    SendingData,
    ReceiveData,
    Programming,
    Disconnect,
}

impl TryFrom<u32> for MmcState {
    type Error = MmcError;

    fn try_from(raw: u32) -> Result<Self, MmcError> {
        Ok(match raw {
            0 => Self::Invalid,
            1 => Self::HwInitialization,
            2 => Self::Idle,
            3 => Self::Ready,
            4 => Self::Identification,
            5 => Self::StandBy,
            6 => Self::Transfer,
            7 => Self::SendingData,
            8 => Self::ReceiveData,
            9 => Self::Programming,
            10 => Self::Disconnect,
            _ => return Err(MmcError::InvalidParameter),
        })
    }
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResponseType {
    R1 = 0,
    R1b,
    R2,
    R3,
    R6,
    R7,
}

impl ResponseType {
    /// Number of 32-bit words the response occupies.
    pub const fn words(self) -> usize {
        match self {
            Self::R2 => 4,
            _ => 1,
        }
    }
}

impl TryFrom<u32> for ResponseType {
    type Error = MmcError;

    fn try_from(raw: u32) -> Result<Self, MmcError> {
        Ok(match raw {
            0 => Self::R1,
            1 => Self::R1b,
            2 => Self::R2,
            3 => Self::R3,
            4 => Self::R6,
            5 => Self::R7,
            _ => return Err(MmcError::InvalidParameter),
        })
    }
}

/// eMMC bus timing.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TimingMode {
    Backward = 0,
    Hs26,
    Hs52,
    Hs52Ddr1V8,
    Hs52Ddr1V2,
    Hs200,
    Hs400,
}

impl TryFrom<u32> for TimingMode {
    type Error = MmcError;

    fn try_from(raw: u32) -> Result<Self, MmcError> {
        Ok(match raw {
            0 => Self::Backward,
            1 => Self::Hs26,
            2 => Self::Hs52,
            3 => Self::Hs52Ddr1V8,
            4 => Self::Hs52Ddr1V2,
            5 => Self::Hs200,
            6 => Self::Hs400,
            _ => return Err(MmcError::Unsupported("timing mode")),
        })
    }
}

/// Host side of the MMC protocol.
///
/// Block transfers address the data of the command most recently passed
/// to [`send_command`](MmcHost::send_command); `length` is in bytes.
pub trait MmcHost {
    fn is_card_present(&self) -> bool;

    fn is_read_only(&self) -> bool;

    fn is_dma_supported(&self) -> bool;

    /// Device path node identifying this controller.
    fn build_device_path(&self) -> &'static protocol::MmcDevicePath;

    fn notify_state(&mut self, state: MmcState) -> Result<(), MmcError>;

    fn send_command(&mut self, cmd: MmcCmd, argument: u32) -> Result<(), MmcError>;

    fn receive_response(
        &mut self,
        response_type: ResponseType,
        buffer: &mut [u32],
    ) -> Result<(), MmcError>;

    fn read_block_data(
        &mut self,
        lba: u64,
        length: usize,
        buffer: &mut [u32],
    ) -> Result<(), MmcError>;

    fn write_block_data(&mut self, lba: u64, length: usize, buffer: &[u32])
    -> Result<(), MmcError>;

    fn set_ios(
        &mut self,
        bus_clock_hz: u32,
        bus_width: u32,
        timing: TimingMode,
    ) -> Result<(), MmcError>;

    fn is_multi_block(&self) -> bool;
}
