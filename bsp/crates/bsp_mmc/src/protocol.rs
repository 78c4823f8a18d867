//! The host protocol as a binary function table.
//!
//! Firmware consumers only see [`EfiMmcHostProtocol`]. Every entry point
//! locks the host published by a [`HostInstance`] and converts raw
//! arguments and results at the boundary.

use core::slice;

use spin::Mutex;

use crate::{
    EFI_INVALID_PARAMETER, EFI_SUCCESS, EfiStatus, MMC_HOST_PROTOCOL_REVISION, MmcCmd, MmcError,
    MmcHost, MmcState, ResponseType, TimingMode, status_of,
};

#[repr(C)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EfiGuid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

pub const HARDWARE_DEVICE_PATH: u8 = 0x01;
pub const HW_VENDOR_DP: u8 = 0x04;
pub const END_DEVICE_PATH_TYPE: u8 = 0x7f;
pub const END_ENTIRE_DEVICE_PATH_SUBTYPE: u8 = 0xff;

/// Identifies the DesignWare eMMC driver in device paths.
pub const DW_EMMC_GUID: EfiGuid = EfiGuid {
    data1: 0xb549_f005,
    data2: 0x4bd4,
    data3: 0x4020,
    data4: [0xa0, 0xcb, 0x06, 0xf4, 0x2b, 0xda, 0x68, 0xc3],
};

#[repr(C)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DevicePathHeader {
    pub kind: u8,
    pub sub_type: u8,
    /// Node length in bytes, little endian.
    pub length: [u8; 2],
}

impl DevicePathHeader {
    pub const fn new(kind: u8, sub_type: u8, length: usize) -> Self {
        Self {
            kind,
            sub_type,
            length: (length as u16).to_le_bytes(),
        }
    }

    pub const fn node_length(&self) -> usize {
        u16::from_le_bytes(self.length) as usize
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VendorDevicePath {
    pub header: DevicePathHeader,
    pub guid: EfiGuid,
}

/// A vendor node followed by the end-of-path node.
#[repr(C)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MmcDevicePath {
    pub vendor: VendorDevicePath,
    pub end: DevicePathHeader,
}

pub static DEVICE_PATH: MmcDevicePath = MmcDevicePath {
    vendor: VendorDevicePath {
        header: DevicePathHeader::new(
            HARDWARE_DEVICE_PATH,
            HW_VENDOR_DP,
            size_of::<VendorDevicePath>(),
        ),
        guid: DW_EMMC_GUID,
    },
    end: DevicePathHeader::new(
        END_DEVICE_PATH_TYPE,
        END_ENTIRE_DEVICE_PATH_SUBTYPE,
        size_of::<DevicePathHeader>(),
    ),
};

/// Where the function table finds its host.
pub trait HostInstance: 'static {
    type Host: MmcHost + 'static;

    /// `None` until the platform has published the host.
    fn host() -> Option<&'static Mutex<Self::Host>>;
}

fn with_host<I, T, F>(f: F) -> Result<T, MmcError>
where
    I: HostInstance,
    F: FnOnce(&mut I::Host) -> Result<T, MmcError>,
{
    let host = I::host().ok_or(MmcError::NotReady)?;
    let mut host = host.lock();
    f(&mut host)
}

pub type IsCardPresent = unsafe extern "efiapi" fn(this: *const EfiMmcHostProtocol) -> bool;
pub type IsReadOnly = unsafe extern "efiapi" fn(this: *const EfiMmcHostProtocol) -> bool;
pub type BuildDevicePath = unsafe extern "efiapi" fn(
    this: *const EfiMmcHostProtocol,
    device_path: *mut *const DevicePathHeader,
) -> EfiStatus;
pub type NotifyState =
    unsafe extern "efiapi" fn(this: *const EfiMmcHostProtocol, state: u32) -> EfiStatus;
pub type SendCommand =
    unsafe extern "efiapi" fn(this: *const EfiMmcHostProtocol, cmd: u32, argument: u32) -> EfiStatus;
pub type ReceiveResponse = unsafe extern "efiapi" fn(
    this: *const EfiMmcHostProtocol,
    response_type: u32,
    buffer: *mut u32,
) -> EfiStatus;
pub type BlockData = unsafe extern "efiapi" fn(
    this: *const EfiMmcHostProtocol,
    lba: u64,
    length: usize,
    buffer: *mut u32,
) -> EfiStatus;
pub type SetIos = unsafe extern "efiapi" fn(
    this: *const EfiMmcHostProtocol,
    bus_clock_hz: u32,
    bus_width: u32,
    timing: u32,
) -> EfiStatus;
pub type IsMultiBlock = unsafe extern "efiapi" fn(this: *const EfiMmcHostProtocol) -> bool;

#[repr(C)]
pub struct EfiMmcHostProtocol {
    pub revision: u32,
    pub is_card_present: IsCardPresent,
    pub is_read_only: IsReadOnly,
    pub build_device_path: BuildDevicePath,
    pub notify_state: NotifyState,
    pub send_command: SendCommand,
    pub receive_response: ReceiveResponse,
    pub read_block_data: BlockData,
    pub write_block_data: BlockData,
    pub set_ios: SetIos,
    pub is_multi_block: IsMultiBlock,
}

impl EfiMmcHostProtocol {
    pub const fn new<I: HostInstance>() -> Self {
        Self {
            revision: MMC_HOST_PROTOCOL_REVISION,
            is_card_present: is_card_present::<I>,
            is_read_only: is_read_only::<I>,
            build_device_path: build_device_path::<I>,
            notify_state: notify_state::<I>,
            send_command: send_command::<I>,
            receive_response: receive_response::<I>,
            read_block_data: read_block_data::<I>,
            write_block_data: write_block_data::<I>,
            set_ios: set_ios::<I>,
            is_multi_block: is_multi_block::<I>,
        }
    }
}

unsafe extern "efiapi" fn is_card_present<I: HostInstance>(_: *const EfiMmcHostProtocol) -> bool {
    with_host::<I, _, _>(|h| Ok(h.is_card_present())).unwrap_or(false)
}

unsafe extern "efiapi" fn is_read_only<I: HostInstance>(_: *const EfiMmcHostProtocol) -> bool {
    with_host::<I, _, _>(|h| Ok(h.is_read_only())).unwrap_or(false)
}

unsafe extern "efiapi" fn is_multi_block<I: HostInstance>(_: *const EfiMmcHostProtocol) -> bool {
    with_host::<I, _, _>(|h| Ok(h.is_multi_block())).unwrap_or(false)
}

unsafe extern "efiapi" fn build_device_path<I: HostInstance>(
    _: *const EfiMmcHostProtocol,
    device_path: *mut *const DevicePathHeader,
) -> EfiStatus {
    if device_path.is_null() {
        return EFI_INVALID_PARAMETER;
    }
    match with_host::<I, _, _>(|h| Ok(h.build_device_path())) {
        Ok(path) => {
            // SAFETY: checked non-null, the caller owns the out pointer.
            unsafe { device_path.write(&path.vendor.header) };
            EFI_SUCCESS
        }
        Err(e) => e.efi_status(),
    }
}

unsafe extern "efiapi" fn notify_state<I: HostInstance>(
    _: *const EfiMmcHostProtocol,
    state: u32,
) -> EfiStatus {
    status_of(with_host::<I, _, _>(|h| {
        h.notify_state(MmcState::try_from(state)?)
    }))
}

unsafe extern "efiapi" fn send_command<I: HostInstance>(
    _: *const EfiMmcHostProtocol,
    cmd: u32,
    argument: u32,
) -> EfiStatus {
    status_of(with_host::<I, _, _>(|h| h.send_command(MmcCmd(cmd), argument)))
}

unsafe extern "efiapi" fn receive_response<I: HostInstance>(
    _: *const EfiMmcHostProtocol,
    response_type: u32,
    buffer: *mut u32,
) -> EfiStatus {
    if buffer.is_null() || !buffer.is_aligned() {
        return EFI_INVALID_PARAMETER;
    }
    status_of(with_host::<I, _, _>(|h| {
        // Types without a response register layout read nothing.
        let Ok(response_type) = ResponseType::try_from(response_type) else {
            return Ok(());
        };
        // SAFETY: the caller provides room for one response of this type.
        let words = unsafe { slice::from_raw_parts_mut(buffer, response_type.words()) };
        h.receive_response(response_type, words)
    }))
}

unsafe extern "efiapi" fn read_block_data<I: HostInstance>(
    _: *const EfiMmcHostProtocol,
    lba: u64,
    length: usize,
    buffer: *mut u32,
) -> EfiStatus {
    if buffer.is_null() || !buffer.is_aligned() {
        return EFI_INVALID_PARAMETER;
    }
    // SAFETY: the caller provides `length` bytes at `buffer`.
    let words = unsafe { slice::from_raw_parts_mut(buffer, length.div_ceil(4)) };
    status_of(with_host::<I, _, _>(|h| h.read_block_data(lba, length, words)))
}

unsafe extern "efiapi" fn write_block_data<I: HostInstance>(
    _: *const EfiMmcHostProtocol,
    lba: u64,
    length: usize,
    buffer: *mut u32,
) -> EfiStatus {
    if buffer.is_null() || !buffer.is_aligned() {
        return EFI_INVALID_PARAMETER;
    }
    // SAFETY: the caller provides `length` bytes at `buffer`.
    let words = unsafe { slice::from_raw_parts(buffer.cast_const(), length.div_ceil(4)) };
    status_of(with_host::<I, _, _>(|h| h.write_block_data(lba, length, words)))
}

unsafe extern "efiapi" fn set_ios<I: HostInstance>(
    _: *const EfiMmcHostProtocol,
    bus_clock_hz: u32,
    bus_width: u32,
    timing: u32,
) -> EfiStatus {
    status_of(with_host::<I, _, _>(|h| {
        h.set_ios(bus_clock_hz, bus_width, TimingMode::try_from(timing)?)
    }))
}
