use core::hint::spin_loop;
use core::sync::atomic::{Ordering, fence};

use bsp_regs::{Delay, RegisterBlock};
use log::{debug, error, trace};

use crate::idmac::{BLOCK_SIZE, CoherentDma, DmaOps, IdmacDescriptor, build_chain};
use crate::protocol::{DEVICE_PATH, MmcDevicePath};
use crate::regs::*;
use crate::{MmcCmd, MmcError, MmcHost, MmcState, ResponseType, TimingMode};

pub const DEFAULT_BASE_CLOCK_HZ: u32 = 100_000_000;
/// Card clock used during identification.
pub const INIT_CLOCK_HZ: u32 = 400_000;

/// Spins allowed for self-clearing controller bits and the data busy flag.
pub const RESET_POLL_LIMIT: u32 = 100_000;
/// Time given to the card before every command.
pub const COMMAND_SETTLE_US: u32 = 15_000;
pub const COMMAND_POLL_US: u32 = 500;
pub const COMMAND_POLL_LIMIT: u32 = 4_000;
/// 1 us polls waiting for data transfer over.
pub const DATA_POLL_LIMIT: u32 = 1_000_000;
/// Idle polls allowed between two FIFO words on reads.
pub const FIFO_READ_POLL_LIMIT: u32 = 1_000_000;
/// 1 us polls waiting for FIFO space on writes.
pub const FIFO_WRITE_POLL_LIMIT: u32 = 1_000_000;
/// Writes wait until the FIFO holds at most this many words.
pub const FIFO_WRITE_THRESHOLD: u32 = 32;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TransferMode {
    /// Block data through the internal DMA controller.
    Idmac,
    /// Block data through the FIFO window, one word at a time.
    Fifo,
}

impl TransferMode {
    pub const DEFAULT: Self = if cfg!(feature = "emmc-pio") {
        Self::Fifo
    } else {
        Self::Idmac
    };
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DwEmmcConfig {
    /// Rate of the controller's source clock.
    pub base_clock_hz: u32,
    pub transfer_mode: TransferMode,
}

impl DwEmmcConfig {
    pub const DEFAULT: Self = Self {
        base_clock_hz: DEFAULT_BASE_CLOCK_HZ,
        transfer_mode: TransferMode::DEFAULT,
    };
}

impl Default for DwEmmcConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Controller command flags for a bus command.
///
/// Every command also carries its index, `USE_HOLD_REG` and `START`.
pub fn command_flags(cmd: MmcCmd, argument: u32) -> Cmd {
    const RESP: Cmd = Cmd::RESPONSE_EXPECT;
    const CRC: Cmd = Cmd::CHECK_RESPONSE_CRC;
    const WAIT: Cmd = Cmd::WAIT_PRVDATA_COMPLETE;
    let read = RESP | CRC | Cmd::DATA_EXPECTED | Cmd::READ | WAIT;

    let index = cmd.index();
    let flags = match index {
        0 => Cmd::SEND_INIT,
        1 | 41 => RESP,
        2 => RESP | Cmd::LONG_RESPONSE | CRC | Cmd::SEND_INIT,
        3 => RESP | CRC | Cmd::SEND_INIT,
        6 if argument & (1 << 31) != 0 => read,
        7 if argument == 0 => Cmd::empty(),
        8 | 13 => RESP | CRC | WAIT,
        9 => RESP | CRC | Cmd::LONG_RESPONSE,
        12 => RESP | CRC | Cmd::STOP_ABORT_CMD,
        17 | 18 | 51 => read,
        24 | 25 => RESP | CRC | Cmd::DATA_EXPECTED | Cmd::WRITE | WAIT,
        30 => RESP | CRC | Cmd::DATA_EXPECTED,
        _ => RESP | CRC,
    };
    flags | Cmd::from_bits_retain(index) | Cmd::USE_HOLD_REG | Cmd::START
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct PendingCommand {
    flags: Cmd,
    argument: u32,
}

/// DesignWare eMMC host controller.
///
/// Commands that move data are held back and issued by the next block
/// transfer, once the byte count is programmed.
pub struct DwEmmc<R, D, M = CoherentDma> {
    regs: R,
    delay: D,
    dma: M,
    config: DwEmmcConfig,
    descriptors: &'static mut [IdmacDescriptor],
    pending: Option<PendingCommand>,
}

impl<R, D, M> DwEmmc<R, D, M>
where
    R: RegisterBlock,
    D: Delay,
    M: DmaOps,
{
    /// `descriptors` backs IDMAC transfers and may be empty in FIFO mode.
    pub fn new(
        regs: R,
        delay: D,
        dma: M,
        config: DwEmmcConfig,
        descriptors: &'static mut [IdmacDescriptor],
    ) -> Self {
        Self {
            regs,
            delay,
            dma,
            config,
            descriptors,
            pending: None,
        }
    }

    pub fn regs(&self) -> &R {
        &self.regs
    }

    pub fn config(&self) -> &DwEmmcConfig {
        &self.config
    }

    pub fn descriptors(&self) -> &[IdmacDescriptor] {
        &self.descriptors[..]
    }

    /// Flags and argument of the deferred data command, if any.
    pub fn pending_command(&self) -> Option<(Cmd, u32)> {
        self.pending.map(|p| (p.flags, p.argument))
    }

    pub fn into_parts(self) -> (R, D, M) {
        (self.regs, self.delay, self.dma)
    }

    fn wait_while<F>(
        &mut self,
        what: &'static str,
        limit: u32,
        interval_us: u32,
        mut busy: F,
    ) -> Result<(), MmcError>
    where
        F: FnMut(&R) -> Result<bool, MmcError>,
    {
        for _ in 0..limit {
            if !busy(&self.regs)? {
                return Ok(());
            }
            if interval_us > 0 {
                self.delay.delay_us(interval_us);
            } else {
                spin_loop();
            }
        }
        error!("timed out waiting for {what}");
        Err(MmcError::Timeout(what))
    }

    fn wait_data_idle(&mut self) -> Result<(), MmcError> {
        self.wait_while("data idle", RESET_POLL_LIMIT, 0, |r| {
            Ok(r.is_set32(STATUS, Status::DATA_BUSY.bits()))
        })
    }

    fn update_clock(&mut self) -> Result<(), MmcError> {
        let cmd = Cmd::WAIT_PRVDATA_COMPLETE | Cmd::UPDATE_CLOCK_ONLY | Cmd::START;
        self.regs.write32(CMD, cmd.bits());
        self.wait_while("clock update", RESET_POLL_LIMIT, 0, |r| {
            if !r.is_set32(CMD, Cmd::START.bits()) {
                return Ok(false);
            }
            if r.is_set32(RINTSTS, Int::HLE.bits()) {
                error!("failed to update mmc clock frequency");
                return Err(MmcError::ClockUpdate);
            }
            Ok(true)
        })
    }

    /// Programs the card clock divider for the fastest rate not above `hz`.
    pub fn set_clock(&mut self, hz: u32) -> Result<(), MmcError> {
        let source = self.config.base_clock_hz / 2;
        let div = (1..256u32)
            .find(|div| source / (2 * div) <= hz)
            .ok_or(MmcError::ClockNotFound(hz))?;

        self.wait_data_idle()?;
        self.regs.write32(CLKENA, 0);
        self.update_clock()?;
        self.regs.write32(CLKDIV, div);
        self.update_clock()?;
        self.regs.write32(CLKENA, 1);
        self.regs.write32(CLKSRC, 0);
        self.update_clock()?;
        debug!("card clock {} Hz (requested {hz}, divider {div})", source / (2 * div));
        Ok(())
    }

    fn init_hardware(&mut self) -> Result<(), MmcError> {
        self.pending = None;
        self.regs.write32(PWREN, 1);
        self.regs.write32(CTRL, Ctrl::RESET_ALL.bits());
        self.wait_while("controller reset", RESET_POLL_LIMIT, 0, |r| {
            Ok(r.is_set32(CTRL, Ctrl::RESET_ALL.bits()))
        })?;

        self.set_clock(INIT_CLOCK_HZ)?;
        self.delay.delay_us(100);

        self.regs.write32(RINTSTS, !0);
        self.regs.write32(INTMASK, 0);
        self.regs.write32(TMOUT, !0);
        self.regs.write32(IDINTEN, 0);
        self.regs.write32(BMOD, Bmod::SWRESET.bits());
        self.regs.write32(BLKSIZ, BLOCK_SIZE as u32);
        self.wait_while("IDMAC reset", RESET_POLL_LIMIT, 0, |r| {
            Ok(r.is_set32(BMOD, Bmod::SWRESET.bits()))
        })?;
        debug!("dw_emmc: controller initialised");
        Ok(())
    }

    fn issue(&mut self, flags: Cmd, argument: u32) -> Result<(), MmcError> {
        let index = flags.intersection(Cmd::INDEX).bits();
        trace!("CMD{index} arg={argument:#010x} flags={:#010x}", flags.bits());

        self.delay.delay_us(COMMAND_SETTLE_US);
        self.wait_data_idle()?;
        self.regs.write32(RINTSTS, !0);
        self.regs.write32(CMDARG, argument);
        self.regs.write32(CMD, flags.bits());

        for _ in 0..COMMAND_POLL_LIMIT {
            self.delay.delay_us(COMMAND_POLL_US);
            let rintsts = self.regs.read32(RINTSTS);
            let status = Int::from_bits_retain(rintsts);
            if status.intersects(Int::COMMAND_ERRORS) {
                debug!("CMD{index} failed, rintsts={rintsts:#010x}");
                return Err(MmcError::Device { index, rintsts });
            }
            if status.intersects(Int::DTO | Int::CMD_DONE) {
                return Ok(());
            }
        }
        error!("CMD{index} did not complete");
        Err(MmcError::Timeout("command completion"))
    }

    /// Common setup of a block transfer for the deferred `flags`.
    fn prepare_transfer(
        &mut self,
        flags: Cmd,
        length: usize,
        reset_fifo: bool,
    ) -> Result<(), MmcError> {
        if flags.contains(Cmd::WAIT_PRVDATA_COMPLETE) {
            self.wait_data_idle()?;
        }
        if reset_fifo
            && flags.intersects(Cmd::STOP_ABORT_CMD | Cmd::DATA_EXPECTED)
            && !self.regs.is_set32(STATUS, Status::FIFO_EMPTY.bits())
        {
            self.regs.set_bits32(CTRL, Ctrl::FIFO_RESET.bits());
            self.wait_while("FIFO reset", RESET_POLL_LIMIT, 0, |r| {
                Ok(r.is_set32(CTRL, Ctrl::FIFO_RESET.bits()))
            })?;
        }
        self.regs.write32(BLKSIZ, BLOCK_SIZE as u32);
        self.regs.write32(BYTCNT, length as u32);
        Ok(())
    }

    fn start_dma(&mut self, buffer: usize, length: usize) -> Result<(), MmcError> {
        let table = self.descriptors.as_ptr() as usize;
        let table_addr = self.dma.bus_address(table)?;
        let buffer_addr = self.dma.bus_address(buffer)?;
        let count = build_chain(&mut self.descriptors[..], table_addr, buffer_addr, length)?;
        fence(Ordering::SeqCst);
        self.dma.clean(table, count * size_of::<IdmacDescriptor>());
        self.regs.write32(DBADDR, table_addr);

        self.regs
            .set_bits32(CTRL, (Ctrl::INT_EN | Ctrl::DMA_EN | Ctrl::IDMAC_EN).bits());
        self.regs.set_bits32(BMOD, (Bmod::ENABLE | Bmod::FB).bits());
        self.regs.write32(BLKSIZ, BLOCK_SIZE as u32);
        self.regs.write32(BYTCNT, length as u32);
        trace!("IDMAC: {count} descriptors for {length} bytes at {buffer_addr:#x}");
        Ok(())
    }

    fn wait_data_over(&mut self, index: u32, errors: Int) -> Result<(), MmcError> {
        for _ in 0..DATA_POLL_LIMIT {
            let rintsts = self.regs.read32(RINTSTS);
            let status = Int::from_bits_retain(rintsts);
            if status.intersects(errors) {
                error!("CMD{index} data error, rintsts={rintsts:#010x}");
                return Err(MmcError::Device { index, rintsts });
            }
            if status.contains(Int::DTO) {
                return Ok(());
            }
            self.delay.delay_us(1);
        }
        error!("CMD{index} data transfer did not finish");
        Err(MmcError::Timeout("data transfer"))
    }

    fn fifo_read(&mut self, index: u32, words: &mut [u32]) -> Result<(), MmcError> {
        let mut filled = 0;
        let mut budget = FIFO_READ_POLL_LIMIT;
        loop {
            let rintsts = self.regs.read32(RINTSTS);
            if Int::from_bits_retain(rintsts).intersects(Int::READ_ERRORS) {
                error!(
                    "CMD{index} read error, rintsts={rintsts:#010x}, {} words left",
                    words.len() - filled
                );
                return Err(MmcError::Device { index, rintsts });
            }

            while filled < words.len()
                && !self.regs.is_set32(STATUS, Status::FIFO_EMPTY.bits())
            {
                words[filled] = self.regs.read32(FIFO);
                filled += 1;
                budget = FIFO_READ_POLL_LIMIT;
            }

            if filled == words.len() {
                let rintsts = self.regs.read32(RINTSTS);
                if Int::from_bits_retain(rintsts).intersects(Int::READ_ERRORS) {
                    return Err(MmcError::Device { index, rintsts });
                }
                return Ok(());
            }

            self.delay.delay_ns(1);
            budget -= 1;
            if budget == 0 {
                error!(
                    "CMD{index} FIFO read stalled, {} words left",
                    words.len() - filled
                );
                return Err(MmcError::Timeout("FIFO data"));
            }
        }
    }

    fn fifo_write(&mut self, index: u32, words: &[u32]) -> Result<(), MmcError> {
        for &word in words {
            self.wait_while("FIFO space", FIFO_WRITE_POLL_LIMIT, 1, |r| {
                Ok(fifo_count(r.read32(STATUS)) > FIFO_WRITE_THRESHOLD)
            })?;
            self.regs.write32(FIFO, word);
        }
        self.wait_data_over(index, Int::DATA_ERRORS)
    }

    fn take_pending(&mut self) -> Result<PendingCommand, MmcError> {
        self.pending.take().ok_or_else(|| {
            error!("block transfer without a data command");
            MmcError::NoPendingCommand
        })
    }
}

fn check_buffer(length: usize, words: usize) -> Result<(), MmcError> {
    if length == 0 {
        return Err(MmcError::InvalidParameter);
    }
    let available = words * 4;
    if available < length {
        return Err(MmcError::BufferTooSmall {
            required: length,
            available,
        });
    }
    Ok(())
}

impl<R, D, M> MmcHost for DwEmmc<R, D, M>
where
    R: RegisterBlock,
    D: Delay,
    M: DmaOps,
{
    fn is_card_present(&self) -> bool {
        true
    }

    fn is_read_only(&self) -> bool {
        false
    }

    fn is_dma_supported(&self) -> bool {
        true
    }

    fn build_device_path(&self) -> &'static MmcDevicePath {
        &DEVICE_PATH
    }

    fn notify_state(&mut self, state: MmcState) -> Result<(), MmcError> {
        trace!("dw_emmc: state {state:?}");
        match state {
            MmcState::Invalid => Err(MmcError::InvalidParameter),
            MmcState::HwInitialization => self.init_hardware(),
            _ => Ok(()),
        }
    }

    fn send_command(&mut self, cmd: MmcCmd, argument: u32) -> Result<(), MmcError> {
        let flags = command_flags(cmd, argument);
        if flags.contains(Cmd::DATA_EXPECTED) {
            trace!("CMD{} deferred until the data transfer", cmd.index());
            self.pending = Some(PendingCommand { flags, argument });
            return Ok(());
        }
        self.issue(flags, argument)
    }

    fn receive_response(
        &mut self,
        response_type: ResponseType,
        buffer: &mut [u32],
    ) -> Result<(), MmcError> {
        let words = buffer
            .get_mut(..response_type.words())
            .ok_or(MmcError::InvalidParameter)?;
        for (offset, word) in (RESP0..).step_by(4).zip(words.iter_mut()) {
            *word = self.regs.read32(offset);
        }
        Ok(())
    }

    fn read_block_data(
        &mut self,
        _lba: u64,
        length: usize,
        buffer: &mut [u32],
    ) -> Result<(), MmcError> {
        check_buffer(length, buffer.len())?;
        let pending = self.take_pending()?;
        let index = pending.flags.intersection(Cmd::INDEX).bits();
        self.prepare_transfer(pending.flags, length, true)?;

        match self.config.transfer_mode {
            TransferMode::Idmac => {
                let addr = buffer.as_mut_ptr() as usize;
                self.dma.invalidate(addr, length);
                self.start_dma(addr, length)?;
                self.issue(pending.flags, pending.argument)?;
                self.wait_data_over(index, Int::DATA_ERRORS)?;
                self.dma.invalidate(addr, length);
                Ok(())
            }
            TransferMode::Fifo => {
                self.issue(pending.flags, pending.argument)?;
                self.fifo_read(index, &mut buffer[..length / 4])
            }
        }
    }

    fn write_block_data(
        &mut self,
        _lba: u64,
        length: usize,
        buffer: &[u32],
    ) -> Result<(), MmcError> {
        check_buffer(length, buffer.len())?;
        let pending = self.take_pending()?;
        let index = pending.flags.intersection(Cmd::INDEX).bits();
        // CMD6 and CMD51 transfers keep the FIFO contents.
        let reset_fifo = !matches!(index, 6 | 51);
        self.prepare_transfer(pending.flags, length, reset_fifo)?;

        match self.config.transfer_mode {
            TransferMode::Idmac => {
                let addr = buffer.as_ptr() as usize;
                self.dma.clean(addr, length);
                self.start_dma(addr, length)?;
                self.issue(pending.flags, pending.argument)?;
                self.wait_data_over(index, Int::DATA_ERRORS)
            }
            TransferMode::Fifo => {
                self.issue(pending.flags, pending.argument)?;
                self.fifo_write(index, &buffer[..length / 4])
            }
        }
    }

    fn set_ios(
        &mut self,
        bus_clock_hz: u32,
        bus_width: u32,
        timing: TimingMode,
    ) -> Result<(), MmcError> {
        if timing != TimingMode::Backward {
            let uhs = self.regs.read32(UHSREG);
            let uhs = match timing {
                TimingMode::Hs52Ddr1V2 | TimingMode::Hs52Ddr1V8 => uhs | UHS_DDR,
                TimingMode::Hs52 | TimingMode::Hs26 => uhs & !UHS_DDR,
                _ => return Err(MmcError::Unsupported("timing mode")),
            };
            self.regs.write32(UHSREG, uhs);
        }

        let ctype = match bus_width {
            1 => CTYPE_1BIT,
            4 => CTYPE_4BIT,
            8 => CTYPE_8BIT,
            _ => return Err(MmcError::Unsupported("bus width")),
        };
        self.regs.write32(CTYPE, ctype);

        if bus_clock_hz != 0 {
            self.set_clock(bus_clock_hz)?;
        }
        Ok(())
    }

    fn is_multi_block(&self) -> bool {
        true
    }
}
