//! Pin-level bus encoding shared by the RTL, the reference model and the harness.
//!
//! `ui_in` carries a 6-bit address field with the operation selector shifted
//! into bits 7:6. The bidirectional bus carries the data nibble in bits 3:0
//! and the state code in bits 5:4, each with its own output-enable bits.

use eyre::{bail, Result};

pub const OP_SHIFT: u8 = 6;
pub const ADDR_MASK: u8 = 0x3F;

pub const UIO_DATA_MASK: u8 = 0xF;
pub const UIO_STATE_SHIFT: u8 = 4;
pub const UIO_STATE_MASK: u8 = 0x3;

/// Number of addressable memory words.
pub const MEM_DEPTH: usize = 32;
/// Number of distinct values a memory word holds.
pub const DATA_VALUES: u8 = 16;

/// Cycles `rst_n` is held low before stimulus starts.
pub const RESET_CYCLES: u32 = 10;
/// Cycles waited after issuing RUN before the state is sampled.
pub const RUN_SETTLE_CYCLES: u32 = 2;
/// 10 us clock period (100 kHz).
pub const CLOCK_PERIOD_NS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Op {
    Read = 0,
    Write = 1,
    Run = 2,
}

impl TryFrom<u8> for Op {
    type Error = eyre::Report;

    fn try_from(selector: u8) -> Result<Self> {
        match selector {
            0 => Ok(Op::Read),
            1 => Ok(Op::Write),
            2 => Ok(Op::Run),
            other => bail!("reserved operation selector {other:#04b}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum State {
    Reset = 0,
    Running = 1,
}

impl TryFrom<u8> for State {
    type Error = eyre::Report;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(State::Reset),
            1 => Ok(State::Running),
            other => bail!("undefined state code {other:#04b}"),
        }
    }
}

/// Build the `ui_in` value selecting `op` on `addr`.
pub fn encode_ui(op: Op, addr: u8) -> Result<u8> {
    if usize::from(addr) >= MEM_DEPTH {
        bail!("address {addr} outside memory of depth {MEM_DEPTH}");
    }
    Ok(addr | ((op as u8) << OP_SHIFT))
}

/// Split `ui_in` into its operation and address field.
///
/// The address is returned even when the selector is reserved.
pub fn decode_ui(ui_in: u8) -> (Result<Op>, u8) {
    (Op::try_from(ui_in >> OP_SHIFT), ui_in & ADDR_MASK)
}

/// Data nibble of a `uio_out` or `uio_oe` value.
pub fn data_nibble(uio: u8) -> u8 {
    uio & UIO_DATA_MASK
}

/// State field of a `uio_out` or `uio_oe` value.
pub fn state_field(uio: u8) -> u8 {
    (uio & (UIO_STATE_MASK << UIO_STATE_SHIFT)) >> UIO_STATE_SHIFT
}

/// Pack a data nibble and state code into the bidirectional bus layout.
pub fn pack_uio(state: u8, data: u8) -> u8 {
    ((state & UIO_STATE_MASK) << UIO_STATE_SHIFT) | (data & UIO_DATA_MASK)
}
