//! The pin-level seam between the harness and a device under test.

use crate::protocol::{decode_ui, pack_uio, Op, State, MEM_DEPTH, UIO_DATA_MASK};
use crate::simulator::TtMemSm;

/// Tiny Tapeout top-level pins. Setters only stage values; `eval` propagates them.
pub trait Dut {
    fn set_clk(&mut self, value: u8);
    fn set_rst_n(&mut self, value: u8);
    fn set_ena(&mut self, value: u8);
    fn set_ui_in(&mut self, value: u8);
    fn set_uio_in(&mut self, value: u8);

    fn eval(&mut self);

    fn uo_out(&self) -> u8;
    fn uio_out(&self) -> u8;
    fn uio_oe(&self) -> u8;
}

impl<'ctx> Dut for TtMemSm<'ctx> {
    fn set_clk(&mut self, value: u8) {
        self.clk = value;
    }

    fn set_rst_n(&mut self, value: u8) {
        self.rst_n = value;
    }

    fn set_ena(&mut self, value: u8) {
        self.ena = value;
    }

    fn set_ui_in(&mut self, value: u8) {
        self.ui_in = value;
    }

    fn set_uio_in(&mut self, value: u8) {
        self.uio_in = value;
    }

    fn eval(&mut self) {
        TtMemSm::eval(self);
    }

    fn uo_out(&self) -> u8 {
        self.uo_out
    }

    fn uio_out(&self) -> u8 {
        self.uio_out
    }

    fn uio_oe(&self) -> u8 {
        self.uio_oe
    }
}

/// Cycle-level model of `rtl/tt_um_mem_sm.sv`.
///
/// Sequential logic updates on a 0 -> 1 transition of `clk` observed by
/// `eval`; the output-enables are combinational on `ui_in`.
#[derive(Debug, Clone)]
pub struct ReferenceDut {
    clk: u8,
    rst_n: u8,
    ena: u8,
    ui_in: u8,
    uio_in: u8,

    last_clk: u8,
    mem: [u8; MEM_DEPTH],
    read_q: u8,
    state_q: State,

    uio_out: u8,
    uio_oe: u8,
}

impl Default for ReferenceDut {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceDut {
    pub fn new() -> Self {
        let mut dut = Self {
            clk: 0,
            rst_n: 0,
            ena: 0,
            ui_in: 0,
            uio_in: 0,
            last_clk: 0,
            mem: [0; MEM_DEPTH],
            read_q: 0,
            state_q: State::Reset,
            uio_out: 0,
            uio_oe: 0,
        };
        dut.update_outputs();
        dut
    }

    /// Current memory contents, for scoreboard checks.
    pub fn memory(&self) -> &[u8; MEM_DEPTH] {
        &self.mem
    }

    pub fn enabled(&self) -> bool {
        self.ena != 0
    }

    fn rising_edge(&mut self) {
        if self.rst_n == 0 {
            self.state_q = State::Reset;
            self.read_q = 0;
            self.mem = [0; MEM_DEPTH];
            return;
        }

        let (op, addr) = decode_ui(self.ui_in);
        let index = usize::from(addr) % MEM_DEPTH;
        // Selector 3 is reserved and leaves everything untouched.
        match op {
            Ok(Op::Read) => self.read_q = self.mem[index],
            Ok(Op::Write) => self.mem[index] = self.uio_in & UIO_DATA_MASK,
            Ok(Op::Run) => self.state_q = State::Running,
            Err(_) => {}
        }
    }

    fn update_outputs(&mut self) {
        self.uio_out = pack_uio(self.state_q as u8, self.read_q);
        let (op, _) = decode_ui(self.ui_in);
        let data_oe = if matches!(op, Ok(Op::Read)) { UIO_DATA_MASK } else { 0 };
        self.uio_oe = pack_uio(0b11, data_oe);
    }
}

impl Dut for ReferenceDut {
    fn set_clk(&mut self, value: u8) {
        self.clk = value & 1;
    }

    fn set_rst_n(&mut self, value: u8) {
        self.rst_n = value & 1;
    }

    fn set_ena(&mut self, value: u8) {
        self.ena = value & 1;
    }

    fn set_ui_in(&mut self, value: u8) {
        self.ui_in = value;
    }

    fn set_uio_in(&mut self, value: u8) {
        self.uio_in = value;
    }

    fn eval(&mut self) {
        if self.last_clk == 0 && self.clk == 1 {
            self.rising_edge();
        }
        self.last_clk = self.clk;
        self.update_outputs();
    }

    fn uo_out(&self) -> u8 {
        self.uio_out
    }

    fn uio_out(&self) -> u8 {
        self.uio_out
    }

    fn uio_oe(&self) -> u8 {
        self.uio_oe
    }
}
