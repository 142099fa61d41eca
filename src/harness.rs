//! Clocked stimulus driver over any [`Dut`].

use eyre::{ensure, Result};
use log::{debug, info};

use crate::dut::Dut;
use crate::protocol::{
    data_nibble, encode_ui, state_field, Op, State, CLOCK_PERIOD_NS, RESET_CYCLES,
    RUN_SETTLE_CYCLES, UIO_DATA_MASK, UIO_STATE_MASK,
};

pub struct Harness<D: Dut> {
    dut: D,
    cycle_count: u64,
}

impl<D: Dut> Harness<D> {
    pub fn new(dut: D) -> Self {
        Self {
            dut,
            cycle_count: 0,
        }
    }

    pub fn dut(&self) -> &D {
        &self.dut
    }

    pub fn dut_mut(&mut self) -> &mut D {
        &mut self.dut
    }

    pub fn into_inner(self) -> D {
        self.dut
    }

    /// Rising edges seen since construction.
    pub fn cycles(&self) -> u64 {
        self.cycle_count
    }

    pub fn sim_time_ns(&self) -> u64 {
        self.cycle_count * CLOCK_PERIOD_NS
    }

    /// Single clock period
    pub fn step(&mut self) {
        // Rising edge
        self.dut.set_clk(1);
        self.dut.eval();

        // Falling edge
        self.dut.set_clk(0);
        self.dut.eval();

        self.cycle_count += 1;
    }

    pub fn clock_cycles(&mut self, cycles: u32) {
        for _ in 0..cycles {
            self.step();
        }
    }

    /// Enable the design and hold `rst_n` low for [`RESET_CYCLES`], then release it.
    pub fn reset(&mut self) {
        info!("Reset");
        self.dut.set_clk(0);
        self.dut.set_ena(1);
        self.dut.set_ui_in(0);
        self.dut.set_uio_in(0);
        self.dut.set_rst_n(0);
        self.dut.eval();

        self.clock_cycles(RESET_CYCLES);

        self.dut.set_rst_n(1);
        self.dut.eval();
        debug!("reset released at {} ns", self.sim_time_ns());
    }

    /// Drive `op` on `addr` without advancing the clock.
    pub fn drive(&mut self, op: Op, addr: u8) -> Result<()> {
        self.dut.set_ui_in(encode_ui(op, addr)?);
        self.dut.eval();
        Ok(())
    }

    pub fn write(&mut self, addr: u8, value: u8) -> Result<()> {
        ensure!(
            value <= UIO_DATA_MASK,
            "write value {value:#x} does not fit the data nibble"
        );
        self.dut.set_uio_in(value);
        self.drive(Op::Write, addr)?;
        self.step();
        Ok(())
    }

    /// Read `addr`, checking the data nibble is driven.
    pub fn read(&mut self, addr: u8) -> Result<u8> {
        self.drive(Op::Read, addr)?;
        self.step();

        let oe = data_nibble(self.dut.uio_oe());
        ensure!(
            oe == UIO_DATA_MASK,
            "read of address {addr}: data output-enable {oe:#x}, expected {UIO_DATA_MASK:#x}"
        );
        Ok(data_nibble(self.dut.uio_out()))
    }

    /// Issue RUN and wait [`RUN_SETTLE_CYCLES`].
    pub fn run(&mut self) -> Result<()> {
        self.drive(Op::Run, 0)?;
        self.clock_cycles(RUN_SETTLE_CYCLES);
        Ok(())
    }

    pub fn state(&self) -> Result<State> {
        State::try_from(state_field(self.dut.uio_out()))
    }

    pub fn state_oe(&self) -> u8 {
        state_field(self.dut.uio_oe())
    }

    /// Fail unless the state field is fully driven.
    pub fn expect_state_driven(&self) -> Result<()> {
        let oe = self.state_oe();
        ensure!(
            oe == UIO_STATE_MASK,
            "state output-enable {oe:#04b}, expected {UIO_STATE_MASK:#04b}"
        );
        Ok(())
    }

    pub fn expect_state(&self, expected: State) -> Result<()> {
        let state = self.state()?;
        ensure!(
            state == expected,
            "state {state:?} at cycle {}, expected {expected:?}",
            self.cycle_count
        );
        Ok(())
    }
}
