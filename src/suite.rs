//! The project's test cases and a small runner that reports pass/fail per case.

use eyre::{bail, ensure, Result};
use log::{error, info};

use crate::dut::Dut;
use crate::harness::Harness;
use crate::protocol::{State, DATA_VALUES, MEM_DEPTH, UIO_DATA_MASK};

/// Every address receives every nibble; each write is read back on the next edge.
pub fn test_mem<D: Dut>(tb: &mut Harness<D>) -> Result<()> {
    info!("Start");
    tb.reset();

    info!("Test project behavior");
    for addr in 0..MEM_DEPTH as u8 {
        for value in 0..DATA_VALUES {
            tb.write(addr, value)?;
            let observed = tb.read(addr)?;
            ensure!(
                observed == value,
                "address {addr} value {value:#x}: read {observed:#x}, expected {value:#x}"
            );
        }
    }
    Ok(())
}

/// RESET after reset release, RUNNING two cycles after RUN.
pub fn test_sm<D: Dut>(tb: &mut Harness<D>) -> Result<()> {
    info!("Start");
    tb.reset();

    info!("Test project behavior");
    tb.expect_state_driven()?;
    tb.expect_state(State::Reset)?;

    tb.run()?;
    tb.expect_state(State::Running)
}

/// Writes to one address leave every other address untouched.
pub fn test_mem_retention<D: Dut>(tb: &mut Harness<D>) -> Result<()> {
    tb.reset();

    let pattern = |addr: u8| (addr * 7 + 3) % DATA_VALUES;
    let mut expected = [0u8; MEM_DEPTH];
    for addr in 0..MEM_DEPTH as u8 {
        expected[usize::from(addr)] = pattern(addr);
        tb.write(addr, pattern(addr))?;
    }
    check_all(tb, &expected)?;

    // The pattern repeats every 16 words, so flip the upper half to expose
    // a device that drops address bit 4.
    let upper = MEM_DEPTH as u8 / 2;
    for addr in upper..MEM_DEPTH as u8 {
        expected[usize::from(addr)] = pattern(addr) ^ UIO_DATA_MASK;
        tb.write(addr, expected[usize::from(addr)])?;
    }
    check_all(tb, &expected)
}

fn check_all<D: Dut>(tb: &mut Harness<D>, expected: &[u8; MEM_DEPTH]) -> Result<()> {
    for (addr, &value) in (0u8..).zip(expected.iter()) {
        let observed = tb.read(addr)?;
        ensure!(
            observed == value,
            "address {addr}: read {observed:#x}, expected {value:#x}"
        );
    }
    Ok(())
}

/// The state field stays driven whatever operation is on the bus.
pub fn test_state_oe_persistent<D: Dut>(tb: &mut Harness<D>) -> Result<()> {
    tb.reset();
    tb.expect_state_driven()?;

    tb.write(9, 0x5)?;
    tb.expect_state_driven()?;
    tb.read(9)?;
    tb.expect_state_driven()?;

    tb.run()?;
    tb.expect_state_driven()?;
    tb.expect_state(State::Running)?;

    // Memory stays usable once running.
    tb.write(9, 0xC)?;
    tb.expect_state_driven()?;
    let observed = tb.read(9)?;
    ensure!(observed == 0xC, "read {observed:#x} while running, expected 0xc");
    tb.expect_state(State::Running)
}

/// Reset is the only way back from RUNNING.
pub fn test_reset_returns_to_reset_state<D: Dut>(tb: &mut Harness<D>) -> Result<()> {
    tb.reset();
    tb.run()?;
    tb.expect_state(State::Running)?;

    // Further non-RUN traffic does not leave RUNNING.
    tb.read(0)?;
    tb.expect_state(State::Running)?;

    tb.reset();
    tb.expect_state_driven()?;
    tb.expect_state(State::Reset)
}

pub struct TestCase<D: Dut> {
    pub name: &'static str,
    pub run: fn(&mut Harness<D>) -> Result<()>,
}

pub fn all_tests<D: Dut>() -> Vec<TestCase<D>> {
    vec![
        TestCase { name: "test_mem", run: test_mem },
        TestCase { name: "test_sm", run: test_sm },
        TestCase { name: "test_mem_retention", run: test_mem_retention },
        TestCase { name: "test_state_oe_persistent", run: test_state_oe_persistent },
        TestCase {
            name: "test_reset_returns_to_reset_state",
            run: test_reset_returns_to_reset_state,
        },
    ]
}

/// All cases, or only the one called `filter`.
pub fn select_tests<D: Dut>(filter: Option<&str>) -> Result<Vec<TestCase<D>>> {
    let cases: Vec<_> = all_tests::<D>()
        .into_iter()
        .filter(|case| filter.map_or(true, |name| case.name == name))
        .collect();
    if cases.is_empty() {
        bail!("no test case named {:?}", filter.unwrap_or_default());
    }
    Ok(cases)
}

#[derive(Debug)]
pub struct CaseOutcome {
    pub name: &'static str,
    pub cycles: u64,
    pub failure: Option<String>,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Default)]
pub struct SuiteReport {
    pub outcomes: Vec<CaseOutcome>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

/// Run `cases`, each on a fresh DUT from `make_dut`.
///
/// A failing case is recorded and the runner moves on; only a DUT that cannot
/// be built aborts the run.
pub fn run_suite<D, F>(cases: &[TestCase<D>], mut make_dut: F) -> Result<SuiteReport>
where
    D: Dut,
    F: FnMut() -> Result<D>,
{
    let mut report = SuiteReport::default();
    for case in cases {
        info!("running {}", case.name);
        let mut tb = Harness::new(make_dut()?);
        let failure = match (case.run)(&mut tb) {
            Ok(()) => {
                info!("{} passed after {} ns", case.name, tb.sim_time_ns());
                None
            }
            Err(e) => {
                error!("{} failed: {e}", case.name);
                Some(e.to_string())
            }
        };
        report.outcomes.push(CaseOutcome {
            name: case.name,
            cycles: tb.cycles(),
            failure,
        });
    }
    info!("{} passed, {} failed", report.passed(), report.failed());
    Ok(report)
}
