use log::warn;
use marlin::verilator::VerilatorRuntime;

use tt_mem_sm::protocol::State;
use tt_mem_sm::{create_runtime, suite, verilator_available, Dut, Harness, TtMemSm};

/// `None` when verilator is not installed; the calling test then passes vacuously.
fn create_runtime_if_available() -> Result<Option<VerilatorRuntime>, Box<dyn std::error::Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    if !verilator_available() {
        warn!("verilator not on PATH, skipping RTL test");
        return Ok(None);
    }
    Ok(Some(create_runtime()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem() -> Result<(), Box<dyn std::error::Error>> {
        let Some(runtime) = create_runtime_if_available()? else {
            return Ok(());
        };
        let dut = runtime
            .create_model_simple::<TtMemSm>()
            .map_err(|e| format!("Failed to create model: {:?}", e))?;

        suite::test_mem(&mut Harness::new(dut))?;
        Ok(())
    }

    #[test]
    fn test_sm() -> Result<(), Box<dyn std::error::Error>> {
        let Some(runtime) = create_runtime_if_available()? else {
            return Ok(());
        };
        let dut = runtime
            .create_model_simple::<TtMemSm>()
            .map_err(|e| format!("Failed to create model: {:?}", e))?;

        suite::test_sm(&mut Harness::new(dut))?;
        Ok(())
    }

    #[test]
    fn test_write_then_read_address_5() -> Result<(), Box<dyn std::error::Error>> {
        let Some(runtime) = create_runtime_if_available()? else {
            return Ok(());
        };
        let dut = runtime
            .create_model_simple::<TtMemSm>()
            .map_err(|e| format!("Failed to create model: {:?}", e))?;
        let mut tb = Harness::new(dut);

        tb.reset();
        tb.write(5, 0xA)?;
        assert_eq!(tb.read(5)?, 0xA);
        assert_eq!(tb.dut().uio_oe() & 0xF, 0xF);
        // uo_out mirrors the bidirectional outputs
        assert_eq!(tb.dut().uo_out(), tb.dut().uio_out());
        Ok(())
    }

    #[test]
    fn test_run_then_reset() -> Result<(), Box<dyn std::error::Error>> {
        let Some(runtime) = create_runtime_if_available()? else {
            return Ok(());
        };
        let dut = runtime
            .create_model_simple::<TtMemSm>()
            .map_err(|e| format!("Failed to create model: {:?}", e))?;
        let mut tb = Harness::new(dut);

        tb.reset();
        assert_eq!(tb.state()?, State::Reset);
        assert_eq!(tb.state_oe(), 0b11);

        tb.run()?;
        assert_eq!(tb.state()?, State::Running);

        tb.reset();
        assert_eq!(tb.state()?, State::Reset);
        Ok(())
    }

    #[test]
    fn test_reset_clears_memory() -> Result<(), Box<dyn std::error::Error>> {
        let Some(runtime) = create_runtime_if_available()? else {
            return Ok(());
        };
        let dut = runtime
            .create_model_simple::<TtMemSm>()
            .map_err(|e| format!("Failed to create model: {:?}", e))?;
        let mut tb = Harness::new(dut);

        tb.reset();
        tb.write(0, 0x3)?;
        tb.write(31, 0xE)?;
        assert_eq!(tb.read(31)?, 0xE);

        tb.reset();
        assert_eq!(tb.read(0)?, 0);
        assert_eq!(tb.read(31)?, 0);
        Ok(())
    }

    #[test]
    fn test_full_suite() -> Result<(), Box<dyn std::error::Error>> {
        let Some(runtime) = create_runtime_if_available()? else {
            return Ok(());
        };
        let report = suite::run_suite(&suite::all_tests::<TtMemSm>(), || {
            runtime
                .create_model_simple::<TtMemSm>()
                .map_err(|e| eyre::eyre!("Failed to create model: {:?}", e))
        })?;

        assert!(report.all_passed(), "{:?}", report.outcomes);
        Ok(())
    }
}
