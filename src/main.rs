use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use eyre::{bail, Result};
use log::info;
use tt_mem_sm::{
    create_runtime_in, suite, verilator_available, ReferenceDut, TtMemSm, DEFAULT_ARTIFACTS,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    /// Built-in cycle model
    Reference,
    /// RTL compiled with Verilator
    Verilator,
}

#[derive(Parser, Debug)]
#[command(
    name = "tt-mem-sm",
    version,
    about = "Run the memory and state-machine test suite against the Tiny Tapeout design"
)]
struct Cli {
    #[arg(long, value_enum, default_value_t = Backend::Verilator)]
    backend: Backend,

    /// Verilator build directory.
    #[arg(long, default_value = DEFAULT_ARTIFACTS)]
    artifacts: Utf8PathBuf,

    /// Run only the named test case.
    #[arg(long)]
    test: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let filter = cli.test.as_deref();

    let report = match cli.backend {
        Backend::Reference => {
            info!("running against the reference model");
            let cases = suite::select_tests::<ReferenceDut>(filter)?;
            suite::run_suite(&cases, || Ok(ReferenceDut::new()))?
        }
        Backend::Verilator => {
            if !verilator_available() {
                bail!("verilator not found on PATH; try --backend reference");
            }
            let runtime = create_runtime_in(&cli.artifacts)?;
            info!("verilator model built in {}", cli.artifacts);
            suite::run_suite(&suite::select_tests::<TtMemSm>(filter)?, || {
                runtime
                    .create_model_simple::<TtMemSm>()
                    .map_err(|e| eyre::eyre!("Failed to create model: {:?}", e))
            })?
        }
    };

    for outcome in &report.outcomes {
        match &outcome.failure {
            None => println!("PASS {} ({} cycles)", outcome.name, outcome.cycles),
            Some(msg) => println!("FAIL {}: {}", outcome.name, msg),
        }
    }
    println!(
        "TESTS={} PASS={} FAIL={}",
        report.outcomes.len(),
        report.passed(),
        report.failed()
    );

    if !report.all_passed() {
        bail!("{} test case(s) failed", report.failed());
    }
    Ok(())
}
