use std::process::Command;

use camino::Utf8Path;
use eyre::Result;
use log::debug;
use marlin::{
    verilator::{VerilatorRuntime, VerilatorRuntimeOptions},
    verilog::prelude::*,
};

// Tiny Tapeout top level of the memory/state-machine project
#[verilog(src = "rtl/tt_um_mem_sm.sv", name = "tt_um_mem_sm")]
pub struct TtMemSm;

pub const DEFAULT_ARTIFACTS: &str = "artifacts";

pub fn create_runtime() -> Result<VerilatorRuntime> {
    create_runtime_in(Utf8Path::new(DEFAULT_ARTIFACTS))
}

pub fn create_runtime_in(artifacts: &Utf8Path) -> Result<VerilatorRuntime> {
    let include_paths = [Utf8Path::new("rtl")];
    let src_files = [Utf8Path::new("rtl/tt_um_mem_sm.sv")];

    debug!("building verilator runtime in {artifacts}");
    VerilatorRuntime::new(
        artifacts,
        &src_files,
        &include_paths,
        [],
        VerilatorRuntimeOptions::default_logging(),
    )
    .map_err(|e| eyre::eyre!("Failed to create runtime: {}", e))
}

/// Whether a `verilator` binary is reachable on `PATH`.
pub fn verilator_available() -> bool {
    Command::new("verilator")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
