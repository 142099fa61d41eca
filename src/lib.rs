pub mod dut;
pub mod harness;
pub mod protocol;
pub mod simulator;
pub mod suite;

pub use dut::{Dut, ReferenceDut};
pub use harness::Harness;
pub use protocol::{Op, State};
pub use simulator::*;
