//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises one subsystem against
//! the mock adapters in [`mock_hw`].  All tests run on the host with no
//! real hardware required.

mod actuator_tests;
mod maintenance_tests;
mod mock_hw;
mod supervisor_tests;
mod water_tank_tests;
