//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a subsystem against mock
//! ports.  All tests run on the host with no radio or network.

mod mock_ports;
mod runtime_tests;
mod service_tests;
