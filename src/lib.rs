//! FleetPulse API smoke harness.
//!
//! Sends a fixed set of requests to a FleetPulse backend, checks each
//! response against a declared contract and a few value rules, and prints a
//! pass/fail report.

pub mod checks;
pub mod cli;
pub mod http;
pub mod runner;
pub mod testing;
