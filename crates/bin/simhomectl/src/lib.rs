//! # simhomectl
//!
//! Operator console for the simulated house.
//!
//! The binary only wires things together; the console itself lives here so
//! that it can be driven from tests without a terminal.

pub mod config;
pub mod console;
