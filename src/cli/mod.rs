//! Command-line interface
//!
//! This module contains the CLI commands and the scripted scenarios the
//! demo binary runs. Nothing here holds ledger invariants.

pub mod commands;
pub mod scenarios;

pub use commands::{Command, Opt};
pub use scenarios::{run_demo, DemoReport, ScenarioOutcome};
