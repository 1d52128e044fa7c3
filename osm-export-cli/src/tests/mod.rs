//! Shared test harness modules for the `osm-export` CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;
use crate::export::{ExportConfig, ExportOutcome, execute_export, run_export_with};

mod helpers;
