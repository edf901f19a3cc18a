// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Per-worker bookkeeping that is not part of the trailed search state.

pub mod statistics;

pub use statistics::{Counters, Statistics};
