//! Cable drum consumption reconciliation.
//!
//! Turns the usage records of one drum into used, wasted and remaining footage
//! under the drum's chosen calculation method.

mod types;
mod wastage;

pub use types::*;
pub use wastage::{
    calculate_wastage, complement_segments, footage_marks, merge_intervals, normalize_record,
    round_meters, total_length, validate_manual_wastage, WastageCalculator, WastageMethod,
};
