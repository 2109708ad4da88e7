//! Position sizing — translate a risk budget into trade quantity.
//!
//! Sizers convert a stop distance plus a dollar risk cap into a bounded
//! order quantity. They do NOT decide entry/exit (the signal's job) and do
//! NOT build orders (the position manager's job).

pub mod risk;

pub use risk::{size, size_with_watr, watr_stop_distance, SizedPosition};
