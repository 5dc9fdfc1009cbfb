//! Foundation utilities: math, timing, logging

pub mod logging;
pub mod math;
pub mod time;
