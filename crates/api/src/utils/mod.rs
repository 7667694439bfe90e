//! Binary helpers.

pub mod logging;
