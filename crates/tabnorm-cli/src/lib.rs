//! Library side of the `tabnorm` binary: configuration, logging and the
//! batch driver.

pub mod batch;
pub mod config;
pub mod logging;
