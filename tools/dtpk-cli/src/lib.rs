//! dtpk - DTPK soundbank tool
//!
//! Library half of the `dtpk` binary: manifest-driven builds and the `info`
//! report.

pub mod info;
pub mod manifest;
