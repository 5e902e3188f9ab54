//! Per-OS elevation primitives used by `elevation::ElevationStrategy`.

pub mod linux;
pub mod windows;
