//! Backends that stand in for the system under test.

pub mod host;

pub use host::HostBackend;
