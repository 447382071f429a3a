//! Shared grammar definitions for the `lrzero` integration tests and
//! benchmarks.

pub mod grammars;
