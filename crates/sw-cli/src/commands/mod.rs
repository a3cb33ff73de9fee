//! CLI command implementations

pub(crate) mod common;
pub(crate) mod exists;
pub(crate) mod migrate;
pub(crate) mod status;
