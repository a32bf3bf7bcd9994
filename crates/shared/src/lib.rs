//! Domain and wire types shared by the water potability client crates.

pub mod domain;
pub mod error;
pub mod protocol;
