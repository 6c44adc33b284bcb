//! License authority wire protocol.

pub mod models;
