//! Infrastructure layer - concrete config clients

pub mod memory;
pub mod nacos;
