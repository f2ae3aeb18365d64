//! Nacos HTTP client

pub mod client;
pub mod dto;

pub use client::NacosClient;
