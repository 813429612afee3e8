// src/lib.rs

//! League of Legends free champion rotation bot library

pub mod config;
pub mod error;
pub mod formatter;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod testing;
