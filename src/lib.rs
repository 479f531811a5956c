// src/lib.rs
pub mod aggregate;
pub mod category;
pub mod cell;
pub mod config;
pub mod discover;
pub mod extract;
pub mod metrics;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod rounds;
pub mod table;
pub mod validate;
pub mod workbook;
