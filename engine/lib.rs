#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
pub mod batch;
pub mod config;
pub mod features;
pub mod model;
pub mod router;
pub mod service;

#[path = "../serve/mod.rs"]
pub mod serve;
