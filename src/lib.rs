pub mod cli;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod preview;
pub mod report;
pub mod scanner;
