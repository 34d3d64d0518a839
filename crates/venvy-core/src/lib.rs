#![deny(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

mod config;
mod discovery;
mod error;
mod fs;
mod lifecycle;
mod locator;
mod outcome;
mod packages;
mod process;
mod shell;
mod supervisor;

pub mod api;

pub use api::*;
