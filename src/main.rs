extern crate serde;
extern crate serde_json;

use anyhow::Result;

#[macro_use]
extern crate serde_derive;

mod aggregator;
mod cli;
mod common;
mod config;
mod fallback;
mod source;
mod upstream;
mod web;

fn main() -> Result<()> {
    crate::cli::main()
}
