#![no_std]

extern crate alloc;

pub use analysis::*;
pub use area::*;
pub use assist::*;
pub use board::*;
pub use config::*;
pub use error::*;
pub use generator::*;
pub use reveal::*;
pub use save::*;
pub use session::*;
pub use types::*;

pub(crate) use reveal::open_area;

mod analysis;
mod area;
mod assist;
mod board;
mod config;
mod error;
mod generator;
mod reveal;
mod save;
mod session;
mod types;
