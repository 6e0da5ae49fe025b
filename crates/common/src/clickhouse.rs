mod client;
mod point_sink;

pub use client::*;
pub use point_sink::*;
