mod client;
mod node_directory;

pub use client::*;
pub use node_directory::*;
