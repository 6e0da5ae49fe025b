mod message;
mod node;
mod point;
mod result;

pub use message::*;
pub use node::*;
pub use point::*;
pub use result::*;
