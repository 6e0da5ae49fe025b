mod expander;
mod projector;
mod translator;

pub use expander::*;
pub use projector::*;
pub use translator::*;
