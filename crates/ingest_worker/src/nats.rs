mod message_processor;

pub use message_processor::*;
