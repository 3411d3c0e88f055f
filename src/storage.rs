mod channel;
mod sample;
mod sink;
mod writer;

pub use channel::*;
pub use sample::*;
pub use sink::*;
pub use writer::*;
