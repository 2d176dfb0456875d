// Pure domain services: no I/O, no clock
pub mod duration;
pub mod parser;

pub use duration::{extract_duration, DurationUnit};
pub use parser::parse_line;
