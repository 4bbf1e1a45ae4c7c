mod duration;

pub use duration::{parse_duration, parse_mode};
