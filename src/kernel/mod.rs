pub mod cancel;
pub mod probe;
pub mod render;
pub mod time;
