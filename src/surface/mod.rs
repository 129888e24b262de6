pub mod memory;

pub use memory::{AnimationEvent, MemorySurface};
