pub mod memory_tools;

pub use memory_tools::{MemoryTool, MemoryToolError};
