pub mod memory;
pub mod traits;

pub use memory::MemoryDriver;
pub use traits::UiDriver;
