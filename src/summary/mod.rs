pub mod core;
pub mod engine;


pub use self::core::*;
pub use self::engine::*;
