pub use crate::chip8::Chip8;
pub use crate::error::Error;
pub use crate::inputs::Quirks;
pub use crate::opcode::Opcode;

mod chip8;
pub mod constants;
mod error;
mod inputs;
mod instruction;
mod opcode;
mod operations;
pub mod state;
