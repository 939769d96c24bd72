pub use crate::chip8::{Chip8, Chip8Builder, Step};
pub use crate::constants::{DEFAULT_CLOCK_SPEED, TIMER_FREQUENCY};
pub use crate::error::{Fault, LoadError};
pub use crate::opcode::Opcode;
pub use crate::quirks::{Quirks, ShiftSource, SpriteEdge};

mod chip8;
pub mod constants;
mod error;
mod instruction;
mod opcode;
mod operations;
mod quirks;
pub mod state;
