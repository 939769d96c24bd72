use thiserror::Error;

/// Conditions that halt the machine until it is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("stack overflow: call at {pc:#06X} with a full call stack")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#06X} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("memory access out of bounds at address {address:#06X}")]
    MemoryFault { address: usize },
}

/// Reasons a ROM could not be loaded. Memory is untouched when any of these occur.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unable to read ROM: {0}")]
    Io(#[from] std::io::Error),

    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    TooLarge { size: usize, max: usize },
}
