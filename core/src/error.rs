use std::error;
use std::fmt;

/// Failures raised while loading a ROM or executing a single cycle.
///
/// Every variant is local to the operation that raised it; the engine stays
/// usable afterwards and the embedder decides whether to keep cycling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The ROM doesn't fit between the load address and the end of memory.
    RomTooBig { len: usize, capacity: usize },
    /// CALL with every stack slot already in use.
    StackOverflow { pc: u16 },
    /// RET with no return address on the stack.
    StackUnderflow { pc: u16 },
    /// A computed data address fell outside addressable memory.
    AddressOutOfRange { addr: u16, len: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::RomTooBig { len, capacity } => {
                write!(f, "ROM is {} bytes but only {} fit in memory", len, capacity)
            }
            Error::StackOverflow { pc } => {
                write!(f, "call stack overflow at {:#05X}", pc)
            }
            Error::StackUnderflow { pc } => {
                write!(f, "return with an empty call stack at {:#05X}", pc)
            }
            Error::AddressOutOfRange { addr, len } => {
                write!(f, "access of {} bytes at {:#05X} is out of range", len, addr)
            }
        }
    }
}

impl error::Error for Error {}
