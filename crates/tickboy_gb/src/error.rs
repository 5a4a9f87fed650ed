use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

/// Everything the core can report to the presentation layer.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GbError {
    #[error("cartridge is {actual} bytes long, the header needs at least {minimum}")]
    InvalidCartridgeSize { actual: usize, minimum: usize },

    #[error(
        "unsupported {}instruction 0x{opcode:02X} at 0x{address:04X}",
        cb_prefix(.extended)
    )]
    UnsupportedInstruction {
        opcode: u8,
        extended: bool,
        address: u16,
    },

    #[error("unsupported memory location 0x{0:04X}")]
    UnsupportedMemoryLocation(u16),

    #[error("memory location 0x{0:04X} is read-only")]
    ReadOnlyMemoryLocation(u16),
}

fn cb_prefix(extended: &bool) -> &'static str {
    if *extended {
        "CB-prefixed "
    } else {
        ""
    }
}

/// Side channel through which the machine reports errors it does not
/// return synchronously (CPU panics in the middle of a frame).
pub trait ErrorSink {
    fn report(&mut self, error: &GbError);
}

/// Default sink: forwards every error to the `log` facade.
#[derive(Debug, Default)]
pub struct LogErrorSink;

impl ErrorSink for LogErrorSink {
    fn report(&mut self, error: &GbError) {
        log::error!("GB: {}", error);
    }
}

/// Sink that keeps every reported error so a frontend can show it later.
///
/// Clones share the same backing list, so one clone can be handed to the
/// machine while another stays with the caller.
#[derive(Clone, Debug, Default)]
pub struct SharedErrorSink {
    errors: Rc<RefCell<Vec<GbError>>>,
}

impl SharedErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.borrow().is_empty()
    }

    pub fn errors(&self) -> Vec<GbError> {
        self.errors.borrow().clone()
    }

    pub fn take(&self) -> Vec<GbError> {
        std::mem::take(&mut *self.errors.borrow_mut())
    }
}

impl ErrorSink for SharedErrorSink {
    fn report(&mut self, error: &GbError) {
        log::error!("GB: {}", error);
        self.errors.borrow_mut().push(error.clone());
    }
}
