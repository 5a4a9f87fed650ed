pub mod app;
pub mod cpu;
pub mod error;
pub mod interrupts;
pub mod machine;

pub use app::GameBoyApp;
pub use error::{ErrorSink, GbError, LogErrorSink, SharedErrorSink};
pub use machine::{Button, Cartridge, CartridgeHeader, MachineConfig, Motherboard};

/// Logical screen width in pixels for the Game Boy DMG.
pub const SCREEN_WIDTH: usize = 160;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 144;
/// Default integer scaling factor for windowed frontends.
pub const SCREEN_SCALE: u32 = 4;
/// Bytes per pixel in every framebuffer the core exposes (RGBA).
pub const BYTES_PER_PIXEL: usize = 4;
