use crate::key::Key;

/// Interface every emulator exposes to a frontend.
///
/// A frontend owns the host window (or, for the headless runner, nothing at
/// all) and drives the emulator one video frame at a time through `update`.
pub trait App {
    fn init(&mut self);
    /// Advance one frame and copy the result into `screen` (RGBA, row-major).
    fn update(&mut self, screen: &mut [u8]);
    fn handle_key_event(&mut self, key: Key, is_down: bool);
    fn should_exit(&self) -> bool;
    fn exit(&mut self);

    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn scale(&self) -> u32;
    fn title(&self) -> String;
}
