/// Host keys understood by the emulators.
///
/// Frontends translate their native key codes into this enum; each emulator
/// decides which of them it cares about.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    A,
    S,
    X,
    Z,
    Enter,
    Space,
    Escape,
    Unknown,
}
