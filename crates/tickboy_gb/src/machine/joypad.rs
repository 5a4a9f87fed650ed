use super::Mmu;
use crate::interrupts::{Interrupt, InterruptControl};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Right,
    Left,
    Up,
    Down,
}

impl Button {
    /// Group nibble and bit within it, as laid out in $FF00.
    fn line(self) -> (Group, u8) {
        match self {
            Button::A => (Group::Action, 0),
            Button::B => (Group::Action, 1),
            Button::Select => (Group::Action, 2),
            Button::Start => (Group::Action, 3),
            Button::Right => (Group::Dpad, 0),
            Button::Left => (Group::Dpad, 1),
            Button::Up => (Group::Dpad, 2),
            Button::Down => (Group::Dpad, 3),
        }
    }

    fn opposite(self) -> Option<Button> {
        match self {
            Button::Right => Some(Button::Left),
            Button::Left => Some(Button::Right),
            Button::Up => Some(Button::Down),
            Button::Down => Some(Button::Up),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Group {
    Action,
    Dpad,
}

/// Button state in the hardware's active-low layout.
///
/// Opposing directions are never reported together: pressing one releases
/// the other.
#[derive(Clone, Debug)]
pub struct JoyPad {
    action: u8,
    dpad: u8,
    /// A button went from released to pressed since the last tick.
    press_edge: bool,
}

impl Default for JoyPad {
    fn default() -> Self {
        Self::new()
    }
}

impl JoyPad {
    pub fn new() -> Self {
        Self {
            action: 0x0F,
            dpad: 0x0F,
            press_edge: false,
        }
    }

    pub fn press(&mut self, button: Button) {
        if let Some(opposite) = button.opposite() {
            self.set_line(opposite, false);
        }
        if !self.is_pressed(button) {
            self.press_edge = true;
        }
        self.set_line(button, true);
    }

    pub fn release(&mut self, button: Button) {
        self.set_line(button, false);
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        let (group, bit) = button.line();
        self.nibble(group) & (1 << bit) == 0
    }

    /// Active-low A/B/Select/Start nibble.
    pub fn action(&self) -> u8 {
        self.action
    }

    /// Active-low Right/Left/Up/Down nibble.
    pub fn dpad(&self) -> u8 {
        self.dpad
    }

    /// Publish the button state to $FF00 and raise the joypad interrupt on a
    /// new press.
    pub fn tick(&mut self, mmu: &mut Mmu) {
        mmu.set_joypad_state(self.action, self.dpad);
        if std::mem::take(&mut self.press_edge) {
            mmu.request(Interrupt::JOYPAD);
        }
    }

    fn nibble(&self, group: Group) -> u8 {
        match group {
            Group::Action => self.action,
            Group::Dpad => self.dpad,
        }
    }

    fn set_line(&mut self, button: Button, pressed: bool) {
        let (group, bit) = button.line();
        let nibble = match group {
            Group::Action => &mut self.action,
            Group::Dpad => &mut self.dpad,
        };
        if pressed {
            *nibble &= !(1 << bit);
        } else {
            *nibble |= 1 << bit;
        }
    }
}
