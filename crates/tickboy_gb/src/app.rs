use crate::interrupts::InterruptControl;
use crate::machine::io;
use crate::{Button, Motherboard, SCREEN_HEIGHT, SCREEN_SCALE, SCREEN_WIDTH};
use tickboy_common::app::App;
use tickboy_common::key::Key;

/// Frontend-facing wrapper around the Game Boy machine.
///
/// Implements the shared `App` trait so any frontend, windowed or headless,
/// can drive the emulator one frame at a time.
#[derive(Default)]
pub struct GameBoyApp {
    should_exit: bool,
    pub gb: Motherboard,
    frame_counter: u64,
    last_pc: u16,
    pc_stagnant_frames: u32,
    last_lcdc: u8,
}

impl GameBoyApp {
    pub fn new(gb: Motherboard) -> Self {
        Self {
            should_exit: false,
            gb,
            frame_counter: 0,
            last_pc: 0,
            pc_stagnant_frames: 0,
            last_lcdc: 0,
        }
    }

    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    fn log_status(&self) {
        let regs = &self.gb.cpu().regs;
        let mmu = self.gb.mmu();
        log::info!(
            "GB: frame={} pc=0x{:04X} sp=0x{:04X} af=0x{:04X} bc=0x{:04X} de=0x{:04X} hl=0x{:04X} ime={} state={:?} IF=0x{:02X} IE=0x{:02X} LCDC=0x{:02X} STAT=0x{:02X} LY={} SCX={} SCY={} BGP=0x{:02X} WX={} WY={}",
            self.frame_counter,
            regs.pc,
            regs.sp,
            regs.af(),
            regs.bc(),
            regs.de(),
            regs.hl(),
            mmu.ime(),
            self.gb.cpu().state(),
            mmu.interrupt_flags(),
            mmu.interrupt_enable(),
            mmu.peek(io::LCDC),
            mmu.peek(io::STAT) | 0x80,
            mmu.peek(io::LY),
            mmu.peek(io::SCX),
            mmu.peek(io::SCY),
            mmu.peek(io::BGP),
            mmu.peek(io::WX),
            mmu.peek(io::WY),
        );
    }
}

/// Z => A, X => B, A => Select, S => Start, arrows => D-pad.
fn map_key(key: Key) -> Option<Button> {
    match key {
        Key::Right => Some(Button::Right),
        Key::Left => Some(Button::Left),
        Key::Up => Some(Button::Up),
        Key::Down => Some(Button::Down),
        Key::Z => Some(Button::A),
        Key::X => Some(Button::B),
        Key::A => Some(Button::Select),
        Key::S => Some(Button::Start),
        _ => None,
    }
}

impl App for GameBoyApp {
    fn init(&mut self) {
        log::info!("Game Boy init");
        if !self.gb.is_powered() {
            self.gb.power_on();
        }
        self.last_pc = self.gb.cpu().regs.pc;
        self.last_lcdc = self.gb.mmu().peek(io::LCDC);
    }

    fn update(&mut self, screen_state: &mut [u8]) {
        self.gb.update();

        let frame = self.gb.framebuffer();
        let len = frame.len().min(screen_state.len());
        screen_state[..len].copy_from_slice(&frame[..len]);

        self.frame_counter = self.frame_counter.wrapping_add(1);

        if self.gb.cpu().is_panicked() {
            log::error!("GB: CPU panicked, shutting down\n{}", self.gb.describe());
            self.gb.power_off();
            self.should_exit = true;
            return;
        }

        let pc = self.gb.cpu().regs.pc;
        if pc == self.last_pc {
            self.pc_stagnant_frames = self.pc_stagnant_frames.saturating_add(1);
        } else {
            self.pc_stagnant_frames = 0;
            self.last_pc = pc;
        }

        let lcdc = self.gb.mmu().peek(io::LCDC);
        if lcdc != self.last_lcdc {
            log::debug!("GB LCDC changed: 0x{:02X} -> 0x{:02X}", self.last_lcdc, lcdc);
            self.last_lcdc = lcdc;
        }

        if self.frame_counter == 1 || self.frame_counter % 60 == 0 {
            self.log_status();
        }

        if self.pc_stagnant_frames == 600 {
            log::warn!(
                "GB: PC unchanged for ~600 frames at 0x{:04X} (state={:?})",
                pc,
                self.gb.cpu().state(),
            );
        }
    }

    fn handle_key_event(&mut self, key: Key, is_pressed: bool) {
        log::debug!("GB key event: {:?} pressed={}", key, is_pressed);
        if key == Key::Escape && is_pressed {
            self.should_exit = true;
            return;
        }
        let Some(button) = map_key(key) else {
            return;
        };
        if is_pressed {
            self.gb.press(button);
        } else {
            self.gb.release(button);
        }
    }

    fn should_exit(&self) -> bool {
        self.should_exit
    }

    fn exit(&mut self) {
        log::info!("Game Boy exit");
        self.gb.power_off();
    }

    fn width(&self) -> u32 {
        SCREEN_WIDTH as u32
    }

    fn height(&self) -> u32 {
        SCREEN_HEIGHT as u32
    }

    fn scale(&self) -> u32 {
        SCREEN_SCALE
    }

    fn title(&self) -> String {
        match self.gb.cartridge() {
            Some(cartridge) if !cartridge.title().is_empty() => {
                format!("TickBoy - {}", cartridge.title())
            }
            _ => "TickBoy Game Boy".to_string(),
        }
    }
}
