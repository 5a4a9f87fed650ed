
use super::{
    io, Apu, Button, Cartridge, JoyPad, MachineConfig, Mmu, Ppu, Timer, CYCLES_PER_FRAME, M_CYCLE,
};
use crate::cpu::Cpu;
use crate::error::{ErrorSink, GbError, LogErrorSink};
use crate::interrupts::InterruptControl;

/// The whole machine.
///
/// Owns one of each component and drives them in lockstep. Components never
/// hold references to each other: each one borrows the MMU for the duration
/// of its tick.
pub struct Motherboard {
    mmu: Mmu,
    cpu: Cpu,
    ppu: Ppu,
    timer: Timer,
    joypad: JoyPad,
    apu: Apu,
    cartridge: Option<Cartridge>,
    error_sink: Box<dyn ErrorSink>,
    /// Master clock in T-cycles since power-on.
    cycles: u64,
    powered: bool,
    config: MachineConfig,
}

impl Default for Motherboard {
    fn default() -> Self {
        Self::with_default_sink(MachineConfig::default())
    }
}

impl Motherboard {
    pub fn new(config: MachineConfig, error_sink: Box<dyn ErrorSink>) -> Self {
        Self {
            mmu: Mmu::new(),
            cpu: Cpu::new(),
            ppu: Ppu::new(config.palette),
            timer: Timer::new(),
            joypad: JoyPad::new(),
            apu: Apu::new(config.sample_rate, config.apu_enabled),
            cartridge: None,
            error_sink,
            cycles: 0,
            powered: false,
            config,
        }
    }

    /// Build a machine that reports errors through `log`.
    pub fn with_default_sink(config: MachineConfig) -> Self {
        Self::new(config, Box::new(LogErrorSink))
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Parse and keep a ROM image. Takes effect on the next power-on.
    ///
    /// A malformed image is reported to the error sink and returned; the
    /// previously inserted cartridge, if any, stays in place.
    pub fn insert_cartridge(&mut self, rom: Vec<u8>) -> Result<(), GbError> {
        let cartridge = match Cartridge::from_bytes(rom) {
            Ok(cartridge) => cartridge,
            Err(err) => {
                self.error_sink.report(&err);
                return Err(err);
            }
        };

        let header = cartridge.header();
        log::info!(
            "GB cartridge: title='{}' type=0x{:02X} rom_banks={} ram_banks={}",
            header.title,
            header.cartridge_type,
            header.rom_banks,
            header.ram_banks
        );
        self.cartridge = Some(cartridge);
        Ok(())
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    /// Reset every component to the post-boot state and map the cartridge.
    pub fn power_on(&mut self) {
        self.mmu = Mmu::new();
        self.mmu.apply_power_on_state();

        let checksum = match &self.cartridge {
            Some(cartridge) => {
                self.mmu.load_cartridge(cartridge);
                cartridge.header().header_checksum
            }
            None => {
                log::warn!("GB: powering on without a cartridge");
                0
            }
        };

        self.cpu.reset(checksum);
        self.timer.reset();
        self.ppu.reset();
        self.apu.reset();
        self.joypad = JoyPad::new();
        self.cycles = 0;
        self.powered = true;
        log::info!("GB: power on\n{}", self.cpu.describe());
    }

    pub fn power_off(&mut self) {
        if self.powered {
            log::info!("GB: power off after {} cycles", self.cycles);
        }
        self.powered = false;
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Run one frame's worth of M-cycles.
    ///
    /// Stops early if the CPU panics; the error goes to the sink and the CPU
    /// stays panicked until the next power-on.
    pub fn update(&mut self) {
        if !self.powered {
            return;
        }

        for _ in 0..CYCLES_PER_FRAME / M_CYCLE {
            self.joypad.tick(&mut self.mmu);
            self.timer.tick(&mut self.mmu);
            if let Err(err) = self.cpu.tick(&mut self.mmu, self.cycles) {
                self.error_sink.report(&err);
            }
            self.mmu.tick();
            self.ppu.tick(&mut self.mmu);
            self.apu.tick(&mut self.mmu);
            self.cpu.handle_interrupts(&mut self.mmu);
            self.cycles += M_CYCLE;

            if self.cpu.is_panicked() {
                break;
            }
        }
    }

    pub fn press(&mut self, button: Button) {
        self.joypad.press(button);
    }

    pub fn release(&mut self, button: Button) {
        self.joypad.release(button);
    }

    /// The last completed frame, RGBA.
    pub fn framebuffer(&self) -> &[u8] {
        self.ppu.framebuffer()
    }

    /// Frames completed since power-on.
    pub fn frames(&self) -> u64 {
        self.ppu.frames()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Take every audio sample produced since the last call.
    pub fn drain_audio(&mut self) -> Vec<f32> {
        self.apu.drain_samples()
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn mmu(&self) -> &Mmu {
        &self.mmu
    }

    pub fn mmu_mut(&mut self) -> &mut Mmu {
        &mut self.mmu
    }

    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    /// CPU state plus the IO registers most useful when debugging a hang.
    pub fn describe(&self) -> String {
        let mut out = self.cpu.describe();
        out.push_str(&format!(
            "\nLCDC=0x{:02X} STAT=0x{:02X} LY={} IE=0x{:02X} IF=0x{:02X} IME={} DIV=0x{:02X} TIMA=0x{:02X}",
            self.mmu.peek(io::LCDC),
            self.mmu.peek(io::STAT) | 0x80,
            self.mmu.peek(io::LY),
            self.mmu.interrupt_enable(),
            self.mmu.interrupt_flags(),
            self.mmu.ime(),
            self.mmu.peek(io::DIV),
            self.mmu.peek(io::TIMA),
        ));
        out
    }
}
