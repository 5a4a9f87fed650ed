//! Sharp LR35902 core: registers, dispatch tables, and the step loop.
//!
//! The CPU is instruction-granular. `tick` compares the CPU's own cycle
//! count with the machine's master clock and only starts a new instruction
//! once the clock has caught up, so a single call may run several T-cycles
//! of work at once.

mod alu;
mod bus;
mod cb;
mod exec;
mod interrupts;
mod regs;
mod table;


pub use bus::{Bus, CpuBus};
pub use regs::{Flag, Registers};
pub use table::{Instruction, Operation, EXTENDED, STANDARD};

use crate::error::GbError;
use crate::interrupts::Interrupt;

/// Extra T-cycles charged when a jump is taken.
pub(crate) const JUMP_OVERHEAD: u32 = 4;
/// Extra T-cycles charged when a call or return is taken.
pub(crate) const CALL_OVERHEAD: u32 = 12;
/// Cost of servicing an interrupt.
pub(crate) const INTERRUPT_CYCLES: u64 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CpuState {
    Running,
    Halted,
    Stopped,
    /// Hit an opcode with no implementation. Only `reset` leaves this state.
    Panic,
}

/// Register indices used by the 8-bit operand encoding.
pub(crate) mod r8 {
    pub const B: u8 = 0;
    pub const C: u8 = 1;
    pub const D: u8 = 2;
    pub const E: u8 = 3;
    pub const H: u8 = 4;
    pub const L: u8 = 5;
    /// Memory at HL.
    pub const HLI: u8 = 6;
    pub const A: u8 = 7;
}

/// Register pair indices. `SP` and `AF` share slot 3; which one applies
/// depends on the instruction group.
pub(crate) mod r16 {
    pub const BC: u8 = 0;
    pub const DE: u8 = 1;
    pub const HL: u8 = 2;
    pub const SP: u8 = 3;
    pub const AF: u8 = 3;
}

/// Branch conditions.
pub(crate) mod cond {
    pub const NZ: u8 = 0;
    pub const Z: u8 = 1;
    pub const NC: u8 = 2;
    pub const CY: u8 = 3;
    pub const ALWAYS: u8 = 4;
}

pub struct Cpu {
    pub regs: Registers,
    state: CpuState,
    /// T-cycles consumed since reset.
    cycles: u64,
    /// Extra T-cycles added by the current instruction's taken branch.
    branch_overhead: u32,
    /// Set by EI; blocks dispatch until the following instruction completes.
    interrupts_just_enabled: bool,
    standard: &'static [Instruction; 256],
    extended: &'static [Instruction; 256],
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            regs: Registers::default(),
            state: CpuState::Running,
            cycles: 0,
            branch_overhead: 0,
            interrupts_just_enabled: false,
            standard: &*STANDARD,
            extended: &*EXTENDED,
        }
    }

    /// Put the CPU into its post-boot state.
    pub fn reset(&mut self, header_checksum: u8) {
        self.regs.reset(header_checksum);
        self.state = CpuState::Running;
        self.cycles = 0;
        self.branch_overhead = 0;
        self.interrupts_just_enabled = false;
    }

    pub fn state(&self) -> CpuState {
        self.state
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn is_panicked(&self) -> bool {
        self.state == CpuState::Panic
    }

    /// Advance the CPU against the master clock.
    ///
    /// Errors are returned once, on the tick that moved the CPU into
    /// `CpuState::Panic`; later ticks are no-ops.
    pub fn tick(&mut self, bus: &mut dyn CpuBus, master_cycles: u64) -> Result<(), GbError> {
        match self.state {
            CpuState::Panic => Ok(()),
            CpuState::Halted => {
                self.cycles = self.cycles.max(master_cycles);
                Ok(())
            }
            CpuState::Stopped => {
                self.cycles = self.cycles.max(master_cycles);
                if bus.is_requested(Interrupt::JOYPAD) {
                    log::debug!("GB CPU: leaving STOP on joypad input");
                    self.state = CpuState::Running;
                }
                Ok(())
            }
            CpuState::Running => {
                if self.cycles > master_cycles {
                    return Ok(());
                }
                self.interrupts_just_enabled = false;
                self.step(bus).map(|_| ())
            }
        }
    }

    /// Fetch, decode, and execute a single instruction.
    ///
    /// Returns the number of T-cycles it took, including branch overhead.
    pub fn step(&mut self, bus: &mut dyn CpuBus) -> Result<u32, GbError> {
        let mut opcode = self.fetch8(bus);
        let mut extended = false;
        let mut instruction = self.standard[usize::from(opcode)];

        if let Operation::Prefix = instruction.operation {
            opcode = self.fetch8(bus);
            extended = true;
            instruction = self.extended[usize::from(opcode)];
        }

        self.branch_overhead = 0;
        match instruction.operation {
            Operation::Implied(op) => op(self, bus),
            Operation::Byte(op) => {
                let operand = self.fetch8(bus);
                op(self, bus, operand);
            }
            Operation::Word(op) => {
                let operand = self.fetch16(bus);
                op(self, bus, operand);
            }
            Operation::Prefix | Operation::Unsupported => {
                return Err(self.panic(opcode, extended));
            }
        }

        let cycles = instruction.cycles + self.branch_overhead;
        self.cycles += u64::from(cycles);
        Ok(cycles)
    }

    fn panic(&mut self, opcode: u8, extended: bool) -> GbError {
        let rewind = if extended { 2 } else { 1 };
        self.regs.pc = self.regs.pc.wrapping_sub(rewind);
        self.state = CpuState::Panic;

        let error = GbError::UnsupportedInstruction {
            opcode,
            extended,
            address: self.regs.pc,
        };
        log::error!("GB CPU panic: {} ({})", error, self.regs);
        error
    }

    /// Multi-line register dump for debugging output.
    pub fn describe(&self) -> String {
        format!(
            "state={:?} cycles={} ime_delay={}\n{}",
            self.state, self.cycles, self.interrupts_just_enabled, self.regs
        )
    }

    /// Look up the descriptor that would run for the bytes at `pc`.
    pub fn instruction_at(&self, bus: &mut dyn Bus, pc: u16) -> Instruction {
        let opcode = bus.read8(pc);
        let instruction = self.standard[usize::from(opcode)];
        match instruction.operation {
            Operation::Prefix => self.extended[usize::from(bus.read8(pc.wrapping_add(1)))],
            _ => instruction,
        }
    }

    #[inline]
    pub(crate) fn read_reg8(&mut self, bus: &mut dyn CpuBus, index: u8) -> u8 {
        match index {
            r8::B => self.regs.b,
            r8::C => self.regs.c,
            r8::D => self.regs.d,
            r8::E => self.regs.e,
            r8::H => self.regs.h,
            r8::L => self.regs.l,
            r8::HLI => bus.read8(self.regs.hl()),
            _ => self.regs.a,
        }
    }

    #[inline]
    pub(crate) fn write_reg8(&mut self, bus: &mut dyn CpuBus, index: u8, value: u8) {
        match index {
            r8::B => self.regs.b = value,
            r8::C => self.regs.c = value,
            r8::D => self.regs.d = value,
            r8::E => self.regs.e = value,
            r8::H => self.regs.h = value,
            r8::L => self.regs.l = value,
            r8::HLI => bus.write8(self.regs.hl(), value),
            _ => self.regs.a = value,
        }
    }

    /// Register pair by index, with slot 3 meaning SP.
    #[inline]
    pub(crate) fn read_reg16(&self, index: u8) -> u16 {
        match index {
            r16::BC => self.regs.bc(),
            r16::DE => self.regs.de(),
            r16::HL => self.regs.hl(),
            _ => self.regs.sp,
        }
    }

    #[inline]
    pub(crate) fn write_reg16(&mut self, index: u8, value: u16) {
        match index {
            r16::BC => self.regs.set_bc(value),
            r16::DE => self.regs.set_de(value),
            r16::HL => self.regs.set_hl(value),
            _ => self.regs.sp = value,
        }
    }

    #[inline]
    pub(crate) fn condition(&self, cc: u8) -> bool {
        match cc {
            cond::NZ => !self.regs.is_flag_set(Flag::Z),
            cond::Z => self.regs.is_flag_set(Flag::Z),
            cond::NC => !self.regs.is_flag_set(Flag::C),
            cond::CY => self.regs.is_flag_set(Flag::C),
            _ => true,
        }
    }

    #[inline]
    fn fetch8(&mut self, bus: &mut dyn CpuBus) -> u8 {
        let value = bus.read8(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    #[inline]
    fn fetch16(&mut self, bus: &mut dyn CpuBus) -> u16 {
        let lo = self.fetch8(bus);
        let hi = self.fetch8(bus);
        u16::from_le_bytes([lo, hi])
    }

    /// Push high byte then low byte; SP ends two below where it started.
    #[inline]
    pub(crate) fn push_u16(&mut self, bus: &mut dyn CpuBus, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, lo);
    }

    #[inline]
    pub(crate) fn pop_u16(&mut self, bus: &mut dyn CpuBus) -> u16 {
        let lo = bus.read8(self.regs.sp);
        let hi = bus.read8(self.regs.sp.wrapping_add(1));
        self.regs.sp = self.regs.sp.wrapping_add(2);
        u16::from_le_bytes([lo, hi])
    }

    /// Write PC when `cc` holds, charging `overhead` only for a taken branch.
    pub(crate) fn jump_to(&mut self, address: u16, cc: u8, overhead: u32) -> bool {
        if !self.condition(cc) {
            return false;
        }
        self.regs.pc = address;
        self.branch_overhead += overhead;
        true
    }

    pub(crate) fn jump_relative(&mut self, offset: u8, cc: u8) {
        let target = self.regs.pc.wrapping_add(offset as i8 as u16);
        self.jump_to(target, cc, JUMP_OVERHEAD);
    }

    pub(crate) fn call(&mut self, bus: &mut dyn CpuBus, address: u16, cc: u8) {
        if self.condition(cc) {
            let return_address = self.regs.pc;
            self.push_u16(bus, return_address);
            self.jump_to(address, cond::ALWAYS, CALL_OVERHEAD);
        }
    }

    pub(crate) fn ret(&mut self, bus: &mut dyn CpuBus, cc: u8) {
        if self.condition(cc) {
            let address = self.pop_u16(bus);
            self.jump_to(address, cond::ALWAYS, CALL_OVERHEAD);
        }
    }

    pub(crate) fn set_state(&mut self, state: CpuState) {
        self.state = state;
    }

    pub(crate) fn enable_interrupts_delayed(&mut self, bus: &mut dyn CpuBus) {
        bus.set_ime(true);
        self.interrupts_just_enabled = true;
    }
}
