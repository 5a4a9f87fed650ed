use super::{Cpu, CpuBus, CpuState, INTERRUPT_CYCLES};
use crate::interrupts::Interrupt;

impl Cpu {
    /// Service at most one pending interrupt.
    ///
    /// Called by the driving loop after every tick. Returns `true` when a
    /// handler was entered.
    ///
    /// A halted CPU wakes whenever an enabled source is flagged, even with
    /// IME clear; in that case execution simply resumes after the HALT.
    pub fn handle_interrupts(&mut self, bus: &mut dyn CpuBus) -> bool {
        let pending = bus.interrupt_enable() & bus.interrupt_flags() & 0x1F;

        if self.state == CpuState::Halted && pending != 0 && !bus.ime() {
            log::debug!("GB CPU: HALT exit without dispatch (IE&IF=0x{:02X})", pending);
            self.state = CpuState::Running;
            return false;
        }

        if self.interrupts_just_enabled
            || !bus.ime()
            || bus.interrupt_enable() == 0
            || bus.interrupt_flags() == 0
            || matches!(self.state, CpuState::Stopped | CpuState::Panic)
        {
            return false;
        }

        let Some(interrupt) = Interrupt::PRIORITY
            .into_iter()
            .find(|source| pending & source.bits() != 0)
        else {
            return false;
        };

        bus.clear_request(interrupt);
        bus.set_ime(false);

        let pc = self.regs.pc;
        self.push_u16(bus, pc);
        self.regs.pc = interrupt.vector();
        if self.state == CpuState::Halted {
            log::debug!("GB CPU: HALT exit through {:?}", interrupt);
        }
        self.state = CpuState::Running;
        self.cycles += INTERRUPT_CYCLES;

        log::trace!(
            "GB CPU interrupt: {:?} vector=0x{:04X} return=0x{:04X} sp=0x{:04X}",
            interrupt,
            self.regs.pc,
            pc,
            self.regs.sp
        );
        true
    }
}
