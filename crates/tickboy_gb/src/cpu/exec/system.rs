use crate::cpu::alu::Shift;
use crate::cpu::{Cpu, CpuBus, CpuState, Flag};

pub(crate) fn nop(_cpu: &mut Cpu, _bus: &mut dyn CpuBus) {}

pub(crate) fn halt(cpu: &mut Cpu, _bus: &mut dyn CpuBus) {
    log::debug!("GB CPU: HALT at PC=0x{:04X}", cpu.regs.pc.wrapping_sub(1));
    cpu.set_state(CpuState::Halted);
}

/// `STOP` is encoded with a padding byte that is fetched and ignored.
pub(crate) fn stop(cpu: &mut Cpu, _bus: &mut dyn CpuBus, _padding: u8) {
    log::debug!("GB CPU: STOP at PC=0x{:04X}", cpu.regs.pc.wrapping_sub(2));
    cpu.set_state(CpuState::Stopped);
}

pub(crate) fn di(_cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    bus.set_ime(false);
}

pub(crate) fn ei(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    cpu.enable_interrupts_delayed(bus);
}

// The accumulator rotates always clear Z, unlike their CB-prefixed forms.

pub(crate) fn rlca(cpu: &mut Cpu, _bus: &mut dyn CpuBus) {
    accumulator_shift(cpu, Shift::Rlc);
}

pub(crate) fn rrca(cpu: &mut Cpu, _bus: &mut dyn CpuBus) {
    accumulator_shift(cpu, Shift::Rrc);
}

pub(crate) fn rla(cpu: &mut Cpu, _bus: &mut dyn CpuBus) {
    accumulator_shift(cpu, Shift::Rl);
}

pub(crate) fn rra(cpu: &mut Cpu, _bus: &mut dyn CpuBus) {
    accumulator_shift(cpu, Shift::Rr);
}

fn accumulator_shift(cpu: &mut Cpu, kind: Shift) {
    let a = cpu.regs.a;
    cpu.regs.a = cpu.alu_shift(kind, a);
    cpu.regs.clear_flag(Flag::Z);
}
