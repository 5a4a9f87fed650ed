use crate::cpu::{cond, Cpu, CpuBus, CALL_OVERHEAD, JUMP_OVERHEAD};

pub(crate) fn jr<const CC: u8>(cpu: &mut Cpu, _bus: &mut dyn CpuBus, offset: u8) {
    cpu.jump_relative(offset, CC);
}

pub(crate) fn jp<const CC: u8>(cpu: &mut Cpu, _bus: &mut dyn CpuBus, addr: u16) {
    cpu.jump_to(addr, CC, JUMP_OVERHEAD);
}

/// `JP (HL)` has no overhead; its four cycles are all in the base cost.
pub(crate) fn jp_hl(cpu: &mut Cpu, _bus: &mut dyn CpuBus) {
    let addr = cpu.regs.hl();
    cpu.jump_to(addr, cond::ALWAYS, 0);
}

pub(crate) fn call<const CC: u8>(cpu: &mut Cpu, bus: &mut dyn CpuBus, addr: u16) {
    cpu.call(bus, addr, CC);
}

pub(crate) fn ret<const CC: u8>(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    cpu.ret(bus, CC);
}

/// `RETI` re-enables interrupts without the one-instruction delay of EI.
pub(crate) fn reti(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    cpu.ret(bus, cond::ALWAYS);
    bus.set_ime(true);
}

pub(crate) fn rst<const VECTOR: u16>(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    let return_address = cpu.regs.pc;
    cpu.push_u16(bus, return_address);
    cpu.jump_to(VECTOR, cond::ALWAYS, CALL_OVERHEAD);
}
