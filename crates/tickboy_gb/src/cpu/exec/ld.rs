use crate::cpu::{Cpu, CpuBus};

pub(crate) fn ld_r_r<const D: u8, const S: u8>(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    let value = cpu.read_reg8(bus, S);
    cpu.write_reg8(bus, D, value);
}

pub(crate) fn ld_r_d8<const D: u8>(cpu: &mut Cpu, bus: &mut dyn CpuBus, value: u8) {
    cpu.write_reg8(bus, D, value);
}

pub(crate) fn ld_rr_d16<const RR: u8>(cpu: &mut Cpu, _bus: &mut dyn CpuBus, value: u16) {
    cpu.write_reg16(RR, value);
}

/// `LD (BC),A` / `LD (DE),A`.
pub(crate) fn ld_rri_a<const RR: u8>(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    let addr = cpu.read_reg16(RR);
    bus.write8(addr, cpu.regs.a);
}

/// `LD A,(BC)` / `LD A,(DE)`.
pub(crate) fn ld_a_rri<const RR: u8>(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    let addr = cpu.read_reg16(RR);
    cpu.regs.a = bus.read8(addr);
}

pub(crate) fn ld_hli_a(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    let hl = cpu.regs.hl();
    bus.write8(hl, cpu.regs.a);
    cpu.regs.set_hl(hl.wrapping_add(1));
}

pub(crate) fn ld_hld_a(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    let hl = cpu.regs.hl();
    bus.write8(hl, cpu.regs.a);
    cpu.regs.set_hl(hl.wrapping_sub(1));
}

pub(crate) fn ld_a_hli(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    let hl = cpu.regs.hl();
    cpu.regs.a = bus.read8(hl);
    cpu.regs.set_hl(hl.wrapping_add(1));
}

pub(crate) fn ld_a_hld(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    let hl = cpu.regs.hl();
    cpu.regs.a = bus.read8(hl);
    cpu.regs.set_hl(hl.wrapping_sub(1));
}

pub(crate) fn ld_a16_sp(cpu: &mut Cpu, bus: &mut dyn CpuBus, addr: u16) {
    let [lo, hi] = cpu.regs.sp.to_le_bytes();
    bus.write8(addr, lo);
    bus.write8(addr.wrapping_add(1), hi);
}

pub(crate) fn ld_a16_a(cpu: &mut Cpu, bus: &mut dyn CpuBus, addr: u16) {
    bus.write8(addr, cpu.regs.a);
}

pub(crate) fn ld_a_a16(cpu: &mut Cpu, bus: &mut dyn CpuBus, addr: u16) {
    cpu.regs.a = bus.read8(addr);
}

/// `LDH (a8),A`: high page store at $FF00+a8.
pub(crate) fn ldh_a8_a(cpu: &mut Cpu, bus: &mut dyn CpuBus, offset: u8) {
    bus.write8(0xFF00 | u16::from(offset), cpu.regs.a);
}

pub(crate) fn ldh_a_a8(cpu: &mut Cpu, bus: &mut dyn CpuBus, offset: u8) {
    cpu.regs.a = bus.read8(0xFF00 | u16::from(offset));
}

/// `LD (C),A`: high page store at $FF00+C.
pub(crate) fn ldh_c_a(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    bus.write8(0xFF00 | u16::from(cpu.regs.c), cpu.regs.a);
}

pub(crate) fn ldh_a_c(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    cpu.regs.a = bus.read8(0xFF00 | u16::from(cpu.regs.c));
}

pub(crate) fn ld_hl_sp_r8(cpu: &mut Cpu, _bus: &mut dyn CpuBus, offset: u8) {
    let value = cpu.alu_add16_signed(cpu.regs.sp, offset);
    cpu.regs.set_hl(value);
}

pub(crate) fn ld_sp_hl(cpu: &mut Cpu, _bus: &mut dyn CpuBus) {
    cpu.regs.sp = cpu.regs.hl();
}

