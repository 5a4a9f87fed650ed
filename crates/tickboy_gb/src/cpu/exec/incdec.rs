use crate::cpu::{Cpu, CpuBus};

pub(crate) fn inc_r<const R: u8>(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    let value = cpu.read_reg8(bus, R);
    let result = cpu.alu_inc8(value);
    cpu.write_reg8(bus, R, result);
}

pub(crate) fn dec_r<const R: u8>(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    let value = cpu.read_reg8(bus, R);
    let result = cpu.alu_dec8(value);
    cpu.write_reg8(bus, R, result);
}

// 16-bit INC/DEC never touch flags.

pub(crate) fn inc_rr<const RR: u8>(cpu: &mut Cpu, _bus: &mut dyn CpuBus) {
    let value = cpu.read_reg16(RR).wrapping_add(1);
    cpu.write_reg16(RR, value);
}

pub(crate) fn dec_rr<const RR: u8>(cpu: &mut Cpu, _bus: &mut dyn CpuBus) {
    let value = cpu.read_reg16(RR).wrapping_sub(1);
    cpu.write_reg16(RR, value);
}
