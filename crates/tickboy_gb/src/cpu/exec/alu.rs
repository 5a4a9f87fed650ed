use crate::cpu::{Cpu, CpuBus, Flag};

pub(crate) const ADD: u8 = 0;
pub(crate) const ADC: u8 = 1;
pub(crate) const SUB: u8 = 2;
pub(crate) const SBC: u8 = 3;
pub(crate) const AND: u8 = 4;
pub(crate) const XOR: u8 = 5;
pub(crate) const OR: u8 = 6;
pub(crate) const CP: u8 = 7;

#[inline]
fn apply<const OP: u8>(cpu: &mut Cpu, value: u8) {
    match OP {
        ADD => cpu.alu_add(value, false),
        ADC => cpu.alu_add(value, true),
        SUB => cpu.alu_sub(value, false),
        SBC => cpu.alu_sub(value, true),
        AND => cpu.alu_and(value),
        XOR => cpu.alu_xor(value),
        OR => cpu.alu_or(value),
        _ => cpu.alu_cp(value),
    }
}

/// `<op> A,r` for the $80-$BF block.
pub(crate) fn alu_r<const OP: u8, const S: u8>(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    let value = cpu.read_reg8(bus, S);
    apply::<OP>(cpu, value);
}

/// `<op> A,d8`.
pub(crate) fn alu_d8<const OP: u8>(cpu: &mut Cpu, _bus: &mut dyn CpuBus, value: u8) {
    apply::<OP>(cpu, value);
}

pub(crate) fn add_hl_rr<const RR: u8>(cpu: &mut Cpu, _bus: &mut dyn CpuBus) {
    let value = cpu.read_reg16(RR);
    cpu.alu_add16_hl(value);
}

pub(crate) fn add_sp_r8(cpu: &mut Cpu, _bus: &mut dyn CpuBus, offset: u8) {
    cpu.regs.sp = cpu.alu_add16_signed(cpu.regs.sp, offset);
}

pub(crate) fn daa(cpu: &mut Cpu, _bus: &mut dyn CpuBus) {
    cpu.alu_daa();
}

pub(crate) fn cpl(cpu: &mut Cpu, _bus: &mut dyn CpuBus) {
    cpu.regs.a = !cpu.regs.a;
    cpu.regs.raise_flag(Flag::N);
    cpu.regs.raise_flag(Flag::H);
}

pub(crate) fn scf(cpu: &mut Cpu, _bus: &mut dyn CpuBus) {
    cpu.regs.clear_flag(Flag::N);
    cpu.regs.clear_flag(Flag::H);
    cpu.regs.raise_flag(Flag::C);
}

pub(crate) fn ccf(cpu: &mut Cpu, _bus: &mut dyn CpuBus) {
    let carry = cpu.regs.is_flag_set(Flag::C);
    cpu.regs.clear_flag(Flag::N);
    cpu.regs.clear_flag(Flag::H);
    cpu.regs.set_flag(Flag::C, !carry);
}
