//! Handlers for the CB-prefixed table: rotates, shifts, and bit operations.

use super::alu::Shift;
use super::{Cpu, CpuBus, Flag};

/// RLC/RRC/RL/RR/SLA/SRA/SWAP/SRL selected by the table row.
pub(crate) fn shift<const ROW: u8, const R: u8>(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    let value = cpu.read_reg8(bus, R);
    let result = cpu.alu_shift(Shift::from_row(ROW), value);
    cpu.write_reg8(bus, R, result);
}

/// `BIT n,r`: Z reflects the inverted bit, H is always set, C is kept.
pub(crate) fn bit<const N: u8, const R: u8>(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    let value = cpu.read_reg8(bus, R);
    cpu.regs.set_flag(Flag::Z, value & (1 << N) == 0);
    cpu.regs.clear_flag(Flag::N);
    cpu.regs.raise_flag(Flag::H);
}

pub(crate) fn res<const N: u8, const R: u8>(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    let value = cpu.read_reg8(bus, R);
    cpu.write_reg8(bus, R, value & !(1 << N));
}

pub(crate) fn set<const N: u8, const R: u8>(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    let value = cpu.read_reg8(bus, R);
    cpu.write_reg8(bus, R, value | (1 << N));
}
