use crate::cpu::{r16, Cpu, CpuBus};

/// `PUSH rr`, where slot 3 means AF.
pub(crate) fn push<const RR: u8>(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    let value = match RR {
        r16::AF => cpu.regs.af(),
        _ => cpu.read_reg16(RR),
    };
    cpu.push_u16(bus, value);
}

/// `POP rr`, where slot 3 means AF. Popping AF drops F's low nibble.
pub(crate) fn pop<const RR: u8>(cpu: &mut Cpu, bus: &mut dyn CpuBus) {
    let value = cpu.pop_u16(bus);
    match RR {
        r16::AF => cpu.regs.set_af(value),
        _ => cpu.write_reg16(RR, value),
    }
}
