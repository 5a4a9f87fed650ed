use crate::interrupts::InterruptControl;

/// Abstraction over the Game Boy bus (memory and IO) as the CPU sees it.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);
}

/// Everything an instruction handler may touch: memory plus IME/IE/IF.
///
/// Implemented automatically for any type providing both halves, so the
/// dispatch tables can hold plain function pointers over `dyn CpuBus`.
pub trait CpuBus: Bus + InterruptControl {}

impl<T: Bus + InterruptControl> CpuBus for T {}
