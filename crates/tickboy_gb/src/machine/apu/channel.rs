//! Per-kind channel state and the length/envelope/sweep helpers they share.

/// Square wave duty patterns (12.5%, 25%, 50%, 75%).
const DUTY_TABLE: [[u8; 8]; 4] = [
    [0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 1, 1, 1],
    [0, 1, 1, 1, 1, 1, 1, 0],
];

#[derive(Clone, Copy, Debug, Default)]
pub struct Envelope {
    period: u8,
    add: bool,
    volume: u8,
    timer: u8,
}

impl Envelope {
    /// Reload from an NRx2 value on trigger.
    pub fn load(&mut self, nrx2: u8) {
        self.volume = nrx2 >> 4;
        self.add = nrx2 & 0x08 != 0;
        self.period = nrx2 & 0x07;
        self.timer = self.period;
    }

    /// 64 Hz frame sequencer step. A period of 0 freezes the volume.
    pub fn clock(&mut self) {
        if self.period == 0 {
            return;
        }
        if self.timer > 1 {
            self.timer -= 1;
            return;
        }
        self.timer = self.period;
        if self.add && self.volume < 15 {
            self.volume += 1;
        } else if !self.add && self.volume > 0 {
            self.volume -= 1;
        }
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }
}

/// Channel 1 frequency sweep.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sweep {
    period: u8,
    negate: bool,
    shift: u8,
    timer: u8,
    shadow: u16,
    enabled: bool,
}

impl Sweep {
    /// Reload from NR10 and the current frequency on trigger.
    ///
    /// Returns `false` when the initial overflow check already fails.
    pub fn load(&mut self, nr10: u8, frequency: u16) -> bool {
        self.period = (nr10 >> 4) & 0x07;
        self.negate = nr10 & 0x08 != 0;
        self.shift = nr10 & 0x07;
        self.shadow = frequency;
        self.timer = if self.period == 0 { 8 } else { self.period };
        self.enabled = self.period != 0 || self.shift != 0;
        self.shift == 0 || self.calculate() <= 2047
    }

    fn calculate(&self) -> u16 {
        let delta = self.shadow >> self.shift;
        if self.negate {
            self.shadow.wrapping_sub(delta)
        } else {
            self.shadow.wrapping_add(delta)
        }
    }

    /// 128 Hz frame sequencer step.
    pub fn clock(&mut self) -> SweepResult {
        if self.timer > 1 {
            self.timer -= 1;
            return SweepResult::Unchanged;
        }
        self.timer = if self.period == 0 { 8 } else { self.period };
        if !self.enabled || self.period == 0 {
            return SweepResult::Unchanged;
        }

        let next = self.calculate();
        if next > 2047 {
            return SweepResult::Overflow;
        }
        if self.shift == 0 {
            return SweepResult::Unchanged;
        }
        self.shadow = next;
        if self.calculate() > 2047 {
            return SweepResult::Overflow;
        }
        SweepResult::Frequency(next)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweepResult {
    Unchanged,
    Frequency(u16),
    Overflow,
}

#[derive(Clone, Debug, Default)]
pub struct SquareState {
    pub duty: u8,
    pub frequency: u16,
    duty_position: u8,
    timer: u32,
    pub envelope: Envelope,
    /// Only channel 1 sweeps.
    pub sweep: Option<Sweep>,
}

#[derive(Clone, Debug, Default)]
pub struct WaveState {
    pub frequency: u16,
    /// NR32 output level code (0 = mute, 1 = 100%, 2 = 50%, 3 = 25%).
    pub volume_code: u8,
    position: u8,
    timer: u32,
    sample: u8,
}

#[derive(Clone, Debug)]
pub struct NoiseState {
    pub clock_shift: u8,
    pub divisor: u8,
    pub width7: bool,
    lfsr: u16,
    timer: u32,
    pub envelope: Envelope,
}

impl Default for NoiseState {
    fn default() -> Self {
        Self {
            clock_shift: 0,
            divisor: 0,
            width7: false,
            lfsr: 0x7FFF,
            timer: 0,
            envelope: Envelope::default(),
        }
    }
}

/// One of the four sound generators.
#[derive(Clone, Debug)]
pub enum Channel {
    Square(SquareState),
    Wave(WaveState),
    Noise(NoiseState),
}

impl Channel {
    pub fn square(with_sweep: bool) -> Self {
        Channel::Square(SquareState {
            sweep: with_sweep.then(Sweep::default),
            ..SquareState::default()
        })
    }

    pub fn wave() -> Self {
        Channel::Wave(WaveState::default())
    }

    pub fn noise() -> Self {
        Channel::Noise(NoiseState::default())
    }

    /// Restart the waveform generator after a trigger.
    pub fn restart(&mut self) {
        match self {
            Channel::Square(sq) => {
                sq.timer = square_period(sq.frequency);
            }
            Channel::Wave(wave) => {
                wave.position = 0;
                wave.timer = wave_period(wave.frequency);
            }
            Channel::Noise(noise) => {
                noise.lfsr = 0x7FFF;
                noise.timer = noise_period(noise.divisor, noise.clock_shift);
            }
        }
    }

    /// Advance the waveform generator by `cycles` T-cycles.
    pub fn step(&mut self, cycles: u32, wave_ram: &[u8; 16]) {
        match self {
            Channel::Square(sq) => {
                let period = square_period(sq.frequency);
                let SquareState {
                    duty_position,
                    timer,
                    ..
                } = sq;
                run_timer(timer, cycles, period, || {
                    *duty_position = (*duty_position + 1) & 0x07;
                });
            }
            Channel::Wave(wave) => {
                let period = wave_period(wave.frequency);
                let WaveState {
                    position,
                    timer,
                    sample,
                    ..
                } = wave;
                run_timer(timer, cycles, period, || {
                    *position = (*position + 1) & 0x1F;
                    let byte = wave_ram[usize::from(*position / 2)];
                    *sample = if *position & 1 == 0 {
                        byte >> 4
                    } else {
                        byte & 0x0F
                    };
                });
            }
            Channel::Noise(noise) => {
                if noise.clock_shift >= 14 {
                    return;
                }
                let period = noise_period(noise.divisor, noise.clock_shift);
                let NoiseState {
                    lfsr, timer, width7, ..
                } = noise;
                let width7 = *width7;
                run_timer(timer, cycles, period, || {
                    let bit = (*lfsr ^ (*lfsr >> 1)) & 1;
                    *lfsr = (*lfsr >> 1) | (bit << 14);
                    if width7 {
                        *lfsr = (*lfsr & !0x40) | (bit << 6);
                    }
                });
            }
        }
    }

    /// Current digital output, 0-15.
    pub fn output(&self) -> u8 {
        match self {
            Channel::Square(sq) => {
                DUTY_TABLE[usize::from(sq.duty & 0x03)][usize::from(sq.duty_position)]
                    * sq.envelope.volume()
            }
            Channel::Wave(wave) => match wave.volume_code {
                1 => wave.sample,
                2 => wave.sample >> 1,
                3 => wave.sample >> 2,
                _ => 0,
            },
            Channel::Noise(noise) => {
                if noise.lfsr & 1 == 0 {
                    noise.envelope.volume()
                } else {
                    0
                }
            }
        }
    }

    pub fn envelope_mut(&mut self) -> Option<&mut Envelope> {
        match self {
            Channel::Square(sq) => Some(&mut sq.envelope),
            Channel::Noise(noise) => Some(&mut noise.envelope),
            Channel::Wave(_) => None,
        }
    }
}

/// Count down `timer` by `cycles`, reloading with `period` and calling
/// `on_expire` each time it runs out.
fn run_timer(timer: &mut u32, mut cycles: u32, period: u32, mut on_expire: impl FnMut()) {
    while cycles > 0 {
        if *timer == 0 {
            *timer = period;
        }
        let spent = cycles.min(*timer);
        *timer -= spent;
        cycles -= spent;
        if *timer == 0 {
            on_expire();
        }
    }
}

fn square_period(frequency: u16) -> u32 {
    (2048 - u32::from(frequency & 0x07FF)) * 4
}

fn wave_period(frequency: u16) -> u32 {
    (2048 - u32::from(frequency & 0x07FF)) * 2
}

fn noise_period(divisor: u8, clock_shift: u8) -> u32 {
    let base = if divisor == 0 { 8 } else { u32::from(divisor) * 16 };
    base << clock_shift
}

/// Length counter step shared by every channel. Returns `true` when the
/// counter just ran out and the channel must be silenced.
pub fn clock_length(length_enabled: bool, counter: &mut u16) -> bool {
    if length_enabled && *counter > 0 {
        *counter -= 1;
        return *counter == 0;
    }
    false
}
