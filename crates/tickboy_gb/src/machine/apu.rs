//! Four-channel APU: two square channels (the first with sweep), a wave
//! channel and a noise channel, clocked by a 512 Hz frame sequencer and
//! mixed into interleaved stereo `f32` samples.
//!
//! Registers live in the MMU. Length counters are also kept there so that
//! NRx1 writes can reload them without the MMU depending on the APU; the
//! APU only reads them back and clocks them.

mod channel;

pub use channel::Channel;
use channel::{clock_length, SweepResult};

use super::{io, Mmu, M_CYCLE};

/// DMG master clock in Hz.
const CLOCK_HZ: u64 = 4_194_304;
/// T-cycles between frame sequencer steps (512 Hz).
const SEQUENCER_PERIOD: u32 = 8192;

/// Register block base for each channel (NRx0).
const CHANNEL_BASE: [u16; 4] = [0xFF10, 0xFF15, 0xFF1A, 0xFF1F];
const LENGTH_CEILING: [u16; 4] = [64, 64, 256, 64];

pub struct Apu {
    channels: [Channel; 4],
    enabled: [bool; 4],
    sequencer_cycles: u32,
    sequencer_step: u8,
    sample_rate: u32,
    sample_clock: u64,
    /// Interleaved left/right samples waiting to be drained.
    samples: Vec<f32>,
    /// When false the APU keeps register state but produces no samples.
    output_enabled: bool,
}

impl Apu {
    pub fn new(sample_rate: u32, output_enabled: bool) -> Self {
        Self {
            channels: [
                Channel::square(true),
                Channel::square(false),
                Channel::wave(),
                Channel::noise(),
            ],
            enabled: [false; 4],
            sequencer_cycles: 0,
            sequencer_step: 0,
            sample_rate,
            sample_clock: 0,
            samples: Vec::new(),
            output_enabled,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.sample_rate, self.output_enabled);
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_channel_enabled(&self, channel: usize) -> bool {
        self.enabled[channel]
    }

    pub fn channel(&self, index: usize) -> &Channel {
        &self.channels[index]
    }

    /// Take every sample produced since the last call.
    pub fn drain_samples(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.samples)
    }

    /// Advance by one M-cycle.
    pub fn tick(&mut self, mmu: &mut Mmu) {
        let cycles = M_CYCLE as u32;

        if !mmu.apu_enabled() {
            self.enabled = [false; 4];
            mmu.take_channel_triggers();
            self.update_status(mmu);
            self.produce_samples(mmu, cycles);
            return;
        }

        self.sync_registers(mmu);

        let triggers = mmu.take_channel_triggers();
        for index in 0..4 {
            if triggers & (1 << index) != 0 {
                self.trigger(mmu, index);
            }
        }

        self.sequencer_cycles += cycles;
        if self.sequencer_cycles >= SEQUENCER_PERIOD {
            self.sequencer_cycles -= SEQUENCER_PERIOD;
            let step = self.sequencer_step;
            self.sequencer_step = (step + 1) & 0x07;
            self.clock_sequencer(mmu, step);
        }

        let mut wave_ram = [0u8; 16];
        for (offset, byte) in (0u16..).zip(wave_ram.iter_mut()) {
            *byte = mmu.peek(io::WAVE_RAM + offset);
        }
        for (index, channel) in self.channels.iter_mut().enumerate() {
            if self.enabled[index] {
                channel.step(cycles, &wave_ram);
            }
        }

        self.update_status(mmu);
        self.produce_samples(mmu, cycles);
    }

    fn reg(mmu: &Mmu, channel: usize, offset: u16) -> u8 {
        mmu.peek(CHANNEL_BASE[channel] + offset)
    }

    fn frequency(mmu: &Mmu, channel: usize) -> u16 {
        let lo = Self::reg(mmu, channel, 3);
        let hi = Self::reg(mmu, channel, 4) & 0x07;
        u16::from_le_bytes([lo, hi])
    }

    fn dac_enabled(mmu: &Mmu, channel: usize) -> bool {
        match channel {
            2 => Self::reg(mmu, 2, 0) & 0x80 != 0,
            _ => Self::reg(mmu, channel, 2) & 0xF8 != 0,
        }
    }

    /// Pull frequency, duty and shape settings that may change mid-note.
    fn sync_registers(&mut self, mmu: &Mmu) {
        for index in 0..4 {
            if !Self::dac_enabled(mmu, index) {
                self.enabled[index] = false;
            }
            match &mut self.channels[index] {
                Channel::Square(sq) => {
                    sq.duty = Self::reg(mmu, index, 1) >> 6;
                    sq.frequency = Self::frequency(mmu, index);
                }
                Channel::Wave(wave) => {
                    wave.frequency = Self::frequency(mmu, index);
                    wave.volume_code = (Self::reg(mmu, index, 2) >> 5) & 0x03;
                }
                Channel::Noise(noise) => {
                    let nr43 = Self::reg(mmu, index, 3);
                    noise.clock_shift = nr43 >> 4;
                    noise.width7 = nr43 & 0x08 != 0;
                    noise.divisor = nr43 & 0x07;
                }
            }
        }
    }

    fn trigger(&mut self, mmu: &mut Mmu, index: usize) {
        if mmu.length_timer(index) == 0 {
            mmu.set_length_timer(index, LENGTH_CEILING[index]);
        }

        let nrx2 = Self::reg(mmu, index, 2);
        let nr10 = mmu.peek(io::NR10);
        let mut enabled = Self::dac_enabled(mmu, index);

        let channel = &mut self.channels[index];
        if let Some(envelope) = channel.envelope_mut() {
            envelope.load(nrx2);
        }
        if let Channel::Square(sq) = channel {
            if let Some(sweep) = sq.sweep.as_mut() {
                if !sweep.load(nr10, sq.frequency) {
                    enabled = false;
                }
            }
        }
        channel.restart();

        log::trace!("GB APU: channel {} triggered (enabled={})", index + 1, enabled);
        self.enabled[index] = enabled;
    }

    fn clock_sequencer(&mut self, mmu: &mut Mmu, step: u8) {
        // Length at 256 Hz.
        if step % 2 == 0 {
            for index in 0..4 {
                let length_enabled = Self::reg(mmu, index, 4) & 0x40 != 0;
                let mut counter = mmu.length_timer(index);
                if clock_length(length_enabled, &mut counter) {
                    self.enabled[index] = false;
                }
                mmu.set_length_timer(index, counter);
            }
        }

        // Sweep at 128 Hz.
        if step == 2 || step == 6 {
            if let Channel::Square(sq) = &mut self.channels[0] {
                if let Some(sweep) = sq.sweep.as_mut() {
                    match sweep.clock() {
                        SweepResult::Frequency(frequency) => {
                            sq.frequency = frequency;
                            let [lo, hi] = frequency.to_le_bytes();
                            mmu.poke(0xFF13, lo);
                            let nr14 = mmu.peek(0xFF14);
                            mmu.poke(0xFF14, (nr14 & !0x07) | (hi & 0x07));
                        }
                        SweepResult::Overflow => self.enabled[0] = false,
                        SweepResult::Unchanged => {}
                    }
                }
            }
        }

        // Envelope at 64 Hz.
        if step == 7 {
            for channel in &mut self.channels {
                if let Some(envelope) = channel.envelope_mut() {
                    envelope.clock();
                }
            }
        }
    }

    /// Mirror channel activity into NR52 bits 0-3.
    fn update_status(&self, mmu: &mut Mmu) {
        let status = (0..4)
            .filter(|&index| self.enabled[index])
            .fold(0u8, |acc, index| acc | (1 << index));
        let nr52 = mmu.peek(io::NR52);
        mmu.poke(io::NR52, (nr52 & 0xF0) | status);
    }

    fn produce_samples(&mut self, mmu: &Mmu, cycles: u32) {
        if !self.output_enabled || self.sample_rate == 0 {
            return;
        }
        self.sample_clock += u64::from(self.sample_rate) * u64::from(cycles);
        while self.sample_clock >= CLOCK_HZ {
            self.sample_clock -= CLOCK_HZ;
            let (left, right) = self.mix(mmu);
            self.samples.push(left);
            self.samples.push(right);
        }
    }

    fn mix(&self, mmu: &Mmu) -> (f32, f32) {
        if !mmu.apu_enabled() {
            return (0.0, 0.0);
        }
        let nr50 = mmu.peek(io::NR50);
        let nr51 = mmu.peek(io::NR51);

        let mut left = 0.0;
        let mut right = 0.0;
        for (index, channel) in self.channels.iter().enumerate() {
            if !self.enabled[index] {
                continue;
            }
            // 0..=15 mapped to -1.0..=1.0.
            let value = f32::from(channel.output()) / 7.5 - 1.0;
            if nr51 & (0x10 << index) != 0 {
                left += value;
            }
            if nr51 & (0x01 << index) != 0 {
                right += value;
            }
        }

        let left_volume = f32::from(((nr50 >> 4) & 0x07) + 1) / 8.0;
        let right_volume = f32::from((nr50 & 0x07) + 1) / 8.0;
        (left / 4.0 * left_volume, right / 4.0 * right_volume)
    }
}
