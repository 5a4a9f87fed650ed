use tickboy_common::Color;
use typed_builder::TypedBuilder;

/// Grayscale shades for colour indices 0-3 after palette mapping.
pub const DMG_PALETTE: [Color; 4] = [
    Color::WHITE,
    Color::LIGHT_GRAY,
    Color::DARK_GRAY,
    Color::BLACK,
];

#[derive(Clone, Debug, TypedBuilder)]
pub struct MachineConfig {
    #[builder(default = DMG_PALETTE)]
    pub palette: [Color; 4],
    /// Output rate of the stereo sample buffer, in Hz.
    #[builder(default = 44_100)]
    pub sample_rate: u32,
    /// Produce audio samples. The sound registers behave the same either way.
    #[builder(default = true)]
    pub apu_enabled: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
