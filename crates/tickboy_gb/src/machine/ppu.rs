//! Dot-driven PPU: derives the mode from a frame-relative cycle counter,
//! raises STAT/VBlank interrupts on mode changes, and renders one scanline
//! at the start of each pixel transfer.

mod objects;
mod render;

use tickboy_common::Color;

use super::{io, Mmu, CYCLES_PER_FRAME, CYCLES_PER_LINE, M_CYCLE};
use crate::interrupts::{Interrupt, InterruptControl};
use crate::{BYTES_PER_PIXEL, SCREEN_HEIGHT, SCREEN_WIDTH};

const OAM_SEARCH_CYCLES: u64 = 80;
const PIXEL_TRANSFER_CYCLES: u64 = 172;

/// PPU mode as encoded in STAT bits 0-1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PpuMode {
    HBlank = 0,
    VBlank = 1,
    OamSearch = 2,
    PixelTransfer = 3,
}

impl PpuMode {
    pub fn from_stat(stat: u8) -> Self {
        match stat & 0x03 {
            0 => PpuMode::HBlank,
            1 => PpuMode::VBlank,
            2 => PpuMode::OamSearch,
            _ => PpuMode::PixelTransfer,
        }
    }

    /// Mode for a given line and dot offset within that line.
    fn at(ly: u8, line_sync: u64) -> Self {
        if usize::from(ly) >= SCREEN_HEIGHT {
            PpuMode::VBlank
        } else if line_sync < OAM_SEARCH_CYCLES {
            PpuMode::OamSearch
        } else if line_sync < OAM_SEARCH_CYCLES + PIXEL_TRANSFER_CYCLES {
            PpuMode::PixelTransfer
        } else {
            PpuMode::HBlank
        }
    }

    /// STAT bit enabling the LCD STAT interrupt for entering this mode.
    fn stat_source(self) -> u8 {
        match self {
            PpuMode::HBlank => 0x08,
            PpuMode::VBlank => 0x10,
            PpuMode::OamSearch => 0x20,
            PpuMode::PixelTransfer => 0x00,
        }
    }
}

pub struct Ppu {
    /// T-cycles into the current frame.
    frame_sync: u64,
    /// Lines of the window drawn so far this frame.
    window_line: u8,
    lcd_on: bool,
    palette: [Color; 4],
    /// Frame being drawn.
    back: Vec<u8>,
    /// Last completed frame.
    front: Vec<u8>,
    /// BG/window colour index per pixel of the current line, before the
    /// palette is applied.
    bg_index: [u8; SCREEN_WIDTH],
    frames: u64,
}

impl Ppu {
    pub fn new(palette: [Color; 4]) -> Self {
        let size = SCREEN_WIDTH * SCREEN_HEIGHT * BYTES_PER_PIXEL;
        let mut ppu = Self {
            frame_sync: 0,
            window_line: 0,
            lcd_on: false,
            palette,
            back: vec![0; size],
            front: vec![0; size],
            bg_index: [0; SCREEN_WIDTH],
            frames: 0,
        };
        ppu.fill(palette[0]);
        ppu.front.copy_from_slice(&ppu.back);
        ppu
    }

    pub fn reset(&mut self) {
        self.frame_sync = 0;
        self.window_line = 0;
        self.lcd_on = false;
        self.frames = 0;
        self.fill(self.palette[0]);
        self.front.copy_from_slice(&self.back);
    }

    /// The last completed frame as RGBA bytes.
    pub fn framebuffer(&self) -> &[u8] {
        &self.front
    }

    /// Number of frames committed since reset.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance by one M-cycle.
    pub fn tick(&mut self, mmu: &mut Mmu) {
        if mmu.peek(io::LCDC) & 0x80 == 0 {
            if self.lcd_on {
                log::debug!("GB PPU: LCD disabled at frame {}", self.frames);
                self.lcd_on = false;
            }
            self.frame_sync = 0;
            self.window_line = 0;
            mmu.poke(io::LY, 0);
            return;
        }
        if !self.lcd_on {
            log::debug!("GB PPU: LCD enabled");
            self.lcd_on = true;
        }

        let ly = (self.frame_sync / CYCLES_PER_LINE) as u8;
        let line_sync = self.frame_sync % CYCLES_PER_LINE;

        mmu.poke(io::LY, ly);
        let coincident = mmu.update_coincidence();

        let mode = PpuMode::at(ly, line_sync);
        let stat = mmu.peek(io::STAT);
        if mode != PpuMode::from_stat(stat) {
            mmu.poke(io::STAT, (stat & !0x03) | mode as u8);

            let mode_irq = stat & mode.stat_source() != 0;
            let lyc_irq = coincident && stat & 0x40 != 0;
            if mode_irq || lyc_irq {
                mmu.request(Interrupt::LCD_STAT);
            }

            match mode {
                PpuMode::PixelTransfer => self.render_scanline(mmu, ly),
                PpuMode::VBlank => {
                    mmu.request(Interrupt::VBLANK);
                    self.commit_frame();
                }
                PpuMode::OamSearch if ly == 0 => self.start_frame(mmu),
                _ => {}
            }
        }

        self.frame_sync = (self.frame_sync + M_CYCLE) % CYCLES_PER_FRAME;
    }

    fn start_frame(&mut self, mmu: &Mmu) {
        self.window_line = 0;
        let background = self.shade(mmu.peek(io::BGP), 0);
        self.fill(background);
    }

    fn commit_frame(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
        self.frames += 1;
    }

    fn render_scanline(&mut self, mmu: &Mmu, ly: u8) {
        self.render_background(mmu, ly);
        self.render_objects(mmu, ly);
    }

    fn fill(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for pixel in self.back.chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel.copy_from_slice(&bytes);
        }
    }

    /// Map a colour index through a palette register.
    fn shade(&self, palette: u8, color_index: u8) -> Color {
        self.palette[usize::from((palette >> (color_index * 2)) & 0x03)]
    }

    fn put_pixel(&mut self, x: usize, y: usize, color: Color) {
        let offset = (y * SCREEN_WIDTH + x) * BYTES_PER_PIXEL;
        self.back[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&color.to_bytes());
    }
}

/// Two bitplane bytes for one tile row, combined into a 2-bit colour index.
#[inline]
fn tile_pixel(lo: u8, hi: u8, bit: u8) -> u8 {
    (((hi >> bit) & 0x01) << 1) | ((lo >> bit) & 0x01)
}
