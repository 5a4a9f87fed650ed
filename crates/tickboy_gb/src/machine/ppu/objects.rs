use super::{tile_pixel, Ppu};
use crate::machine::{io, Mmu};
use crate::SCREEN_WIDTH;

const OAM_BASE: u16 = 0xFE00;
const OAM_ENTRIES: u16 = 40;
/// Hardware limit on objects considered per line.
const MAX_PER_LINE: usize = 10;

#[derive(Clone, Copy, Debug)]
struct Sprite {
    index: u8,
    y: i16,
    x: i16,
    tile: u8,
    flags: u8,
}

impl Sprite {
    fn read(mmu: &Mmu, index: u8) -> Self {
        let base = OAM_BASE + u16::from(index) * 4;
        Self {
            index,
            y: i16::from(mmu.peek(base)) - 16,
            x: i16::from(mmu.peek(base + 1)) - 8,
            tile: mmu.peek(base + 2),
            flags: mmu.peek(base + 3),
        }
    }

    fn behind_background(&self) -> bool {
        self.flags & 0x80 != 0
    }

    fn flip_y(&self) -> bool {
        self.flags & 0x40 != 0
    }

    fn flip_x(&self) -> bool {
        self.flags & 0x20 != 0
    }

    fn uses_obp1(&self) -> bool {
        self.flags & 0x10 != 0
    }
}

impl Ppu {
    pub(super) fn render_objects(&mut self, mmu: &Mmu, ly: u8) {
        let lcdc = mmu.peek(io::LCDC);
        if lcdc & 0x02 == 0 {
            return;
        }
        let height: i16 = if lcdc & 0x04 != 0 { 16 } else { 8 };
        let line = i16::from(ly);

        // Off-screen entries still use up one of the ten slots.
        let mut sprites: Vec<Sprite> = (0..OAM_ENTRIES as u8)
            .map(|index| Sprite::read(mmu, index))
            .filter(|s| line >= s.y && line < s.y + height)
            .take(MAX_PER_LINE)
            .collect();
        sprites.retain(|s| s.x > -8 && s.x < SCREEN_WIDTH as i16);

        // Lowest X wins, then lowest OAM index; draw losers first.
        sprites.sort_by(|a, b| (b.x, b.index).cmp(&(a.x, a.index)));

        let obp0 = mmu.peek(io::OBP0);
        let obp1 = mmu.peek(io::OBP1);

        for sprite in sprites {
            let mut row = line - sprite.y;
            if sprite.flip_y() {
                row = height - 1 - row;
            }
            let tile = if height == 16 {
                sprite.tile & 0xFE
            } else {
                sprite.tile
            };
            let row_addr = 0x8000 + u16::from(tile) * 16 + (row as u16) * 2;
            let lo = mmu.peek(row_addr);
            let hi = mmu.peek(row_addr + 1);
            let palette = if sprite.uses_obp1() { obp1 } else { obp0 };

            for col in 0..8i16 {
                let screen_x = sprite.x + col;
                if screen_x < 0 || screen_x >= SCREEN_WIDTH as i16 {
                    continue;
                }
                let screen_x = screen_x as usize;

                let bit = if sprite.flip_x() { col } else { 7 - col } as u8;
                let color_index = tile_pixel(lo, hi, bit);
                if color_index == 0 {
                    continue;
                }
                if sprite.behind_background() && self.bg_index[screen_x] != 0 {
                    continue;
                }

                let color = self.shade(palette, color_index);
                self.put_pixel(screen_x, usize::from(ly), color);
            }
        }
    }
}
