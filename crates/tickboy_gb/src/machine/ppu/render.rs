use super::{tile_pixel, Ppu};
use crate::machine::{io, Mmu};
use crate::SCREEN_WIDTH;

/// Address of the first byte of a BG/window tile.
fn tile_data_address(lcdc: u8, tile_index: u8) -> u16 {
    if lcdc & 0x10 != 0 {
        0x8000 + u16::from(tile_index) * 16
    } else {
        // Signed index, rebased so tile 0 sits at $9000.
        let rebased = i16::from(tile_index as i8) + 128;
        0x8800 + (rebased as u16) * 16
    }
}

impl Ppu {
    pub(super) fn render_background(&mut self, mmu: &Mmu, ly: u8) {
        let lcdc = mmu.peek(io::LCDC);
        let scy = mmu.peek(io::SCY);
        let scx = mmu.peek(io::SCX);
        let wy = mmu.peek(io::WY);
        let wx = i16::from(mmu.peek(io::WX));
        let bgp = mmu.peek(io::BGP);

        let bg_enabled = lcdc & 0x01 != 0;
        let window_on_line = bg_enabled && lcdc & 0x20 != 0 && ly >= wy;
        let mut window_drawn = false;

        for x in 0..SCREEN_WIDTH {
            let in_window = window_on_line && x as i16 >= wx - 7;

            let color_index = if !bg_enabled {
                0
            } else {
                let (map_base, px, py) = if in_window {
                    window_drawn = true;
                    let map = if lcdc & 0x40 != 0 { 0x9C00 } else { 0x9800 };
                    (map, (x as i16 - (wx - 7)) as u8, self.window_line)
                } else {
                    let map = if lcdc & 0x08 != 0 { 0x9C00 } else { 0x9800 };
                    (map, (x as u8).wrapping_add(scx), ly.wrapping_add(scy))
                };

                let map_addr = map_base + u16::from(py / 8) * 32 + u16::from(px / 8);
                let tile_index = mmu.peek(map_addr);
                let row_addr = tile_data_address(lcdc, tile_index) + u16::from(py % 8) * 2;
                let lo = mmu.peek(row_addr);
                let hi = mmu.peek(row_addr + 1);
                tile_pixel(lo, hi, 7 - (px % 8))
            };

            self.bg_index[x] = color_index;
            let color = self.shade(bgp, color_index);
            self.put_pixel(x, usize::from(ly), color);
        }

        if window_drawn {
            self.window_line = self.window_line.wrapping_add(1);
        }
    }
}
