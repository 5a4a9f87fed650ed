use tickboy_common::Color;

use super::cartridge::{header_checksum, MIN_CARTRIDGE_SIZE};
use super::config::DMG_PALETTE;
use super::*;
use crate::cpu::{Bus, CpuState};
use crate::error::{GbError, SharedErrorSink};
use crate::interrupts::{Interrupt, InterruptControl};
use crate::{BYTES_PER_PIXEL, SCREEN_WIDTH};

const TICKS_PER_LINE: u64 = CYCLES_PER_LINE / M_CYCLE;
const TICKS_PER_FRAME: u64 = CYCLES_PER_FRAME / M_CYCLE;

fn powered_mmu() -> Mmu {
    let mut mmu = Mmu::new();
    mmu.apply_power_on_state();
    mmu.set_interrupt_flags(0);
    mmu
}

/// 32 KiB ROM-only image with `program` at $0100 and a valid header.
fn rom_with_program(program: &[u8]) -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    rom[0x100..0x100 + program.len()].copy_from_slice(program);
    rom[0x134..0x13B].copy_from_slice(b"TICKBOY");
    rom[0x14D] = header_checksum(&rom);
    rom
}

fn pixel(frame: &[u8], x: usize, y: usize) -> [u8; 4] {
    let offset = (y * SCREEN_WIDTH + x) * BYTES_PER_PIXEL;
    [
        frame[offset],
        frame[offset + 1],
        frame[offset + 2],
        frame[offset + 3],
    ]
}

fn run_ppu_frame(ppu: &mut Ppu, mmu: &mut Mmu) {
    for _ in 0..TICKS_PER_FRAME {
        ppu.tick(mmu);
    }
}

/// Fill every row of tile `index` (unsigned addressing) with one colour.
fn solid_tile(mmu: &mut Mmu, index: u16, color_index: u8) {
    let lo = if color_index & 1 != 0 { 0xFF } else { 0x00 };
    let hi = if color_index & 2 != 0 { 0xFF } else { 0x00 };
    let base = 0x8000 + index * 16;
    for row in 0..8 {
        mmu.poke(base + row * 2, lo);
        mmu.poke(base + row * 2 + 1, hi);
    }
}

fn write_sprite(mmu: &mut Mmu, slot: u16, y: u8, x: u8, tile: u8, flags: u8) {
    let base = 0xFE00 + slot * 4;
    mmu.poke(base, y);
    mmu.poke(base + 1, x);
    mmu.poke(base + 2, tile);
    mmu.poke(base + 3, flags);
}

// MMU

#[test]
fn oam_dma_blocks_cpu_until_countdown_expires() {
    let mut mmu = powered_mmu();
    for i in 0..0xA0u16 {
        mmu.write8(0x8000 + i, i as u8 + 1);
    }

    mmu.write8(io::DMA, 0x80);
    assert!(mmu.dma_active());
    assert_eq!(mmu.read8(0xFE00), 0xFF);
    assert_eq!(mmu.read8(0x8005), 0xFF);
    // Outside both ranges the bus is free.
    assert_eq!(mmu.read8(0xC000), 0x00);

    // Writes to a blocked address are dropped.
    mmu.write8(0xFE00, 0x99);

    for _ in 0..159 {
        mmu.tick();
    }
    assert!(mmu.dma_active());
    assert_eq!(mmu.read8(0xFE00), 0xFF);

    mmu.tick();
    assert!(!mmu.dma_active());
    assert_eq!(mmu.read8(0xFE00), 0x01);
    assert_eq!(mmu.read8(0xFE9F), 0xA0);
    assert_eq!(mmu.read8(0x8005), 0x06);
}

#[test]
fn echo_ram_mirrors_work_ram_both_ways() {
    let mut mmu = powered_mmu();
    mmu.write8(0xE000, 0xFF);
    assert_eq!(mmu.read8(0xC000), 0xFF);

    mmu.write8(0xC123, 0x42);
    assert_eq!(mmu.read8(0xE123), 0x42);

    mmu.write8(0xFDFF, 0x7E);
    assert_eq!(mmu.read8(0xDDFF), 0x7E);
}

#[test]
fn prohibited_area_reads_zero_and_ignores_writes() {
    let mut mmu = powered_mmu();
    mmu.write8(0xFEA0, 0x12);
    mmu.write8(0xFEFF, 0x34);
    assert_eq!(mmu.read8(0xFEA0), 0x00);
    assert_eq!(mmu.read8(0xFEFF), 0x00);
    assert_eq!(mmu.peek(0xFEA0), 0x00);
}

#[test]
fn rom_area_is_read_only() {
    let mut rom = rom_with_program(&[0x00]);
    rom[0x2000] = 0x5A;
    let cartridge = Cartridge::from_bytes(rom).unwrap();

    let mut mmu = powered_mmu();
    mmu.load_cartridge(&cartridge);
    mmu.write8(0x2000, 0x01);
    mmu.write8(0x0100, 0xFF);
    assert_eq!(mmu.read8(0x2000), 0x5A);
    assert_eq!(mmu.read8(0x0100), 0x00);
}

#[test]
fn joypad_register_reads_the_selected_group() {
    let mut mmu = powered_mmu();
    // A and Down held.
    mmu.set_joypad_state(0b1110, 0b0111);

    mmu.write8(io::JOYP, 0x20);
    assert_eq!(mmu.read8(io::JOYP), 0xE7);

    mmu.write8(io::JOYP, 0x10);
    assert_eq!(mmu.read8(io::JOYP), 0xDE);

    // Only the select bits are writable.
    mmu.write8(io::JOYP, 0xFF);
    assert_eq!(mmu.read8(io::JOYP), 0xFF);
}

#[test]
fn stat_keeps_ppu_bits_and_reads_bit_seven_set() {
    let mut mmu = powered_mmu();
    assert_eq!(mmu.peek(io::STAT), 0x85);

    mmu.write8(io::STAT, 0xFF);
    assert_eq!(mmu.read8(io::STAT), 0xFD);

    mmu.write8(io::STAT, 0x00);
    assert_eq!(mmu.read8(io::STAT), 0x85);
}

#[test]
fn interrupt_flag_upper_bits_read_as_one() {
    let mut mmu = powered_mmu();
    mmu.write8(io::IF, 0x04);
    assert_eq!(mmu.read8(io::IF), 0xE4);
    assert!(mmu.is_requested(Interrupt::TIMER));

    mmu.write8(io::IF, 0xFF);
    assert_eq!(mmu.interrupt_flags(), 0x1F);
}

#[test]
fn lyc_write_rechecks_coincidence() {
    let mut mmu = powered_mmu();
    mmu.write8(io::LYC, 5);
    assert_eq!(mmu.read8(io::STAT) & 0x04, 0);

    mmu.poke(io::LY, 5);
    mmu.write8(io::LYC, 5);
    assert_eq!(mmu.read8(io::STAT) & 0x04, 0x04);
}

#[test]
fn length_register_writes_reload_the_counters() {
    let mut mmu = powered_mmu();
    mmu.write8(0xFF11, 0x80 | 0x3F);
    assert_eq!(mmu.length_timer(0), 1);

    mmu.write8(0xFF16, 0x00);
    assert_eq!(mmu.length_timer(1), 64);

    mmu.write8(0xFF1B, 0x10);
    assert_eq!(mmu.length_timer(2), 240);

    mmu.write8(0xFF20, 0x20);
    assert_eq!(mmu.length_timer(3), 32);
}

#[test]
fn powering_sound_off_clears_channel_registers() {
    let mut mmu = powered_mmu();
    mmu.write8(0xFF11, 0x20);
    mmu.write8(io::NR52, 0x00);

    assert_eq!(mmu.peek(0xFF11), 0x00);
    assert_eq!(mmu.peek(io::NR51), 0x00);
    assert_eq!(mmu.length_timer(0), 0);
    assert_eq!(mmu.peek(io::NR52), 0x00);

    // Channel registers ignore writes while the APU is off.
    mmu.write8(0xFF12, 0xF0);
    assert_eq!(mmu.peek(0xFF12), 0x00);

    mmu.write8(io::NR52, 0x80);
    mmu.write8(0xFF12, 0xF0);
    assert_eq!(mmu.peek(0xFF12), 0xF0);
}

#[test]
fn length_loads_reach_the_counters_while_sound_is_off() {
    let mut mmu = powered_mmu();
    mmu.write8(io::NR52, 0x00);

    mmu.write8(0xFF11, 0x3E);
    assert_eq!(mmu.length_timer(0), 2);
    // The register itself stays cleared.
    assert_eq!(mmu.peek(0xFF11), 0x00);

    mmu.write8(0xFF1B, 0x80);
    assert_eq!(mmu.length_timer(2), 128);
}

#[test]
fn power_on_state_matches_post_boot_values() {
    let mut mmu = Mmu::new();
    mmu.apply_power_on_state();
    assert_eq!(mmu.peek(io::LCDC), 0x91);
    assert_eq!(mmu.peek(io::BGP), 0xFC);
    assert_eq!(mmu.peek(io::NR52), 0xF1);
    assert_eq!(mmu.peek(io::TAC), 0xF8);
    assert_eq!(mmu.interrupt_enable(), 0x00);
    assert!(!mmu.ime());
}

// Timer

#[test]
fn div_write_resets_the_divider() {
    let mut mmu = powered_mmu();
    let mut timer = Timer::new();
    timer.reset();
    timer.tick(&mut mmu);
    assert_eq!(mmu.read8(io::DIV), 0xAB);

    mmu.write8(io::DIV, 0x55);
    assert_eq!(mmu.read8(io::DIV), 0x00);

    timer.tick(&mut mmu);
    assert_eq!(timer.counter(), 4);
    assert_eq!(mmu.read8(io::DIV), 0x00);

    for _ in 0..63 {
        timer.tick(&mut mmu);
    }
    assert_eq!(mmu.read8(io::DIV), 0x01);
}

#[test]
fn tima_counts_at_the_selected_rate() {
    let mut mmu = powered_mmu();
    let mut timer = Timer::new();
    timer.reset();
    mmu.write8(io::TAC, 0x05);

    // 256 T-cycles at a 16-cycle period.
    for _ in 0..64 {
        timer.tick(&mut mmu);
    }
    assert_eq!(mmu.read8(io::TIMA), 16);
}

#[test]
fn tima_stays_put_when_disabled() {
    let mut mmu = powered_mmu();
    let mut timer = Timer::new();
    timer.reset();
    mmu.write8(io::TAC, 0x01);

    for _ in 0..256 {
        timer.tick(&mut mmu);
    }
    assert_eq!(mmu.read8(io::TIMA), 0);
}

#[test]
fn tima_overflow_reloads_and_requests_timer_interrupt() {
    let mut mmu = powered_mmu();
    let mut timer = Timer::new();
    timer.reset();
    mmu.write8(io::TMA, 0x42);
    mmu.write8(io::TIMA, 0xFF);
    mmu.write8(io::TAC, 0x05);

    let mut fired = false;
    for _ in 0..8 {
        timer.tick(&mut mmu);
        if mmu.is_requested(Interrupt::TIMER) {
            fired = true;
            break;
        }
    }
    assert!(fired);
    assert_eq!(mmu.read8(io::TIMA), 0x42);
}

// JoyPad

#[test]
fn pressing_a_direction_releases_its_opposite() {
    let mut joypad = JoyPad::new();
    joypad.press(Button::Left);
    joypad.press(Button::Right);
    assert!(joypad.is_pressed(Button::Right));
    assert!(!joypad.is_pressed(Button::Left));
    assert_eq!(joypad.dpad(), 0b1110);

    joypad.press(Button::Up);
    joypad.press(Button::Down);
    assert!(!joypad.is_pressed(Button::Up));
    assert_eq!(joypad.dpad(), 0b0110);

    joypad.release(Button::Right);
    assert_eq!(joypad.dpad(), 0b0111);
}

#[test]
fn joypad_press_edge_requests_interrupt_once() {
    let mut mmu = powered_mmu();
    let mut joypad = JoyPad::new();

    joypad.press(Button::Start);
    joypad.tick(&mut mmu);
    assert!(mmu.is_requested(Interrupt::JOYPAD));
    assert_eq!(joypad.action(), 0b0111);

    mmu.clear_request(Interrupt::JOYPAD);
    joypad.press(Button::Start);
    joypad.tick(&mut mmu);
    assert!(!mmu.is_requested(Interrupt::JOYPAD));

    mmu.write8(io::JOYP, 0x10);
    assert_eq!(mmu.read8(io::JOYP), 0xD7);
}

// PPU

#[test]
fn one_line_walks_oam_search_pixel_transfer_hblank() {
    let mut mmu = powered_mmu();
    let mut ppu = Ppu::new(DMG_PALETTE);

    let mut modes = Vec::new();
    for _ in 0..TICKS_PER_LINE {
        ppu.tick(&mut mmu);
        let mode = PpuMode::from_stat(mmu.peek(io::STAT));
        if modes.last() != Some(&mode) {
            modes.push(mode);
        }
    }
    assert_eq!(
        modes,
        vec![PpuMode::OamSearch, PpuMode::PixelTransfer, PpuMode::HBlank]
    );
}

#[test]
fn ly_advances_once_per_line_and_vblank_fires_once_per_frame() {
    let mut mmu = powered_mmu();
    let mut ppu = Ppu::new(DMG_PALETTE);

    let mut vblanks = 0;
    for tick in 0..TICKS_PER_FRAME {
        ppu.tick(&mut mmu);
        let expected = (tick * M_CYCLE / CYCLES_PER_LINE) % LINES_PER_FRAME;
        assert_eq!(u64::from(mmu.peek(io::LY)), expected);
        if mmu.is_requested(Interrupt::VBLANK) {
            vblanks += 1;
            mmu.clear_request(Interrupt::VBLANK);
        }
    }
    assert_eq!(vblanks, 1);
    assert_eq!(ppu.frames(), 1);

    // Wraps back to line 0.
    ppu.tick(&mut mmu);
    assert_eq!(mmu.peek(io::LY), 0);
}

#[test]
fn lyc_match_requests_stat_interrupt_on_mode_change() {
    let mut mmu = powered_mmu();
    let mut ppu = Ppu::new(DMG_PALETTE);
    mmu.write8(io::LYC, 1);
    mmu.write8(io::STAT, 0x40);

    for _ in 0..TICKS_PER_LINE {
        ppu.tick(&mut mmu);
    }
    assert!(!mmu.is_requested(Interrupt::LCD_STAT));

    ppu.tick(&mut mmu);
    assert_eq!(mmu.peek(io::LY), 1);
    assert!(mmu.is_requested(Interrupt::LCD_STAT));
}

#[test]
fn hblank_source_requests_stat_interrupt() {
    let mut mmu = powered_mmu();
    let mut ppu = Ppu::new(DMG_PALETTE);
    mmu.write8(io::LYC, 0xFF);
    mmu.write8(io::STAT, 0x08);

    let mut first = None;
    for tick in 0..TICKS_PER_LINE {
        ppu.tick(&mut mmu);
        if first.is_none() && mmu.is_requested(Interrupt::LCD_STAT) {
            first = Some(tick);
        }
    }
    // HBlank begins 252 T-cycles into the line.
    assert_eq!(first, Some(252 / M_CYCLE));
}

#[test]
fn lcd_off_resets_ly_and_freezes_the_ppu() {
    let mut mmu = powered_mmu();
    let mut ppu = Ppu::new(DMG_PALETTE);
    for _ in 0..TICKS_PER_LINE * 3 {
        ppu.tick(&mut mmu);
    }
    assert_eq!(mmu.peek(io::LY), 2);

    mmu.write8(io::LCDC, 0x11);
    let stat = mmu.peek(io::STAT);
    for _ in 0..TICKS_PER_FRAME {
        ppu.tick(&mut mmu);
    }
    assert_eq!(mmu.peek(io::LY), 0);
    assert_eq!(mmu.peek(io::STAT), stat);
    assert_eq!(ppu.frames(), 0);
    assert!(!mmu.is_requested(Interrupt::VBLANK));
}

#[test]
fn background_tiles_are_drawn_through_bgp() {
    let mut mmu = powered_mmu();
    let mut ppu = Ppu::new(DMG_PALETTE);
    mmu.write8(io::BGP, 0xE4);
    solid_tile(&mut mmu, 1, 1);
    mmu.poke(0x9800, 1);

    run_ppu_frame(&mut ppu, &mut mmu);
    let frame = ppu.framebuffer();
    assert_eq!(pixel(frame, 0, 0), Color::LIGHT_GRAY.to_bytes());
    assert_eq!(pixel(frame, 7, 7), Color::LIGHT_GRAY.to_bytes());
    assert_eq!(pixel(frame, 8, 0), Color::WHITE.to_bytes());
    assert_eq!(pixel(frame, 0, 8), Color::WHITE.to_bytes());
}

#[test]
fn signed_tile_addressing_reads_from_the_upper_block() {
    let mut mmu = powered_mmu();
    let mut ppu = Ppu::new(DMG_PALETTE);
    mmu.write8(io::LCDC, 0x81);
    mmu.write8(io::BGP, 0xE4);
    // Tile 0 in signed mode lives at $9000 (index 0x100 from $8000).
    solid_tile(&mut mmu, 0x100, 3);

    run_ppu_frame(&mut ppu, &mut mmu);
    assert_eq!(pixel(ppu.framebuffer(), 40, 40), Color::BLACK.to_bytes());
}

#[test]
fn disabled_background_renders_colour_zero() {
    let mut mmu = powered_mmu();
    let mut ppu = Ppu::new(DMG_PALETTE);
    mmu.write8(io::LCDC, 0x90);
    mmu.write8(io::BGP, 0xE4);
    solid_tile(&mut mmu, 1, 3);
    mmu.poke(0x9800, 1);

    run_ppu_frame(&mut ppu, &mut mmu);
    assert_eq!(pixel(ppu.framebuffer(), 0, 0), Color::WHITE.to_bytes());
}

#[test]
fn window_covers_pixels_right_of_wx_minus_seven() {
    let mut mmu = powered_mmu();
    let mut ppu = Ppu::new(DMG_PALETTE);
    // Window on, window map at $9C00, BG map at $9800.
    mmu.write8(io::LCDC, 0xF1);
    mmu.write8(io::BGP, 0xE4);
    mmu.write8(io::WY, 10);
    mmu.write8(io::WX, 87);
    solid_tile(&mut mmu, 2, 3);
    for i in 0..32 * 32 {
        mmu.poke(0x9C00 + i, 2);
    }

    run_ppu_frame(&mut ppu, &mut mmu);
    let frame = ppu.framebuffer();
    assert_eq!(pixel(frame, 79, 10), Color::WHITE.to_bytes());
    assert_eq!(pixel(frame, 80, 10), Color::BLACK.to_bytes());
    assert_eq!(pixel(frame, 80, 9), Color::WHITE.to_bytes());
    assert_eq!(pixel(frame, 159, 143), Color::BLACK.to_bytes());
}

#[test]
fn objects_draw_over_background_with_their_palette() {
    let mut mmu = powered_mmu();
    let mut ppu = Ppu::new(DMG_PALETTE);
    mmu.write8(io::LCDC, 0x93);
    mmu.write8(io::OBP0, 0xE4);
    mmu.write8(io::OBP1, 0x1B);
    solid_tile(&mut mmu, 1, 1);
    write_sprite(&mut mmu, 0, 16, 8, 1, 0x00);
    write_sprite(&mut mmu, 1, 16, 40, 1, 0x10);

    run_ppu_frame(&mut ppu, &mut mmu);
    let frame = ppu.framebuffer();
    assert_eq!(pixel(frame, 0, 0), Color::LIGHT_GRAY.to_bytes());
    assert_eq!(pixel(frame, 8, 0), Color::WHITE.to_bytes());
    // OBP1 maps index 1 to shade 2.
    assert_eq!(pixel(frame, 32, 0), Color::DARK_GRAY.to_bytes());
}

#[test]
fn objects_are_hidden_when_lcdc_bit_one_is_clear() {
    let mut mmu = powered_mmu();
    let mut ppu = Ppu::new(DMG_PALETTE);
    mmu.write8(io::LCDC, 0x91);
    mmu.write8(io::OBP0, 0xE4);
    solid_tile(&mut mmu, 1, 3);
    write_sprite(&mut mmu, 0, 16, 8, 1, 0x00);

    run_ppu_frame(&mut ppu, &mut mmu);
    assert_eq!(pixel(ppu.framebuffer(), 0, 0), Color::WHITE.to_bytes());
}

#[test]
fn lower_x_object_wins_overlaps() {
    let mut mmu = powered_mmu();
    let mut ppu = Ppu::new(DMG_PALETTE);
    mmu.write8(io::LCDC, 0x93);
    mmu.write8(io::OBP0, 0xE4);
    solid_tile(&mut mmu, 1, 1);
    solid_tile(&mut mmu, 3, 3);
    write_sprite(&mut mmu, 0, 16, 9, 3, 0x00);
    write_sprite(&mut mmu, 1, 16, 8, 1, 0x00);

    run_ppu_frame(&mut ppu, &mut mmu);
    let frame = ppu.framebuffer();
    assert_eq!(pixel(frame, 1, 0), Color::LIGHT_GRAY.to_bytes());
    assert_eq!(pixel(frame, 8, 0), Color::BLACK.to_bytes());
}

#[test]
fn object_flip_and_transparency() {
    let mut mmu = powered_mmu();
    let mut ppu = Ppu::new(DMG_PALETTE);
    mmu.write8(io::LCDC, 0x93);
    mmu.write8(io::OBP0, 0xE4);
    // Only the leftmost column is opaque.
    for row in 0..8 {
        mmu.poke(0x8010 + row * 2, 0x80);
        mmu.poke(0x8010 + row * 2 + 1, 0x80);
    }
    write_sprite(&mut mmu, 0, 16, 8, 1, 0x20);

    run_ppu_frame(&mut ppu, &mut mmu);
    let frame = ppu.framebuffer();
    assert_eq!(pixel(frame, 0, 0), Color::WHITE.to_bytes());
    assert_eq!(pixel(frame, 7, 0), Color::BLACK.to_bytes());
}

#[test]
fn behind_background_objects_only_show_over_colour_zero() {
    let mut mmu = powered_mmu();
    let mut ppu = Ppu::new(DMG_PALETTE);
    mmu.write8(io::LCDC, 0x93);
    mmu.write8(io::BGP, 0xE4);
    mmu.write8(io::OBP0, 0xE4);
    solid_tile(&mut mmu, 1, 1);
    solid_tile(&mut mmu, 2, 3);
    mmu.poke(0x9800, 1);
    write_sprite(&mut mmu, 0, 16, 8, 2, 0x80);
    write_sprite(&mut mmu, 1, 16, 16, 2, 0x80);

    run_ppu_frame(&mut ppu, &mut mmu);
    let frame = ppu.framebuffer();
    assert_eq!(pixel(frame, 0, 0), Color::LIGHT_GRAY.to_bytes());
    assert_eq!(pixel(frame, 8, 0), Color::BLACK.to_bytes());
}

#[test]
fn only_ten_objects_are_considered_per_line() {
    let mut mmu = powered_mmu();
    let mut ppu = Ppu::new(DMG_PALETTE);
    mmu.write8(io::LCDC, 0x93);
    mmu.write8(io::OBP0, 0xE4);
    solid_tile(&mut mmu, 1, 3);
    // Ten off-screen entries on line 0 use up every slot.
    for slot in 0..10 {
        write_sprite(&mut mmu, slot, 16, 0, 1, 0x00);
    }
    write_sprite(&mut mmu, 10, 16, 8, 1, 0x00);

    run_ppu_frame(&mut ppu, &mut mmu);
    assert_eq!(pixel(ppu.framebuffer(), 0, 0), Color::WHITE.to_bytes());
}

#[test]
fn tall_objects_use_the_even_tile_first() {
    let mut mmu = powered_mmu();
    let mut ppu = Ppu::new(DMG_PALETTE);
    mmu.write8(io::LCDC, 0x97);
    mmu.write8(io::OBP0, 0xE4);
    solid_tile(&mut mmu, 2, 1);
    solid_tile(&mut mmu, 3, 3);
    write_sprite(&mut mmu, 0, 16, 8, 3, 0x00);

    run_ppu_frame(&mut ppu, &mut mmu);
    let frame = ppu.framebuffer();
    assert_eq!(pixel(frame, 0, 0), Color::LIGHT_GRAY.to_bytes());
    assert_eq!(pixel(frame, 0, 15), Color::BLACK.to_bytes());
    assert_eq!(pixel(frame, 0, 16), Color::WHITE.to_bytes());
}

// APU

#[test]
fn trigger_enables_channel_and_sets_status_bit() {
    let mut mmu = powered_mmu();
    let mut apu = Apu::new(44_100, true);
    mmu.write8(0xFF12, 0xF0);
    mmu.write8(0xFF14, 0x80);

    apu.tick(&mut mmu);
    assert!(apu.is_channel_enabled(0));
    assert_eq!(mmu.peek(io::NR52) & 0x0F, 0x01);
}

#[test]
fn dac_off_channel_does_not_start() {
    let mut mmu = powered_mmu();
    let mut apu = Apu::new(44_100, true);
    mmu.write8(0xFF17, 0x00);
    mmu.write8(0xFF19, 0x80);

    apu.tick(&mut mmu);
    assert!(!apu.is_channel_enabled(1));
    assert_eq!(mmu.peek(io::NR52) & 0x02, 0);
}

#[test]
fn length_counter_silences_channel() {
    let mut mmu = powered_mmu();
    let mut apu = Apu::new(44_100, true);
    mmu.write8(0xFF12, 0xF0);
    mmu.write8(0xFF11, 0x3F);
    mmu.write8(0xFF14, 0xC0);

    // The first length clock lands after 8192 T-cycles.
    for _ in 0..2047 {
        apu.tick(&mut mmu);
    }
    assert!(apu.is_channel_enabled(0));

    apu.tick(&mut mmu);
    assert!(!apu.is_channel_enabled(0));
    assert_eq!(mmu.peek(io::NR52) & 0x01, 0);
    assert_eq!(mmu.length_timer(0), 0);
}

#[test]
fn samples_are_produced_at_the_configured_rate() {
    let mut mmu = powered_mmu();
    let mut apu = Apu::new(44_100, true);
    for _ in 0..2048 {
        apu.tick(&mut mmu);
    }
    // 8192 T-cycles at 44.1 kHz is 86 stereo frames.
    let samples = apu.drain_samples();
    assert_eq!(samples.len(), 172);
    assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));
    assert!(apu.drain_samples().is_empty());
}

#[test]
fn muted_apu_produces_no_samples() {
    let mut mmu = powered_mmu();
    let mut apu = Apu::new(44_100, false);
    for _ in 0..2048 {
        apu.tick(&mut mmu);
    }
    assert!(apu.drain_samples().is_empty());
}

#[test]
fn wave_channel_plays_wave_ram() {
    let mut mmu = powered_mmu();
    let mut apu = Apu::new(44_100, true);
    for offset in 0..16 {
        mmu.poke(io::WAVE_RAM + offset, 0xF0);
    }
    mmu.write8(0xFF1A, 0x80);
    mmu.write8(0xFF1C, 0x20);
    mmu.write8(0xFF1D, 0x00);
    mmu.write8(0xFF1E, 0x87);

    let mut seen = Vec::new();
    for _ in 0..1024 {
        apu.tick(&mut mmu);
        seen.push(apu.channel(2).output());
    }
    assert!(apu.is_channel_enabled(2));
    assert!(seen.contains(&15));
    assert!(seen.contains(&0));
}

// Cartridge

#[test]
fn short_image_is_rejected() {
    let err = Cartridge::from_bytes(vec![0; MIN_CARTRIDGE_SIZE - 1]).unwrap_err();
    assert_eq!(
        err,
        GbError::InvalidCartridgeSize {
            actual: 0x14F,
            minimum: 0x150,
        }
    );
}

#[test]
fn header_fields_are_parsed() {
    let mut rom = rom_with_program(&[]);
    rom[0x147] = 0x01;
    rom[0x148] = 0x01;
    rom[0x149] = 0x03;
    rom[0x14E] = 0x12;
    rom[0x14F] = 0x34;
    rom[0x14D] = header_checksum(&rom);

    let cartridge = Cartridge::from_bytes(rom).unwrap();
    let header = cartridge.header();
    assert_eq!(cartridge.title(), "TICKBOY");
    assert_eq!(header.cartridge_type, 0x01);
    assert_eq!(header.rom_banks, 4);
    assert_eq!(header.ram_banks, 4);
    assert_eq!(header.global_checksum, 0x1234);
    assert_eq!(header.header_checksum, header_checksum(cartridge.rom()));
}

// Motherboard

#[test]
fn nop_rom_runs_a_full_frame() {
    let mut gb = Motherboard::default();
    gb.insert_cartridge(rom_with_program(&[])).unwrap();
    gb.power_on();
    gb.update();

    assert_eq!(gb.frames(), 1);
    assert_eq!(gb.cycles(), CYCLES_PER_FRAME);
    assert_eq!(gb.cpu().state(), CpuState::Running);
    assert_eq!(gb.cpu().regs.pc, 0x0100 + TICKS_PER_FRAME as u16);
    assert_eq!(
        gb.framebuffer().len(),
        SCREEN_WIDTH * crate::SCREEN_HEIGHT * BYTES_PER_PIXEL
    );
}

#[test]
fn update_does_nothing_while_powered_off() {
    let mut gb = Motherboard::default();
    gb.insert_cartridge(rom_with_program(&[])).unwrap();
    gb.update();
    assert_eq!(gb.cycles(), 0);

    gb.power_on();
    gb.power_off();
    gb.update();
    assert_eq!(gb.cycles(), 0);
}

#[test]
fn vblank_handler_runs_once_per_frame() {
    let program = [
        0xAF, // XOR A
        0xE0, 0x0F, // LDH (IF),A
        0x3E, 0x01, // LD A,1
        0xE0, 0xFF, // LDH (IE),A
        0xFB, // EI
        0x18, 0xFE, // JR -2
    ];
    let mut rom = rom_with_program(&program);
    rom[0x40] = 0x04; // INC B
    rom[0x41] = 0xD9; // RETI
    rom[0x14D] = header_checksum(&rom);

    let mut gb = Motherboard::default();
    gb.insert_cartridge(rom).unwrap();
    gb.power_on();
    let b = gb.cpu().regs.b;

    gb.update();
    assert_eq!(gb.cpu().regs.b, b.wrapping_add(1));
    gb.update();
    assert_eq!(gb.cpu().regs.b, b.wrapping_add(2));
}

#[test]
fn halt_with_interrupts_disabled_wakes_without_dispatch() {
    let program = [
        0xAF, // XOR A
        0xE0, 0x0F, // LDH (IF),A
        0x3E, 0x01, // LD A,1
        0xE0, 0xFF, // LDH (IE),A
        0x76, // HALT
        0x0C, // INC C
        0xAF, // XOR A
        0xE0, 0x0F, // LDH (IF),A
        0x18, 0xF9, // JR back to HALT
    ];
    let mut gb = Motherboard::default();
    gb.insert_cartridge(rom_with_program(&program)).unwrap();
    gb.power_on();
    let c = gb.cpu().regs.c;

    gb.update();
    assert_eq!(gb.cpu().regs.c, c.wrapping_add(1));
    assert_eq!(gb.cpu().state(), CpuState::Halted);
}

#[test]
fn unsupported_opcode_panics_and_reports_once() {
    let sink = SharedErrorSink::new();
    let mut gb = Motherboard::new(MachineConfig::default(), Box::new(sink.clone()));
    gb.insert_cartridge(rom_with_program(&[0xD3])).unwrap();
    gb.power_on();

    gb.update();
    assert!(gb.cpu().is_panicked());
    assert_eq!(gb.cpu().regs.pc, 0x0100);
    assert_eq!(
        sink.errors(),
        vec![GbError::UnsupportedInstruction {
            opcode: 0xD3,
            extended: false,
            address: 0x0100,
        }]
    );

    gb.update();
    assert_eq!(sink.errors().len(), 1);
    assert!(gb.describe().contains("Panic"));
}

#[test]
fn bad_cartridge_is_reported_and_returned() {
    let sink = SharedErrorSink::new();
    let mut gb = Motherboard::new(MachineConfig::default(), Box::new(sink.clone()));
    let result = gb.insert_cartridge(vec![0; 16]);
    assert!(matches!(
        result,
        Err(GbError::InvalidCartridgeSize { actual: 16, .. })
    ));
    assert_eq!(sink.errors().len(), 1);
    assert!(gb.cartridge().is_none());
}

#[test]
fn joypad_input_reaches_the_cpu_through_ff00() {
    let program = [
        0x3E, 0x10, // LD A,0x10
        0xE0, 0x00, // LDH (JOYP),A
        0xF0, 0x00, // LDH A,(JOYP)
        0x47, // LD B,A
        0x18, 0xFB, // JR back to LDH A,(JOYP)
    ];
    let mut gb = Motherboard::default();
    gb.insert_cartridge(rom_with_program(&program)).unwrap();
    gb.power_on();
    gb.press(Button::A);
    gb.update();
    assert_eq!(gb.cpu().regs.b & 0x0F, 0b1110);

    gb.release(Button::A);
    gb.update();
    assert_eq!(gb.cpu().regs.b & 0x0F, 0b1111);
}

#[test]
fn config_builder_defaults() {
    let config = MachineConfig::default();
    assert_eq!(config.palette, DMG_PALETTE);
    assert_eq!(config.sample_rate, 44_100);
    assert!(config.apu_enabled);

    let custom = MachineConfig::builder()
        .sample_rate(48_000)
        .apu_enabled(false)
        .build();
    let gb = Motherboard::with_default_sink(custom);
    assert_eq!(gb.apu().sample_rate(), 48_000);
    assert_eq!(gb.config().sample_rate, 48_000);
}
