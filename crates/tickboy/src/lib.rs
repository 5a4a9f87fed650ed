use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use typed_builder::TypedBuilder;

use tickboy_common::app::App;
use tickboy_gb::{
    GameBoyApp, MachineConfig, Motherboard, SharedErrorSink, BYTES_PER_PIXEL, SCREEN_HEIGHT,
    SCREEN_WIDTH,
};

#[derive(Clone, Debug, TypedBuilder)]
pub struct RunConfig {
    #[builder(setter(into))]
    pub rom_path: PathBuf,
    #[builder(default = 120)]
    pub frames: u32,
    /// Write the last frame here as a binary PPM.
    #[builder(default)]
    pub dump_path: Option<PathBuf>,
    #[builder(default)]
    pub machine: MachineConfig,
}

/// What a headless run ended with.
#[derive(Debug)]
pub struct RunSummary {
    pub title: String,
    pub frames: u64,
    pub cycles: u64,
    pub panicked: bool,
    pub describe: String,
}

/// Load a ROM from disk and run it without a window.
pub fn run(config: RunConfig) -> Result<RunSummary> {
    let rom = std::fs::read(&config.rom_path)
        .with_context(|| format!("failed to read ROM '{}'", config.rom_path.display()))?;
    log::info!(
        "Loaded ROM '{}' ({} bytes)",
        config.rom_path.display(),
        rom.len()
    );
    run_rom(rom, config.frames, config.dump_path.as_deref(), config.machine)
}

/// Run an in-memory ROM image for `frames` frames.
pub fn run_rom(
    rom: Vec<u8>,
    frames: u32,
    dump_path: Option<&Path>,
    machine: MachineConfig,
) -> Result<RunSummary> {
    let errors = SharedErrorSink::new();
    let mut gb = Motherboard::new(machine, Box::new(errors.clone()));
    gb.insert_cartridge(rom)
        .context("failed to insert cartridge")?;

    let mut app = GameBoyApp::new(gb);
    let mut screen = vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT * BYTES_PER_PIXEL];
    app.init();
    log::info!("Running '{}' for {} frames", app.title(), frames);

    for _ in 0..frames {
        if app.should_exit() {
            break;
        }
        app.update(&mut screen);
        // Headless: nobody consumes the audio.
        app.gb.drain_audio();
    }

    let summary = RunSummary {
        title: app.title(),
        frames: app.frame_counter(),
        cycles: app.gb.cycles(),
        panicked: app.gb.cpu().is_panicked(),
        describe: app.gb.describe(),
    };
    app.exit();

    if let Some(path) = dump_path {
        write_ppm(path, &screen, SCREEN_WIDTH, SCREEN_HEIGHT)?;
        log::info!("Wrote frame to '{}'", path.display());
    }

    if let Some(error) = errors.take().into_iter().next() {
        log::warn!("Emulation stopped: {}", error);
    }

    Ok(summary)
}

/// Write an RGBA buffer as a binary (P6) PPM, dropping alpha.
pub fn write_ppm(path: &Path, rgba: &[u8], width: usize, height: usize) -> Result<()> {
    if rgba.len() != width * height * BYTES_PER_PIXEL {
        bail!(
            "frame is {} bytes, expected {}x{} RGBA",
            rgba.len(),
            width,
            height
        );
    }
    let file = File::create(path)
        .with_context(|| format!("failed to create '{}'", path.display()))?;
    let mut out = BufWriter::new(file);
    write!(out, "P6\n{} {}\n255\n", width, height)?;
    for pixel in rgba.chunks_exact(BYTES_PER_PIXEL) {
        out.write_all(&pixel[..3])?;
    }
    out.flush()?;
    Ok(())
}
