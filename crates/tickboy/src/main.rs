use std::path::PathBuf;

use tickboy::RunConfig;

const USAGE: &str = "Usage: tickboy <rom_path> [frames] [out.ppm]";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(rom_path) = args.next().map(PathBuf::from) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let frames: u32 = match args.next() {
        Some(arg) => arg.parse().unwrap_or_else(|_| {
            eprintln!("Invalid frames '{arg}'; expected an integer.\n{USAGE}");
            std::process::exit(2);
        }),
        None => 120,
    };
    let dump_path = args.next().map(PathBuf::from);

    log::info!("Playing ROM path: '{}'", rom_path.display());
    let config = RunConfig::builder()
        .rom_path(rom_path)
        .frames(frames)
        .dump_path(dump_path)
        .build();
    let summary = tickboy::run(config)?;

    println!(
        "'{}': {} frames, {} cycles{}",
        summary.title,
        summary.frames,
        summary.cycles,
        if summary.panicked { " (CPU panicked)" } else { "" }
    );
    println!("{}", summary.describe);

    if summary.panicked {
        std::process::exit(1);
    }
    Ok(())
}
