use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use roundframe::bus::Bus;
use roundframe::clock::SystemClock;
use roundframe::constants::*;
use roundframe::display::LogPanel;
use roundframe::frame::BmpDecoder;
use roundframe::storage::CardDirectory;
use roundframe::{Halt, Slideshow, SlideshowConfig};

#[derive(Parser, Debug)]
#[command(version, about = "Cycle the bitmaps on a card across a 240x240 round display")]
struct Args {
    /// Directory standing in for the storage card
    card: PathBuf,

    /// Seconds each image stays on screen
    #[arg(long, default_value_t = DISPLAY_INTERVAL.as_secs())]
    interval: u64,

    /// Log swaps instead of opening the simulator window
    #[arg(long)]
    headless: bool,

    /// Simulator window pixels per panel pixel
    #[arg(long, default_value_t = WINDOW_SCALE)]
    scale: i32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = SlideshowConfig {
        interval: Duration::from_secs(args.interval),
        ..SlideshowConfig::default()
    };
    let bus = Bus::new(BUS_PINS);
    let mut card = CardDirectory::new(&args.card);

    let outcome = if args.headless {
        run_headless(&mut card, &bus, &config)
    } else {
        run_simulator(&mut card, &bus, &config, args.scale)
    };
    outcome.with_context(|| format!("slideshow halted on {}", args.card.display()))
}

// Harnesses hand a halt back untouched; `main` reports it once.
fn run_headless(
    card: &mut CardDirectory,
    bus: &Bus,
    config: &SlideshowConfig,
) -> Result<(), Halt> {
    let mut slideshow = Slideshow::boot(
        card,
        bus,
        BmpDecoder,
        LogPanel::default(),
        SystemClock::new(),
        config,
    )?;

    slideshow.run_while(|| true, RETRY_PAUSE);
    Ok(())
}

#[cfg(feature = "simulator")]
fn run_simulator(
    card: &mut CardDirectory,
    bus: &Bus,
    config: &SlideshowConfig,
    scale: i32,
) -> Result<(), Halt> {
    use roundframe::simulator::{SimulatorClock, SimulatorPanel, Window};

    let window = Window::open(config.width, config.height, scale);
    let booted = Slideshow::boot(
        card,
        bus,
        BmpDecoder,
        SimulatorPanel::new(window.clone()),
        SimulatorClock::new(window.clone()),
        config,
    );

    let mut slideshow = match booted {
        Ok(slideshow) => slideshow,
        Err(halt) => {
            window.borrow_mut().idle_until_closed(&halt);
            return Err(halt);
        }
    };

    slideshow.run_while(|| !window.borrow().closed(), RETRY_PAUSE);
    Ok(())
}

#[cfg(not(feature = "simulator"))]
fn run_simulator(
    card: &mut CardDirectory,
    bus: &Bus,
    config: &SlideshowConfig,
    _scale: i32,
) -> Result<(), Halt> {
    log::warn!("built without the simulator feature, running headless");
    run_headless(card, bus, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn headless_hands_the_halt_back_to_main() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("readme.txt"), "no pictures here").unwrap();

        let mut card = CardDirectory::new(tmp.path());
        let halt = run_headless(&mut card, &Bus::new(BUS_PINS), &SlideshowConfig::default())
            .unwrap_err();
        assert!(matches!(halt, Halt::Catalog(_)));

        let report = format!("{:#}", anyhow::Error::new(halt).context("slideshow halted"));
        assert_eq!(report.matches("no bitmap files found").count(), 1);
    }
}
