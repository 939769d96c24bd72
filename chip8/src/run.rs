use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::info;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use display::Display;
use emu8_core::{Chip8, Chip8Builder, Quirks, Step, TIMER_FREQUENCY};

use crate::audio::Beeper;
use crate::keymap::keymap;

/// Everything the host needs to start a machine.
#[derive(Debug, Clone)]
pub struct Config {
    pub rom: PathBuf,
    pub clock_speed: u32,
    pub scale: u32,
    pub quirks: Quirks,
    pub seed: Option<u64>,
}

/// Builds a machine and loads the ROM; nothing is opened on screen until this succeeds.
pub fn load(config: &Config) -> Result<Chip8, Box<dyn Error>> {
    let mut builder = Chip8Builder::new().with_quirks(config.quirks);
    if let Some(seed) = config.seed {
        builder = builder.with_rng_seed(seed);
    }
    let mut chip8 = builder.build();

    let file = File::open(&config.rom)?;
    let mut reader = BufReader::new(file);
    chip8.load_rom(&mut reader)?;
    info!("running {}", config.rom.display());
    Ok(chip8)
}

pub fn run(config: Config) -> Result<(), Box<dyn Error>> {
    let mut chip8 = load(&config)?;

    // Get SDL2 context
    let sdl = sdl2::init()?;
    let mut display = Display::new(&sdl, config.scale)?;
    let mut beeper = Beeper::new(&sdl)?;
    let mut events = sdl.event_pump()?;

    // Each frame ticks the timers once and runs however many instructions fit in 1/60s
    let frame_time = Duration::from_secs(1) / TIMER_FREQUENCY;
    let steps_per_frame = f64::from(config.clock_speed) / f64::from(TIMER_FREQUENCY);
    let mut pending_steps: f64 = 0.0;

    // Whether or not the default clock speed should be respected
    let mut fast_forward = false;

    'event: loop {
        let frame_start = Instant::now();

        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } => break 'event,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => chip8.set_key(kc, true),
                    (Keycode::Space, _) => fast_forward = true,
                    (Keycode::F5, _) => chip8.restart(),
                    (Keycode::Escape, _) => break 'event,
                    _ => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => chip8.set_key(kc, false),
                    (Keycode::Space, _) => fast_forward = false,
                    _ => continue,
                },
                _ => continue,
            };
        }

        // Update state
        pending_steps += steps_per_frame;
        while pending_steps >= 1.0 {
            pending_steps -= 1.0;
            if chip8.step()? == Step::AwaitingKey {
                pending_steps = 0.0;
            }
        }
        chip8.tick();
        beeper.set_beeping(chip8.should_emit_tone());

        // If the draw flag is set, render the current frame and unset it
        if chip8.needs_redraw() {
            display.render(chip8.frame_buffer())?;
            chip8.acknowledge_redraw();
        }

        // Handle timing
        let elapsed = frame_start.elapsed();
        if !fast_forward && elapsed < frame_time {
            std::thread::sleep(frame_time - elapsed);
        }
    }

    info!("window closed");
    Ok(())
}
