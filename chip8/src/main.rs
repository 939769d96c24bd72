use std::path::PathBuf;

use clap::{ErrorKind, Parser};
use log::error;

use emu8_core::{Quirks, ShiftSource, SpriteEdge, DEFAULT_CLOCK_SPEED};

mod audio;
mod keymap;
mod run;

/// Runs a Chip-8 ROM.
///
/// Keys 1-4, Q-R, A-F and Z-V form the keypad. Hold Space to fast forward,
/// F5 restarts the ROM and Escape quits.
#[derive(Parser, Debug)]
#[clap(name = "emu8", version)]
struct Cli {
    /// Path to the ROM to run
    rom: PathBuf,

    /// Instructions executed per second
    #[clap(long, default_value_t = DEFAULT_CLOCK_SPEED)]
    hz: u32,

    /// Size multiplier for each pixel
    #[clap(long, default_value_t = 10)]
    scale: u32,

    /// Start from the COSMAC VIP interpreter's quirks
    #[clap(long)]
    vip: bool,

    /// 8XY6 and 8XYE shift Vx in place instead of copying from Vy
    #[clap(long)]
    shift_in_place: bool,

    /// Discard sprite pixels past the screen edge instead of wrapping them
    #[clap(long)]
    clip_sprites: bool,

    /// Seed for the random number instruction
    #[clap(long)]
    seed: Option<u64>,
}

impl Cli {
    fn quirks(&self) -> Quirks {
        let mut quirks = if self.vip {
            Quirks::cosmac_vip()
        } else {
            Quirks::default()
        };
        if self.shift_in_place {
            quirks.shift_source = ShiftSource::Vx;
        }
        if self.clip_sprites {
            quirks.sprite_edge = SpriteEdge::Clip;
        }
        quirks
    }

    fn into_config(self) -> Result<run::Config, String> {
        if self.hz == 0 {
            return Err("--hz must be greater than 0".to_string());
        }
        if self.scale == 0 {
            return Err("--scale must be greater than 0".to_string());
        }
        Ok(run::Config {
            quirks: self.quirks(),
            rom: self.rom,
            clock_speed: self.hz,
            scale: self.scale,
            seed: self.seed,
        })
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("error: {}", message);
            std::process::exit(1);
        }
    };

    if let Err(e) = run::run(config) {
        error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_rom() {
        assert!(Cli::try_parse_from(["emu8"]).is_err());
    }

    #[test]
    fn test_rejects_extra_arguments() {
        assert!(Cli::try_parse_from(["emu8", "a.ch8", "b.ch8"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["emu8", "pong.ch8"]).unwrap();
        assert_eq!(cli.rom, PathBuf::from("pong.ch8"));
        assert_eq!(cli.hz, DEFAULT_CLOCK_SPEED);
        assert_eq!(cli.scale, 10);
        assert_eq!(cli.quirks(), Quirks::default());
        assert_eq!(cli.seed, None);
    }

    #[test]
    fn test_quirk_flags() {
        let cli =
            Cli::try_parse_from(["emu8", "pong.ch8", "--shift-in-place", "--clip-sprites"])
                .unwrap();
        let quirks = cli.quirks();
        assert_eq!(quirks.shift_source, ShiftSource::Vx);
        assert_eq!(quirks.sprite_edge, SpriteEdge::Clip);
        assert!(!quirks.logic_resets_vf);
    }

    #[test]
    fn test_vip_preset() {
        let cli = Cli::try_parse_from(["emu8", "pong.ch8", "--vip"]).unwrap();
        assert_eq!(cli.quirks(), Quirks::cosmac_vip());
    }

    #[test]
    fn test_zero_hz_is_rejected() {
        let cli = Cli::try_parse_from(["emu8", "pong.ch8", "--hz", "0"]).unwrap();
        assert!(cli.into_config().is_err());
    }
}
