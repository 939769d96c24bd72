use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};

/// Pitch of the tone played while the sound timer is non-zero.
const TONE_PITCH: f32 = 440.0;
const TONE_VOLUME: f32 = 0.2;
const SAMPLE_RATE: i32 = 44_100;

/// A square wave generator fed to SDL's audio thread.
pub struct SquareWave {
    phase_inc: f32,
    phase: f32,
    volume: f32,
}

impl AudioCallback for SquareWave {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = if self.phase < 0.5 {
                self.volume
            } else {
                -self.volume
            };
            self.phase = (self.phase + self.phase_inc) % 1.0;
        }
    }
}

/// # Beeper
/// Plays a single tone on and off; the Chip-8 has no other sound.
pub struct Beeper {
    device: AudioDevice<SquareWave>,
    is_beeping: bool,
}

impl Beeper {
    pub fn new(sdl: &sdl2::Sdl) -> Result<Self, String> {
        let audio = sdl.audio()?;
        let desired = AudioSpecDesired {
            freq: Some(SAMPLE_RATE),
            channels: Some(1),
            samples: None,
        };
        let device = audio.open_playback(None, &desired, |spec| SquareWave {
            phase_inc: TONE_PITCH / spec.freq as f32,
            phase: 0.0,
            volume: TONE_VOLUME,
        })?;
        Ok(Beeper {
            device,
            is_beeping: false,
        })
    }

    /// Starts or stops the tone; does nothing if it's already in that state.
    pub fn set_beeping(&mut self, beeping: bool) {
        if beeping == self.is_beeping {
            return;
        }
        if beeping {
            self.device.resume();
        } else {
            self.device.pause();
        }
        self.is_beeping = beeping;
    }
}
