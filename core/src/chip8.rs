use std::io::Read;

use log::{error, info, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, KEY_COUNT, MAX_ROM_SIZE, PROGRAM_START};
use crate::error::{Fault, LoadError};
use crate::instruction::{from_op, Flow, Runtime};
use crate::opcode::Opcode;
use crate::quirks::Quirks;
use crate::state::{FrameBuffer, Mode, State};

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - the `runtime` (quirks and random number source) instructions execute with
///  - the last `rom` loaded, so it can be restarted
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - stepping the CPU and ticking its timers
/// - inspecting its frame buffer for rendering by some display
/// - checking whether a tone should be playing
///
/// Nothing here blocks or keeps time; the host decides how often `step` and `tick` run.
#[derive(Debug)]
pub struct Chip8 {
    state: State,
    runtime: Runtime,
    rom: Option<Vec<u8>>,
}

/// What a single call to `Chip8::step` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// One instruction was applied.
    Executed,
    /// The machine is waiting on FX0A; nothing changed.
    AwaitingKey,
    /// The word at PC isn't an instruction; it was skipped.
    UnknownOpcode(u16),
}

/// Configures a `Chip8` before it's built.
#[derive(Debug, Clone, Default)]
pub struct Chip8Builder {
    quirks: Quirks,
    rng_seed: Option<u64>,
}

impl Chip8Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    /// Makes CXNN deterministic.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn build(&self) -> Chip8 {
        let rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8 {
            state: State::new(),
            runtime: Runtime {
                quirks: self.quirks,
                rng,
            },
            rom: None,
        }
    }
}

impl Chip8 {
    pub fn new() -> Self {
        Chip8Builder::new().build()
    }

    /// Returns every part of the machine to its power-on state, clearing any fault.
    /// The loaded ROM is discarded from memory; see `restart` to keep it.
    pub fn reset(&mut self) {
        self.state = State::new();
        info!("machine reset");
    }

    /// Resets the machine and loads the last ROM back into memory.
    pub fn restart(&mut self) {
        self.reset();
        if let Some(rom) = &self.rom {
            copy_rom(&mut self.state, rom);
            info!("reloaded {} byte ROM", rom.len());
        }
    }

    /// Load a rom from a source file
    ///
    /// At most one byte past `MAX_ROM_SIZE` is read, so endless sources are rejected as too large.
    ///
    /// # Arguments
    /// * `reader` a file reader that contains a ROM
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<(), LoadError> {
        let mut rom = Vec::new();
        reader.take(MAX_ROM_SIZE as u64 + 1).read_to_end(&mut rom)?;
        self.load_rom_bytes(&rom)
    }

    /// Copy a ROM into memory at 0x200
    ///
    /// Memory is left untouched if the ROM doesn't fit.
    pub fn load_rom_bytes(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(LoadError::TooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }
        copy_rom(&mut self.state, rom);
        self.rom = Some(rom.to_vec());
        info!("loaded {} byte ROM", rom.len());
        Ok(())
    }

    /// Advances the CPU by a single instruction
    /// - reports the fault again if the machine has halted
    /// - waits (without touching PC) while a register needs a key
    /// - otherwise fetches, decodes and executes the next opcode
    pub fn step(&mut self) -> Result<Step, Fault> {
        if let Mode::Halted(fault) = self.state.mode {
            return Err(fault);
        }

        if let Some(register) = self.state.register_needing_key {
            return Ok(match self.state.captured_key.take() {
                Some(key) => {
                    self.state.v[register as usize] = key;
                    self.state.register_needing_key = None;
                    self.state.pc += 0x2;
                    Step::Executed
                }
                None => Step::AwaitingKey,
            });
        }

        let word = self.state.fetch().map_err(|fault| self.halt(fault))?;
        let op = Opcode::decode(word);
        trace!(
            "{:04X} v{:02X?} i{:04X} pc{:04X}",
            word,
            self.state.v,
            self.state.i,
            self.state.pc
        );

        let operation = match from_op(&op) {
            Some(operation) => operation,
            None => {
                warn!("unknown opcode {:04X} at {:04X}", word, self.state.pc);
                self.state.pc += 0x2;
                return Ok(Step::UnknownOpcode(word));
            }
        };

        let flow = operation(&op, &mut self.state, &mut self.runtime)
            .map_err(|fault| self.halt(fault))?;
        Ok(match flow {
            Flow::Next => {
                self.state.pc += 0x2;
                Step::Executed
            }
            Flow::Skip => {
                self.state.pc += 0x4;
                Step::Executed
            }
            Flow::Jump(address) => {
                self.state.pc = address;
                Step::Executed
            }
            Flow::Wait => Step::AwaitingKey,
        })
    }

    /// Counts both timers down by one, stopping at zero.
    /// Meant to be called at 60Hz regardless of how fast instructions run.
    pub fn tick(&mut self) {
        if self.is_halted() {
            return;
        }
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the index of the key on the hexadecimal keypad
    /// * `pressed` whether the key is now down
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        let index = key as usize;
        if index >= KEY_COUNT {
            warn!("ignoring out of range key {:#04X}", key);
            return;
        }

        let was_pressed = self.state.keys[index];
        self.state.keys[index] = pressed;

        let newly_pressed = pressed && !was_pressed;
        if newly_pressed
            && self.state.register_needing_key.is_some()
            && self.state.captured_key.is_none()
        {
            self.state.captured_key = Some(key);
        }
    }

    /// Whether the pixel at (x, y) is lit; anything off screen is dark.
    pub fn pixel_at(&self, x: usize, y: usize) -> bool {
        x < DISPLAY_WIDTH && y < DISPLAY_HEIGHT && self.state.frame_buffer[y][x]
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// Whether the frame buffer has changed since the last `acknowledge_redraw`.
    pub fn needs_redraw(&self) -> bool {
        self.state.draw_flag
    }

    pub fn acknowledge_redraw(&mut self) {
        self.state.draw_flag = false;
    }

    /// Whether a tone should be playing.
    pub fn should_emit_tone(&self) -> bool {
        self.state.sound_timer > 0
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn fault(&self) -> Option<Fault> {
        match self.state.mode {
            Mode::Halted(fault) => Some(fault),
            Mode::Running => None,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.fault().is_some()
    }

    pub fn quirks(&self) -> Quirks {
        self.runtime.quirks
    }

    fn halt(&mut self, fault: Fault) -> Fault {
        error!("halting: {}", fault);
        self.state.mode = Mode::Halted(fault);
        fault
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

fn copy_rom(state: &mut State, rom: &[u8]) {
    let start = PROGRAM_START as usize;
    state.memory[start..start + rom.len()].copy_from_slice(rom);
}
