use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, KEY_COUNT, MEMORY_SIZE, PROGRAM_START, SPRITE_SHEET, STACK_SIZE,
};
use crate::error::Fault;

/// A snapshot of the Chip-8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the flag register; only ever written as a side effect
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Pointer
/// - (sp) the number of return addresses on the stack, 0..=16
///
/// Timers
/// - 2 8-bit timers (delay & sound), counted down at 60Hz by the host
/// - A tone plays while the sound timer is non-zero
///
/// ## Memory
/// - 16 entry stack of return addresses
/// - 4096 bytes of addressable memory
///     - 0x000..0x050 holds the font and is read-only after reset
///     - 0x200.. is where ROMs are loaded
/// - 64x32 frame buffer
///
/// ## Input
/// - 16 flags tracking the pressed status of keys 0..F
/// - Emulation waits while a register is awaiting a key press
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub stack: [u16; STACK_SIZE],
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub keys: [bool; KEY_COUNT],
    pub register_needing_key: Option<u8>,
    pub captured_key: Option<u8>,
    pub mode: Mode,
}

/// Whether the machine will execute further instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Running,
    Halted(Fault),
}

/// The FrameBuffer is indexed as [y][x]
pub type FrameBuffer = [[bool; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

impl State {
    pub fn new() -> Self {
        // 0x000 - 0x050 is reserved for a sprite sheet
        let mut memory = [0; MEMORY_SIZE];
        memory[0..SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            stack: [0; STACK_SIZE],
            delay_timer: 0,
            sound_timer: 0,
            memory,
            frame_buffer: [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            // the cleared screen still needs presenting once
            draw_flag: true,
            keys: [false; KEY_COUNT],
            register_needing_key: None,
            captured_key: None,
            mode: Mode::Running,
        }
    }

    /// Gets the opcode currently pointed at by the pc.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    pub fn fetch(&self) -> Result<u16, Fault> {
        let pc = self.pc as usize;
        Ok(u16::from(self.read(pc)?) << 8 | u16::from(self.read(pc + 1)?))
    }

    /// Reads the byte at `address`.
    pub fn read(&self, address: usize) -> Result<u8, Fault> {
        Ok(self.read_slice(address, 1)?[0])
    }

    /// Borrows `len` bytes of memory starting at `address`.
    pub fn read_slice(&self, address: usize, len: usize) -> Result<&[u8], Fault> {
        check_bounds(address, len)?;
        Ok(&self.memory[address..address + len])
    }

    /// Copies `bytes` into memory starting at `address`.
    ///
    /// Nothing is written unless the whole range is writable.
    pub fn write_slice(&mut self, address: usize, bytes: &[u8]) -> Result<(), Fault> {
        check_bounds(address, bytes.len())?;
        if address < SPRITE_SHEET.len() {
            return Err(Fault::MemoryFault { address });
        }
        self.memory[address..address + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// STACK.push(address)
    pub fn push(&mut self, address: u16) -> Result<(), Fault> {
        if self.sp as usize >= STACK_SIZE {
            return Err(Fault::StackOverflow { pc: self.pc });
        }
        self.stack[self.sp as usize] = address;
        self.sp += 1;
        Ok(())
    }

    /// STACK.pop()
    pub fn pop(&mut self) -> Result<u16, Fault> {
        if self.sp == 0 {
            return Err(Fault::StackUnderflow { pc: self.pc });
        }
        self.sp -= 1;
        Ok(self.stack[self.sp as usize])
    }

    /// The most recently pushed return address, if any.
    pub fn stack_top(&self) -> Option<u16> {
        match self.sp {
            0 => None,
            sp => Some(self.stack[sp as usize - 1]),
        }
    }

    pub(crate) fn set_flag(&mut self, flag: bool) {
        self.v[0xF] = flag as u8;
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

fn check_bounds(address: usize, len: usize) -> Result<(), Fault> {
    if address + len > MEMORY_SIZE {
        Err(Fault::MemoryFault {
            address: address.max(MEMORY_SIZE),
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_layout() {
        let state = State::new();
        assert_eq!(state.pc, 0x200);
        assert_eq!(state.sp, 0);
        assert_eq!(state.i, 0);
        assert_eq!(state.v, [0; 16]);
        assert_eq!(state.memory[..80], SPRITE_SHEET[..]);
        assert!(state.memory[80..].iter().all(|&b| b == 0));
        assert!(state.frame_buffer.iter().flatten().all(|&px| !px));
        assert_eq!(state.mode, Mode::Running);
    }

    #[test]
    fn test_fetch_is_big_endian() {
        let mut state = State::new();
        state.memory[0x200..0x202].copy_from_slice(&[0xAA, 0xBB]);
        assert_eq!(state.fetch(), Ok(0xAABB));
    }

    #[test]
    fn test_fetch_past_end_of_memory_faults() {
        let mut state = State::new();
        state.pc = 0xFFF;
        assert_eq!(state.fetch(), Err(Fault::MemoryFault { address: 0x1000 }));
    }

    #[test]
    fn test_read_slice_out_of_bounds() {
        let state = State::new();
        assert!(state.read_slice(0xFFE, 2).is_ok());
        assert_eq!(
            state.read_slice(0xFFE, 3),
            Err(Fault::MemoryFault { address: 0x1000 })
        );
        assert_eq!(
            state.read_slice(0x1234, 1),
            Err(Fault::MemoryFault { address: 0x1234 })
        );
    }

    #[test]
    fn test_read_single_byte() {
        let state = State::new();
        assert_eq!(state.read(0x000), Ok(0xF0));
        assert_eq!(state.read(0xFFF), Ok(0x00));
        assert_eq!(state.read(0x1000), Err(Fault::MemoryFault { address: 0x1000 }));
    }

    #[test]
    fn test_write_slice_leaves_memory_untouched_on_fault() {
        let mut state = State::new();
        let before = state.memory;
        assert!(state.write_slice(0xFFE, &[1, 2, 3]).is_err());
        assert_eq!(state.memory[..], before[..]);
    }

    #[test]
    fn test_font_is_read_only() {
        let mut state = State::new();
        assert_eq!(
            state.write_slice(0x04F, &[0xFF]),
            Err(Fault::MemoryFault { address: 0x04F })
        );
        assert!(state.write_slice(0x050, &[0xFF]).is_ok());
        assert_eq!(state.memory[..80], SPRITE_SHEET[..]);
    }

    #[test]
    fn test_push_pop() {
        let mut state = State::new();
        state.push(0x202).unwrap();
        assert_eq!(state.sp, 1);
        assert_eq!(state.stack_top(), Some(0x202));
        assert_eq!(state.pop(), Ok(0x202));
        assert_eq!(state.sp, 0);
        assert_eq!(state.stack_top(), None);
    }

    #[test]
    fn test_push_overflow() {
        let mut state = State::new();
        for n in 0..16 {
            state.push(n).unwrap();
        }
        assert_eq!(state.push(0x300), Err(Fault::StackOverflow { pc: 0x200 }));
        assert_eq!(state.sp, 16);
    }

    #[test]
    fn test_pop_underflow() {
        let mut state = State::new();
        assert_eq!(state.pop(), Err(Fault::StackUnderflow { pc: 0x200 }));
        assert_eq!(state.sp, 0);
    }
}
