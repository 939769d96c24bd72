/// Bytes of addressable memory.
pub const MEMORY_SIZE: usize = 4096;

/// Where ROMs are loaded into memory and where execution begins.
pub const PROGRAM_START: u16 = 0x200;

/// The largest ROM that fits between `PROGRAM_START` and the end of memory.
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Number of return addresses the call stack can hold.
pub const STACK_SIZE: usize = 16;

/// Number of keys on the hexadecimal keypad.
pub const KEY_COUNT: usize = 16;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// The rate at which the delay and sound timers count down.
pub const TIMER_FREQUENCY: u32 = 60;

/// Instructions executed per second unless the host asks for something else.
pub const DEFAULT_CLOCK_SPEED: u32 = 700;

/// Each font glyph is 5 rows of 8 bits with only the high nibble used.
pub const GLYPH_SIZE: u16 = 5;

/// # Sprite sheet
/// The hexadecimal font lives at the very start of memory, 5 bytes per glyph.
///
/// ```text
/// "0"   Binary     Hex
/// ****  11110000   0xF0
/// *  *  10010000   0x90
/// *  *  10010000   0x90
/// *  *  10010000   0x90
/// ****  11110000   0xF0
/// ```
pub const SPRITE_SHEET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
