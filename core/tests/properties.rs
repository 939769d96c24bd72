//! Property tests for invariants that should hold for every input.

use emu8_core::{Chip8, Chip8Builder, Opcode};
use proptest::prelude::*;

fn machine(program: &[u8]) -> Chip8 {
    let mut chip8 = Chip8Builder::new().with_rng_seed(0).build();
    chip8.load_rom_bytes(program).unwrap();
    chip8
}

proptest! {
    #[test]
    fn decode_fields_rebuild_word(word in any::<u16>()) {
        let op = Opcode::decode(word);
        prop_assert_eq!(u16::from(op.family) << 12 | op.nnn, word);
        prop_assert_eq!(u16::from(op.x) << 8 | u16::from(op.nn), op.nnn);
        prop_assert_eq!(op.y << 4 | op.n, op.nn);
    }

    #[test]
    fn any_word_steps_without_panicking(word in any::<u16>()) {
        let mut chip8 = machine(&word.to_be_bytes());
        let _ = chip8.step();
        if chip8.is_halted() {
            prop_assert_eq!(chip8.state().pc, 0x200);
        }
    }

    #[test]
    fn add_with_carry_matches_wide_sum(a in any::<u8>(), b in any::<u8>()) {
        let mut chip8 = machine(&[0x60, a, 0x61, b, 0x80, 0x14]);
        for _ in 0..3 {
            chip8.step().unwrap();
        }
        let sum = u16::from(a) + u16::from(b);
        prop_assert_eq!(chip8.state().v[0x0], sum as u8);
        prop_assert_eq!(chip8.state().v[0xF], (sum > 0xFF) as u8);
    }

    #[test]
    fn subtract_flags_no_borrow(a in any::<u8>(), b in any::<u8>()) {
        let mut chip8 = machine(&[0x60, a, 0x61, b, 0x80, 0x15, 0x62, a, 0x81, 0x27]);
        for _ in 0..5 {
            chip8.step().unwrap();
        }
        prop_assert_eq!(chip8.state().v[0x0], a.wrapping_sub(b));
        // V2 = a; V1 = V2 - V1
        prop_assert_eq!(chip8.state().v[0x1], a.wrapping_sub(b));
        prop_assert_eq!(chip8.state().v[0xF], (a >= b) as u8);
    }

    #[test]
    fn timers_never_underflow(start in any::<u8>(), ticks in 0usize..300) {
        let mut chip8 = machine(&[0x60, start, 0xF0, 0x15, 0xF0, 0x18]);
        for _ in 0..3 {
            chip8.step().unwrap();
        }
        for _ in 0..ticks {
            chip8.tick();
        }
        let expected = start.saturating_sub(ticks.min(255) as u8);
        prop_assert_eq!(chip8.state().delay_timer, expected);
        prop_assert_eq!(chip8.state().sound_timer, expected);
    }
}
