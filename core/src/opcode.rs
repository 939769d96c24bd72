/// # Opcodes
///
/// Chip-8 opcodes are 16 bits each. Their behavior is cased on some combination of:
/// - `(n, _, _, _)` the family; applies to all opcodes
/// - `(_, _, _, n)` specific behavior within a family
/// - `(_, _, n, n)` more specific behavior within a family
/// - `(_, n, n, n)` some fixed function that doesn't require variables (e.g. CLS; clear screen)
///
/// Nibbles not used to determine the operation often (but not always) carry important data.
/// - `(_, n, n, n)` represent a 12-bit address
/// - `(_, _, n, n)` encodes some data that is assigned to and/or compared with Vx
/// - `(_, n, _, _)` refers either to the register Vx or a range of registers V0..Vx
/// - `(_, _, n, _)` refers to the the register Vy
///
/// Every 16-bit word decodes; whether it means anything is decided at dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    /// The raw instruction word.
    pub word: u16,
    /// `[f___]`
    pub family: u8,
    /// `[_x__]`
    pub x: u8,
    /// `[__y_]`
    pub y: u8,
    /// `[___n]`
    pub n: u8,
    /// `[__nn]`
    pub nn: u8,
    /// `[_nnn]`
    pub nnn: u16,
}

impl Opcode {
    pub fn decode(word: u16) -> Self {
        Opcode {
            word,
            family: ((word & 0xF000) >> 12) as u8,
            x: ((word & 0x0F00) >> 8) as u8,
            y: ((word & 0x00F0) >> 4) as u8,
            n: (word & 0x000F) as u8,
            nn: (word & 0x00FF) as u8,
            nnn: word & 0x0FFF,
        }
    }

    /// Returns the Opcode's component nibbles.
    pub fn nibbles(&self) -> (u8, u8, u8, u8) {
        (self.family, self.x, self.y, self.n)
    }

    pub(crate) fn vx(&self) -> usize {
        self.x as usize
    }

    pub(crate) fn vy(&self) -> usize {
        self.y as usize
    }
}

impl From<u16> for Opcode {
    fn from(word: u16) -> Self {
        Opcode::decode(word)
    }
}

#[cfg(test)]
mod test_opcode {
    use super::*;

    #[test]
    fn test_nibbles() {
        let op = Opcode::decode(0xABCD);
        assert_eq!(op.nibbles(), (0xA, 0xB, 0xC, 0xD));
    }

    #[test]
    fn test_family() {
        assert_eq!(Opcode::decode(0xABCD).family, 0xA);
    }

    #[test]
    fn test_x() {
        assert_eq!(Opcode::decode(0xABCD).x, 0xB);
    }

    #[test]
    fn test_y() {
        assert_eq!(Opcode::decode(0xABCD).y, 0xC);
    }

    #[test]
    fn test_n() {
        assert_eq!(Opcode::decode(0xABCD).n, 0xD);
    }

    #[test]
    fn test_nn() {
        assert_eq!(Opcode::decode(0xABCD).nn, 0xCD);
    }

    #[test]
    fn test_nnn() {
        assert_eq!(Opcode::decode(0xABCD).nnn, 0x0BCD);
    }

    #[test]
    fn test_from_word() {
        let op: Opcode = 0x00E0.into();
        assert_eq!(op, Opcode::decode(0x00E0));
        assert_eq!(op.word, 0x00E0);
    }
}
