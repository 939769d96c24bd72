/// # Quirks
///
/// Instruction behaviors that differ between the COSMAC VIP interpreter and
/// the later implementations most ROMs were written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    /// Which register 8XY6 and 8XYE shift.
    pub shift_source: ShiftSource,
    /// What happens to sprite pixels that run off the edge of the screen.
    pub sprite_edge: SpriteEdge,
    /// 8XY1, 8XY2 and 8XY3 clear VF after the operation.
    pub logic_resets_vf: bool,
    /// FX55 and FX65 leave I pointing one past the last register transferred.
    pub load_store_increments_i: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftSource {
    /// Vx = Vy >> 1 (or << 1)
    Vy,
    /// Vx = Vx >> 1 (or << 1); Vy is ignored
    Vx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteEdge {
    /// Pixels past an edge reappear on the opposite side.
    Wrap,
    /// Pixels past an edge are discarded.
    /// The starting coordinate is still wrapped onto the screen.
    Clip,
}

impl Quirks {
    /// Behavior of the original COSMAC VIP interpreter.
    pub fn cosmac_vip() -> Self {
        Quirks {
            shift_source: ShiftSource::Vy,
            sprite_edge: SpriteEdge::Clip,
            logic_resets_vf: true,
            load_store_increments_i: true,
        }
    }
}

impl Default for Quirks {
    fn default() -> Self {
        Quirks {
            shift_source: ShiftSource::Vy,
            sprite_edge: SpriteEdge::Wrap,
            logic_resets_vf: false,
            load_store_increments_i: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_quirks() {
        let quirks = Quirks::default();
        assert_eq!(quirks.shift_source, ShiftSource::Vy);
        assert_eq!(quirks.sprite_edge, SpriteEdge::Wrap);
        assert!(!quirks.logic_resets_vf);
        assert!(!quirks.load_store_increments_i);
    }

    #[test]
    fn test_vip_differs_from_default() {
        let vip = Quirks::cosmac_vip();
        assert_ne!(vip, Quirks::default());
        assert_eq!(vip.sprite_edge, SpriteEdge::Clip);
        assert!(vip.logic_resets_vf);
        assert!(vip.load_store_increments_i);
    }
}
