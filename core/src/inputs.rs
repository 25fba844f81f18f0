use rand::rngs::StdRng;

use crate::constants::KEY_COUNT;

/// External inputs handed to instruction handlers alongside the current state.
pub struct Inputs<'a> {
    /// Pressed status of keypad keys 0x0..=0xF.
    pub keys: &'a [bool; KEY_COUNT],
    /// Random byte source for Cxkk.
    pub rng: &'a mut StdRng,
    /// Behavior switches for instructions with disputed semantics.
    pub quirks: Quirks,
}

/// Knobs for opcodes whose behavior differs between historical interpreters.
///
/// The defaults match the common modern convention: shifts operate on Vx in
/// place and sprites are clipped at the display edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Quirks {
    /// 8xy6/8xyE shift Vy into Vx instead of shifting Vx in place.
    pub shift_reads_vy: bool,
    /// Dxyn wraps sprite pixels past the display edge instead of clipping.
    pub wrap_sprites: bool,
}
