use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_START, MEMORY_SIZE, PIXEL_OFF, ROM_START, SPRITE_SHEET,
    STACK_DEPTH,
};

/// A snapshot of the interpreter's internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the carry/borrow/collision flag and is clobbered
///       by several instructions
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter; always the address of the *next*
///   instruction to fetch
///
/// Pointer
/// - (sp) an 8-bit stack pointer; the number of return addresses in use
///
/// Timers
/// - 2 8-bit timers (delay & sound), decremented once per cycle until zero
///
/// ## Memory
/// - 16-slot stack of 16-bit subroutine return addresses
/// - 4096 bytes of addressable memory; 0x000-0x1FF is reserved, with the
///   font sprite sheet at 0x050 and ROMs loaded at 0x200
/// - 64x32 frame buffer of 32-bit cells, plus a flag marking that the next
///   frame needs a redraw
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub stack: [u16; STACK_DEPTH],
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
}

impl State {
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        let font = FONT_START as usize;
        memory[font..font + SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; 16],
            i: 0,
            pc: ROM_START,
            sp: 0,
            stack: [0; STACK_DEPTH],
            delay_timer: 0,
            sound_timer: 0,
            memory,
            frame_buffer: [PIXEL_OFF; DISPLAY_WIDTH * DISPLAY_HEIGHT],
            draw_flag: false,
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// The FrameBuffer is a flat row-major grid indexed as `[y * WIDTH + x]`.
///
/// Cells are `PIXEL_ON` or `PIXEL_OFF` so a renderer can treat the buffer
/// as 32-bit pixel data and blit it with `FRAME_PITCH` bytes per row.
pub type FrameBuffer = [u32; DISPLAY_WIDTH * DISPLAY_HEIGHT];

#[cfg(test)]
mod test_state {
    use super::*;

    #[test]
    fn test_new_loads_font() {
        let state = State::new();
        let font = FONT_START as usize;
        assert_eq!(state.memory[font..font + 80], SPRITE_SHEET);
        // everything from the ROM load address up is untouched
        assert!(state.memory[ROM_START as usize..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_new_points_pc_at_rom() {
        assert_eq!(State::new().pc, 0x200);
    }
}
