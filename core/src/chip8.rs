use std::collections::VecDeque;

use log::trace;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constants::{KEY_COUNT, MAX_SAVED_STATES, MEMORY_SIZE, ROM_START};
use crate::error::Error;
use crate::inputs::{Inputs, Quirks};
use crate::instruction::from_op;
use crate::opcode::Opcode;
use crate::state::{FrameBuffer, State};

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - `previous_states` for rewinding
///  - the `keypad`, written by the embedder and read once per cycle
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing the machine one cycle at a time, and reversing it
/// - inspecting its frame buffer for rendering by some display
pub struct Chip8 {
    state: State,
    previous_states: VecDeque<State>,
    rng: StdRng,
    /// Pressed status of keypad keys 0x0..=0xF. The embedder writes it
    /// between cycles; the interpreter only reads it.
    pub keypad: [bool; KEY_COUNT],
    /// Behavior switches for opcodes with disputed semantics.
    pub quirks: Quirks,
}

impl Chip8 {
    pub fn new() -> Self {
        Chip8 {
            state: State::new(),
            previous_states: VecDeque::with_capacity(MAX_SAVED_STATES),
            rng: StdRng::from_entropy(),
            keypad: [false; KEY_COUNT],
            quirks: Quirks::default(),
        }
    }

    /// Builds an engine with a fixed RNG seed so Cxkk is reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Chip8 {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new()
        }
    }

    /// Copies a ROM into memory at the fixed load address.
    ///
    /// # Arguments
    /// * `rom` the raw ROM bytes
    ///
    /// Fails without touching memory when the ROM doesn't fit between
    /// 0x200 and the end of memory.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), Error> {
        let start = ROM_START as usize;
        let capacity = MEMORY_SIZE - start;
        if rom.len() > capacity {
            return Err(Error::RomTooBig {
                len: rom.len(),
                capacity,
            });
        }
        self.state.memory[start..start + rom.len()].copy_from_slice(rom);
        Ok(())
    }

    /// Advances the machine by a single cycle:
    /// fetch, advance the pc, decode, execute, tick the timers.
    ///
    /// A failed instruction leaves registers, memory and the frame buffer
    /// untouched; the pc stays past the faulting opcode and the timers
    /// still tick, so the embedder can keep cycling after an error.
    pub fn cycle(&mut self) -> Result<(), Error> {
        // snapshot first so reverse_cycle lands on the pre-cycle state
        self.save_state();

        let op = self.fetch();
        trace!(
            "{:04X} v{:02X?} i{:04X} pc{:04X}",
            op.0,
            self.state.v,
            self.state.i,
            self.state.pc
        );

        let mut advanced = self.state;
        advanced.pc = advanced.pc.wrapping_add(0x2) % MEMORY_SIZE as u16;

        let mut inputs = Inputs {
            keys: &self.keypad,
            rng: &mut self.rng,
            quirks: self.quirks,
        };
        let result = match from_op(op)(op, &advanced, &mut inputs) {
            Ok(state) => {
                self.state = state;
                Ok(())
            }
            Err(e) => {
                self.state = advanced;
                Err(e)
            }
        };

        self.tick_timers();
        result
    }

    /// Reverses the machine by a single cycle if any history remains.
    pub fn reverse_cycle(&mut self) {
        if let Some(state) = self.previous_states.pop_front() {
            self.state = state;
        }
    }

    /// Returns the FrameBuffer and clears the draw flag if the display
    /// should be redrawn.
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    /// The current frame regardless of the draw flag.
    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// Sets the pressed status of a key (low nibble of `key`).
    pub fn key_press(&mut self, key: u8) {
        self.keypad[key as usize & 0xF] = true;
    }

    /// Unsets the pressed status of a key.
    pub fn key_release(&mut self, key: u8) {
        self.keypad[key as usize & 0xF] = false;
    }

    /// Gets the opcode currently pointed at by the pc.
    ///
    /// Memory is stored as bytes, but opcodes are 16 bits so two
    /// subsequent bytes are combined big-endian. The fetch address wraps
    /// around the end of memory.
    fn fetch(&self) -> Opcode {
        let pc = self.state.pc as usize;
        let left = u16::from(self.state.memory[pc % MEMORY_SIZE]);
        let right = u16::from(self.state.memory[(pc + 1) % MEMORY_SIZE]);
        Opcode(left << 8 | right)
    }

    /// Decrements each timer that hasn't already hit zero.
    fn tick_timers(&mut self) {
        if self.state.delay_timer > 0 {
            self.state.delay_timer -= 1;
        }
        if self.state.sound_timer > 0 {
            self.state.sound_timer -= 1;
        }
    }

    /// Puts the current state in previous_states, dropping the oldest
    /// snapshot once MAX_SAVED_STATES are held.
    fn save_state(&mut self) {
        if self.previous_states.len() == MAX_SAVED_STATES {
            self.previous_states.pop_back();
        }
        self.previous_states.push_front(self.state);
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PIXEL_OFF;

    #[test]
    fn test_chip8_fetches_op() {
        let mut chip8 = Chip8::new();
        chip8.state.memory[0x200..0x202].copy_from_slice(&[0xAA, 0xBB]);
        assert_eq!(chip8.fetch(), Opcode(0xAABB));
    }

    #[test]
    fn test_load_rom_copies_bytes() {
        let mut chip8 = Chip8::new();
        chip8.load_rom(&[0x00, 0xE0, 0x12, 0x00]).unwrap();
        assert_eq!(chip8.state.memory[0x200..0x204], [0x00, 0xE0, 0x12, 0x00]);
    }

    #[test]
    fn test_load_rom_accepts_max_size() {
        let mut chip8 = Chip8::new();
        assert_eq!(chip8.load_rom(&[0xAA; 3584]), Ok(()));
    }

    #[test]
    fn test_load_rom_rejects_oversized() {
        let mut chip8 = Chip8::new();
        assert_eq!(
            chip8.load_rom(&[0xAA; 3585]),
            Err(Error::RomTooBig {
                len: 3585,
                capacity: 3584
            })
        );
        // memory untouched on failure
        assert!(chip8.state.memory[0x200..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_cycle_executes_cls() {
        let mut chip8 = Chip8::new();
        chip8.load_rom(&[0x00, 0xE0]).unwrap();
        chip8.state.frame_buffer[0] = 0xFFFF_FFFF;
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.pc, 0x202);
        assert!(chip8.frame_buffer().iter().all(|&c| c == PIXEL_OFF));
    }

    #[test]
    fn test_cycle_ticks_timers() {
        let mut chip8 = Chip8::new();
        chip8.load_rom(&[0x00, 0xE0]).unwrap();
        chip8.state.delay_timer = 2;
        chip8.state.sound_timer = 1;
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.delay_timer, 1);
        assert_eq!(chip8.state.sound_timer, 0);
        // timers floor at zero
        chip8.state.pc = 0x200;
        chip8.cycle().unwrap();
        chip8.state.pc = 0x200;
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.delay_timer, 0);
        assert_eq!(chip8.state.sound_timer, 0);
    }

    #[test]
    fn test_cycle_survives_errors() {
        let mut chip8 = Chip8::new();
        // RET with an empty stack
        chip8.load_rom(&[0x00, 0xEE, 0x61, 0x22]).unwrap();
        assert_eq!(
            chip8.cycle(),
            Err(Error::StackUnderflow { pc: 0x200 })
        );
        // the pc moved past the faulting opcode and the next cycle works
        assert_eq!(chip8.state.pc, 0x202);
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.v[0x1], 0x22);
    }

    #[test]
    fn test_cycle_waits_for_key() {
        let mut chip8 = Chip8::new();
        chip8.load_rom(&[0xF1, 0x0A]).unwrap();
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.pc, 0x200);
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.pc, 0x200);
        chip8.key_press(0xE);
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(chip8.state.v[0x1], 0xE);
    }

    #[test]
    fn test_take_frame_only_after_draw() {
        let mut chip8 = Chip8::new();
        assert!(chip8.take_frame().is_none());
        chip8.load_rom(&[0x00, 0xE0]).unwrap();
        chip8.cycle().unwrap();
        assert!(chip8.take_frame().is_some());
        assert!(chip8.take_frame().is_none());
    }

    #[test]
    fn test_key_press_and_release() {
        let mut chip8 = Chip8::new();
        chip8.key_press(0xE);
        assert!(chip8.keypad[0xE]);
        chip8.key_release(0xE);
        assert!(!chip8.keypad[0xE]);
    }

    #[test]
    fn test_reverse_cycle_restores_state() {
        let mut chip8 = Chip8::new();
        chip8.load_rom(&[0x61, 0x22]).unwrap();
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.v[0x1], 0x22);
        assert_eq!(chip8.state.pc, 0x202);
        chip8.reverse_cycle();
        assert_eq!(chip8.state.v[0x1], 0x0);
        assert_eq!(chip8.state.pc, 0x200);
        // with no history left this is a no-op
        chip8.reverse_cycle();
        assert_eq!(chip8.state.pc, 0x200);
    }

    #[test]
    fn test_chip8_drops_old_saved_states() {
        let mut chip8 = Chip8::new();
        for _ in 0..MAX_SAVED_STATES + 1 {
            chip8.save_state();
        }
        assert_eq!(chip8.previous_states.len(), MAX_SAVED_STATES);
    }

    #[test]
    fn test_with_seed_is_deterministic() {
        let run = || {
            let mut chip8 = Chip8::with_seed(0xC8);
            chip8.load_rom(&[0xC1, 0xFF]).unwrap();
            chip8.cycle().unwrap();
            chip8.state.v[0x1]
        };
        assert_eq!(run(), run());
    }
}
