/// Bytes of addressable memory.
pub const MEMORY_SIZE: usize = 4096;

/// Address ROMs are copied to and execution starts from.
pub const ROM_START: u16 = 0x200;

/// Address the font sprite sheet is copied to.
pub const FONT_START: u16 = 0x050;

/// Height of a single font glyph in bytes.
pub const FONT_HEIGHT: u16 = 5;

/// Display dimensions measured in pixels.
pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Framebuffer cell values for lit and unlit pixels.
///
/// Cells are all-bits-set or all-bits-clear so a renderer can blit the
/// buffer directly as 32-bit pixels.
pub const PIXEL_ON: u32 = 0xFFFF_FFFF;
pub const PIXEL_OFF: u32 = 0x0000_0000;

/// Bytes per framebuffer row; the pitch a renderer needs to blit it.
pub const FRAME_PITCH: usize = DISPLAY_WIDTH * std::mem::size_of::<u32>();

/// Maximum call stack depth.
pub const STACK_DEPTH: usize = 16;

/// Number of keypad keys.
pub const KEY_COUNT: usize = 16;

/// How many previous states are kept around for rewinding.
pub const MAX_SAVED_STATES: usize = 500;

/// Sprites for the hex digits 0..F, 5 bytes per glyph.
///
/// Each byte is one 8-pixel row; only the high nibble of each row is used.
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
