use log::warn;
use rand::Rng;

use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_HEIGHT, FONT_START, MEMORY_SIZE, PIXEL_OFF, PIXEL_ON,
    STACK_DEPTH,
};
use crate::error::Error;
use crate::inputs::Inputs;
use crate::opcode::Opcode;
use crate::state::State;

/// A pure state transition for a single instruction.
///
/// Handlers run *after* the cycle has advanced the pc past the current
/// opcode, so skips add another two and jumps overwrite it outright. On
/// error the returned state is discarded by the caller.
pub type Operation = fn(Opcode, &State, &mut Inputs) -> Result<State, Error>;

/// Address of the instruction currently being executed.
fn current(state: &State) -> u16 {
    state.pc.wrapping_sub(0x2)
}

/// 00E0: clear the frame buffer
pub fn clr(_op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    Ok(State {
        frame_buffer: [PIXEL_OFF; DISPLAY_WIDTH * DISPLAY_HEIGHT],
        draw_flag: true,
        ..*state
    })
}

/// 00EE: PC = STACK.pop()
pub fn rts(_op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    if state.sp == 0x0 {
        return Err(Error::StackUnderflow { pc: current(state) });
    }
    let sp = state.sp - 0x1;
    Ok(State {
        pc: state.stack[sp as usize],
        sp,
        ..*state
    })
}

/// 1nnn: PC = addr
pub fn jump(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    Ok(State {
        pc: op.addr(),
        ..*state
    })
}

/// 2nnn: STACK.push(PC); PC = addr
///
/// The pushed pc already points past the CALL, so RET resumes at the
/// following instruction.
pub fn call(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    if state.sp as usize == STACK_DEPTH {
        return Err(Error::StackOverflow { pc: current(state) });
    }
    let mut stack = state.stack;
    stack[state.sp as usize] = state.pc;
    Ok(State {
        pc: op.addr(),
        sp: state.sp + 0x1,
        stack,
        ..*state
    })
}

/// 3xkk: if Vx == kk then pc += 2
pub fn ske(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    let pc = if state.v[op.x() as usize] == op.kk() {
        state.pc + 0x2
    } else {
        state.pc
    };
    Ok(State { pc, ..*state })
}

/// 4xkk: if Vx != kk then pc += 2
pub fn skne(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    let pc = if state.v[op.x() as usize] != op.kk() {
        state.pc + 0x2
    } else {
        state.pc
    };
    Ok(State { pc, ..*state })
}

/// 5xy0: if Vx == Vy then pc += 2
pub fn skre(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    let pc = if state.v[op.x() as usize] == state.v[op.y() as usize] {
        state.pc + 0x2
    } else {
        state.pc
    };
    Ok(State { pc, ..*state })
}

/// 6xkk: Vx = kk
pub fn load(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    let mut v = state.v;
    v[op.x() as usize] = op.kk();
    Ok(State { v, ..*state })
}

/// 7xkk: Vx += kk
///
/// Wraps at 8 bits; the carry flag is not touched.
pub fn add(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    let mut v = state.v;
    v[op.x() as usize] = v[op.x() as usize].wrapping_add(op.kk());
    Ok(State { v, ..*state })
}

/// 8xy0: Vx = Vy
pub fn mv(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    let mut v = state.v;
    v[op.x() as usize] = v[op.y() as usize];
    Ok(State { v, ..*state })
}

/// 8xy1: Vx |= Vy
pub fn or(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    let mut v = state.v;
    v[op.x() as usize] |= v[op.y() as usize];
    Ok(State { v, ..*state })
}

/// 8xy2: Vx &= Vy
pub fn and(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    let mut v = state.v;
    v[op.x() as usize] &= v[op.y() as usize];
    Ok(State { v, ..*state })
}

/// 8xy3: Vx ^= Vy
pub fn xor(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    let mut v = state.v;
    v[op.x() as usize] ^= v[op.y() as usize];
    Ok(State { v, ..*state })
}

/// 8xy4: Vx += Vy; VF = carry
///
/// VF is written last so it wins when x is F.
pub fn addr(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    let (res, over) = state.v[op.x() as usize].overflowing_add(state.v[op.y() as usize]);
    let mut v = state.v;
    v[op.x() as usize] = res;
    v[0xF] = if over { 0x1 } else { 0x0 };
    Ok(State { v, ..*state })
}

/// 8xy5: Vx -= Vy; VF = !borrow
///
/// VF is 1 only when Vx was strictly greater than Vy.
pub fn sub(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    let x = state.v[op.x() as usize];
    let y = state.v[op.y() as usize];
    let mut v = state.v;
    v[op.x() as usize] = x.wrapping_sub(y);
    v[0xF] = if x > y { 0x1 } else { 0x0 };
    Ok(State { v, ..*state })
}

/// 8xy6: Vx >>= 1; VF = the bit shifted out
///
/// Shifts Vx in place by default; with the shift_reads_vy quirk the shifted
/// value is read from Vy instead.
pub fn shr(op: Opcode, state: &State, inputs: &mut Inputs) -> Result<State, Error> {
    let src = if inputs.quirks.shift_reads_vy {
        state.v[op.y() as usize]
    } else {
        state.v[op.x() as usize]
    };
    let mut v = state.v;
    v[op.x() as usize] = src >> 1;
    v[0xF] = src & 0x1;
    Ok(State { v, ..*state })
}

/// 8xy7: Vx = Vy - Vx; VF = !borrow
pub fn subn(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    let x = state.v[op.x() as usize];
    let y = state.v[op.y() as usize];
    let mut v = state.v;
    v[op.x() as usize] = y.wrapping_sub(x);
    v[0xF] = if y > x { 0x1 } else { 0x0 };
    Ok(State { v, ..*state })
}

/// 8xyE: Vx <<= 1; VF = the bit shifted out
///
/// Same quirk handling as 8xy6.
pub fn shl(op: Opcode, state: &State, inputs: &mut Inputs) -> Result<State, Error> {
    let src = if inputs.quirks.shift_reads_vy {
        state.v[op.y() as usize]
    } else {
        state.v[op.x() as usize]
    };
    let mut v = state.v;
    v[op.x() as usize] = src << 1;
    v[0xF] = src >> 7;
    Ok(State { v, ..*state })
}

/// 9xy0: if Vx != Vy then pc += 2
pub fn skrne(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    let pc = if state.v[op.x() as usize] != state.v[op.y() as usize] {
        state.pc + 0x2
    } else {
        state.pc
    };
    Ok(State { pc, ..*state })
}

/// Annn: I = addr
pub fn loadi(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    Ok(State {
        i: op.addr(),
        ..*state
    })
}

/// Bnnn: PC = V0 + addr
pub fn jumpi(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    Ok(State {
        pc: u16::from(state.v[0x0]) + op.addr(),
        ..*state
    })
}

/// Cxkk: Vx = random_byte & kk
pub fn rand(op: Opcode, state: &State, inputs: &mut Inputs) -> Result<State, Error> {
    let byte: u8 = inputs.rng.gen();
    let mut v = state.v;
    v[op.x() as usize] = byte & op.kk();
    Ok(State { v, ..*state })
}

/// Dxyn: draw_sprite(x=Vx y=Vy size=n)
///
/// XORs the n-byte sprite at memory[I..] onto the frame buffer. The origin
/// wraps around the display edges; pixels past the right or bottom edge are
/// clipped unless the wrap_sprites quirk is on. VF is set when any lit
/// pixel is turned off.
pub fn draw(op: Opcode, state: &State, inputs: &mut Inputs) -> Result<State, Error> {
    let rows = op.n() as usize;
    if state.i as usize + rows > MEMORY_SIZE {
        return Err(Error::AddressOutOfRange {
            addr: state.i,
            len: rows,
        });
    }

    let origin_x = state.v[op.x() as usize] as usize % DISPLAY_WIDTH;
    let origin_y = state.v[op.y() as usize] as usize % DISPLAY_HEIGHT;

    let mut v = state.v;
    let mut frame_buffer = state.frame_buffer;
    v[0xF] = 0x0;

    for row in 0..rows {
        let mut y = origin_y + row;
        if y >= DISPLAY_HEIGHT {
            if !inputs.quirks.wrap_sprites {
                continue;
            }
            y %= DISPLAY_HEIGHT;
        }
        let sprite = state.memory[state.i as usize + row];
        for bit in 0..8 {
            let mut x = origin_x + bit;
            if x >= DISPLAY_WIDTH {
                if !inputs.quirks.wrap_sprites {
                    continue;
                }
                x %= DISPLAY_WIDTH;
            }
            if sprite >> (7 - bit) & 0x1 == 0x0 {
                continue;
            }
            let cell = &mut frame_buffer[y * DISPLAY_WIDTH + x];
            if *cell == PIXEL_ON {
                v[0xF] = 0x1;
            }
            *cell ^= PIXEL_ON;
        }
    }

    Ok(State {
        v,
        frame_buffer,
        draw_flag: true,
        ..*state
    })
}

/// Ex9E: if Vx.pressed then pc += 2
pub fn skpr(op: Opcode, state: &State, inputs: &mut Inputs) -> Result<State, Error> {
    let key = state.v[op.x() as usize] as usize & 0xF;
    let pc = if inputs.keys[key] {
        state.pc + 0x2
    } else {
        state.pc
    };
    Ok(State { pc, ..*state })
}

/// ExA1: if !Vx.pressed then pc += 2
pub fn skup(op: Opcode, state: &State, inputs: &mut Inputs) -> Result<State, Error> {
    let key = state.v[op.x() as usize] as usize & 0xF;
    let pc = if !inputs.keys[key] {
        state.pc + 0x2
    } else {
        state.pc
    };
    Ok(State { pc, ..*state })
}

/// Fx07: Vx = DT
pub fn moved(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    let mut v = state.v;
    v[op.x() as usize] = state.delay_timer;
    Ok(State { v, ..*state })
}

/// Fx0A: Vx = the lowest pressed key, or retry next cycle
///
/// Polls the keypad; while nothing is down the pc is rolled back so this
/// instruction re-decodes on the next cycle. Timers keep ticking.
pub fn keyd(op: Opcode, state: &State, inputs: &mut Inputs) -> Result<State, Error> {
    match inputs.keys.iter().position(|&pressed| pressed) {
        Some(key) => {
            let mut v = state.v;
            v[op.x() as usize] = key as u8;
            Ok(State { v, ..*state })
        }
        None => Ok(State {
            pc: current(state),
            ..*state
        }),
    }
}

/// Fx15: DT = Vx
pub fn loads(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    Ok(State {
        delay_timer: state.v[op.x() as usize],
        ..*state
    })
}

/// Fx18: ST = Vx
pub fn ld(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    Ok(State {
        sound_timer: state.v[op.x() as usize],
        ..*state
    })
}

/// Fx1E: I += Vx
///
/// The sum is masked to addressable memory; VF is not touched.
pub fn addi(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    Ok(State {
        i: (state.i + u16::from(state.v[op.x() as usize])) & 0x0FFF,
        ..*state
    })
}

/// Fx29: I = address of the font glyph for digit Vx
///
/// Only the low nibble of Vx selects a glyph. See constants::SPRITE_SHEET.
pub fn ldspr(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    let digit = u16::from(state.v[op.x() as usize] & 0xF);
    Ok(State {
        i: FONT_START + digit * FONT_HEIGHT,
        ..*state
    })
}

/// Fx33: mem[I..I+3] = bcd(Vx)
///
/// Stores the decimal digits of Vx, most significant first.
pub fn bcd(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    let i = state.i as usize;
    if i + 3 > MEMORY_SIZE {
        return Err(Error::AddressOutOfRange {
            addr: state.i,
            len: 3,
        });
    }
    let digits = [
        state.v[op.x() as usize] / 100 % 10,
        state.v[op.x() as usize] / 10 % 10,
        state.v[op.x() as usize] % 10,
    ];
    let mut memory = state.memory;
    memory[i..i + 3].copy_from_slice(&digits);
    Ok(State { memory, ..*state })
}

/// Fx55: mem[I..=I+x] = V0..=Vx
pub fn stor(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    let i = state.i as usize;
    let len = op.x() as usize + 1;
    if i + len > MEMORY_SIZE {
        return Err(Error::AddressOutOfRange { addr: state.i, len });
    }
    let mut memory = state.memory;
    memory[i..i + len].copy_from_slice(&state.v[..len]);
    Ok(State { memory, ..*state })
}

/// Fx65: V0..=Vx = mem[I..=I+x]
pub fn read(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    let i = state.i as usize;
    let len = op.x() as usize + 1;
    if i + len > MEMORY_SIZE {
        return Err(Error::AddressOutOfRange { addr: state.i, len });
    }
    let mut v = state.v;
    v[..len].copy_from_slice(&state.memory[i..i + len]);
    Ok(State { v, ..*state })
}

/// Fallback for unmapped opcodes; everything but the pc already advanced
/// past the opcode is left alone. ROMs commonly carry unused slots, so
/// this only warns.
pub fn noop(op: Opcode, state: &State, _inputs: &mut Inputs) -> Result<State, Error> {
    warn!("unmapped opcode {:04X} at {:#05X}", op.0, current(state));
    Ok(*state)
}
