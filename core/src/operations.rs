use rand::Rng;

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, GLYPH_SIZE};
use crate::error::Fault;
use crate::instruction::{Flow, Runtime};
use crate::opcode::Opcode;
use crate::quirks::{ShiftSource, SpriteEdge};
use crate::state::State;

/// clear
pub fn clr(_op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    state.frame_buffer = [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
    state.draw_flag = true;
    Ok(Flow::Next)
}

/// PC = STACK.pop()
/// The popped address already points past the call.
pub fn rts(_op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    Ok(Flow::Jump(state.pop()?))
}

/// PC = addr
pub fn jump(op: &Opcode, _state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    Ok(Flow::Jump(op.nnn))
}

/// STACK.push(PC + 2); PC = addr
pub fn call(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    state.push(state.pc + 0x2)?;
    Ok(Flow::Jump(op.nnn))
}

/// if Vx == nn then pc += 2
pub fn ske(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    Ok(Flow::skip_if(state.v[op.vx()] == op.nn))
}

/// if Vx != nn then pc += 2
pub fn skne(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    Ok(Flow::skip_if(state.v[op.vx()] != op.nn))
}

/// if Vx == Vy then pc += 2
pub fn skre(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    Ok(Flow::skip_if(state.v[op.vx()] == state.v[op.vy()]))
}

/// Vx = nn
pub fn load(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    state.v[op.vx()] = op.nn;
    Ok(Flow::Next)
}

/// Vx += nn
/// Add nn to Vx; allow for overflow but implicitly drop it
pub fn add(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    state.v[op.vx()] = state.v[op.vx()].wrapping_add(op.nn);
    Ok(Flow::Next)
}

/// Vx = Vy
pub fn mv(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    state.v[op.vx()] = state.v[op.vy()];
    Ok(Flow::Next)
}

/// Vx |= Vy
pub fn or(op: &Opcode, state: &mut State, rt: &mut Runtime) -> Result<Flow, Fault> {
    state.v[op.vx()] |= state.v[op.vy()];
    reset_flag_after_logic(state, rt);
    Ok(Flow::Next)
}

/// Vx &= Vy
pub fn and(op: &Opcode, state: &mut State, rt: &mut Runtime) -> Result<Flow, Fault> {
    state.v[op.vx()] &= state.v[op.vy()];
    reset_flag_after_logic(state, rt);
    Ok(Flow::Next)
}

/// Vx ^= Vy
pub fn xor(op: &Opcode, state: &mut State, rt: &mut Runtime) -> Result<Flow, Fault> {
    state.v[op.vx()] ^= state.v[op.vy()];
    reset_flag_after_logic(state, rt);
    Ok(Flow::Next)
}

fn reset_flag_after_logic(state: &mut State, rt: &Runtime) {
    if rt.quirks.logic_resets_vf {
        state.set_flag(false);
    }
}

/// Vx += Vy; VF = overflow
pub fn addr(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    let (res, over) = state.v[op.vx()].overflowing_add(state.v[op.vy()]);
    state.v[op.vx()] = res;
    state.set_flag(over);
    Ok(Flow::Next)
}

/// Vx -= Vy; VF = !underflow
pub fn sub(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    let (res, under) = state.v[op.vx()].overflowing_sub(state.v[op.vy()]);
    state.v[op.vx()] = res;
    state.set_flag(!under);
    Ok(Flow::Next)
}

/// Vx = Vy - Vx; VF = !underflow
pub fn subn(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    let (res, under) = state.v[op.vy()].overflowing_sub(state.v[op.vx()]);
    state.v[op.vx()] = res;
    state.set_flag(!under);
    Ok(Flow::Next)
}

/// Vx = src >> 1; VF = the bit shifted out
pub fn shr(op: &Opcode, state: &mut State, rt: &mut Runtime) -> Result<Flow, Fault> {
    let src = shift_operand(op, state, rt);
    state.v[op.vx()] = src >> 1;
    state.set_flag(src & 0x1 == 0x1);
    Ok(Flow::Next)
}

/// Vx = src << 1; VF = the bit shifted out
pub fn shl(op: &Opcode, state: &mut State, rt: &mut Runtime) -> Result<Flow, Fault> {
    let src = shift_operand(op, state, rt);
    state.v[op.vx()] = src << 1;
    state.set_flag(src & 0x80 == 0x80);
    Ok(Flow::Next)
}

fn shift_operand(op: &Opcode, state: &State, rt: &Runtime) -> u8 {
    match rt.quirks.shift_source {
        ShiftSource::Vy => state.v[op.vy()],
        ShiftSource::Vx => state.v[op.vx()],
    }
}

/// if Vx != Vy then pc += 2
pub fn skrne(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    Ok(Flow::skip_if(state.v[op.vx()] != state.v[op.vy()]))
}

/// I = addr
pub fn loadi(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    state.i = op.nnn;
    Ok(Flow::Next)
}

/// PC = V0 + addr
pub fn jumpi(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    Ok(Flow::Jump(u16::from(state.v[0x0]) + op.nnn))
}

/// Vx = rand_byte & nn
pub fn rand(op: &Opcode, state: &mut State, rt: &mut Runtime) -> Result<Flow, Fault> {
    let rand_byte: u8 = rt.rng.gen();
    state.v[op.vx()] = rand_byte & op.nn;
    Ok(Flow::Next)
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs a sprite from memory i..i+n at position x, y on the FrameBuffer.
/// Sets VF if any pixels were erased.
pub fn draw(op: &Opcode, state: &mut State, rt: &mut Runtime) -> Result<Flow, Fault> {
    let sprite = state.read_slice(state.i as usize, op.n as usize)?.to_vec();
    let origin_x = state.v[op.vx()] as usize % DISPLAY_WIDTH;
    let origin_y = state.v[op.vy()] as usize % DISPLAY_HEIGHT;
    let wrap = rt.quirks.sprite_edge == SpriteEdge::Wrap;

    let mut collision = false;
    for (row, byte) in sprite.iter().enumerate() {
        let y = origin_y + row;
        if y >= DISPLAY_HEIGHT && !wrap {
            break;
        }
        for bit in 0..8 {
            if (byte >> (7 - bit)) & 0x1 == 0 {
                continue;
            }
            let x = origin_x + bit;
            if x >= DISPLAY_WIDTH && !wrap {
                break;
            }
            let pixel = &mut state.frame_buffer[y % DISPLAY_HEIGHT][x % DISPLAY_WIDTH];
            collision |= *pixel;
            *pixel ^= true;
        }
    }

    state.draw_flag = true;
    state.set_flag(collision);
    Ok(Flow::Next)
}

/// if Vx.pressed then pc += 2
pub fn skpr(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    Ok(Flow::skip_if(state.keys[key_index(op, state)]))
}

/// if !Vx.pressed then pc += 2
pub fn skup(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    Ok(Flow::skip_if(!state.keys[key_index(op, state)]))
}

fn key_index(op: &Opcode, state: &State) -> usize {
    (state.v[op.vx()] & 0xF) as usize
}

/// Vx = DT
pub fn moved(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    state.v[op.vx()] = state.delay_timer;
    Ok(Flow::Next)
}

/// await keypress for Vx
pub fn keyd(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    state.register_needing_key = Some(op.x);
    state.captured_key = None;
    Ok(Flow::Wait)
}

/// DT = Vx
pub fn loads(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    state.delay_timer = state.v[op.vx()];
    Ok(Flow::Next)
}

/// ST = Vx
pub fn ld(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    state.sound_timer = state.v[op.vx()];
    Ok(Flow::Next)
}

/// I += Vx
pub fn addi(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    state.i = state.i.wrapping_add(u16::from(state.v[op.vx()]));
    Ok(Flow::Next)
}

/// I = (Vx & 0xF) * 5
/// Set I to the memory address of the glyph for the low nibble of Vx
pub fn ldspr(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    state.i = u16::from(state.v[op.vx()] & 0xF) * GLYPH_SIZE;
    Ok(Flow::Next)
}

/// mem[I..I+3] = bcd(Vx)
/// Store BCD repr of Vx in memory starting at address i
pub fn bcd(op: &Opcode, state: &mut State, _rt: &mut Runtime) -> Result<Flow, Fault> {
    let value = state.v[op.vx()];
    let bcd = [value / 100, value / 10 % 10, value % 10];
    state.write_slice(state.i as usize, &bcd)?;
    Ok(Flow::Next)
}

/// mem[I..=I+x] = V0..=Vx
pub fn stor(op: &Opcode, state: &mut State, rt: &mut Runtime) -> Result<Flow, Fault> {
    let v = state.v;
    state.write_slice(state.i as usize, &v[..=op.vx()])?;
    advance_index_after_transfer(op, state, rt);
    Ok(Flow::Next)
}

/// V0..=Vx = mem[I..=I+x]
pub fn read(op: &Opcode, state: &mut State, rt: &mut Runtime) -> Result<Flow, Fault> {
    let len = op.vx() + 1;
    let mut v = state.v;
    v[..len].copy_from_slice(state.read_slice(state.i as usize, len)?);
    state.v = v;
    advance_index_after_transfer(op, state, rt);
    Ok(Flow::Next)
}

fn advance_index_after_transfer(op: &Opcode, state: &mut State, rt: &Runtime) {
    if rt.quirks.load_store_increments_i {
        state.i = state.i.wrapping_add(u16::from(op.x) + 1);
    }
}
