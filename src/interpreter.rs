use crate::dispatch::{self, Dispatch, Op};
use crate::memory::{self, MemoryMap, FONT_GLYPH_SIZE};
use crate::state::{MachineState, CARRY, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;

/// What an executed instruction asks the cycle to do with the program
/// counter, which already moved past the instruction at fetch time.
enum Flow {
    /// keep the pre-incremented program counter
    Advance,
    /// put the program counter back on the same instruction so the next
    /// cycle re-executes it (the key wait polls this way)
    Hold,
}

/// The execution engine. One call to `step()` performs one
/// fetch-decode-execute cycle plus one timer tick; everything else is
/// observable only through the accessors below.
pub struct Chip8Interpreter {
    memory: memory::Chip8MemoryMap,
    state: MachineState,
    dispatch: Dispatch,
    rng: StdRng,
}

impl Chip8Interpreter {
    pub fn new() -> Chip8Interpreter {
        let memory = memory::Chip8MemoryMap::new();
        let state = MachineState::new(memory.program_addr);
        Chip8Interpreter {
            memory,
            state,
            dispatch: Dispatch::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// load a program image
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<(), io::Error> {
        self.memory.load_program(reader)?;
        Ok(())
    }

    /// refresh the keypad vector; called by the input collaborator between
    /// steps, never during one
    pub fn set_keys(&mut self, keys: [bool; 16]) {
        self.state.keypad = keys;
    }

    /// the display collaborator reads this after any step it likes
    pub fn framebuffer(&self) -> &[u8] {
        &self.state.framebuffer
    }

    /// the audio collaborator should sound while this holds
    pub fn sound_active(&self) -> bool {
        self.state.sound_active()
    }

    /// run one machine cycle: fetch the word at the program counter,
    /// advance it by two, execute the decoded operation, then tick both
    /// timers. A key wait leaves the program counter on the waiting
    /// instruction instead of advancing.
    pub fn step(&mut self) -> Result<(), io::Error> {
        let fetched_at = self.state.pc;
        let word = self.memory.read_word(fetched_at);
        self.state.pc = fetched_at.wrapping_add(2);
        let op = self.dispatch.decode(word);
        trace!("{:03x}: {:04x} {:?}", fetched_at, word, op);
        match self.exec(op, word)? {
            Flow::Advance => {}
            Flow::Hold => self.state.pc = fetched_at,
        }
        self.state.tick_timers();
        Ok(())
    }

    /// one operation's state transition. Flag-producing instructions write
    /// VF last, after the result, so VF-as-operand reads its old value.
    fn exec(&mut self, op: Op, word: u16) -> Result<Flow, io::Error> {
        let x = dispatch::x(word);
        let y = dispatch::y(word);
        let kk = dispatch::kk(word);
        let nnn = dispatch::nnn(word);

        match op {
            Op::Nop => {}
            Op::Cls => self.state.framebuffer.fill(0),
            Op::Ret => {
                if self.state.sp == 0 {
                    return Err(machine_fault("subroutine return with an empty call stack"));
                }
                self.state.sp -= 1;
                self.state.pc = self.state.stack[self.state.sp];
            }
            Op::Jp => self.state.pc = nnn,
            Op::Call => {
                if self.state.sp == self.state.stack.len() {
                    return Err(machine_fault("call stack overflow"));
                }
                self.state.stack[self.state.sp] = self.state.pc;
                self.state.sp += 1;
                self.state.pc = nnn;
            }
            Op::SeByte => {
                if self.state.v[x] == kk {
                    self.skip();
                }
            }
            Op::SneByte => {
                if self.state.v[x] != kk {
                    self.skip();
                }
            }
            Op::SeReg => {
                if self.state.v[x] == self.state.v[y] {
                    self.skip();
                }
            }
            Op::LdByte => self.state.v[x] = kk,
            // no carry out of the immediate add
            Op::AddByte => self.state.v[x] = self.state.v[x].wrapping_add(kk),
            Op::Ld => self.state.v[x] = self.state.v[y],
            Op::Or => self.state.v[x] |= self.state.v[y],
            Op::And => self.state.v[x] &= self.state.v[y],
            Op::Xor => self.state.v[x] ^= self.state.v[y],
            Op::Add => {
                let sum = self.state.v[x] as u16 + self.state.v[y] as u16;
                self.state.v[x] = (sum & 0xff) as u8;
                self.state.v[CARRY] = (sum > 0xff) as u8;
            }
            Op::Sub => {
                let (vx, vy) = (self.state.v[x], self.state.v[y]);
                self.state.v[x] = vx.wrapping_sub(vy);
                // not-borrow convention
                self.state.v[CARRY] = (vx > vy) as u8;
            }
            Op::Shr => {
                let vx = self.state.v[x];
                self.state.v[x] = vx >> 1;
                self.state.v[CARRY] = vx & 0x01;
            }
            Op::Subn => {
                let (vx, vy) = (self.state.v[x], self.state.v[y]);
                self.state.v[x] = vy.wrapping_sub(vx);
                self.state.v[CARRY] = (vy > vx) as u8;
            }
            Op::Shl => {
                let vx = self.state.v[x];
                self.state.v[x] = vx << 1;
                self.state.v[CARRY] = vx >> 7;
            }
            Op::SneReg => {
                if self.state.v[x] != self.state.v[y] {
                    self.skip();
                }
            }
            Op::LdIndex => self.state.index = nnn,
            Op::JpOffset => self.state.pc = nnn.wrapping_add(self.state.v[0] as u16),
            Op::Rnd => self.state.v[x] = self.rng.gen::<u8>() & kk,
            Op::Drw => self.draw_sprite(x, y, dispatch::n(word)),
            Op::Skp => {
                if self.key_down(self.state.v[x]) {
                    self.skip();
                }
            }
            Op::Sknp => {
                if !self.key_down(self.state.v[x]) {
                    self.skip();
                }
            }
            Op::ReadDelay => self.state.v[x] = self.state.delay_timer,
            Op::WaitKey => match self.state.keypad.iter().position(|&down| down) {
                Some(key) => self.state.v[x] = key as u8,
                None => return Ok(Flow::Hold),
            },
            Op::SetDelay => self.state.delay_timer = self.state.v[x],
            Op::SetSound => self.state.sound_timer = self.state.v[x],
            // no range check and no flag
            Op::AddIndex => {
                self.state.index = self.state.index.wrapping_add(self.state.v[x] as u16)
            }
            Op::FontAddr => {
                self.state.index = self.memory.font_addr + FONT_GLYPH_SIZE * self.state.v[x] as u16
            }
            Op::Bcd => {
                let value = self.state.v[x];
                let i = self.state.index;
                self.memory.write_byte(i, value / 100);
                self.memory.write_byte(i.wrapping_add(1), value / 10 % 10);
                self.memory.write_byte(i.wrapping_add(2), value % 10);
            }
            Op::SaveRegs => {
                for r in 0..=x {
                    self.memory
                        .write_byte(self.state.index.wrapping_add(r as u16), self.state.v[r]);
                }
            }
            Op::LoadRegs => {
                for r in 0..=x {
                    self.state.v[r] =
                        self.memory.read_byte(self.state.index.wrapping_add(r as u16));
                }
            }
        }
        Ok(Flow::Advance)
    }

    /// skip the instruction the program counter currently rests on
    fn skip(&mut self) {
        self.state.pc = self.state.pc.wrapping_add(2);
    }

    /// key-pressed test; register values above 0x0f use their low nibble
    fn key_down(&self, value: u8) -> bool {
        self.state.keypad[(value & 0x0f) as usize]
    }

    /// XOR an n-row sprite read from memory at the index register onto the
    /// framebuffer at (Vx, Vy). Coordinates wrap on both axes; the
    /// collision flag reports whether any lit pixel was turned off.
    fn draw_sprite(&mut self, x: usize, y: usize, rows: u16) {
        let origin_x = self.state.v[x] as usize % DISPLAY_WIDTH;
        let origin_y = self.state.v[y] as usize % DISPLAY_HEIGHT;
        let mut collided = 0;
        for row in 0..rows {
            let bits = self.memory.read_byte(self.state.index.wrapping_add(row));
            let py = (origin_y + row as usize) % DISPLAY_HEIGHT;
            for col in 0..8 {
                if bits & (0x80 >> col) == 0 {
                    continue;
                }
                let px = (origin_x + col) % DISPLAY_WIDTH;
                let cell = &mut self.state.framebuffer[py * DISPLAY_WIDTH + px];
                collided |= *cell;
                *cell ^= 1;
            }
        }
        self.state.v[CARRY] = collided;
    }
}

fn machine_fault(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}
