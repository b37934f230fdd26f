//! Instruction decode. An opcode is one big-endian 16-bit word; the top
//! nibble names a family, and operands sit in fixed bit fields:
//!
//! ```text
//!   f...  family / primary dispatch key
//!   .x..  register Vx
//!   ..y.  register Vy
//!   ..kk  immediate byte
//!   .nnn  address
//!   ...n  short immediate (sprite height)
//! ```
//!
//! Twelve families map straight to one operation. Families 0, 8 and E pack
//! several operations behind the same top nibble and re-key on the low
//! nibble; family F carries the most variants and re-keys on the whole low
//! byte. Encodings with no assigned operation decode to `Op::Nop`.

/// One decoded operation. Operand fields are re-read from the instruction
/// word at execution time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// unassigned encoding; consumes the fetch and nothing else
    Nop,
    Cls,
    Ret,
    Jp,
    Call,
    SeByte,
    SneByte,
    SeReg,
    LdByte,
    AddByte,
    Ld,
    Or,
    And,
    Xor,
    Add,
    Sub,
    Shr,
    Subn,
    Shl,
    SneReg,
    LdIndex,
    JpOffset,
    Rnd,
    Drw,
    Skp,
    Sknp,
    ReadDelay,
    /// polled wait: holds the program counter until a key is down
    WaitKey,
    SetDelay,
    SetSound,
    AddIndex,
    FontAddr,
    Bcd,
    SaveRegs,
    LoadRegs,
}

/// Routing for one primary-table entry: either straight to an operation or
/// through a family sub-table keyed on a smaller field of the same word.
#[derive(Clone, Copy)]
enum Entry {
    Direct(Op),
    System,  // family 0, keyed on the low nibble
    Alu,     // family 8, keyed on the low nibble
    KeyTest, // family E, keyed on the low nibble
    Misc,    // family F, keyed on the low byte
}

/// Immutable two-level decode tables, built once when the machine starts
/// and never mutated afterwards.
pub struct Dispatch {
    primary: [Entry; 16],
    system: [Op; 16],
    alu: [Op; 16],
    key_test: [Op; 16],
    misc: [Op; 256],
}

impl Dispatch {
    pub fn new() -> Dispatch {
        let mut primary = [Entry::Direct(Op::Nop); 16];
        primary[0x0] = Entry::System;
        primary[0x1] = Entry::Direct(Op::Jp);
        primary[0x2] = Entry::Direct(Op::Call);
        primary[0x3] = Entry::Direct(Op::SeByte);
        primary[0x4] = Entry::Direct(Op::SneByte);
        primary[0x5] = Entry::Direct(Op::SeReg);
        primary[0x6] = Entry::Direct(Op::LdByte);
        primary[0x7] = Entry::Direct(Op::AddByte);
        primary[0x8] = Entry::Alu;
        primary[0x9] = Entry::Direct(Op::SneReg);
        primary[0xa] = Entry::Direct(Op::LdIndex);
        primary[0xb] = Entry::Direct(Op::JpOffset);
        primary[0xc] = Entry::Direct(Op::Rnd);
        primary[0xd] = Entry::Direct(Op::Drw);
        primary[0xe] = Entry::KeyTest;
        primary[0xf] = Entry::Misc;

        let mut system = [Op::Nop; 16];
        system[0x0] = Op::Cls;
        system[0xe] = Op::Ret;

        let mut alu = [Op::Nop; 16];
        alu[0x0] = Op::Ld;
        alu[0x1] = Op::Or;
        alu[0x2] = Op::And;
        alu[0x3] = Op::Xor;
        alu[0x4] = Op::Add;
        alu[0x5] = Op::Sub;
        alu[0x6] = Op::Shr;
        alu[0x7] = Op::Subn;
        alu[0xe] = Op::Shl;

        let mut key_test = [Op::Nop; 16];
        key_test[0x1] = Op::Sknp;
        key_test[0xe] = Op::Skp;

        let mut misc = [Op::Nop; 256];
        misc[0x07] = Op::ReadDelay;
        misc[0x0a] = Op::WaitKey;
        misc[0x15] = Op::SetDelay;
        misc[0x18] = Op::SetSound;
        misc[0x1e] = Op::AddIndex;
        misc[0x29] = Op::FontAddr;
        misc[0x33] = Op::Bcd;
        misc[0x55] = Op::SaveRegs;
        misc[0x65] = Op::LoadRegs;

        Dispatch {
            primary,
            system,
            alu,
            key_test,
            misc,
        }
    }

    /// resolve a fetched word to exactly one operation
    pub fn decode(&self, word: u16) -> Op {
        match self.primary[(word >> 12) as usize] {
            Entry::Direct(op) => op,
            Entry::System => self.system[(word & 0x000f) as usize],
            Entry::Alu => self.alu[(word & 0x000f) as usize],
            Entry::KeyTest => self.key_test[(word & 0x000f) as usize],
            Entry::Misc => self.misc[(word & 0x00ff) as usize],
        }
    }
}

pub fn x(word: u16) -> usize {
    ((word >> 8) & 0x0f) as usize
}

pub fn y(word: u16) -> usize {
    ((word >> 4) & 0x0f) as usize
}

pub fn kk(word: u16) -> u8 {
    (word & 0x00ff) as u8
}

pub fn nnn(word: u16) -> u16 {
    word & 0x0fff
}

pub fn n(word: u16) -> u16 {
    word & 0x000f
}
