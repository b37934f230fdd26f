//! ## Design
//!
//! * the machine is a pure step function: the driver owns all pacing and
//!   invokes `step()` once per CPU cycle; there is no loop and no clock
//!   inside the core
//! * mutable machine state lives in flat stores (`state`, `memory`); the
//!   execution engine (`interpreter`) is their only writer, apart from the
//!   keypad vector which the input collaborator refreshes between steps
//! * decode is two-level table dispatch built once at startup (`dispatch`):
//!   the top nibble picks a family, and four families re-key on a smaller
//!   field of the same word
//! * every memory address computation wraps into the 4K space inside the
//!   memory map, so no opcode can index out of range
//! * display, input and audio sit behind traits so the core never touches a
//!   terminal; the shipped implementations render through tui/crossterm and
//!   beep through the pc speaker
//! * unassigned encodings execute as no-ops; genuine machine faults (call
//!   stack overflow or underflow, oversized program image) surface as
//!   errors to the driver
pub mod dispatch;
pub mod display;
pub mod input;
pub mod interpreter;
pub mod memory;
pub mod sound;
pub mod state;
