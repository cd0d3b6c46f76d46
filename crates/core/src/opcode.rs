//! Opcode table for the managed-runtime IL modeled by ilsplice.
//!
//! Only the subset of opcodes needed to describe method bodies around a call site (and the
//! blocks spliced after it) is modeled. Mnemonics use the dotted IL spelling, e.g. `ldloca.s`.

use crate::result::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single IL operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Nop,
    Ldarg,
    Ldloc,
    LdlocS,
    Ldloca,
    LdlocaS,
    Stloc,
    StlocS,
    LdcI4,
    LdcR8,
    Add,
    Sub,
    Mul,
    Div,
    Call,
    Callvirt,
    Br,
    Brtrue,
    Brfalse,
    Pop,
    Dup,
    Ret,
}

/// The kind of operand an opcode carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandKind {
    None,
    Arg,
    Local,
    Method,
    Int,
    Float,
    Label,
}

const ALL: [Opcode; 22] = [
    Opcode::Nop,
    Opcode::Ldarg,
    Opcode::Ldloc,
    Opcode::LdlocS,
    Opcode::Ldloca,
    Opcode::LdlocaS,
    Opcode::Stloc,
    Opcode::StlocS,
    Opcode::LdcI4,
    Opcode::LdcR8,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Call,
    Opcode::Callvirt,
    Opcode::Br,
    Opcode::Brtrue,
    Opcode::Brfalse,
    Opcode::Pop,
    Opcode::Dup,
    Opcode::Ret,
];

impl Opcode {
    /// IL mnemonic, e.g. `ldloca.s`.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Nop => "nop",
            Opcode::Ldarg => "ldarg",
            Opcode::Ldloc => "ldloc",
            Opcode::LdlocS => "ldloc.s",
            Opcode::Ldloca => "ldloca",
            Opcode::LdlocaS => "ldloca.s",
            Opcode::Stloc => "stloc",
            Opcode::StlocS => "stloc.s",
            Opcode::LdcI4 => "ldc.i4",
            Opcode::LdcR8 => "ldc.r8",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Call => "call",
            Opcode::Callvirt => "callvirt",
            Opcode::Br => "br",
            Opcode::Brtrue => "brtrue",
            Opcode::Brfalse => "brfalse",
            Opcode::Pop => "pop",
            Opcode::Dup => "dup",
            Opcode::Ret => "ret",
        }
    }

    /// The operand this opcode expects.
    pub fn operand_kind(self) -> OperandKind {
        match self {
            Opcode::Ldarg => OperandKind::Arg,
            Opcode::Ldloc
            | Opcode::LdlocS
            | Opcode::Ldloca
            | Opcode::LdlocaS
            | Opcode::Stloc
            | Opcode::StlocS => OperandKind::Local,
            Opcode::LdcI4 => OperandKind::Int,
            Opcode::LdcR8 => OperandKind::Float,
            Opcode::Call | Opcode::Callvirt => OperandKind::Method,
            Opcode::Br | Opcode::Brtrue | Opcode::Brfalse => OperandKind::Label,
            _ => OperandKind::None,
        }
    }

    /// Returns true for opcodes that push the address of a local onto the stack.
    #[inline]
    pub fn is_local_address_load(self) -> bool {
        matches!(self, Opcode::Ldloca | Opcode::LdlocaS)
    }

    /// Returns true for any call opcode.
    #[inline]
    pub fn is_call(self) -> bool {
        matches!(self, Opcode::Call | Opcode::Callvirt)
    }

    /// Returns true if the opcode transfers control.
    #[inline]
    pub fn is_branch(self) -> bool {
        matches!(self, Opcode::Br | Opcode::Brtrue | Opcode::Brfalse)
    }

    /// Returns true if the opcode reads the value of a local.
    #[inline]
    pub fn is_local_load(self) -> bool {
        matches!(self, Opcode::Ldloc | Opcode::LdlocS)
    }

    /// Returns true if the opcode writes a local.
    #[inline]
    pub fn is_local_store(self) -> bool {
        matches!(self, Opcode::Stloc | Opcode::StlocS)
    }

    /// Picks the `(load, store)` pair for a local, preferring the short forms whose operand
    /// fits in one byte.
    pub fn short_form_for_local(slot: u16) -> (Opcode, Opcode) {
        if slot <= u8::MAX as u16 {
            (Opcode::LdlocS, Opcode::StlocS)
        } else {
            (Opcode::Ldloc, Opcode::Stloc)
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl FromStr for Opcode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        ALL.iter()
            .copied()
            .find(|op| op.mnemonic() == lowered)
            .ok_or_else(|| Error::UnknownOpcode(s.to_string()))
    }
}
