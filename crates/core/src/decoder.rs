//! ilsplice's single entry-point for turning IL listings into instruction streams.
//!
//! The listing format is one instruction per line:
//!
//! ```text
//! IL_7: ldloca.s V_1      # optional label(s) followed by a colon
//!       call MineShaft::adjustLevelChances/4
//!       ret
//! ```
//!
//! This stands in for an external loader; it is not a disassembler.

use crate::opcode::{Opcode, OperandKind};
use crate::result::Error;
use crate::signature::MethodSignature;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Frame-relative identifier of a local variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalSlot(pub u16);

impl fmt::Display for LocalSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V_{}", self.0)
    }
}

/// Symbolic branch target. Labels travel with the instruction they are attached to, so
/// inserting instructions never invalidates a branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IL_{}", self.0)
    }
}

/// The value or reference an instruction acts upon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    None,
    Arg(u16),
    Local(LocalSlot),
    Method(MethodSignature),
    Int(i64),
    Float(f64),
    Label(Label),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::None => Ok(()),
            Operand::Arg(index) => write!(f, "A_{index}"),
            Operand::Local(slot) => write!(f, "{slot}"),
            Operand::Method(sig) => write!(f, "{sig}"),
            Operand::Int(value) => write!(f, "{value}"),
            // keep a decimal point so the literal reads back as a float
            Operand::Float(value) => write!(f, "{value:?}"),
            Operand::Label(label) => write!(f, "{label}"),
        }
    }
}

/// Single IL instruction: opcode, operand and any labels that mark it as a branch target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Parsed opcode
    pub op: Opcode,
    /// Operand, `Operand::None` for opcodes without one
    pub operand: Operand,
    /// Labels attached to this instruction
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
}

impl Instruction {
    pub fn new(op: Opcode, operand: Operand) -> Self {
        Self {
            op,
            operand,
            labels: Vec::new(),
        }
    }

    /// Instruction with no operand.
    pub fn bare(op: Opcode) -> Self {
        Self::new(op, Operand::None)
    }

    pub fn with_labels(mut self, labels: Vec<Label>) -> Self {
        self.labels = labels;
        self
    }

    /// The local slot this instruction addresses, if any.
    pub fn local_slot(&self) -> Option<LocalSlot> {
        match self.operand {
            Operand::Local(slot) => Some(slot),
            _ => None,
        }
    }

    /// The call target, if this is a call instruction.
    pub fn call_target(&self) -> Option<&MethodSignature> {
        match (&self.operand, self.op.is_call()) {
            (Operand::Method(sig), true) => Some(sig),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for label in &self.labels {
            write!(f, "{label}: ")?;
        }
        match self.operand {
            Operand::None => write!(f, "{}", self.op),
            _ => write!(f, "{:<10} {}", self.op.mnemonic(), self.operand),
        }
    }
}

/// Parses an IL listing into structured instructions.
pub fn parse_listing(listing: &str) -> Result<Vec<Instruction>, Error> {
    // Fail on empty listing
    if listing.trim().is_empty() {
        return Err(Error::ParseError {
            line: 0,
            msg: "empty listing".into(),
            raw: listing.to_string(),
        });
    }

    let mut instructions = Vec::new();
    for (line_no, raw) in listing.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let parse_error = |msg: &str| Error::ParseError {
            line: line_no + 1,
            msg: msg.to_string(),
            raw: raw.to_string(),
        };

        let mut labels = Vec::new();
        let mut rest = line;
        while let Some((head, tail)) = rest.split_once(':') {
            // `::` belongs to a method operand, not a label
            if tail.starts_with(':') || head.contains(char::is_whitespace) {
                break;
            }
            let label = parse_label(head.trim()).ok_or_else(|| parse_error("invalid label"))?;
            labels.push(label);
            rest = tail.trim_start();
        }

        let mut parts = rest.split_whitespace();
        let mnemonic = parts.next().ok_or_else(|| parse_error("missing opcode"))?;
        let op = Opcode::from_str(mnemonic).map_err(|_| parse_error("unknown opcode"))?;
        let operand_text = parts.next();
        if parts.next().is_some() {
            return Err(parse_error("trailing tokens after operand"));
        }

        let operand = parse_operand(op.operand_kind(), operand_text)
            .ok_or_else(|| parse_error(&format!("invalid operand for {op}")))?;

        tracing::trace!("line {}: {} {}", line_no + 1, op, operand);
        instructions.push(Instruction { op, operand, labels });
    }
    Ok(instructions)
}

fn parse_label(text: &str) -> Option<Label> {
    text.strip_prefix("IL_")?.parse().ok().map(Label)
}

fn parse_index(text: &str, prefix: &str) -> Option<u16> {
    text.strip_prefix(prefix).unwrap_or(text).parse().ok()
}

fn parse_operand(kind: OperandKind, text: Option<&str>) -> Option<Operand> {
    match (kind, text) {
        (OperandKind::None, None) => Some(Operand::None),
        (OperandKind::None, Some(_)) | (_, None) => None,
        (OperandKind::Arg, Some(text)) => parse_index(text, "A_").map(Operand::Arg),
        (OperandKind::Local, Some(text)) => {
            parse_index(text, "V_").map(|slot| Operand::Local(LocalSlot(slot)))
        }
        (OperandKind::Method, Some(text)) => text.parse().ok().map(Operand::Method),
        (OperandKind::Int, Some(text)) => {
            let value = match text.strip_prefix("0x") {
                Some(hex) => i64::from_str_radix(hex, 16).ok(),
                None => text.parse().ok(),
            };
            value.map(Operand::Int)
        }
        (OperandKind::Float, Some(text)) => text.parse().ok().map(Operand::Float),
        (OperandKind::Label, Some(text)) => parse_label(text).map(Operand::Label),
    }
}
