//! Ordered, index-addressable instruction sequence for one method body.

use crate::decoder::Instruction;
use crate::result::{Error, Result};
use crate::signature::MethodSignature;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// A method body as an ordered sequence of instructions.
///
/// Indices are contiguous and 0-based. Instructions are held by value and cannot be edited in
/// place; the only mutation is [`InstructionStream::insert_range`], which shifts every later
/// index by the length of the inserted run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstructionStream {
    instructions: Vec<Instruction>,
}

impl InstructionStream {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    pub fn as_slice(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_inner(self) -> Vec<Instruction> {
        self.instructions
    }

    /// Splices `run` in so that its first instruction lands at `at`.
    ///
    /// `at == len()` appends. Anything past the end is rejected without touching the stream.
    pub fn insert_range<I>(&mut self, at: usize, run: I) -> Result<usize>
    where
        I: IntoIterator<Item = Instruction>,
    {
        if at > self.instructions.len() {
            return Err(Error::InsertOutOfBounds {
                index: at,
                len: self.instructions.len(),
            });
        }
        let before = self.instructions.len();
        let tail = self.instructions.split_off(at);
        self.instructions.extend(run);
        self.instructions.extend(tail);
        Ok(self.instructions.len() - before)
    }

    /// Number of call instructions targeting `signature`.
    pub fn count_calls_to(&self, signature: &MethodSignature) -> usize {
        self.instructions
            .iter()
            .filter(|instr| instr.call_target() == Some(signature))
            .count()
    }
}

impl Index<usize> for InstructionStream {
    type Output = Instruction;

    fn index(&self, index: usize) -> &Self::Output {
        &self.instructions[index]
    }
}

impl From<Vec<Instruction>> for InstructionStream {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self::new(instructions)
    }
}

impl FromIterator<Instruction> for InstructionStream {
    fn from_iter<T: IntoIterator<Item = Instruction>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a InstructionStream {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}
