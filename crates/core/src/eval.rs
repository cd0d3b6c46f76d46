//! Evaluation of IL method bodies over a frame of `f64` locals.
//!
//! Only what is needed to run spliced blocks inside their host body is modeled: local
//! loads/stores, constants, arithmetic, argument and address loads, `br`/`brtrue`/`brfalse`
//! over symbolic labels, and calls dispatched through a [`CallResolver`].

use crate::decoder::{Instruction, Label, LocalSlot, Operand};
use crate::result::{Error, Result};
use crate::signature::MethodSignature;
use crate::Opcode;
use std::collections::HashMap;

/// Upper bound on instructions executed by one [`evaluate`] call.
pub const STEP_LIMIT: usize = 100_000;

/// Value held on the evaluation stack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StackValue {
    /// Numeric value (all IL numeric types collapse to `f64`)
    Number(f64),
    /// Address of a local, from `ldloca`
    Address(LocalSlot),
    /// Opaque method argument, from `ldarg`
    Argument(u16),
}

impl StackValue {
    /// Branch condition: zero is false, references are never null.
    pub fn is_truthy(self) -> bool {
        match self {
            StackValue::Number(value) => value != 0.0,
            StackValue::Address(_) | StackValue::Argument(_) => true,
        }
    }
}

/// Locals and operand stack of one method activation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub locals: Vec<f64>,
    pub stack: Vec<StackValue>,
}

impl Frame {
    pub fn with_locals(locals: Vec<f64>) -> Self {
        Self {
            locals,
            stack: Vec::new(),
        }
    }

    fn local(&self, slot: LocalSlot) -> Result<f64> {
        self.locals
            .get(slot.0 as usize)
            .copied()
            .ok_or(Error::LocalOutOfRange {
                slot: slot.0,
                frame: self.locals.len(),
            })
    }

    /// Writes through to a local slot.
    pub fn store(&mut self, slot: LocalSlot, value: f64) -> Result<()> {
        let frame = self.locals.len();
        let cell = self
            .locals
            .get_mut(slot.0 as usize)
            .ok_or(Error::LocalOutOfRange { slot: slot.0, frame })?;
        *cell = value;
        Ok(())
    }

    fn pop(&mut self, index: usize) -> Result<StackValue> {
        self.stack.pop().ok_or(Error::StackUnderflow(index))
    }

    fn pop_number(&mut self, index: usize) -> Result<f64> {
        match self.pop(index)? {
            StackValue::Number(value) => Ok(value),
            StackValue::Address(_) | StackValue::Argument(_) => Err(Error::TypeMismatch {
                index,
                expected: "number",
            }),
        }
    }
}

/// Resolves `call` instructions during evaluation.
///
/// The resolver pops its arguments from the frame's stack and pushes any return value.
pub trait CallResolver {
    fn call(&mut self, target: &MethodSignature, frame: &mut Frame) -> Result<()>;
}

impl<F> CallResolver for F
where
    F: FnMut(&MethodSignature, &mut Frame) -> Result<()>,
{
    fn call(&mut self, target: &MethodSignature, frame: &mut Frame) -> Result<()> {
        self(target, frame)
    }
}

fn label_targets(instructions: &[Instruction]) -> HashMap<Label, usize> {
    instructions
        .iter()
        .enumerate()
        .flat_map(|(index, ins)| ins.labels.iter().map(move |label| (*label, index)))
        .collect()
}

fn jump(targets: &HashMap<Label, usize>, index: usize, label: Label) -> Result<usize> {
    targets
        .get(&label)
        .copied()
        .ok_or(Error::UnresolvedLabel { index, label: label.0 })
}

/// Runs `instructions` against `frame` from the first instruction until a `ret` or the end of
/// the run.
pub fn evaluate<R>(instructions: &[Instruction], frame: &mut Frame, resolver: &mut R) -> Result<()>
where
    R: CallResolver + ?Sized,
{
    let targets = label_targets(instructions);
    let mut pc = 0;
    let mut steps = 0;

    while let Some(ins) = instructions.get(pc) {
        steps += 1;
        if steps > STEP_LIMIT {
            return Err(Error::StepLimit(STEP_LIMIT));
        }
        let index = pc;
        pc += 1;

        match (ins.op, &ins.operand) {
            (Opcode::Nop, _) => {}
            (Opcode::Ret, _) => return Ok(()),
            (op, Operand::Local(slot)) if op.is_local_load() => {
                let value = frame.local(*slot)?;
                frame.stack.push(StackValue::Number(value));
            }
            (op, Operand::Local(slot)) if op.is_local_store() => {
                let value = frame.pop_number(index)?;
                frame.store(*slot, value)?;
            }
            (op, Operand::Local(slot)) if op.is_local_address_load() => {
                // bounds are checked when the address is dereferenced
                frame.stack.push(StackValue::Address(*slot));
            }
            (Opcode::Ldarg, Operand::Arg(arg)) => frame.stack.push(StackValue::Argument(*arg)),
            (Opcode::LdcR8, Operand::Float(value)) => frame.stack.push(StackValue::Number(*value)),
            (Opcode::LdcI4, Operand::Int(value)) => {
                frame.stack.push(StackValue::Number(*value as f64))
            }
            (Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div, _) => {
                let rhs = frame.pop_number(index)?;
                let lhs = frame.pop_number(index)?;
                let result = match ins.op {
                    Opcode::Add => lhs + rhs,
                    Opcode::Sub => lhs - rhs,
                    Opcode::Mul => lhs * rhs,
                    _ => lhs / rhs,
                };
                frame.stack.push(StackValue::Number(result));
            }
            (Opcode::Pop, _) => {
                frame.pop(index)?;
            }
            (Opcode::Dup, _) => {
                let top = frame.pop(index)?;
                frame.stack.extend([top, top]);
            }
            (Opcode::Br, Operand::Label(label)) => pc = jump(&targets, index, *label)?,
            (Opcode::Brtrue | Opcode::Brfalse, Operand::Label(label)) => {
                let condition = frame.pop(index)?.is_truthy();
                if condition == (ins.op == Opcode::Brtrue) {
                    pc = jump(&targets, index, *label)?;
                }
            }
            (op, Operand::Method(target)) if op.is_call() => {
                tracing::trace!("evaluating call to {} at {}", target, index);
                resolver.call(target, frame)?;
            }
            (op, _) => return Err(Error::UnsupportedOpcode(format!("{op} at {index}"))),
        }
    }
    Ok(())
}
