//! Runs patched method bodies in the evaluator.
//!
//! Calls to the factor accessors go to a [`FactorProvider`]; calls to stubbed host methods pop
//! their arguments (and the receiver, for instance methods) and return nothing. Any other call
//! is unresolved.

use crate::factor::{FactorProvider, FactorSource};
use ilsplice_core::eval::{CallResolver, Frame, StackValue, evaluate};
use ilsplice_core::result::{Error, Result};
use ilsplice_core::{InstructionStream, MethodSignature};

/// [`CallResolver`] for spliced bodies.
pub struct FactorResolver {
    provider: FactorProvider,
    /// Stubbed signatures with the number of stack values each call consumes
    stubs: Vec<(MethodSignature, usize)>,
    /// Number of factor reads so far
    pub factor_calls: usize,
}

impl FactorResolver {
    pub fn new(provider: FactorProvider) -> Self {
        Self {
            provider,
            stubs: Vec::new(),
            factor_calls: 0,
        }
    }

    /// Treat calls to the static method `signature` as argument-consuming no-ops.
    pub fn stub(mut self, signature: MethodSignature) -> Self {
        let consumed = signature.arity as usize;
        self.stubs.push((signature, consumed));
        self
    }

    /// Like [`FactorResolver::stub`], for an instance method whose receiver sits below its
    /// arguments.
    pub fn stub_instance(mut self, signature: MethodSignature) -> Self {
        let consumed = signature.arity as usize + 1;
        self.stubs.push((signature, consumed));
        self
    }
}

impl CallResolver for FactorResolver {
    fn call(&mut self, target: &MethodSignature, frame: &mut Frame) -> Result<()> {
        if let Some(source) = FactorSource::from_signature(target) {
            self.factor_calls += 1;
            frame
                .stack
                .push(StackValue::Number(self.provider.evaluate(source)));
            return Ok(());
        }

        if let Some((_, consumed)) = self.stubs.iter().find(|(sig, _)| sig == target) {
            for _ in 0..*consumed {
                frame.stack.pop().ok_or(Error::StackUnderflow(0))?;
            }
            return Ok(());
        }

        Err(Error::UnresolvedCall(target.to_string()))
    }
}

/// Evaluates a whole stream against `locals` and returns the final frame.
pub fn run(
    stream: &InstructionStream,
    locals: Vec<f64>,
    resolver: &mut FactorResolver,
) -> Result<Frame> {
    let mut frame = Frame::with_locals(locals);
    evaluate(stream.as_slice(), &mut frame, resolver)?;
    Ok(frame)
}
