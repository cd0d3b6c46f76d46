use crate::Result;
use crate::Transform;
use ilsplice_core::InstructionStream;
use tracing::info;

/// Trait for running a sequence of transforms on one method body.
pub trait Pass {
    fn run(&self, stream: &mut InstructionStream, passes: &[Box<dyn Transform>]) -> Result<()>;
}

/// Default implementation of the Pass trait.
///
/// Each transform works on a snapshot that is committed only when it reports a change.
pub struct DefaultPass;

impl Pass for DefaultPass {
    fn run(&self, stream: &mut InstructionStream, passes: &[Box<dyn Transform>]) -> Result<()> {
        for pass in passes {
            let before = stream.len();
            let mut snapshot = stream.clone();

            let mutated = pass.apply(&mut snapshot)?;
            if !mutated {
                continue;
            }

            let delta = snapshot.len() as isize - before as isize;
            info!("{:>14} Δ{:+} instructions", pass.name(), delta);
            *stream = snapshot;
        }
        Ok(())
    }
}
