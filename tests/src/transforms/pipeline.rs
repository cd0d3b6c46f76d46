use crate::{POPULATE_LEVEL, init_tracing};
use ilsplice_core::{Instruction, InstructionStream, LocalSlot, Opcode, Operand, process_listing};
use ilsplice_transform::pipeline::{PatchResult, patch};
use ilsplice_transform::plan::PatchPlan;
use ilsplice_transform::rewriter::BLOCK_LEN;
use ilsplice_transform::sink::{PatchEvent, RecordingSink, Severity};

fn fixture() -> InstructionStream {
    process_listing(POPULATE_LEVEL).unwrap()
}

/// Checks the splice invariant: prefix identical, tail shifted by `4k`, content unchanged.
fn assert_spliced(
    input: &InstructionStream,
    output: &InstructionStream,
    call_index: usize,
    k: usize,
) {
    let shift = BLOCK_LEN * k;
    assert_eq!(output.len(), input.len() + shift);
    for i in 0..=call_index {
        assert_eq!(output[i], input[i], "prefix differs at {i}");
    }
    for i in call_index + 1..input.len() {
        assert_eq!(output[i + shift], input[i], "tail differs at {i}");
    }
}

#[test]
fn splice_preserves_prefix_and_shifts_tail() {
    init_tracing();
    let input = fixture();
    let report = patch(input.clone(), &PatchPlan::spawn_rate(), &RecordingSink::new());

    assert!(report.result.is_patched());
    assert_spliced(&input, &report.stream, 13, 2);
}

#[test]
fn labels_on_tail_travel_with_their_instruction() {
    let input = fixture();
    let report = patch(input.clone(), &PatchPlan::spawn_rate(), &RecordingSink::new());
    let labelled: Vec<_> = report
        .stream
        .iter()
        .enumerate()
        .filter(|(_, instr)| !instr.labels.is_empty())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(labelled, vec![19 + 8]);
}

#[test]
fn single_target_plan_adds_one_block() {
    let input = fixture();
    let mut plan = PatchPlan::spawn_rate();
    plan.targets.truncate(1);

    let report = patch(input.clone(), &plan, &RecordingSink::new());
    assert_eq!(
        report.result,
        PatchResult::Patched {
            call_index: 13,
            locals: vec![LocalSlot(1)],
            inserted: 4,
        }
    );
    assert_spliced(&input, &report.stream, 13, 1);
}

#[test]
fn missing_call_returns_input_unchanged() {
    let input = process_listing(
        "ldloca.s V_0\ncall StardewValley.Locations.MineShaft::adjustLevelChances/3\nret",
    )
    .unwrap();
    let sink = RecordingSink::new();
    let report = patch(input.clone(), &PatchPlan::spawn_rate(), &sink);

    assert_eq!(report.result, PatchResult::NotFound);
    assert_eq!(report.stream, input);
    assert!(matches!(
        sink.events().as_slice(),
        [(Severity::Error, PatchEvent::NotFound { .. })]
    ));
}

#[test]
fn shape_drift_is_rejected_without_partial_patch() {
    // `stoneChance` now passed by value: the monster anchor still matches, the stone one does not
    let drifted = POPULATE_LEVEL.replace("ldloca.s V_0", "ldloc.s V_0");
    let input = process_listing(&drifted).unwrap();
    let sink = RecordingSink::new();
    let report = patch(input.clone(), &PatchPlan::spawn_rate(), &sink);

    assert_eq!(report.result, PatchResult::ShapeMismatch(9));
    assert_eq!(report.stream, input);
    assert!(matches!(
        sink.events().as_slice(),
        [(Severity::Error, PatchEvent::ShapeMismatch { index: 9, .. })]
    ));
}

#[test]
fn anchor_before_stream_start_is_a_mismatch() {
    let listing = "ldloca.s V_1\nldloca.s V_2\nldloca.s V_3\n\
                   call StardewValley.Locations.MineShaft::adjustLevelChances/4";
    let input = process_listing(listing).unwrap();
    let report = patch(input.clone(), &PatchPlan::spawn_rate(), &RecordingSink::new());

    assert_eq!(report.result, PatchResult::ShapeMismatch(-1));
    assert_eq!(report.stream, input);
}

#[test]
fn anchor_with_non_local_operand_is_a_mismatch() {
    let mut instructions = fixture().into_inner();
    instructions[10] = Instruction::new(Opcode::LdlocaS, Operand::Int(1));
    let input = InstructionStream::new(instructions);

    let report = patch(input.clone(), &PatchPlan::spawn_rate(), &RecordingSink::new());
    assert_eq!(report.result, PatchResult::ShapeMismatch(10));
}

#[test]
fn repatching_keeps_one_call_and_one_splice() {
    let plan = PatchPlan::spawn_rate();
    let once = patch(fixture(), &plan, &RecordingSink::new()).stream;

    let sink = RecordingSink::new();
    let twice = patch(once.clone(), &plan, &sink);

    assert_eq!(twice.result, PatchResult::AlreadyPatched { call_index: 13 });
    assert_eq!(twice.stream, once);
    assert_eq!(twice.stream.count_calls_to(&plan.target), 1);
}

#[test]
fn body_patched_by_a_narrower_plan_is_not_patched_again() {
    let mut monster_only = PatchPlan::spawn_rate();
    monster_only.targets.truncate(1);
    let once = patch(fixture(), &monster_only, &RecordingSink::new());
    assert!(once.result.is_patched());

    let sink = RecordingSink::new();
    let again = patch(once.stream.clone(), &PatchPlan::spawn_rate(), &sink);

    assert_eq!(again.result, PatchResult::AlreadyPatched { call_index: 13 });
    assert_eq!(again.stream, once.stream);
    let mul_blocks = again.stream.iter().filter(|i| i.op == Opcode::Mul).count();
    assert_eq!(mul_blocks, 1);
    assert!(matches!(
        sink.events().as_slice(),
        [(Severity::Error, PatchEvent::AlreadyPatched { call_index: 13, .. })]
    ));
}

#[test]
fn mismatch_on_every_shape_of_anchor_opcode() {
    for replacement in ["nop", "ldloc V_1", "stloc.s V_1", "ldc.r8 1.0", "dup"] {
        let listing = POPULATE_LEVEL.replace("ldloca.s V_1", replacement);
        let input = process_listing(&listing).unwrap();
        let report = patch(input.clone(), &PatchPlan::spawn_rate(), &RecordingSink::new());
        assert_eq!(report.result, PatchResult::ShapeMismatch(10), "{replacement}");
        assert_eq!(report.stream, input);
    }
}
