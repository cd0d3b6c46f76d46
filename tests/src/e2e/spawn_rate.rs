use crate::{POPULATE_LEVEL, init_tracing};
use ilsplice_core::{LocalSlot, Opcode, process_listing};
use ilsplice_transform::cost::{CostSettings, Offer};
use ilsplice_transform::factor::{FactorConfig, FactorProvider, FactorSettings, FactorSource};
use ilsplice_transform::pipeline::{PatchResult, patch};
use ilsplice_transform::plan::PatchPlan;
use ilsplice_transform::simulate::{FactorResolver, run};
use ilsplice_transform::sink::{PatchEvent, RecordingSink, Severity};
use std::sync::Arc;

const SCENARIO: &str = "
ldc.r8 3.0
stloc.s V_0
ldc.r8 5.0
stloc.s V_1
ldloca.s V_0
ldloca.s V_1
ldloca.s V_2
ldloca.s V_3
call StardewValley.Locations.MineShaft::adjustLevelChances/4
ret
";

fn resolver(factor: f64, apply_secondary: bool) -> (FactorResolver, Arc<FactorConfig>) {
    let config = FactorConfig::shared(FactorSettings {
        current_factor: factor,
        apply_secondary,
    });
    let resolver = FactorResolver::new(FactorProvider::new(Arc::clone(&config)))
        .stub(PatchPlan::spawn_rate().target);
    (resolver, config)
}

#[test]
fn monster_block_then_stone_block_after_call() {
    init_tracing();
    let input = process_listing(SCENARIO).unwrap();
    let sink = RecordingSink::new();
    let report = patch(input.clone(), &PatchPlan::spawn_rate(), &sink);

    assert_eq!(
        report.result,
        PatchResult::Patched {
            call_index: 8,
            locals: vec![LocalSlot(1), LocalSlot(0)],
            inserted: 8,
        }
    );
    let out = &report.stream;
    assert_eq!(out.len(), input.len() + 8);

    let ops: Vec<_> = out.iter().skip(9).take(8).map(|i| i.op).collect();
    assert_eq!(
        ops,
        vec![
            Opcode::LdlocS,
            Opcode::Call,
            Opcode::Mul,
            Opcode::StlocS,
            Opcode::LdlocS,
            Opcode::Call,
            Opcode::Div,
            Opcode::StlocS,
        ]
    );
    assert_eq!(out[9].local_slot(), Some(LocalSlot(1)));
    assert_eq!(out[10].call_target(), Some(&FactorSource::Primary.signature()));
    assert_eq!(out[13].local_slot(), Some(LocalSlot(0)));
    assert_eq!(out[14].call_target(), Some(&FactorSource::Secondary.signature()));
    assert_eq!(out[out.len() - 1].op, Opcode::Ret);

    assert_eq!(
        sink.events(),
        vec![(
            Severity::Info,
            PatchEvent::Patched {
                method: "StardewValley.Locations.MineShaft::populateLevel".into(),
                locals: vec![
                    ("monsterChance".into(), LocalSlot(1)),
                    ("stoneChance".into(), LocalSlot(0)),
                ],
            }
        )]
    );
}

#[test]
fn patched_body_scales_monster_and_keeps_stone_when_toggle_off() {
    let report = patch(
        process_listing(SCENARIO).unwrap(),
        &PatchPlan::spawn_rate(),
        &RecordingSink::new(),
    );
    let (mut resolver, _) = resolver(2.0, false);
    let frame = run(&report.stream, vec![0.0; 4], &mut resolver).unwrap();

    assert_eq!(frame.locals[1], 10.0);
    assert_eq!(frame.locals[0], 3.0);
    assert_eq!(resolver.factor_calls, 2);
    assert!(frame.stack.is_empty());
}

#[test]
fn patched_body_divides_stone_when_toggle_on() {
    let report = patch(
        process_listing(SCENARIO).unwrap(),
        &PatchPlan::spawn_rate(),
        &RecordingSink::new(),
    );
    let (mut resolver, _) = resolver(2.0, true);
    let frame = run(&report.stream, vec![0.0; 4], &mut resolver).unwrap();

    assert_eq!(frame.locals[1], 10.0);
    assert_eq!(frame.locals[0], 1.5);
}

#[test]
fn factor_is_read_at_invocation_time() {
    let report = patch(
        process_listing(SCENARIO).unwrap(),
        &PatchPlan::spawn_rate(),
        &RecordingSink::new(),
    );
    let (mut resolver, config) = resolver(2.0, false);

    let first = run(&report.stream, vec![0.0; 4], &mut resolver).unwrap();
    config.set_factor(4.0);
    let second = run(&report.stream, vec![0.0; 4], &mut resolver).unwrap();
    config.set_factor(-1.0);
    let third = run(&report.stream, vec![0.0; 4], &mut resolver).unwrap();
    config.reset();
    let fourth = run(&report.stream, vec![0.0; 4], &mut resolver).unwrap();

    assert_eq!(first.locals[1], 10.0);
    assert_eq!(second.locals[1], 20.0);
    assert_eq!(third.locals[1], 5.0);
    assert_eq!(fourth.locals[1], 5.0);
    assert_eq!(resolver.factor_calls, 8);
}

#[test]
fn spliced_region_of_fixture_scales_in_place() {
    let report = patch(
        process_listing(POPULATE_LEVEL).unwrap(),
        &PatchPlan::spawn_rate(),
        &RecordingSink::new(),
    );
    let spliced: ilsplice_core::InstructionStream =
        report.stream.iter().skip(14).take(8).cloned().collect();
    let (mut resolver, _) = resolver(3.0, true);
    let frame = run(&spliced, vec![0.5, 0.25, 0.0, 0.0, 0.0], &mut resolver).unwrap();

    assert_eq!(frame.locals[1], 0.75);
    assert_eq!(frame.locals[0], 0.5 / 3.0);
}

#[test]
fn purchased_factor_reaches_the_spliced_blocks() {
    let report = patch(
        process_listing(SCENARIO).unwrap(),
        &PatchPlan::spawn_rate(),
        &RecordingSink::new(),
    );
    let (mut resolver, config) = resolver(1.0, false);

    let offer = CostSettings::default().offer(&config, 3.0, 100, 0);
    assert!(matches!(offer, Offer::Insufficient { .. }));
    let frame = run(&report.stream, vec![0.0; 4], &mut resolver).unwrap();
    assert_eq!(frame.locals[1], 5.0);

    let offer = CostSettings::default().offer(&config, 3.0, 10_000, 0);
    assert!(matches!(offer, Offer::Accepted { .. }));
    let frame = run(&report.stream, vec![0.0; 4], &mut resolver).unwrap();
    assert_eq!(frame.locals[1], 15.0);
}
