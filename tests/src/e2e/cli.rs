use crate::POPULATE_LEVEL;
use ilsplice_cli::commands::Command;
use ilsplice_cli::commands::decode::DecodeArgs;
use ilsplice_cli::commands::patch::PatchArgs;
use ilsplice_cli::commands::simulate::SimulateArgs;
use ilsplice_core::read_listing;
use std::fs;
use std::path::PathBuf;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ilsplice-{}-{name}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn args(dir: &PathBuf, input: &PathBuf, strict: bool) -> PatchArgs {
    PatchArgs {
        input: input.clone(),
        plan: None,
        output: Some(dir.join("out.il")),
        emit: Some(dir.join("report.json")),
        indices: true,
        strict,
    }
}

#[tokio::test]
async fn patch_command_writes_listing_and_report() {
    let dir = scratch("patch");
    let input = dir.join("populate_level.il");
    fs::write(&input, POPULATE_LEVEL).unwrap();

    args(&dir, &input, true).execute().await.unwrap();

    let patched = read_listing(&dir.join("out.il")).unwrap();
    assert_eq!(patched.len(), 30);

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["input_len"], 22);
    assert_eq!(report["output_len"], 30);
    assert_eq!(report["outcome"]["result"], "patched");
    assert_eq!(report["outcome"]["detail"]["call_index"], 13);
}

#[tokio::test]
async fn strict_patch_fails_on_shape_mismatch_but_still_writes_original() {
    let dir = scratch("strict");
    let input = dir.join("drifted.il");
    fs::write(&input, POPULATE_LEVEL.replace("ldloca.s V_1", "nop")).unwrap();

    let err = args(&dir, &input, true).execute().await.unwrap_err();
    assert!(err.to_string().contains("not patched"));

    let written = read_listing(&dir.join("out.il")).unwrap();
    assert_eq!(written, read_listing(&input).unwrap());

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["outcome"]["result"], "shape_mismatch");
    assert_eq!(report["outcome"]["detail"], 10);
}

#[tokio::test]
async fn decode_command_accepts_fixture_and_rejects_garbage() {
    let dir = scratch("decode");
    let input = dir.join("populate_level.il");
    fs::write(&input, POPULATE_LEVEL).unwrap();
    DecodeArgs { input }.execute().await.unwrap();

    let garbage = dir.join("garbage.il");
    fs::write(&garbage, "ldloca.s V_0\nfrobnicate V_1\n").unwrap();
    let err = DecodeArgs { input: garbage }.execute().await.unwrap_err();
    assert!(err.to_string().contains("line 2"));

    let missing = DecodeArgs {
        input: dir.join("missing.il"),
    };
    assert!(missing.execute().await.is_err());
}

fn simulate_args(input: PathBuf, factor: f64) -> SimulateArgs {
    SimulateArgs {
        input,
        plan: None,
        locals: vec![0.02, 0.0005, 0.01, 0.001, 0.0],
        factor,
        no_secondary: false,
        static_target: false,
    }
}

#[tokio::test]
async fn simulate_command_runs_the_whole_fixture() {
    let dir = scratch("simulate");
    let input = dir.join("populate_level.il");
    fs::write(&input, POPULATE_LEVEL).unwrap();

    let report = simulate_args(input.clone(), 2.0).simulate().unwrap();
    assert!(report.outcome.is_patched());
    assert_eq!(report.factor_calls, 2);
    // V_1 scaled up, V_0 scaled down, branch past the V_4 store taken
    assert_eq!(report.locals, vec![0.01, 0.001, 0.01, 0.001, 0.0]);

    simulate_args(input, 2.0).execute().await.unwrap();
}

#[tokio::test]
async fn simulate_command_honours_secondary_toggle_and_static_target() {
    let dir = scratch("simulate-flags");
    let input = dir.join("populate_level.il");
    fs::write(&input, POPULATE_LEVEL).unwrap();

    let mut args = simulate_args(input.clone(), 4.0);
    args.no_secondary = true;
    let report = args.simulate().unwrap();
    assert_eq!(report.locals[0], 0.02);
    assert_eq!(report.locals[1], 0.002);

    // a static stub leaves the receiver on the stack, which the body never consumes
    let mut args = simulate_args(input, 1.0);
    args.static_target = true;
    let report = args.simulate().unwrap();
    assert_eq!(report.locals[1], 0.0005);
}
