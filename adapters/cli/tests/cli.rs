use std::{
    path::PathBuf,
    process::{Command, Output},
};

fn level(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("levels")
        .join(name)
}

fn gem_cascade(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gem-cascade"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch gem-cascade")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf-8 stdout")
}

#[test]
fn scripted_opening_wins_the_frozen_yard() {
    let path = level("frozen_yard.toml");
    let output = gem_cascade(&["--level", path.to_str().expect("utf-8 path")]);
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    assert!(text.starts_with("1  3  4  2  4  0\n"), "{text}");
    assert!(text.contains("#1 swap (2, 2) -> (3, 2)"));
    assert!(text.contains("bonus phase"));
    let last = text.lines().last().expect("final line");
    assert!(last.starts_with("final: "), "{last}");
    assert!(last.contains("| won"), "{last}");
    assert!(last.contains("wood=0 lock=0 ice=0"), "{last}");
}

#[test]
fn replays_are_reproducible() {
    let path = level("jelly_spread.toml");
    let args = [
        "--level",
        path.to_str().expect("utf-8 path"),
        "--autoplay",
        "6",
        "--boards",
    ];
    let first = gem_cascade(&args);
    let second = gem_cascade(&args);
    assert!(first.status.success(), "{first:?}");
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn seed_override_changes_the_board() {
    let path = level("open_field.toml");
    let path = path.to_str().expect("utf-8 path");
    let original = stdout(&gem_cascade(&["--level", path]));
    let reseeded = stdout(&gem_cascade(&["--level", path, "--seed", "7"]));
    assert_ne!(original, reseeded);
    assert_eq!(original.lines().count(), reseeded.lines().count());
}

#[test]
fn missing_level_file_is_an_error() {
    let output = gem_cascade(&["--level", "does/not/exist.toml"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read level file"), "{stderr}");
}
