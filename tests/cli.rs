use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mcb"))
}

/// Fresh scratch directory under the system temp dir.
fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mcb-cli-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

const TWO_TRIANGLES: &str = "% two triangles sharing edge 2-3\n4 5\n1 2 1\n2 3 1\n3 1 1\n2 4 1\n4 3 1\n";

#[test]
fn missing_arguments_print_usage_and_exit_1() {
    let out = bin().output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Usage"), "{stdout}");
}

#[test]
fn stats_mode_appends_one_line_per_run() {
    let dir = scratch("stats");
    let input = dir.join("g.txt");
    let output = dir.join("stats.txt");
    fs::write(&input, TWO_TRIANGLES).unwrap();

    for _ in 0..2 {
        let status = bin().arg(&input).arg(&output).arg("2").status().unwrap();
        assert!(status.success());
    }
    let text = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    let fields: Vec<&str> = lines[0].split_whitespace().collect();
    assert_eq!(fields.len(), 10);
    // final cycles, total weight
    assert_eq!(fields[3], "2");
    assert_eq!(fields[4], "6");
}

#[test]
fn basis_mode_lists_one_indexed_edges() {
    let dir = scratch("basis");
    let input = dir.join("g.txt");
    let output = dir.join("basis.txt");
    fs::write(&input, TWO_TRIANGLES).unwrap();

    let status = bin()
        .arg(&input)
        .arg(&output)
        .args(["--mode", "basis"])
        .status()
        .unwrap();
    assert!(status.success());
    let text = fs::read_to_string(&output).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("2 6"));
    let mut cycles: Vec<&str> = lines.collect();
    cycles.sort_unstable();
    assert_eq!(cycles, vec!["3 3 1 2 3", "3 3 2 4 5"]);
}

#[test]
fn reduced_mode_writes_matrix_market() {
    let dir = scratch("reduced");
    let input = dir.join("g.txt");
    let output = dir.join("reduced.mtx");
    fs::write(&input, "4 4\n1 2 1\n2 3 1\n3 4 1\n4 1 1\n").unwrap();

    let status = bin()
        .arg(&input)
        .arg(&output)
        .args(["--mode", "reduced"])
        .status()
        .unwrap();
    assert!(status.success());
    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("%%MatrixMarket matrix coordinate integer symmetric"));
    assert!(text.lines().any(|l| l.split_whitespace().collect::<Vec<_>>() == ["1", "1", "4"]));
}

#[test]
fn unreadable_input_exits_2() {
    let dir = scratch("missing");
    let out = bin()
        .arg(dir.join("nope.txt"))
        .arg(dir.join("out.txt"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("nope.txt"));
}
