use std::process::{Command, Stdio};

const BIN: &str = env!("CARGO_BIN_EXE_ply2raw");

const TRIANGLE_PLY: &str = "ply\n\
format ascii 1.0\n\
element vertex 3\n\
property float x\n\
property float y\n\
property float z\n\
element face 1\n\
property list uchar int vertex_indices\n\
end_header\n\
0 0 0\n\
1 0 0\n\
0 1 0\n\
3 0 1 2\n";

#[test]
fn converts_file_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("triangle.ply");
    let output = dir.path().join("triangle.raw");
    std::fs::write(&input, TRIANGLE_PLY).unwrap();

    let status = Command::new(BIN)
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(
        "0 0 0 1 0 0 0 1 0\n",
        std::fs::read_to_string(&output).unwrap()
    );
}

#[test]
fn converts_stdin_to_stdout() {
    use std::io::Write;

    let mut child = Command::new(BIN)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(TRIANGLE_PLY.as_bytes())
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    assert_eq!("0 0 0 1 0 0 0 1 0\n", String::from_utf8(out.stdout).unwrap());
}

#[test]
fn help_exits_successfully() {
    let out = Command::new(BIN)
        .arg("--help")
        .stdout(Stdio::piped())
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    assert!(text.contains("vertex_indices"));
}

#[test]
fn version_exits_successfully() {
    for flag in ["--version", "-v"] {
        let out = Command::new(BIN)
            .arg(flag)
            .stdout(Stdio::piped())
            .output()
            .unwrap();
        assert!(out.status.success());
        assert!(String::from_utf8(out.stdout).unwrap().contains("ply2raw"));
    }
}

#[test]
fn skipped_element_warning_is_visible_by_default() {
    use std::io::Write;

    let input = "ply\n\
format ascii 1.0\n\
element vertex 3\n\
property float x\n\
property float y\n\
property float z\n\
element edge 1\n\
property int v1\n\
property int v2\n\
element face 1\n\
property list uchar int vertex_indices\n\
end_header\n\
0 0 0\n\
1 0 0\n\
0 1 0\n\
0 1\n\
3 0 1 2\n";

    let mut child = Command::new(BIN)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("ignoring element 'edge'"), "{stderr}");
}

#[test]
fn missing_input_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let status = Command::new(BIN)
        .arg(dir.path().join("does-not-exist.ply"))
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn invalid_input_fails_with_nonzero_status() {
    use std::io::Write;

    let mut child = Command::new(BIN)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(b"not a ply file\n")
        .unwrap();
    assert!(!child.wait().unwrap().success());
}

#[test]
fn unknown_option_fails() {
    let status = Command::new(BIN)
        .arg("--frobnicate")
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert!(!status.success());
}
