use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn splice_cmd() -> Command {
    let mut cmd = Command::cargo_bin("splice").expect("Failed to find splice binary");
    cmd.env_remove("SPLICE_FFMPEG").env_remove("SPLICE_FFPROBE");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    splice_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("compose"))
        .stdout(contains("batch"))
        .stdout(contains("check"));
}

#[test]
fn test_sidebyside_rejects_three_inputs() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let mut args = vec!["compose".to_string(), "--mode".to_string(), "sidebyside".to_string()];
    for name in ["a.mp4", "b.mp4", "c.mp4"] {
        let path = dir.path().join(name);
        std::fs::write(&path, "dummy content")?;
        args.push("-i".to_string());
        args.push(path.display().to_string());
    }
    args.push("-o".to_string());
    args.push(dir.path().join("out.mp4").display().to_string());

    splice_cmd()
        .args(&args)
        .arg("--no-color")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("requires exactly 2 input(s), got 3"));

    assert!(!dir.path().join("out.mp4").exists());
    Ok(())
}

#[test]
fn test_compose_missing_input_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let present = dir.path().join("a.mp4");
    std::fs::write(&present, "dummy content")?;

    splice_cmd()
        .arg("compose")
        .args(["-m", "concat", "-i"])
        .arg(&present)
        .arg("-i")
        .arg(dir.path().join("missing.mp4"))
        .arg("-o")
        .arg(dir.path().join("out.mp4"))
        .assert()
        .failure()
        .stderr(contains("missing.mp4"));
    Ok(())
}

#[test]
fn test_compose_job_conflicts_with_mode() {
    splice_cmd()
        .args(["compose", "--job", "job.json", "--mode", "concat"])
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));
}

#[test]
fn test_batch_transcode_requires_format() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    splice_cmd()
        .args(["batch", "transcode", "clip.avi", "-o"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(contains("--format"));
    Ok(())
}

#[test]
fn test_check_reports_missing_ffmpeg() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    splice_cmd()
        .args(["check", "--no-color", "--ffmpeg", "/nonexistent/ffmpeg"])
        .arg("--log-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .code(1);

    let logs: Vec<_> = std::fs::read_dir(dir.path())?.collect::<Result<_, _>>()?;
    assert_eq!(logs.len(), 1);
    let name = logs[0].file_name().to_string_lossy().into_owned();
    assert!(name.starts_with("splice_check_"));
    Ok(())
}
