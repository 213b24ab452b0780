//! Integration tests for archive-tools-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

/// A source tree under `base/` plus a separate directory for archives.
struct Fixture {
    src: TempDir,
    out: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let src = TempDir::new().expect("failed to create temp dir");
        let base = src.path().join("base");
        fs::create_dir_all(base.join("data/tmp")).unwrap();
        fs::write(base.join("msg.txt"), "Hello world!\n").unwrap();
        fs::write(base.join("data/rnd.dat"), vec![7u8; 4096]).unwrap();
        fs::write(base.join("data/tmp/scratch"), "scratch").unwrap();
        Self {
            src,
            out: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn archive(&self, name: &str) -> PathBuf {
        self.out.path().join(name)
    }

    /// Command running in the source tree.
    fn cmd(&self) -> Command {
        let mut cmd = archive_tool_cmd();
        cmd.current_dir(self.src.path());
        cmd
    }

    fn create(&self, name: &str, extra: &[&str]) -> PathBuf {
        let archive = self.archive(name);
        self.cmd()
            .arg("create")
            .arg(&archive)
            .arg("base")
            .args(extra)
            .assert()
            .success();
        archive
    }
}

fn archive_tool_cmd() -> Command {
    cargo_bin_cmd!("archive-tool")
}

fn json_of(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("invalid JSON output")
}

fn magic(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap()[..4].to_vec()
}

#[test]
fn test_version_flag() {
    archive_tool_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("archive-tool"));
}

#[test]
fn test_help_lists_commands() {
    archive_tool_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("verify"))
        .stdout(predicate::str::contains("info"));
}

#[test]
fn test_create_help() {
    archive_tool_cmd()
        .arg("create")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--basedir"))
        .stdout(predicate::str::contains("--exclude"));
}

// ============================================================================
// Create
// ============================================================================

#[test]
fn test_create_then_verify() {
    let f = Fixture::new();
    let archive = f.archive("base.tar.gz");

    f.cmd()
        .arg("create")
        .arg(&archive)
        .arg("base")
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive created"));
    assert!(archive.exists());

    archive_tool_cmd()
        .arg("verify")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive verified"));
}

#[test]
fn test_create_json_output() {
    let f = Fixture::new();
    let archive = f.archive("base.tar");

    let output = f
        .cmd()
        .arg("--json")
        .arg("create")
        .arg(&archive)
        .arg("base")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = json_of(&output);
    assert_eq!(json["status"], "success");
    assert_eq!(json["operation"], "create");
    assert_eq!(json["data"]["files_added"], 3);
    assert_eq!(json["data"]["directories_added"], 3);
    assert_eq!(json["data"]["bytes_read"], 13 + 4096 + 7);
}

#[test]
fn test_create_quiet_mode() {
    let f = Fixture::new();
    f.cmd()
        .arg("--quiet")
        .arg("create")
        .arg(f.archive("base.tar"))
        .arg("base")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_codec_inferred_from_extension() {
    let f = Fixture::new();
    let zst = f.create("base.tar.zst", &[]);
    assert_eq!(magic(&zst), [0x28, 0xb5, 0x2f, 0xfd]);

    let bz2 = f.create("base.tar.bz2", &[]);
    assert_eq!(&magic(&bz2)[..3], b"BZh");

    let unknown = f.create("base.backup", &[]);
    assert_eq!(&magic(&unknown)[..2], [0x1f, 0x8b]);
}

#[test]
fn test_explicit_compression_overrides_extension() {
    let f = Fixture::new();
    let archive = f.create("base.tar.gz", &["--compression", "none"]);
    assert_ne!(&magic(&archive)[..2], [0x1f, 0x8b]);
    // plain tar: the first member name is stored verbatim
    assert!(fs::read(&archive).unwrap().starts_with(b"base/.manifest.toml"));
}

#[test]
fn test_create_compression_level() {
    let f = Fixture::new();
    for level in ["1", "9"] {
        let archive = f.create(&format!("base-{level}.tar.xz"), &["--level", level]);
        archive_tool_cmd()
            .arg("verify")
            .arg(&archive)
            .assert()
            .success();
    }
}

#[test]
fn test_create_invalid_compression_level() {
    let f = Fixture::new();
    f.cmd()
        .arg("create")
        .arg(f.archive("base.tar"))
        .arg("base")
        .arg("--level")
        .arg("10")
        .assert()
        .failure();
}

#[test]
fn test_create_exclude() {
    let f = Fixture::new();
    let archive = f.create("base.tar", &["--exclude", "base/data/tmp"]);

    archive_tool_cmd()
        .arg("list")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("base/data/rnd.dat"))
        .stdout(predicate::str::contains("base/data/tmp").not());
}

#[test]
fn test_create_unused_exclude_warns() {
    let f = Fixture::new();
    f.cmd()
        .arg("create")
        .arg(f.archive("base.tar"))
        .arg("base")
        .arg("-x")
        .arg("base/nope")
        .assert()
        .success()
        .stdout(predicate::str::contains("Warnings:"))
        .stdout(predicate::str::contains("base/nope"));
}

#[test]
fn test_create_with_basedir() {
    let f = Fixture::new();
    let archive = f.archive("x.tar");
    f.cmd()
        .arg("create")
        .arg(&archive)
        .arg("base/msg.txt")
        .arg("base/data")
        .arg("--basedir")
        .arg("base")
        .assert()
        .success();

    archive_tool_cmd()
        .arg("list")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("base/msg.txt"));
}

#[test]
fn test_create_checksums_and_comment() {
    let f = Fixture::new();
    let archive = f.create(
        "base.tar",
        &[
            "--checksum",
            "sha512",
            "--checksum",
            "blake3",
            "--comment",
            "nightly",
        ],
    );

    let output = archive_tool_cmd()
        .arg("--json")
        .arg("list")
        .arg("--long")
        .arg(&archive)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json = json_of(&output);
    assert_eq!(
        json["data"]["checksums"],
        serde_json::json!(["sha512", "blake3"])
    );

    let bytes = fs::read(&archive).unwrap();
    assert!(bytes.windows(9).any(|w| w == b"# nightly"));
}

// ============================================================================
// Create errors
// ============================================================================

#[test]
fn test_create_existing_archive() {
    let f = Fixture::new();
    let archive = f.archive("base.tar");
    fs::write(&archive, "precious").unwrap();

    f.cmd()
        .arg("create")
        .arg(&archive)
        .arg("base")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"))
        .stderr(predicate::str::contains("HINT"));
    assert_eq!(fs::read_to_string(&archive).unwrap(), "precious");
}

#[test]
fn test_create_mixed_paths() {
    let f = Fixture::new();
    let archive = f.archive("base.tar");
    f.cmd()
        .arg("create")
        .arg(&archive)
        .arg("base/msg.txt")
        .arg(f.src.path().join("base/data"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("absolute and relative"));
    assert!(!archive.exists());
}

#[test]
fn test_create_nonexistent_source() {
    let f = Fixture::new();
    f.cmd()
        .arg("create")
        .arg(f.archive("base.tar"))
        .arg("base/nope.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Source not found"));
}

#[test]
fn test_create_unnormalized_path() {
    let f = Fixture::new();
    f.cmd()
        .arg("create")
        .arg(f.archive("base.tar"))
        .arg("base/../base")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid path"));
}

#[test]
fn test_create_no_sources() {
    let f = Fixture::new();
    f.cmd()
        .arg("create")
        .arg(f.archive("base.tar"))
        .assert()
        .failure();
}

#[test]
fn test_create_error_json() {
    let f = Fixture::new();
    let output = f
        .cmd()
        .arg("--json")
        .arg("create")
        .arg(f.archive("base.tar"))
        .arg("base/nope.txt")
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let json = json_of(&output);
    assert_eq!(json["status"], "error");
    assert!(json["error"].as_str().unwrap().contains("nope.txt"));
}

// ============================================================================
// Verify, list, info
// ============================================================================

#[test]
fn test_verify_detects_tampering() {
    let f = Fixture::new();
    let archive = f.create("base.tar", &[]);

    let mut bytes = fs::read(&archive).unwrap();
    let at = bytes
        .windows(12)
        .position(|w| w == b"Hello world!")
        .unwrap();
    bytes[at..at + 5].copy_from_slice(b"HELLO");
    fs::write(&archive, bytes).unwrap();

    archive_tool_cmd()
        .arg("verify")
        .arg(&archive)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Verification failed"))
        .stderr(predicate::str::contains("base/msg.txt"));
}

#[test]
fn test_verify_json_output() {
    let f = Fixture::new();
    let archive = f.create("base.tar.gz", &[]);

    let output = archive_tool_cmd()
        .arg("verify")
        .arg("--json")
        .arg(&archive)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json = json_of(&output);
    assert_eq!(json["operation"], "verify");
    assert_eq!(json["data"]["members_checked"], 6);
    assert_eq!(json["data"]["files_checked"], 3);
}

#[test]
fn test_verify_not_an_archive() {
    let f = Fixture::new();
    let path = f.archive("garbage.tar");
    fs::write(&path, "not a tar file at all").unwrap();

    archive_tool_cmd()
        .arg("verify")
        .arg(&path)
        .assert()
        .failure();
}

#[test]
fn test_list_long() {
    let f = Fixture::new();
    let archive = f.create("base.tar", &[]);

    archive_tool_cmd()
        .arg("list")
        .arg("--long")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?m)^d\d{4} .* base$").unwrap())
        .stdout(predicate::str::is_match(r"(?m)^-\d{4} +13 .* base/msg\.txt$").unwrap())
        .stdout(predicate::str::contains("Total: 6 entries"));
}

#[test]
fn test_list_json() {
    let f = Fixture::new();
    let archive = f.create("base.tar", &[]);

    let output = archive_tool_cmd()
        .arg("--json")
        .arg("list")
        .arg(&archive)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json = json_of(&output);
    let paths = json["data"].as_array().unwrap();
    assert_eq!(paths.len(), 6);
    assert_eq!(paths[0], "base");
}

#[test]
fn test_info_file_entry() {
    let f = Fixture::new();
    let archive = f.create("base.tar", &[]);

    archive_tool_cmd()
        .arg("info")
        .arg(&archive)
        .arg("base/msg.txt")
        .assert()
        .success()
        .stdout(predicate::str::contains("Type:   file"))
        .stdout(predicate::str::contains("Size:   13"))
        .stdout(predicate::str::contains(
            "sha256: 0ba904eae8773b70c75333db4de2f3ac45a8ad4ddba1b242f0b3cfc199391dd8",
        ));
}

#[test]
fn test_info_unknown_entry() {
    let f = Fixture::new();
    let archive = f.create("base.tar", &[]);

    archive_tool_cmd()
        .arg("info")
        .arg(&archive)
        .arg("base/missing")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not listed in the manifest"));
}

#[cfg(unix)]
#[test]
fn test_info_symlink_entry() {
    let f = Fixture::new();
    std::os::unix::fs::symlink("msg.txt", f.src.path().join("base/link")).unwrap();
    let archive = f.create("base.tar", &[]);

    let output = archive_tool_cmd()
        .arg("--json")
        .arg("info")
        .arg(&archive)
        .arg("base/link")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json = json_of(&output);
    assert_eq!(json["data"]["type"], "symlink");
    assert_eq!(json["data"]["target"], "msg.txt");
}

#[test]
fn test_completion_bash() {
    archive_tool_cmd()
        .arg("completion")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("archive-tool"));
}

#[test]
fn test_verbose_conflicts_with_quiet() {
    archive_tool_cmd()
        .args(["--verbose", "--quiet", "verify", "x.tar"])
        .assert()
        .failure();
}
