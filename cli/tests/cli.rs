use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn fixture(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (path, content) in files {
        let full = tmp.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }
    tmp
}

fn gpt_copy(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gpt-copy").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("GPT_COPY_ROOT")
        .arg(root)
        .arg("--no-config");
    cmd
}

#[test]
fn test_help_flag() {
    Command::cargo_bin("gpt-copy")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--include"))
        .stdout(predicate::str::contains("--exclude-dir"))
        .stdout(predicate::str::contains("--tree-only"))
        .stdout(predicate::str::contains("--tokens"))
        .stdout(predicate::str::contains("EXAMPLES:"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("gpt-copy")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gpt-copy"));
}

#[test]
fn test_nonexistent_root_exits_with_error() {
    Command::cargo_bin("gpt-copy")
        .unwrap()
        .arg("/this/path/does/not/exist")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_file_root_is_invalid_argument() {
    let tmp = fixture(&[("afile.txt", "hello")]);
    gpt_copy(&tmp.path().join("afile.txt"))
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn test_default_document_has_tree_and_numbered_sections() {
    let tmp = fixture(&[("src/main.py", "print('hello')\n"), ("README.md", "# Demo\n")]);
    gpt_copy(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Folder Structure\n\n```\n"))
        .stdout(predicate::str::contains("## File: `src/main.py`"))
        .stdout(predicate::str::contains("*(Relative Path: `src/main.py`)*"))
        .stdout(predicate::str::contains("```python\n1: print('hello')\n```"))
        .stdout(predicate::str::contains("## File: `README.md`"));
}

#[test]
fn test_no_number_disables_line_numbers() {
    let tmp = fixture(&[("main.py", "print('hello')\n")]);
    gpt_copy(tmp.path())
        .arg("--no-number")
        .assert()
        .success()
        .stdout(predicate::str::contains("```python\nprint('hello')\n```"));
}

#[test]
fn test_tree_only_omits_file_sections() {
    let tmp = fixture(&[("src/main.py", "print('hello')\n")]);
    gpt_copy(tmp.path())
        .arg("--tree-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("└── src"))
        .stdout(predicate::str::contains("main.py"))
        .stdout(predicate::str::contains("## File:").not())
        .stdout(predicate::str::contains("# Folder Structure").not());
}

#[test]
fn test_include_only_acts_as_whitelist() {
    let tmp = fixture(&[("main.py", "x = 1\n"), ("app.js", "let x = 1;\n")]);
    gpt_copy(tmp.path())
        .args(["-i", "*.py"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## File: `main.py`"))
        .stdout(predicate::str::contains("app.js").not())
        .stderr(predicate::str::contains("did not match").not());
}

#[test]
fn test_rules_apply_in_command_line_order() {
    let tmp = fixture(&[
        ("build/temp.js", "temp\n"),
        ("build/reports/summary.txt", "summary\n"),
    ]);
    gpt_copy(tmp.path())
        .args(["-e", "build/**", "-i", "build/reports/**"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## File: `build/reports/summary.txt`"))
        .stdout(predicate::str::contains("temp.js").not());

    gpt_copy(tmp.path())
        .args(["-i", "build/reports/**", "-e", "build/**"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## File:").not());
}

#[test]
fn test_exclude_dir_shows_compressed_preview() {
    let tmp = fixture(&[
        ("node_modules/a.js", ""),
        ("node_modules/b.js", ""),
        ("node_modules/c.js", ""),
        ("node_modules/d.js", ""),
        ("index.js", "run();\n"),
    ]);
    gpt_copy(tmp.path())
        .args(["--exclude-dir", "node_modules", "--tree-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("node_modules"))
        .stdout(predicate::str::contains("c.js"))
        .stdout(predicate::str::contains("d.js").not())
        .stdout(predicate::str::contains("[...]"));
}

#[test]
fn test_unmatched_patterns_are_reported() {
    let tmp = fixture(&[("main.py", "x = 1\n")]);
    gpt_copy(tmp.path())
        .args(["-e", "*.nonexistent", "--exclude-dir", "nonexistent"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Warning: The following patterns did not match any files:",
        ))
        .stderr(predicate::str::contains("  --exclude '*.nonexistent'"))
        .stderr(predicate::str::contains("  --exclude-dir 'nonexistent/'"));
}

#[test]
fn test_quiet_suppresses_unmatched_report() {
    let tmp = fixture(&[("main.py", "x = 1\n")]);
    gpt_copy(tmp.path())
        .args(["-q", "-e", "*.nonexistent"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_binary_files_are_listed_as_unrecognized() {
    let tmp = fixture(&[("main.py", "x = 1\n")]);
    fs::write(tmp.path().join("blob.bin"), [0u8, 159, 146, 150]).unwrap();
    gpt_copy(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("# Unrecognized Files"))
        .stdout(predicate::str::contains("- `blob.bin`"))
        .stdout(predicate::str::contains("## File: `blob.bin`").not());
}

#[test]
fn test_tokens_annotate_tree() {
    let tmp = fixture(&[("main.py", "def main():\n    print('hello world')\n")]);
    gpt_copy(tmp.path())
        .arg("--tokens")
        .assert()
        .success()
        .stdout(predicate::str::contains("tokens total)"))
        .stdout(predicate::str::is_match(r"main\.py \(\d+ tokens\)").unwrap())
        .stdout(predicate::str::contains("## File:").not());
}

#[test]
fn test_top_n_ranks_largest_files() {
    let big = "fn main() { println!(\"hello\"); }\n".repeat(50);
    let tmp = fixture(&[("big.rs", big.as_str()), ("small.rs", "x")]);
    gpt_copy(tmp.path())
        .args(["--tokens", "--top-n", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing top 1 files by token count:"))
        .stdout(predicate::str::contains("  1. big.rs ("))
        .stdout(predicate::str::contains("small.rs").not());
}

#[test]
fn test_output_file_is_written_and_never_emitted() {
    let tmp = fixture(&[("main.py", "x = 1\n")]);
    for _ in 0..2 {
        Command::cargo_bin("gpt-copy")
            .unwrap()
            .current_dir(tmp.path())
            .env("NO_COLOR", "1")
            .args([".", "--no-config", "-o", "out.md"])
            .assert()
            .success()
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("Output saved to:"));
    }
    let written = fs::read_to_string(tmp.path().join("out.md")).unwrap();
    assert!(written.contains("## File: `main.py`"));
    assert!(!written.contains("out.md"));
}

#[test]
fn test_gitignore_is_respected_unless_forced() {
    let tmp = fixture(&[
        (".gitignore", "secret.txt\n"),
        ("secret.txt", "hunter2\n"),
        ("main.py", "x = 1\n"),
    ]);
    gpt_copy(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("## File: `main.py`"))
        .stdout(predicate::str::contains("## File: `secret.txt`").not())
        .stdout(predicate::str::contains("hunter2").not());

    gpt_copy(tmp.path())
        .arg("--force")
        .assert()
        .success()
        .stdout(predicate::str::contains("## File: `secret.txt`"));
}

#[test]
fn test_project_config_rules_are_loaded() {
    let tmp = fixture(&[
        (".gpt-copy.toml", "[filters]\nexclude = [\"*.log\"]\n"),
        ("app.log", "noise\n"),
        ("main.py", "x = 1\n"),
    ]);
    Command::cargo_bin("gpt-copy")
        .unwrap()
        .env("NO_COLOR", "1")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("## File: `main.py`"))
        .stdout(predicate::str::contains("app.log").not());
}

#[test]
fn test_invalid_config_is_an_error() {
    let tmp = fixture(&[(".gpt-copy.toml", "[filters]\nunknown = 1\n")]);
    Command::cargo_bin("gpt-copy")
        .unwrap()
        .arg(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_completions_are_printed() {
    Command::cargo_bin("gpt-copy")
        .unwrap()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gpt-copy"));
}
