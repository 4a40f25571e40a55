#![cfg(unix)]

// End-to-end behavior of the command-not-found binary with fake tools on a
// private PATH.
mod support;

use anyhow::Result;
use serde_json::Value;
use std::ffi::OsStr;
use std::fs;
use std::os::unix::ffi::OsStrExt;
use support::{Sandbox, run_command, stderr_of, stdout_of};

#[test]
fn reachable_command_replaces_the_helper() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.install("ls", "echo fake-ls-ran")?;

    let mut cmd = sandbox.command();
    cmd.arg("ls");
    let output = run_command(cmd)?;
    assert!(output.status.success(), "{}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "fake-ls-ran\n");
    Ok(())
}

#[test]
fn layout_typo_is_announced_then_executed() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.install("ls", "echo fake-ls-ran")?;

    let mut cmd = sandbox.command();
    cmd.arg("ды");
    let output = run_command(cmd)?;
    assert!(output.status.success(), "{}", stderr_of(&output));
    assert_eq!(
        stdout_of(&output),
        "Auto-correcting 'ды' to 'ls' and executing:\nfake-ls-ran\n"
    );
    Ok(())
}

#[test]
fn unknown_command_without_catalog_exits_127_with_search_hint() -> Result<()> {
    let sandbox = Sandbox::new()?;

    let mut cmd = sandbox.command();
    cmd.env("CNF_CATALOG_COMMAND", sandbox.tools.join("missing-apt-cache"))
        .arg("frobnicate");
    let output = run_command(cmd)?;
    assert_eq!(output.status.code(), Some(127));
    assert_eq!(
        stdout_of(&output),
        "frobnicate: Command not found\nPerhaps you were looking for:\nTry: apt-cache search frobnicate\n"
    );
    Ok(())
}

#[test]
fn owner_package_gets_install_hint() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let search = sandbox.tool(
        "search",
        "printf 'htop - interactive process viewer\\nhtop-extra - plugins\\n'",
    )?;
    sandbox.tool("not-installed", "exit 1")?;

    let mut cmd = sandbox.command();
    cmd.env("CNF_CATALOG_COMMAND", &search)
        .env("CNF_INSTALL_HINT", "pkg install %s")
        .arg("htop");
    let output = run_command(cmd)?;
    assert_eq!(output.status.code(), Some(127));
    assert_eq!(
        stdout_of(&output),
        "htop: Command not found\nInstall it with:\npkg install htop\n"
    );
    assert!(sandbox.cache.exists());
    Ok(())
}

#[test]
fn json_report_lists_similar_packages() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let search = sandbox.tool(
        "search",
        "printf 'gitk - viewer\\ngit-lfs - large files\\ngit - vcs\\n'",
    )?;

    let mut cmd = sandbox.command();
    cmd.env("CNF_CATALOG_COMMAND", &search)
        .args(["--json", "gi"]);
    let output = run_command(cmd)?;
    assert_eq!(output.status.code(), Some(127));
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["outcome"], "not_found");
    let names: Vec<_> = value["similar"]
        .as_array()
        .expect("similar array")
        .iter()
        .filter_map(|record| record["name"].as_str())
        .collect();
    assert_eq!(names, ["git", "gitk", "git-lfs"]);
    Ok(())
}

#[test]
fn overlong_input_exits_1() -> Result<()> {
    let sandbox = Sandbox::new()?;

    let mut cmd = sandbox.command();
    cmd.arg("x".repeat(101));
    let output = run_command(cmd)?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_of(&output).is_empty());
    assert!(stderr_of(&output).contains("Input command too long"));
    assert!(!sandbox.cache.exists());
    Ok(())
}

#[test]
fn rebuild_cache_regenerates_unconditionally() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let search = sandbox.tool("search", "echo 'fresh - rebuilt'")?;
    fs::create_dir_all(sandbox.cache.parent().expect("cache dir"))?;
    fs::write(&sandbox.cache, "old - snapshot\n")?;

    let mut cmd = sandbox.command();
    cmd.env("CNF_CATALOG_COMMAND", &search)
        .arg("--rebuild-cache");
    let output = run_command(cmd)?;
    assert!(output.status.success(), "{}", stderr_of(&output));
    assert_eq!(fs::read_to_string(&sandbox.cache)?, "fresh - rebuilt\n");
    Ok(())
}

#[test]
fn no_exec_reports_instead_of_running() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.install("ls", "echo should-not-run")?;

    let mut cmd = sandbox.command();
    cmd.args(["--no-exec", "--json", "ды"]);
    let output = run_command(cmd)?;
    assert!(output.status.success(), "{}", stderr_of(&output));
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["outcome"], "execute");
    assert_eq!(value["command"], "ls");
    assert_eq!(value["autocorrected_from"], "ды");
    Ok(())
}

#[test]
fn translated_messages_are_used() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let messages = sandbox.root.path().join("ru.json");
    fs::write(
        &messages,
        r#"{"Command not found": "команда не найдена", "Try: %s": "Попробуйте: %s"}"#,
    )?;

    let mut cmd = sandbox.command();
    cmd.env("CNF_MESSAGES", &messages)
        .env("CNF_CATALOG_COMMAND", sandbox.tools.join("missing"))
        .env("CNF_SEARCH_HINT", "pkg search %s")
        .arg("frobnicate");
    let output = run_command(cmd)?;
    assert_eq!(output.status.code(), Some(127));
    let stdout = stdout_of(&output);
    assert!(stdout.starts_with("frobnicate: команда не найдена\n"), "{stdout}");
    assert!(stdout.ends_with("Попробуйте: pkg search frobnicate\n"), "{stdout}");
    Ok(())
}

#[test]
fn malformed_setting_still_reports_not_found() -> Result<()> {
    let sandbox = Sandbox::new()?;

    let mut cmd = sandbox.command();
    cmd.env("CNF_MAX_RESULTS", "abc")
        .env("CNF_CATALOG_COMMAND", sandbox.tools.join("missing-apt-cache"))
        .arg("frobnicate");
    let output = run_command(cmd)?;
    assert_eq!(output.status.code(), Some(127), "{}", stderr_of(&output));
    assert!(
        stdout_of(&output).ends_with("Try: apt-cache search frobnicate\n"),
        "{}",
        stdout_of(&output)
    );
    Ok(())
}

#[test]
fn non_utf8_command_is_reported_not_found() -> Result<()> {
    let sandbox = Sandbox::new()?;

    let mut cmd = sandbox.command();
    cmd.env("CNF_CATALOG_COMMAND", sandbox.tools.join("missing-apt-cache"))
        .arg(OsStr::from_bytes(b"frob\xffnicate"));
    let output = run_command(cmd)?;
    assert_eq!(output.status.code(), Some(127), "{}", stderr_of(&output));
    assert!(stdout_of(&output).contains("Command not found"));
    Ok(())
}

#[test]
fn unknown_backend_is_a_usage_error() -> Result<()> {
    let sandbox = Sandbox::new()?;

    let mut cmd = sandbox.command();
    cmd.args(["--backend", "rpmdb", "ls"]);
    let output = run_command(cmd)?;
    assert_eq!(output.status.code(), Some(2));
    Ok(())
}
