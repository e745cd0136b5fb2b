use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Bakes git provenance into the binary as `ICS_GIT_*` environment
/// variables. Outside a git checkout every value is empty.
fn main() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    let root = PathBuf::from(manifest_dir);
    watch_git_dir(&root);

    let commit = git(&root, &["rev-parse", "HEAD"]);
    let branch = git(&root, &["rev-parse", "--abbrev-ref", "HEAD"]);
    let dirty = git(&root, &["status", "--porcelain"]).map(|out| !out.is_empty());

    let base = ["master", "main"].into_iter().find(|name| {
        git(&root, &["show-ref", "--verify", &format!("refs/heads/{name}")]).is_some()
    });
    // `rev-list --left-right base...HEAD` prints "<behind>\t<ahead>".
    let counts = base
        .and_then(|base| git(&root, &["rev-list", "--count", "--left-right", &format!("{base}...HEAD")]))
        .and_then(|out| {
            let (behind, ahead) = out.split_once('\t')?;
            Some((behind.trim().to_string(), ahead.trim().to_string()))
        });

    emit("ICS_GIT_COMMIT", commit.as_deref().unwrap_or_default());
    emit("ICS_GIT_BRANCH", branch.as_deref().unwrap_or_default());
    emit(
        "ICS_GIT_DIRTY",
        match dirty {
            Some(true) => "true",
            Some(false) => "false",
            None => "",
        },
    );
    emit("ICS_GIT_BASE", base.unwrap_or_default());
    emit("ICS_GIT_BEHIND", counts.as_ref().map_or("", |(behind, _)| behind.as_str()));
    emit("ICS_GIT_AHEAD", counts.as_ref().map_or("", |(_, ahead)| ahead.as_str()));
}

fn git(root: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).current_dir(root).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn watch_git_dir(root: &Path) {
    let git_dir = root.join(".git");
    for file in ["HEAD", "index"] {
        let path = git_dir.join(file);
        if path.exists() {
            println!("cargo:rerun-if-changed={}", path.display());
        }
    }
    println!("cargo:rerun-if-changed=build.rs");
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={key}={value}");
}
