use std::path::Path;
use std::process::Command;

const SHA_VAR: &str = "DAYPLAN_BUILD_SHA";

/// Run git in `repo` and return trimmed stdout, if it succeeded.
fn git(repo: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git").arg("-C").arg(repo).args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
}

fn main() {
    println!("cargo:rerun-if-env-changed={SHA_VAR}");

    // Packaged builds (no .git) can pass the revision in.
    if let Ok(sha) = std::env::var(SHA_VAR)
        && !sha.trim().is_empty()
    {
        println!("cargo:rustc-env={SHA_VAR}={}", sha.trim());
        return;
    }

    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let repo_root = Path::new(&manifest_dir).join("..");

    let sha = match git(&repo_root, &["rev-parse", "--short", "HEAD"]) {
        Some(sha) if !sha.is_empty() => {
            let dirty = git(&repo_root, &["status", "--porcelain", "--untracked-files=no"])
                .is_some_and(|s| !s.is_empty());
            if dirty { format!("{sha}-dirty") } else { sha }
        }
        _ => "unknown".to_string(),
    };

    println!("cargo:rustc-env={SHA_VAR}={sha}");
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/index");
}
