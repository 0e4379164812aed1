use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use pinvend_core::prelude::*;

fn hg(repo: &Path, args: &[&str]) -> String {
    let output = Command::new("hg")
        .args(args)
        .current_dir(repo)
        .env("HGPLAIN", "1")
        .env("HGUSER", "Test User <test@example.com>")
        .output()
        .expect("Failed to invoke hg");
    assert!(output.status.success(), "hg command failed: {:?}", args);
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
#[ignore = "needs the `hg` client on PATH; run with `cargo test -- --ignored`"]
fn fetch_hg_dependency_at_revision() {
    let temp = TempDir::new().unwrap();
    let upstreams = temp.path().join("upstreams");
    let name = "hg.example.com/dep";
    let repo = upstreams.join(name);
    fs::create_dir_all(&repo).unwrap();
    hg(&repo, &["init"]);
    fs::write(repo.join("dep.go"), "package dep // v1\n").unwrap();
    hg(&repo, &["add", "dep.go"]);
    hg(&repo, &["commit", "-m", "first"]);
    let first = hg(&repo, &["log", "-r", ".", "--template", "{node}"]);
    fs::write(repo.join("dep.go"), "package dep // v2\n").unwrap();
    hg(&repo, &["commit", "-m", "second"]);

    let prefix = url::Url::from_directory_path(&upstreams)
        .unwrap()
        .to_string();
    let fetcher =
        VendorFetcher::new(FetcherConfig::new(temp.path().join("vendor")).with_url_prefix(prefix));

    let outcome = fetcher.fetch(&VendorSpec::hg(name, &first).unwrap()).unwrap();

    assert_eq!(
        fs::read_to_string(outcome.target_dir.join("dep.go")).unwrap(),
        "package dep // v1\n"
    );
    assert!(!outcome.target_dir.join(".hg").exists());
}
