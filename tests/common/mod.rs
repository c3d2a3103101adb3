//! Temporary git repositories for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub struct GitRepoFixture {
    dir: TempDir,
    root: PathBuf,
}

impl GitRepoFixture {
    /// An empty repository whose initial branch is `master`.
    pub fn create() -> Self {
        let dir = TempDir::new().unwrap();
        // git reports the resolved root, so tests compare against that
        let root = dir.path().canonicalize().unwrap();
        let repo = Self { dir, root };
        repo.git(&["init", "--quiet"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/master"]);
        repo
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run git in the repository and return its trimmed stdout.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args([
                "-c",
                "user.name=Test User",
                "-c",
                "user.email=test@example.com",
                "-c",
                "commit.gpgsign=false",
            ])
            .args(args)
            .current_dir(&self.root)
            .env("LC_ALL", "C")
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }

    /// Write (`Some`) or delete (`None`) files and stage them, then commit
    /// if a message is given.
    pub fn add(&self, files: &[(&str, Option<&str>)], commit: Option<&str>) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for (relative, content) in files {
            let path = self.root.join(relative);
            match content {
                Some(content) => {
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent).unwrap();
                    }
                    fs::write(&path, content).unwrap();
                    self.git(&["add", "--", relative]);
                }
                None => {
                    self.git(&["rm", "--quiet", "--", relative]);
                }
            }
            paths.push(path);
        }
        if let Some(message) = commit {
            self.git(&["commit", "--quiet", "-m", message]);
        }
        paths
    }

    /// Write a file without staging it.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root.join(relative)).unwrap()
    }

    pub fn get_hash(&self, revision: &str) -> String {
        self.git(&["rev-parse", revision])
    }

    pub fn create_branch(&self, new_branch: &str, start_point: &str) {
        self.git(&["checkout", "--quiet", "-b", new_branch, start_point]);
    }
}
