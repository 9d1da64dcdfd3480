//! Shared helpers for integration tests: stub build tools written as shell
//! scripts into a temporary build-tools directory.

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Serializes tests that write and then execute scripts. Executing a file
/// that another thread's fork still holds open for writing fails with
/// ETXTBSY, so script creation and execution never overlap across tests.
pub static EXEC_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

/// Writes an executable script.
pub fn write_script(path: &Path, body: &str) {
    std::fs::write(path, format!("#!/bin/sh\n{body}")).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// A workspace with a build-tools directory, a keystore and a package.
pub struct Workspace {
    pub root: tempfile::TempDir,
    pub tools: PathBuf,
    pub keystore: PathBuf,
    pub package: PathBuf,
}

impl Workspace {
    /// Creates the layout. No tools are installed yet.
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let tools = root.path().join("build-tools");
        let out = root.path().join("out");
        std::fs::create_dir_all(&tools).unwrap();
        std::fs::create_dir_all(&out).unwrap();

        let keystore = root.path().join("release.jks");
        std::fs::write(&keystore, b"keystore").unwrap();
        let package = out.join("app.apk");
        std::fs::write(&package, b"PK apk contents").unwrap();

        Self {
            root,
            tools,
            keystore,
            package,
        }
    }

    /// Installs a `zipalign` that copies `$4` to `$5` and exits with `exit`.
    pub fn install_zipalign(&self, exit: i32) {
        write_script(
            &self.tools.join("zipalign"),
            &format!(
                "echo \"Verifying alignment of $5 ($3)...\"\n\
                 cp \"$4\" \"$5\"\n\
                 echo \"Verification succesful\"\n\
                 exit {exit}\n"
            ),
        );
    }

    /// Installs an `apksigner` that copies the input (`$12`) to `--out`
    /// (`$11`) on success and prints its arguments.
    pub fn install_apksigner(&self, exit: i32) {
        write_script(
            &self.tools.join("apksigner"),
            &format!(
                "echo \"apksigner $1 ks=$3 alias=$7\"\n\
                 if [ {exit} -eq 0 ]; then cp \"${{12}}\" \"${{11}}\"; else echo \"Failed to load signer\" >&2; fi\n\
                 exit {exit}\n"
            ),
        );
    }

    /// Path of the aligned intermediate package.
    pub fn intermediate(&self) -> PathBuf {
        self.package.with_file_name("unSign-app.apk")
    }

    /// Path of the signed package.
    pub fn signed(&self) -> PathBuf {
        self.package.with_file_name("sign-app.apk")
    }

    /// Settings file location inside the workspace.
    pub fn config_path(&self) -> PathBuf {
        self.root.path().join("settings").join("auto_sign_config.json")
    }
}
