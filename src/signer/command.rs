//! Construction of the `zipalign` and `apksigner` invocations.
//!
//! Commands are kept as an argument vector and spawned without a shell, so
//! paths and passwords containing spaces or shell metacharacters are passed
//! through verbatim. The [`Display`](std::fmt::Display) form is a
//! shell-quoted single line for logs, with credential arguments redacted.

use super::request::{DerivedPaths, Secret};
use super::tools::BuildTools;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

/// Byte boundary passed to `zipalign -p`.
pub const ALIGNMENT: &str = "4";

const REDACTED: &str = "pass:******";

/// An external tool invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    secret_args: Vec<usize>,
}

impl ToolCommand {
    /// Starts a command for `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            secret_args: Vec::new(),
        }
    }

    /// Appends a plain argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Appends several plain arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Appends a `pass:<secret>` argument that is redacted when displayed.
    pub fn password_arg(mut self, secret: &Secret) -> Self {
        self.secret_args.push(self.args.len());
        self.args.push(format!("pass:{}", secret.expose()).into());
        self
    }

    /// Program to execute.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments, unredacted.
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Short program name for messages, e.g. `zipalign`.
    pub fn name(&self) -> String {
        self.program
            .file_stem()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote(&self.program.to_string_lossy()))?;
        for (i, arg) in self.args.iter().enumerate() {
            f.write_str(" ")?;
            if self.secret_args.contains(&i) {
                f.write_str(REDACTED)?;
            } else {
                f.write_str(&quote(&arg.to_string_lossy()))?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ToolCommand").field(&self.to_string()).finish()
    }
}

/// Quotes a word for display if a shell would split or expand it.
fn quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+@%\\".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// `zipalign -v -p 4 <package> <working_dir>/unSign-<name>`
pub fn build_align_command(
    tools: &BuildTools,
    package_path: &Path,
    paths: &DerivedPaths,
) -> ToolCommand {
    ToolCommand::new(tools.zipalign())
        .args(["-v", "-p", ALIGNMENT])
        .arg(package_path)
        .arg(paths.unsigned_aligned_path())
}

/// `apksigner sign --ks <keystore> --ks-pass pass:<pwd> --ks-key-alias <alias>
/// --key-pass pass:<pwd> --out <working_dir>/sign-<name> <working_dir>/unSign-<name>`
pub fn build_sign_command(
    tools: &BuildTools,
    keystore_path: &Path,
    key_password: &Secret,
    alias: &str,
    alias_password: &Secret,
    paths: &DerivedPaths,
) -> ToolCommand {
    ToolCommand::new(tools.apksigner())
        .args(["sign", "--ks"])
        .arg(keystore_path)
        .arg("--ks-pass")
        .password_arg(key_password)
        .args(["--ks-key-alias", alias])
        .arg("--key-pass")
        .password_arg(alias_password)
        .arg("--out")
        .arg(paths.signed_path())
        .arg(paths.unsigned_aligned_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (BuildTools, DerivedPaths) {
        let tools = BuildTools::locate(Path::new("/nonexistent/build-tools"));
        let paths = DerivedPaths::from_package_path(Path::new("/out/app.apk")).unwrap();
        (tools, paths)
    }

    fn strings(cmd: &ToolCommand) -> Vec<String> {
        cmd.get_args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn align_command_layout() {
        let (tools, paths) = fixture();
        let cmd = build_align_command(&tools, Path::new("/out/app.apk"), &paths);

        assert_eq!(cmd.program(), Path::new("/nonexistent/build-tools/zipalign"));
        assert_eq!(
            strings(&cmd),
            ["-v", "-p", "4", "/out/app.apk", "/out/unSign-app.apk"]
        );
        assert_eq!(cmd.name(), "zipalign");
    }

    #[test]
    fn sign_command_layout() {
        let (tools, paths) = fixture();
        let cmd = build_sign_command(
            &tools,
            Path::new("/k.jks"),
            &Secret::new("p1"),
            "k1",
            &Secret::new("p2"),
            &paths,
        );

        assert_eq!(
            strings(&cmd),
            [
                "sign",
                "--ks",
                "/k.jks",
                "--ks-pass",
                "pass:p1",
                "--ks-key-alias",
                "k1",
                "--key-pass",
                "pass:p2",
                "--out",
                "/out/sign-app.apk",
                "/out/unSign-app.apk",
            ]
        );
    }

    #[test]
    fn display_redacts_passwords() {
        let (tools, paths) = fixture();
        let cmd = build_sign_command(
            &tools,
            Path::new("/k.jks"),
            &Secret::new("topsecret"),
            "k1",
            &Secret::new("alsosecret"),
            &paths,
        );
        let shown = cmd.to_string();

        assert!(!shown.contains("topsecret"));
        assert!(!shown.contains("alsosecret"));
        assert_eq!(shown.matches(REDACTED).count(), 2);
        assert!(!format!("{cmd:?}").contains("topsecret"));
    }

    #[test]
    fn display_quotes_paths_with_spaces() {
        let tools = BuildTools::locate(Path::new("/nonexistent/build-tools"));
        let package = Path::new("/my apps/it's.apk");
        let paths = DerivedPaths::from_package_path(package).unwrap();
        let cmd = build_align_command(&tools, package, &paths);

        assert_eq!(
            cmd.to_string(),
            r"/nonexistent/build-tools/zipalign -v -p 4 '/my apps/it'\''s.apk' '/my apps/unSign-it'\''s.apk'"
        );
        // argv keeps the raw path
        assert_eq!(cmd.get_args()[3], OsString::from("/my apps/it's.apk"));
    }
}
