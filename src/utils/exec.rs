//! External command execution.
//!
//! A small builder over `std::process::Command`, used by the deploy
//! command to drive git.
//!
//! # Examples
//!
//! ```ignore
//! Cmd::new("git").args(["status", "-s"]).run()?;
//! Cmd::new("git").args(["add", "."]).cwd(&dist).run()?;
//! ```

use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

use anyhow::{Context, Result, bail};

/// Command builder for external process execution.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl Cmd {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Run, inheriting stdout/stderr. Errors when the command exits nonzero.
    pub fn run(self) -> Result<()> {
        let display = self.display();
        let mut command = self.build();
        let status = command
            .status()
            .with_context(|| format!("spawning `{display}`"))?;
        if !status.success() {
            bail!("`{display}` exited with {status}");
        }
        Ok(())
    }

    /// Run, capturing output. Errors when the command exits nonzero.
    pub fn output(self) -> Result<Output> {
        let display = self.display();
        let mut command = self.build();
        let output = command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("spawning `{display}`"))?;
        if !output.status.success() {
            bail!(
                "`{display}` exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(output)
    }

    /// Run and ignore a nonzero exit (for best-effort steps like an empty
    /// commit during deploy).
    pub fn run_allow_failure(self) -> bool {
        let mut command = self.build();
        command
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn build(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        command
    }

    fn display(&self) -> String {
        let mut parts = vec![self.program.to_string_lossy().into_owned()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_success() {
        Cmd::new("true").run().unwrap();
    }

    #[test]
    fn test_run_failure() {
        assert!(Cmd::new("false").run().is_err());
    }

    #[test]
    fn test_output_captures_stdout() {
        let output = Cmd::new("echo").arg("hello").output().unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }
}
