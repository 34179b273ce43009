use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Argument token replaced by the followed file's path.
pub const PATH_PLACEHOLDER: &str = "{path}";

/// External program that emits lines appended to a file.
///
/// It must emit nothing for pre-existing content, keep following across
/// renames, write new lines to stdout and stop on SIGTERM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowCommand {
    program: String,
    args: Vec<String>,
}

impl Default for FollowCommand {
    /// `tail -n 0 -F {path}`
    fn default() -> Self {
        Self {
            program: "tail".to_string(),
            args: vec![
                "-n".to_string(),
                "0".to_string(),
                "-F".to_string(),
                PATH_PLACEHOLDER.to_string(),
            ],
        }
    }
}

impl FollowCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a full argument vector. Returns `None` if no program is named.
    pub fn from_argv(argv: Vec<String>) -> Option<Self> {
        let mut argv = argv.into_iter();
        let program = argv.next().filter(|p| !p.trim().is_empty())?;
        Some(Self {
            program,
            args: argv.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments with the placeholder substituted. If no argument mentions
    /// the placeholder, the path is appended.
    pub fn args_for(&self, path: &Path) -> Vec<OsString> {
        let mut substituted = false;
        let mut args: Vec<OsString> = self
            .args
            .iter()
            .map(|arg| {
                if arg == PATH_PLACEHOLDER {
                    substituted = true;
                    path.as_os_str().to_os_string()
                } else if arg.contains(PATH_PLACEHOLDER) {
                    substituted = true;
                    OsString::from(arg.replace(PATH_PLACEHOLDER, &path.to_string_lossy()))
                } else {
                    OsString::from(arg)
                }
            })
            .collect();

        if !substituted {
            args.push(path.as_os_str().to_os_string());
        }
        args
    }

    /// Command with piped stdout/stderr. The child is killed if its handle is
    /// dropped without being reaped.
    pub(crate) fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args_for(path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}
