// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Stage a test case, run the tool on it and compare the output.
//!
//! Every case gets its own directory under the work directory:
//!
//! ```text
//! <work_dir>/man-test-XXXXXX/
//!     input.<ext>      snippet
//!     args.ctags       options rebuilt from the command line
//!     expected.tags    documented output
//!     actual.tags      tool stdout
//!     tags.diff        comparator stdout
//! ```
//!
//! The directory is removed before `run` returns, on success and on error.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::case::Outcome;
use crate::error::RunError;
use crate::options::{OptionsFile, NO_DEFAULT_OPTIONS};
use crate::validate::ValidCase;

pub const OPTIONS_FILE: &str = "args.ctags";
pub const EXPECTED_FILE: &str = "expected.tags";
pub const ACTUAL_FILE: &str = "actual.tags";
pub const DIFF_FILE: &str = "tags.diff";

const STAGING_PREFIX: &str = "man-test-";

/// Where and with what test cases are run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Parent of the per-case staging directories; created on demand
    pub work_dir: PathBuf,
    /// Tool under test
    pub tool: PathBuf,
    /// Line diff program, called as `diff -uN --strip-trailing-cr`
    pub diff: PathBuf,
    /// Leave the staging directory of a failed case in place
    pub keep_failed: bool,
}

impl RunnerConfig {
    pub fn new(work_dir: impl Into<PathBuf>, tool: impl Into<PathBuf>) -> Self {
        RunnerConfig {
            work_dir: work_dir.into(),
            tool: tool.into(),
            diff: PathBuf::from("diff"),
            keep_failed: false,
        }
    }

    pub fn with_diff(mut self, diff: impl Into<PathBuf>) -> Self {
        self.diff = diff.into();
        self
    }

    pub fn with_keep_failed(mut self, keep_failed: bool) -> Self {
        self.keep_failed = keep_failed;
        self
    }

    /// Anchor a relative tool path to the current directory, since the tool
    /// runs from inside the staging directory. A bare `ctags` means the one
    /// in `cwd`, not one on `PATH`.
    pub fn with_tool_anchored(mut self, cwd: &Path) -> Self {
        if self.tool.is_relative() {
            self.tool = cwd.join(&self.tool);
        }
        self
    }
}

/// Runs validated test cases one at a time.
#[derive(Debug, Clone)]
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        Runner { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run one test case. The tool's exit status is ignored; only the
    /// comparator decides.
    pub fn run(&self, case: ValidCase<'_>) -> Result<Outcome, RunError> {
        let span = tracing::debug_span!("run", case = %case.case.locator());
        let _enter = span.enter();

        let work_dir = &self.config.work_dir;
        fs::create_dir_all(work_dir).map_err(|source| RunError::WorkDir {
            path: work_dir.clone(),
            source,
        })?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(work_dir)
            .map_err(|source| RunError::Stage {
                path: work_dir.clone(),
                source,
            })?;
        let dir = staging.path();
        tracing::debug!(dir = %dir.display(), "staging");

        let options = OptionsFile::from_command_line(case.command_line);
        let input = options
            .input
            .as_deref()
            .unwrap_or(case.input_file_name)
            .to_string();

        stage(&dir.join(case.input_file_name), case.source)?;
        stage(&dir.join(EXPECTED_FILE), case.expected)?;
        stage(&dir.join(OPTIONS_FILE), &options.render())?;

        let actual_path = dir.join(ACTUAL_FILE);
        let mut tool = Command::new(&self.config.tool);
        tool.arg("--quiet")
            .arg(NO_DEFAULT_OPTIONS)
            .arg(format!("--options={OPTIONS_FILE}"))
            .arg(&input);
        let status = spawn(tool, dir, &actual_path, &self.config.tool)?;
        tracing::debug!(%status, "tool finished");

        let diff_path = dir.join(DIFF_FILE);
        let mut diff = Command::new(&self.config.diff);
        diff.args(["-uN", "--strip-trailing-cr", ACTUAL_FILE, EXPECTED_FILE]);
        let status = spawn(diff, dir, &diff_path, &self.config.diff)?;
        tracing::debug!(%status, "comparator finished");

        let outcome = if status.success() {
            Outcome::Passed
        } else {
            Outcome::Failed {
                actual: collect(&actual_path)?,
                diff: collect(&diff_path)?,
            }
        };

        if outcome.is_failed() && self.config.keep_failed {
            let kept = staging.into_path();
            tracing::info!(dir = %kept.display(), "kept staging directory of failed case");
        } else {
            let path = dir.to_path_buf();
            staging
                .close()
                .map_err(|source| RunError::Cleanup { path, source })?;
        }

        Ok(outcome)
    }
}

fn stage(path: &Path, contents: &str) -> Result<(), RunError> {
    tracing::debug!(file = %path.display(), bytes = contents.len(), "writing");
    fs::write(path, contents).map_err(|source| RunError::Stage {
        path: path.to_path_buf(),
        source,
    })
}

/// Run `command` in `dir` with stdout sent to `stdout_path`.
fn spawn(
    mut command: Command,
    dir: &Path,
    stdout_path: &Path,
    program: &Path,
) -> Result<std::process::ExitStatus, RunError> {
    let stdout = File::create(stdout_path).map_err(|source| RunError::Stage {
        path: stdout_path.to_path_buf(),
        source,
    })?;
    tracing::debug!(?command, "spawning");
    command
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .status()
        .map_err(|source| RunError::Spawn {
            program: program.to_path_buf(),
            source,
        })
}

fn collect(path: &Path) -> Result<String, RunError> {
    let bytes = fs::read(path).map_err(|source| RunError::Collect {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::case::TestCase;
    use crate::validate::validate;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// Prints its options file, then its input file.
    const ECHO_TOOL: &str = "#!/bin/sh\n\
        [ \"$1\" = --quiet ] || exit 3\n\
        [ \"$2\" = --options=NONE ] || exit 3\n\
        cat \"${3#--options=}\"\n\
        cat \"$4\"\n";

    fn write_tool(dir: &Path, name: &str, script: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn case(source: &str, command_line: &str, expected: &str) -> TestCase {
        let mut case = TestCase::new("ctags-lang-c.7.rst.in", 5, "input.c");
        case.source = Some(source.to_string());
        case.command_line = Some(command_line.to_string());
        case.expected = Some(expected.to_string());
        case
    }

    fn leftovers(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_empty_output_passes() {
        let tmp = TempDir::new().unwrap();
        let tool = write_tool(tmp.path(), "silent", "#!/bin/sh\nexit 0\n");
        let work = tmp.path().join("work");
        let runner = Runner::new(RunnerConfig::new(&work, tool));

        let case = case("int main(){}\n", "--options=NONE --c-kinds=f input.c", "");
        let outcome = runner.run(validate(&case).unwrap()).unwrap();

        assert_eq!(outcome, Outcome::Passed);
        assert_eq!(leftovers(&work), 0);
    }

    #[test]
    fn test_mismatch_fails_with_artifacts() {
        let tmp = TempDir::new().unwrap();
        let tool = write_tool(tmp.path(), "silent", "#!/bin/sh\nexit 0\n");
        let work = tmp.path().join("work");
        let runner = Runner::new(RunnerConfig::new(&work, tool));

        let case = case("int main(){}\n", "--options=NONE --c-kinds=f input.c", "main\tinput.c\t1;\"\tf\n");
        let outcome = runner.run(validate(&case).unwrap()).unwrap();

        match outcome {
            Outcome::Failed { actual, diff } => {
                assert_eq!(actual, "");
                assert!(diff.contains("+main\tinput.c"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(leftovers(&work), 0);
    }

    #[test]
    fn test_tool_sees_staged_files() {
        let tmp = TempDir::new().unwrap();
        let tool = write_tool(tmp.path(), "echo-tool", ECHO_TOOL);
        let runner = Runner::new(RunnerConfig::new(tmp.path().join("work"), tool));

        let case = case(
            "int x;\n",
            "--options=NONE --regex-C=/^#define ([a-z]+)/\\1/d/ --fields=+n input.c",
            "--regex-C=/^#define ([a-z]+)/\\1/d/\n--fields=+n\nint x;\n",
        );
        let outcome = runner.run(validate(&case).unwrap()).unwrap();
        assert_eq!(outcome, Outcome::Passed);
    }

    #[test]
    fn test_line_endings_ignored() {
        let tmp = TempDir::new().unwrap();
        let tool = write_tool(tmp.path(), "echo-tool", ECHO_TOOL);
        let runner = Runner::new(RunnerConfig::new(tmp.path().join("work"), tool));

        let case = case("int x;\n", "input.c", "int x;\r\n");
        let outcome = runner.run(validate(&case).unwrap()).unwrap();
        assert_eq!(outcome, Outcome::Passed);
    }

    #[test]
    fn test_declared_name_used_without_input_token() {
        let tmp = TempDir::new().unwrap();
        let tool = write_tool(tmp.path(), "echo-tool", ECHO_TOOL);
        let runner = Runner::new(RunnerConfig::new(tmp.path().join("work"), tool));

        let case = case("int y;\n", "--sort=no", "--sort=no\nint y;\n");
        let outcome = runner.run(validate(&case).unwrap()).unwrap();
        assert_eq!(outcome, Outcome::Passed);
    }

    #[test]
    fn test_rerun_gives_same_outcome() {
        let tmp = TempDir::new().unwrap();
        let tool = write_tool(tmp.path(), "echo-tool", ECHO_TOOL);
        let work = tmp.path().join("work");
        let runner = Runner::new(RunnerConfig::new(&work, tool));

        let case = case("int z;\n", "input.c", "something else\n");
        let first = runner.run(validate(&case).unwrap()).unwrap();
        assert_eq!(leftovers(&work), 0);
        let second = runner.run(validate(&case).unwrap()).unwrap();
        assert_eq!(leftovers(&work), 0);
        assert_eq!(first, second);
        assert!(first.is_failed());
    }

    #[test]
    fn test_keep_failed_leaves_directory() {
        let tmp = TempDir::new().unwrap();
        let tool = write_tool(tmp.path(), "silent", "#!/bin/sh\nexit 0\n");
        let work = tmp.path().join("work");
        let runner = Runner::new(RunnerConfig::new(&work, tool).with_keep_failed(true));

        let case = case("int main(){}\n", "input.c", "x\n");
        assert!(runner.run(validate(&case).unwrap()).unwrap().is_failed());

        let kept: Vec<_> = fs::read_dir(&work).unwrap().map(|e| e.unwrap().path()).collect();
        assert_eq!(kept.len(), 1);
        assert!(kept[0].join(DIFF_FILE).exists());
        assert!(kept[0].join("input.c").exists());
    }

    #[test]
    fn test_missing_tool_cleans_up() {
        let tmp = TempDir::new().unwrap();
        let work = tmp.path().join("work");
        let runner = Runner::new(RunnerConfig::new(&work, tmp.path().join("no-such-tool")));

        let case = case("int main(){}\n", "input.c", "\n");
        let err = runner.run(validate(&case).unwrap()).unwrap_err();
        assert!(matches!(err, RunError::Spawn { .. }));
        assert_eq!(leftovers(&work), 0);
    }

    #[test]
    fn test_tool_anchoring() {
        let cwd = Path::new("/srv/ctags");
        let anchored = RunnerConfig::new("w", "./ctags").with_tool_anchored(cwd);
        assert_eq!(anchored.tool, PathBuf::from("/srv/ctags/./ctags"));

        let bare = RunnerConfig::new("w", "ctags").with_tool_anchored(cwd);
        assert_eq!(bare.tool, PathBuf::from("/srv/ctags/ctags"));

        let absolute = RunnerConfig::new("w", "/usr/bin/ctags").with_tool_anchored(cwd);
        assert_eq!(absolute.tool, PathBuf::from("/usr/bin/ctags"));
    }
}
