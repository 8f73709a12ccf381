use std::ffi::OsString;
use std::process::{Command, Stdio};

use crate::errors::{Error, ToolFailure};

/// Runs `cmd` to completion and returns its stdout.
///
/// A non-zero exit carries the raw stdout and stderr of the tool.
pub(crate) fn run(cmd: &mut Command) -> Result<Vec<u8>, Error> {
    tracing::debug!("running {cmd:?}");

    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| tool_error(cmd, ToolFailure::Spawn(e)))?;

    if !output.status.success() {
        return Err(tool_error(
            cmd,
            ToolFailure::Exit {
                status: output.status,
                stdout: output.stdout,
                stderr: output.stderr,
            },
        ));
    }

    Ok(output.stdout)
}

/// Runs `cmd` with stdout and stderr connected to ours, for tools whose
/// output is meant for the operator.
pub(crate) fn run_inherit(cmd: &mut Command) -> Result<(), Error> {
    tracing::debug!("running {cmd:?}");

    let status = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| tool_error(cmd, ToolFailure::Spawn(e)))?;

    if !status.success() {
        return Err(tool_error(
            cmd,
            ToolFailure::Exit {
                status,
                stdout: Vec::new(),
                stderr: Vec::new(),
            },
        ));
    }

    Ok(())
}

fn tool_error(cmd: &Command, failure: ToolFailure) -> Error {
    Error::ExternalTool {
        program: cmd.get_program().to_os_string(),
        args: cmd.get_args().map(OsString::from).collect(),
        failure,
    }
}
