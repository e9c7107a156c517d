//! Child process runner for `exec` actions.

use std::io::Read;
use std::process::Stdio;

use badger_domain::action::Invocation;
use badger_domain::error::ExecutionError;

/// Spawn `invocation`, wait for it to exit and return its output.
///
/// The child inherits the host environment plus `invocation.env` and runs
/// in the current working directory. Stdout and stderr share one pipe, so
/// the returned text keeps the order in which the child wrote it. It is
/// lossily decoded and trimmed, and attached to the error on a non-zero exit.
///
/// # Errors
///
/// Returns [`ExecutionError::Spawn`] when the program cannot be started,
/// [`ExecutionError::Capture`] when its output cannot be read and
/// [`ExecutionError::ProcessFailed`] when it exits unsuccessfully.
pub async fn run(invocation: &Invocation) -> Result<String, ExecutionError> {
    let spawn_error = |source| ExecutionError::Spawn {
        program: invocation.program.clone(),
        source,
    };
    let capture_error = |source| ExecutionError::Capture {
        program: invocation.program.clone(),
        source,
    };

    let (mut reader, writer) = std::io::pipe().map_err(spawn_error)?;
    let stderr = writer.try_clone().map_err(spawn_error)?;

    let mut command = tokio::process::Command::new(&invocation.program);
    command
        .args(&invocation.args)
        .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .stdout(writer)
        .stderr(stderr);
    if let Ok(cwd) = std::env::current_dir() {
        command.current_dir(cwd);
    }

    let mut child = command.spawn().map_err(spawn_error)?;
    // The command holds the parent's copies of the write end.
    drop(command);

    let read = tokio::task::spawn_blocking(move || {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map(|_| bytes)
    });
    let status = child.wait().await.map_err(capture_error)?;
    let bytes = read
        .await
        .map_err(std::io::Error::other)
        .and_then(|result| result)
        .map_err(capture_error)?;
    let output = String::from_utf8_lossy(&bytes).trim().to_string();

    if status.success() {
        return Ok(output);
    }
    Err(ExecutionError::ProcessFailed {
        status: status.to_string(),
        output: (!output.is_empty()).then_some(output),
    })
}
