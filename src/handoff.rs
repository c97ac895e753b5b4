//! Replace the waiting process with the follow-up command.

use crate::error::WaitError;
use std::os::unix::process::CommandExt;
use std::process::Command;
use tracing::info;

/// Hand execution over to `command`.
///
/// On success the current process image is replaced, so this never returns
/// and the command's exit status becomes ours. Stdio, environment and open
/// descriptors are inherited. An empty command returns `Ok(())` and leaves
/// exiting to the caller. Only a failed launch comes back as an error.
pub fn handoff(command: &[String]) -> Result<(), WaitError> {
    let Some((program, args)) = command.split_first() else {
        return Ok(());
    };

    info!("Executing: {}", display_command(command));

    let err = Command::new(program).args(args).exec();

    // exec() only returns if there's an error
    Err(WaitError::Launch {
        program: program.clone(),
        source: err,
    })
}

/// Shell-quoted command line for log output.
fn display_command(command: &[String]) -> String {
    shlex::try_join(command.iter().map(String::as_str)).unwrap_or_else(|_| command.join(" "))
}
