//! Child process execution for jobs.
//!
//! Commands are parsed with shell-words into an argv array and executed
//! directly, without invoking a shell. The child inherits stdin, stdout
//! and stderr, so under cron its output lands in the same mail or log
//! file as solorun's own messages.

use crate::error::{Result, SolorunError};
use std::path::Path;
use std::process::Command;

/// Parse a shell-style command line into an argv array.
pub fn parse_command(command: &str) -> Result<Vec<String>> {
    let argv = shell_words::split(command).map_err(|e| {
        SolorunError::UserError(format!(
            "failed to parse command '{}': {}\n\
             Fix: check for unmatched quotes or invalid escape sequences.",
            command, e
        ))
    })?;

    if argv.is_empty() {
        return Err(SolorunError::UserError(
            "command is empty after parsing.\n\
             Fix: provide a program to run."
                .to_string(),
        ));
    }

    Ok(argv)
}

/// A short human label for an argv: the basename of the program.
pub fn command_label(argv: &[String]) -> String {
    argv.first()
        .map(|program| {
            Path::new(program)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| program.clone())
        })
        .unwrap_or_else(|| "command".to_string())
}

/// Run an argv array to completion and map its exit status to a Result.
pub fn run_argv(argv: &[String], workdir: Option<&Path>) -> Result<()> {
    let (program, args) = argv.split_first().ok_or_else(|| {
        SolorunError::UserError(
            "command is empty after parsing.\n\
             Fix: provide a program to run."
                .to_string(),
        )
    })?;

    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = workdir {
        command.current_dir(dir);
    }

    let status = command.status().map_err(|e| {
        SolorunError::JobError(format!(
            "failed to execute '{}': {}\n\
             Fix: ensure the program is installed and in PATH.",
            program, e
        ))
    })?;

    if status.success() {
        return Ok(());
    }

    Err(match status.code() {
        Some(code) => {
            SolorunError::JobError(format!("command '{}' exited with code {}", program, code))
        }
        // No exit code on Unix means the child was killed by a signal.
        None => SolorunError::JobError(format!("command '{}' was terminated by a signal", program)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_command_splits_words() {
        let parsed = parse_command("rsync -a /src /dst").unwrap();
        assert_eq!(parsed, vec!["rsync", "-a", "/src", "/dst"]);
    }

    #[test]
    fn test_parse_command_honors_quotes() {
        let parsed = parse_command("notify \"disk is full\"").unwrap();
        assert_eq!(parsed, vec!["notify", "disk is full"]);
    }

    #[test]
    fn test_parse_command_unmatched_quote() {
        let result = parse_command("echo \"unmatched");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("failed to parse command"));
        assert!(err.to_string().contains("Fix:"));
    }

    #[test]
    fn test_parse_command_empty() {
        let result = parse_command("   ");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_command_label_uses_basename() {
        assert_eq!(command_label(&argv(&["/usr/bin/rsync", "-a"])), "rsync");
        assert_eq!(command_label(&argv(&["echo", "hi"])), "echo");
        assert_eq!(command_label(&[]), "command");
    }

    #[test]
    fn test_run_argv_success() {
        run_argv(&argv(&["true"]), None).unwrap();
    }

    #[test]
    fn test_run_argv_reports_exit_code() {
        let err = run_argv(&argv(&["false"]), None).unwrap_err();
        assert!(matches!(err, SolorunError::JobError(_)));
        assert!(err.to_string().contains("exited with code 1"));
    }

    #[test]
    fn test_run_argv_propagates_specific_code() {
        let err = run_argv(&argv(&["sh", "-c", "exit 3"]), None).unwrap_err();
        assert!(err.to_string().contains("exited with code 3"));
    }

    #[test]
    fn test_run_argv_missing_program() {
        let err = run_argv(&argv(&["no-such-program-solorun-test"]), None).unwrap_err();
        assert!(matches!(err, SolorunError::JobError(_)));
        assert!(err.to_string().contains("failed to execute"));
        assert!(err.to_string().contains("PATH"));
    }

    #[test]
    fn test_run_argv_honors_workdir() {
        let temp_dir = tempfile::TempDir::new().unwrap();

        run_argv(
            &argv(&["sh", "-c", "touch marker"]),
            Some(temp_dir.path()),
        )
        .unwrap();

        assert!(temp_dir.path().join("marker").exists());
    }

    #[test]
    fn test_run_argv_empty() {
        let result = run_argv(&[], None);
        assert!(result.is_err());
    }
}
