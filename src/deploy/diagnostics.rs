//! Post-failure diagnostics.
//!
//! When a deploy fails the interesting details are usually in the
//! application server's own log, not in the deploy tool's output.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::deploy::process::DeployOutcome;

/// Location of the default domain's server log under `GLASSFISH_HOME`.
pub fn server_log_path(glassfish_home: &str) -> PathBuf {
    Path::new(glassfish_home)
        .join("glassfish")
        .join("domains")
        .join("domain1")
        .join("logs")
        .join("server.log")
}

/// Last `n` lines of `text`.
pub fn tail_lines(text: &str, n: usize) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].to_vec()
}

/// Log the deploy command's captured output, one event per line.
pub fn log_outcome(outcome: &DeployOutcome) {
    for line in outcome.stdout.lines() {
        tracing::info!(stream = "stdout", "{}", line);
    }
    for line in outcome.stderr.lines() {
        if outcome.success {
            tracing::info!(stream = "stderr", "{}", line);
        } else {
            tracing::error!(stream = "stderr", "{}", line);
        }
    }
    tracing::info!(code = ?outcome.code, success = outcome.success, "Deploy command finished");
}

/// Last `n` lines of the server log. Invalid UTF-8 is replaced, not fatal.
pub fn read_server_log_tail(path: &Path, n: usize) -> io::Result<Vec<String>> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(tail_lines(&text, n).into_iter().map(str::to_string).collect())
}

/// Dump the tail of the server log, if it can be found.
pub fn log_server_log_tail(glassfish_home: &str, n: usize) {
    if n == 0 {
        return;
    }
    let path = server_log_path(glassfish_home);
    match read_server_log_tail(&path, n) {
        Ok(lines) => {
            tracing::error!(path = %path.display(), lines = n, "Application server log tail follows");
            for line in lines {
                tracing::error!(source = "server.log", "{}", line);
            }
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not read application server log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_log_lives_under_domain1() {
        assert_eq!(
            server_log_path("/opt/glassfish4"),
            PathBuf::from("/opt/glassfish4/glassfish/domains/domain1/logs/server.log")
        );
    }

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail_lines("a\nb\nc\nd\n", 2), vec!["c", "d"]);
        assert_eq!(tail_lines("a\nb", 10), vec!["a", "b"]);
        assert!(tail_lines("", 3).is_empty());
    }

    #[test]
    fn tail_survives_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.log");
        fs::write(&path, b"boot\nbad \xff byte\nSEVERE: deploy failed\n").unwrap();

        let lines = read_server_log_tail(&path, 2).unwrap();

        assert_eq!(lines, vec!["bad \u{fffd} byte", "SEVERE: deploy failed"]);
    }
}
