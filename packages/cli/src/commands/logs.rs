//! Logs command implementation
//!
//! Streams container logs for one instance or the whole fleet, with
//! optional filtering, timestamps, and follow mode.

use super::connect_docker;
use crate::output::log_level_style;
use anyhow::{Result, anyhow};
use clap::Args;
use console::style;
use futures_util::StreamExt;
use runner_fleet_core::bollard::container::LogOutput;
use runner_fleet_core::bollard::query_parameters::LogsOptions;
use runner_fleet_core::docker::{
    InstanceId, container_exists, container_is_running, container_name,
};
use runner_fleet_core::DockerClient;
use std::pin::Pin;

/// Arguments for the logs command
#[derive(Args)]
pub struct LogsArgs {
    /// Instance to stream (1-4); default: the whole fleet
    pub instance: Option<String>,

    /// Number of lines to show (default: 50)
    #[arg(short = 'n', long = "lines", default_value = "50")]
    pub lines: String,

    /// Don't follow (one-shot dump)
    #[arg(long = "no-follow")]
    pub no_follow: bool,

    /// Prefix with timestamps
    #[arg(long)]
    pub timestamps: bool,

    /// Filter lines containing pattern
    #[arg(long)]
    pub grep: Option<String>,
}

type PrefixedLogStream = Pin<
    Box<
        dyn futures_util::Stream<
            Item = (
                Option<String>,
                Result<LogOutput, runner_fleet_core::bollard::errors::Error>,
            ),
        >,
    >,
>;

/// Stream logs from the fleet.
///
/// By default, shows the last 50 lines per instance and follows new output.
/// With a selector, only that instance is streamed and no prefix is added.
/// In quiet mode, outputs raw lines without status messages or colors.
pub async fn cmd_logs(args: &LogsArgs, quiet: bool) -> Result<()> {
    // Selector validation happens before connecting to Docker
    let selected = args
        .instance
        .as_deref()
        .map(InstanceId::parse)
        .transpose()
        .map_err(|e| anyhow!("{e}"))?;

    let client = connect_docker().await?;

    let targets: Vec<InstanceId> = match selected {
        Some(id) => vec![id],
        None => InstanceId::all().collect(),
    };

    let follow = !args.no_follow;
    let options = LogsOptions {
        stdout: true,
        stderr: true,
        follow,
        tail: args.lines.clone(),
        timestamps: args.timestamps,
        ..Default::default()
    };

    // With a single target the prefix is omitted; with the whole fleet each
    // line says which instance it came from.
    let prefixed = targets.len() > 1;
    let mut streams: Vec<PrefixedLogStream> = Vec::new();
    let mut found = 0usize;

    for id in targets {
        let name = container_name(id);
        if !container_exists(&client, &name)
            .await
            .map_err(|e| anyhow!("{e}"))?
        {
            if selected.is_some() {
                return Err(anyhow!(
                    "No container for instance {id}. Run '{}' first.",
                    style("runner-fleet up").cyan()
                ));
            }
            continue;
        }
        found += 1;

        let prefix = prefixed.then(|| format!("[{}] ", style(&name).cyan()));
        let stream = client
            .inner()
            .logs(&name, Some(options.clone()))
            .map(move |item| (prefix.clone(), item));
        streams.push(Box::pin(stream));
    }

    if found == 0 {
        return Err(anyhow!(
            "No fleet containers found. Run '{}' first.",
            style("runner-fleet up").cyan()
        ));
    }

    if !quiet && follow {
        eprintln!("{}", style("Following logs (Ctrl+C to exit)...").dim());
        eprintln!();
    }

    let mut merged = futures_util::stream::select_all(streams);
    while let Some((prefix, result)) = merged.next().await {
        match result {
            Ok(output) => {
                if let Some(line) = log_output_to_line(output) {
                    emit_log_line(&line, args, prefix.as_deref(), quiet);
                }
            }
            Err(_) => {
                // Stream error - check if the container stopped underneath us
                if follow && !quiet && !any_running(&client).await {
                    eprintln!();
                    eprintln!("{}", style("Container stopped").dim());
                }
                break;
            }
        }
    }

    Ok(())
}

async fn any_running(client: &DockerClient) -> bool {
    for id in InstanceId::all() {
        if container_is_running(client, &container_name(id))
            .await
            .unwrap_or(false)
        {
            return true;
        }
    }
    false
}

fn log_output_to_line(output: LogOutput) -> Option<String> {
    match output {
        LogOutput::StdOut { message } | LogOutput::StdErr { message } => {
            Some(String::from_utf8_lossy(&message).to_string())
        }
        _ => None,
    }
}

fn emit_log_line(line: &str, args: &LogsArgs, prefix: Option<&str>, quiet: bool) {
    if let Some(pattern) = args.grep.as_deref()
        && !line.contains(pattern)
    {
        return;
    }

    if !quiet && console::colors_enabled() {
        print_styled_line(line, prefix);
    } else {
        print_line(line, prefix);
    }
}

/// Print a log line, ensuring newline at end
fn print_line(line: &str, prefix: Option<&str>) {
    let output = match prefix {
        Some(p) => format!("{p}{line}"),
        None => line.to_string(),
    };
    if output.ends_with('\n') {
        print!("{output}");
    } else {
        println!("{output}");
    }
}

/// Print a styled log line based on log level
fn print_styled_line(line: &str, prefix: Option<&str>) {
    let styled = log_level_style(line);
    let output = match prefix {
        Some(p) => format!("{p}{styled}"),
        None => styled.to_string(),
    };
    if output.ends_with('\n') {
        print!("{output}");
    } else {
        println!("{output}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with_grep(grep: Option<&str>) -> LogsArgs {
        LogsArgs {
            instance: None,
            lines: "50".to_string(),
            no_follow: false,
            timestamps: false,
            grep: grep.map(String::from),
        }
    }

    #[test]
    fn grep_filter_logic() {
        let args = args_with_grep(Some("ERROR"));
        let pattern = args.grep.as_deref().unwrap();
        assert!("2026-01-01 ERROR: job failed".contains(pattern));
        assert!(!"2026-01-01 INFO: listening".contains(pattern));
    }

    #[test]
    fn stdout_and_stderr_become_lines() {
        let out = LogOutput::StdOut {
            message: "hello\n".into(),
        };
        assert_eq!(log_output_to_line(out).as_deref(), Some("hello\n"));

        let err = LogOutput::StdErr {
            message: "oops".into(),
        };
        assert_eq!(log_output_to_line(err).as_deref(), Some("oops"));
    }

    #[test]
    fn follow_mode_from_no_follow_flag() {
        let mut args = args_with_grep(None);
        assert!(!args.no_follow);
        args.no_follow = true;
        assert!(args.no_follow);
    }
}
