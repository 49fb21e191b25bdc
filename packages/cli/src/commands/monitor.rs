//! Monitor command implementation
//!
//! Redraws a fleet status table on an interval until Ctrl+C. One-shot mode
//! prints the table once and exits.

use super::connect_docker;
use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use console::style;
use runner_fleet_core::docker::{InstanceStatus, fleet_status};
use std::time::Duration;

/// Arguments for the monitor command
#[derive(Args)]
pub struct MonitorArgs {
    /// Refresh interval in seconds
    #[arg(long, default_value_t = 2)]
    pub interval: u64,

    /// Print the table once and exit
    #[arg(long)]
    pub once: bool,
}

/// Live fleet status table.
pub async fn cmd_monitor(args: &MonitorArgs, quiet: bool) -> Result<()> {
    let client = connect_docker().await?;
    let term = console::Term::stdout();

    if args.once {
        let rows = fleet_status(&client).await?;
        println!("{}", render_table(&rows));
        return Ok(());
    }

    if !quiet {
        eprintln!("{}", style("Monitoring fleet (Ctrl+C to exit)...").dim());
    }

    loop {
        let rows = fleet_status(&client).await?;

        term.clear_screen()?;
        println!("{}", render_table(&rows));
        if !quiet {
            println!();
            println!(
                "{}",
                style(format!(
                    "Refreshing every {}s. Ctrl+C to exit.",
                    args.interval
                ))
                .dim()
            );
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(args.interval)) => {}
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}

fn render_table(rows: &[InstanceStatus]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Instance", "Container", "State", "Uptime"]);

    for row in rows {
        let (state, uptime) = match &row.state {
            Some(state) => (state.state.clone(), format_uptime(state.started_at)),
            None => ("absent".to_string(), String::new()),
        };
        table.add_row(vec![
            Cell::new(row.id),
            Cell::new(&row.name),
            Cell::new(crate::output::state_style(&state)),
            Cell::new(uptime),
        ]);
    }

    table
}

fn format_uptime(started_at: Option<chrono::DateTime<chrono::Utc>>) -> String {
    let Some(started) = started_at else {
        return String::new();
    };
    let elapsed = chrono::Utc::now().signed_duration_since(started);
    let Ok(elapsed) = elapsed.to_std() else {
        return String::new();
    };
    // whole seconds keep the column stable between refreshes
    humantime::format_duration(Duration::from_secs(elapsed.as_secs())).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use runner_fleet_core::docker::InstanceId;

    #[test]
    fn absent_instances_render_without_uptime() {
        let rows = vec![InstanceStatus {
            id: InstanceId::new(1).unwrap(),
            name: "runner-fleet-1".to_string(),
            state: None,
        }];
        let rendered = render_table(&rows).to_string();
        assert!(rendered.contains("runner-fleet-1"));
        assert!(rendered.contains("absent"));
    }

    #[test]
    fn uptime_formats_whole_seconds() {
        let started = chrono::Utc::now() - chrono::Duration::seconds(90);
        let rendered = format_uptime(Some(started));
        assert!(rendered.contains("1m"), "got {rendered}");
    }

    #[test]
    fn future_start_time_renders_empty() {
        let started = chrono::Utc::now() + chrono::Duration::seconds(90);
        assert_eq!(format_uptime(Some(started)), "");
    }
}
