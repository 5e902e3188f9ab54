//! Plain-text rendering of catalog listings and execution outcomes.

use helpcmd_core::catalog::Catalog;
use helpcmd_core::help::{category_description, HelpTopic};
use helpcmd_core::history::HistoryEntry;
use helpcmd_core::platform::HostContext;
use helpcmd_core::{CommandSpec, ElevationPath, ExecutionOutcome};
use std::fmt::Write as _;

/// Markers column: `A` needs admin, `!` critical, `*` favorite.
fn markers(spec: &CommandSpec, favorite: bool) -> String {
    let mut out = String::new();
    out.push(if spec.requires_admin { 'A' } else { ' ' });
    out.push(if spec.is_critical { '!' } else { ' ' });
    out.push(if favorite { '*' } else { ' ' });
    out
}

pub fn render_table<F>(commands: &[&CommandSpec], is_favorite: F) -> String
where
    F: Fn(&str) -> bool,
{
    if commands.is_empty() {
        return "No commands found.\n".to_string();
    }

    let key_w = commands.iter().map(|c| c.key.len()).max().unwrap_or(3).max(3);
    let name_w = commands.iter().map(|c| c.name.chars().count()).max().unwrap_or(4).max(4);

    let mut out = String::new();
    let _ = writeln!(out, "{:<key_w$}  {:<name_w$}  {:<3}  CATEGORY", "KEY", "NAME", "");
    for cmd in commands {
        let _ = writeln!(
            out,
            "{:<key_w$}  {:<name_w$}  {}  {}",
            cmd.key,
            cmd.name,
            markers(cmd, is_favorite(&cmd.key)),
            cmd.category
        );
    }
    let _ = writeln!(out, "\nA = requires administrator, ! = asks for confirmation, * = favorite");
    out
}

/// Categories in catalog order with their command count and description.
pub fn render_categories(catalog: &Catalog) -> String {
    let categories = catalog.categories();
    let width = categories.iter().map(|c| c.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    let _ = writeln!(out, "Categories:");
    for category in categories {
        let count = catalog.by_category(category).count();
        let _ = writeln!(
            out,
            "  {:<width$}  {:>3}  {}",
            category,
            count,
            category_description(category).unwrap_or("")
        );
    }
    out
}

/// Topic text, or the topic list when `topic` is `None`.
pub fn render_topic(topic: Option<HelpTopic>) -> String {
    match topic {
        Some(topic) => topic.text(),
        None => {
            let mut out = String::from("Help topics:\n");
            for topic in HelpTopic::ALL {
                let _ = writeln!(out, "  {:<16} {}", topic.name(), topic.summary());
            }
            out
        }
    }
}

pub fn render_details(spec: &CommandSpec, favorite: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}] {}", spec.key, spec.name);
    let _ = writeln!(out, "Category:    {}", spec.category);
    let _ = writeln!(out, "Command:     {}", spec.command);
    let _ = writeln!(out, "Description: {}", spec.description);
    let _ = writeln!(out, "Admin:       {}", yes_no(spec.requires_admin));
    let _ = writeln!(out, "Critical:    {}", yes_no(spec.is_critical));
    let _ = writeln!(out, "Favorite:    {}", yes_no(favorite));
    out
}

pub fn render_host(host: &HostContext, strategy: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "OS family:  {}", host.platform.family);
    let _ = writeln!(out, "Version:    {}", host.platform.version);
    let _ = writeln!(out, "Elevated:   {}", yes_no(host.elevated));
    let _ = writeln!(out, "Elevation:  {}", strategy);
    out
}

pub fn render_outcome(outcome: &ExecutionOutcome) -> String {
    let mut out = String::new();

    if outcome.is_cancelled() {
        let _ = writeln!(out, "Execution cancelled by operator.");
        return out;
    }

    match &outcome.elevation {
        ElevationPath::None => {}
        ElevationPath::ElevatedSucceeded => {
            let _ = writeln!(out, "Ran with administrator privileges.");
        }
        ElevationPath::ElevatedLaunchedDetached => {
            let _ = writeln!(
                out,
                "Launched with administrator privileges in a separate window; exit code unavailable."
            );
            return out;
        }
        ElevationPath::ElevatedFailedFellBack(reason) => {
            let _ = writeln!(out, "{}. Ran without administrator privileges.", reason);
        }
    }

    if !outcome.stdout.is_empty() {
        let _ = writeln!(out, "Output:\n{}", outcome.stdout.trim_end());
    }
    if !outcome.stderr.is_empty() {
        let _ = writeln!(out, "Errors:\n{}", outcome.stderr.trim_end());
    }

    match (&outcome.exit_code, &outcome.error) {
        (Some(0), _) => {
            let _ = writeln!(out, "Command completed successfully.");
        }
        (Some(code), _) => {
            let _ = writeln!(out, "Exit code: {}", code);
        }
        (None, Some(error)) => {
            let _ = writeln!(out, "Error: {}", error);
        }
        (None, None) => {}
    }
    out
}

pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "History is empty.\n".to_string();
    }
    let mut out = String::new();
    for entry in entries.iter().rev() {
        let _ = writeln!(
            out,
            "{}  {:<6} {:<7} {}",
            entry.timestamp,
            entry.command_key,
            if entry.success { "ok" } else { "failed" },
            entry.command_name
        );
    }
    out
}

/// Process exit status for the CLI: 0 for success or a detached elevated
/// launch, 1 otherwise.
pub fn exit_status(outcome: &ExecutionOutcome) -> u8 {
    if outcome.success || outcome.is_detached() {
        0
    } else {
        1
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
