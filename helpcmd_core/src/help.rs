//! Built-in help: category descriptions and the long-form help topics.

use std::fmt;

const RULE_WIDTH: usize = 67;

/// One-line description of a catalog category, matched case-insensitively.
pub fn category_description(category: &str) -> Option<&'static str> {
    let description = match category.trim().to_lowercase().as_str() {
        "system" => "General system settings, services, hardware information and OS management.",
        "network" => "Network diagnostics and configuration: connections, IP, DNS, firewall and connectivity.",
        "users" | "user" => "User accounts, permissions, passwords, groups and security policies.",
        "internet" => "Browsing, proxy and web connectivity settings.",
        "tools" => "Assorted utilities such as terminals, text editors, calculators and capture tools.",
        "disk" => "Disks and partitions: formatting, error checks and hardware diagnostics.",
        "programs" => "Installing, removing and managing applications and OS features.",
        "power" => "Power plans, battery and performance monitoring.",
        "personalization" => "Themes, appearance, sounds, mouse, keyboard and visual settings.",
        "date/time" => "Date, time, time zone and time server synchronization.",
        "backup" => "File backup, system restore and restore points.",
        "accessibility" => "Narrator, magnifier, on-screen keyboard and high contrast.",
        "logs" => "System and kernel logs for troubleshooting.",
        _ => return None,
    };
    Some(description)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Guide,
    Troubleshooting,
    About,
}

impl HelpTopic {
    pub const ALL: [HelpTopic; 3] = [HelpTopic::Guide, HelpTopic::Troubleshooting, HelpTopic::About];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "guide" | "usage" => Some(HelpTopic::Guide),
            "troubleshooting" | "problems" => Some(HelpTopic::Troubleshooting),
            "about" => Some(HelpTopic::About),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HelpTopic::Guide => "guide",
            HelpTopic::Troubleshooting => "troubleshooting",
            HelpTopic::About => "about",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            HelpTopic::Guide => "How to browse, run and audit commands",
            HelpTopic::Troubleshooting => "Common problems and what to do about them",
            HelpTopic::About => "What this tool is and what it records",
        }
    }

    pub fn text(&self) -> String {
        let body = match self {
            HelpTopic::Guide => GUIDE,
            HelpTopic::Troubleshooting => TROUBLESHOOTING,
            HelpTopic::About => ABOUT,
        };
        let rule = "=".repeat(RULE_WIDTH);
        let title = match self {
            HelpTopic::Guide => "USAGE GUIDE - HELP COMMANDS".to_string(),
            HelpTopic::Troubleshooting => "TROUBLESHOOTING".to_string(),
            HelpTopic::About => format!("ABOUT - HELP COMMANDS {}", crate::get_version()),
        };
        format!("{}\n{}\n{}\n{}\n{}\n", rule, title, rule, body.trim(), rule)
    }
}

impl fmt::Display for HelpTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const GUIDE: &str = r#"
Runs support commands for this operating system quickly and consistently,
for remote assistance, quick access to system settings and diagnostics.

BROWSING
  helpcmd list                      every command, grouped categories below
  helpcmd list --category Network   one category
  helpcmd list --search dns         search key, name, description, category
  helpcmd show R2                   full details of one command

RUNNING
  helpcmd run R2                    run a catalog command
  helpcmd exec "ls -la /var/log"    run any command line through the shell
  helpcmd exec --admin "..."        same, asking for administrator rights

  Commands marked A need administrator rights. helpcmd asks the system for
  them (sudo, or the UAC prompt on Windows). If that is refused or not
  possible, the command still runs without them and the output says so.
  Commands marked ! are critical: you must type CONFIRM before they run.

FAVORITES AND HISTORY
  helpcmd favorite add R2           mark a command (* in listings)
  helpcmd history                   newest first
  helpcmd history --export FILE     text report; export before --clear

SETTINGS
  config.json in the data directory: confirm_critical, show_admin_warnings,
  elevation_tool, history_limit, log_file.

SAFETY
  Never run commands you do not understand. Every run is logged.
"#;

const TROUBLESHOOTING: &str = r#"
COMMAND DOES NOTHING
  The command may need administrator rights: accept the sudo or UAC prompt,
  read the Errors section of the output, and check helpcmd.log.

"ACCESS DENIED" / "PERMISSION DENIED"
  Elevation was refused or unavailable, so the command ran without it.
  Start helpcmd from an administrator or root shell and try again.

COMMAND FOUND BUT THE TOOL DOES NOT OPEN
  The tool may not exist on this edition or distribution (gpedit.msc is
  missing on Windows Home, GNOME tools are missing on other desktops).

SEARCH FINDS NOTHING
  Check the spelling, use a broader term, or list one category.

NO UAC PROMPT ON WINDOWS
  UAC may be disabled. Run helpcmd as administrator from the start.

"ELEVATION UNAVAILABLE" ON LINUX
  The elevation tool (sudo by default) is not on PATH. Install it or set
  elevation_tool in config.json.

HISTORY OR FAVORITES NOT SAVED
  Check write permissions on the data directory. An unreadable history.json
  is kept as history.json.bak and a fresh history is started.

LOG FILE TOO LARGE
  helpcmd.log can be deleted or moved; it is recreated on the next run.
"#;

const ABOUT: &str = r#"
Help Commands: a support panel for running system commands.

  Built-in catalogs for Windows and Linux, search and categories,
  favorites, execution history with text export, automatic privilege
  elevation with graceful fallback, confirmation of critical commands,
  persistent settings and full logging.

  Every command is logged. Critical commands require confirmation.
  Nothing is sent over the network.

  Use at your own risk: run only commands you fully understand. Some
  commands make permanent changes to the system.
"#;
