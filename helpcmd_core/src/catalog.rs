//! Read-only command catalogs: the built-in Linux and Windows sets and
//! operator-supplied YAML files.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::platform::OsFamily;
use crate::types::CommandSpec;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Duplicate command key: {0}")]
    DuplicateKey(String),

    #[error("Command '{0}' has an empty command string")]
    EmptyCommand(String),
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    commands: Vec<CommandSpec>,
}

impl Catalog {
    /// Build a catalog, rejecting keys that collide case-insensitively.
    pub fn new(commands: Vec<CommandSpec>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for cmd in &commands {
            if !seen.insert(cmd.key.trim().to_uppercase()) {
                return Err(CatalogError::DuplicateKey(cmd.key.clone()));
            }
            if cmd.command.trim().is_empty() {
                return Err(CatalogError::EmptyCommand(cmd.key.clone()));
            }
        }
        Ok(Self { commands })
    }

    /// The built-in catalog for `family`. POSIX hosts other than Linux share
    /// the Linux set.
    pub fn builtin(family: OsFamily) -> Self {
        let commands = match family {
            OsFamily::Windows => windows_commands(),
            OsFamily::Linux | OsFamily::MacOs | OsFamily::Unknown => linux_commands(),
        };
        Self { commands }
    }

    pub fn load_yaml(path: &Path) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let commands: Vec<CommandSpec> = serde_yaml::from_reader(reader)?;
        Self::new(commands)
    }

    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&CommandSpec> {
        self.commands.iter().find(|c| c.matches_key(key))
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for cmd in &self.commands {
            if !out.contains(&cmd.category.as_str()) {
                out.push(&cmd.category);
            }
        }
        out
    }

    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a CommandSpec> + 'a {
        self.commands
            .iter()
            .filter(move |c| c.category.eq_ignore_ascii_case(category))
    }

    /// Case-insensitive substring search over key, name, description and
    /// category.
    pub fn search(&self, term: &str) -> Vec<&CommandSpec> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.commands.iter().collect();
        }
        self.commands
            .iter()
            .filter(|c| {
                [&c.key, &c.name, &c.description, &c.category]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }
}

fn linux_commands() -> Vec<CommandSpec> {
    vec![
        CommandSpec::new("1", "System Settings (GNOME)", "gnome-control-center", "System")
            .description("Opens the GNOME settings panel."),
        CommandSpec::new("2", "System Monitor", "gnome-system-monitor", "System")
            .description("Processes, resources and disks at a glance."),
        CommandSpec::new("3", "Service Status (systemd)", "systemctl status", "System")
            .description("Shows the status of all system services."),
        CommandSpec::new("4", "Hardware Summary", "lshw -short", "System")
            .description("Short listing of the system's hardware.")
            .admin(),
        CommandSpec::new("5", "Disk Usage", "df -h", "System")
            .description("Space used on every mounted partition."),
        CommandSpec::new("6", "Running Processes", "ps aux", "System")
            .description("Lists every running process."),
        CommandSpec::new("7", "Top", "gnome-terminal -- top", "System")
            .description("Interactive process and resource monitor."),
        CommandSpec::new("8", "Reboot", "systemctl reboot", "System")
            .description("Restarts the machine immediately.")
            .admin()
            .critical(),
        CommandSpec::new("R1", "Network Connections", "nm-connection-editor", "Network")
            .description("NetworkManager connection editor."),
        CommandSpec::new("R2", "Connectivity Test (ping)", "ping -c 4 8.8.8.8", "Network")
            .description("Sends four ICMP echo requests to a public resolver."),
        CommandSpec::new("R3", "Interfaces (ifconfig)", "ifconfig", "Network")
            .description("Legacy interface configuration listing."),
        CommandSpec::new("R4", "Interfaces (ip addr)", "ip addr show", "Network")
            .description("Addresses assigned to every interface."),
        CommandSpec::new("R5", "Firewall Status (UFW)", "ufw status", "Network")
            .description("Shows whether UFW is active and its rules.")
            .admin(),
        CommandSpec::new("R6", "Listening Sockets", "netstat -tulpn", "Network")
            .description("Open TCP/UDP ports with owning processes.")
            .admin(),
        CommandSpec::new("U1", "User Accounts", "gnome-control-center user-accounts", "Users")
            .description("Manage local user accounts."),
        CommandSpec::new("U2", "List Users", "cat /etc/passwd", "Users")
            .description("Every account known to the system."),
        CommandSpec::new("U3", "Logged-in Users", "who", "Users")
            .description("Users with an active session."),
        CommandSpec::new("P1", "Software Center", "gnome-software", "Programs")
            .description("Install and remove applications."),
        CommandSpec::new("P2", "Update System (APT)", "sh -c 'apt update && apt upgrade -y'", "Programs")
            .description("Refreshes package lists and installs upgrades.")
            .admin()
            .critical(),
        CommandSpec::new("P3", "Installed Packages", "dpkg -l", "Programs")
            .description("Lists installed Debian packages."),
        CommandSpec::new("T1", "Terminal", "gnome-terminal", "Tools"),
        CommandSpec::new("T2", "Text Editor", "gedit", "Tools"),
        CommandSpec::new("T3", "File Manager", "nautilus", "Tools"),
        CommandSpec::new("T4", "Calculator", "gnome-calculator", "Tools"),
        CommandSpec::new("T5", "Screenshot", "gnome-screenshot -i", "Tools"),
        CommandSpec::new("D1", "Disks Utility", "gnome-disks", "Disk")
            .description("Partitions, SMART data and disk images."),
        CommandSpec::new("D2", "Home Usage by Folder", "du -h --max-depth=1 /home", "Disk")
            .description("Space taken by each home directory."),
        CommandSpec::new("E1", "Power Settings", "gnome-control-center power", "Power"),
        CommandSpec::new("L1", "System Journal", "journalctl -xe --no-pager", "Logs")
            .description("Recent journal entries with explanations."),
        CommandSpec::new("L2", "Kernel Messages", "dmesg", "Logs")
            .description("Kernel ring buffer."),
    ]
}

fn windows_commands() -> Vec<CommandSpec> {
    vec![
        CommandSpec::new("1", "Control Panel", "control", "System"),
        CommandSpec::new("2", "System Information", "msinfo32", "System")
            .description("Hardware resources, components and software environment."),
        CommandSpec::new("3", "Services", "services.msc", "System"),
        CommandSpec::new("4", "Task Manager", "taskmgr", "System"),
        CommandSpec::new("5", "System File Checker", "sfc /scannow", "System")
            .description("Scans and repairs protected system files.")
            .admin()
            .critical(),
        CommandSpec::new("6", "Restart Now", "shutdown /r /t 0", "System")
            .description("Restarts the machine immediately.")
            .critical(),
        CommandSpec::new("R1", "IP Configuration", "ipconfig /all", "Network")
            .description("Full adapter configuration."),
        CommandSpec::new("R2", "Connectivity Test (ping)", "ping -n 4 8.8.8.8", "Network"),
        CommandSpec::new("R3", "Flush DNS Cache", "ipconfig /flushdns", "Network")
            .admin(),
        CommandSpec::new("R4", "Reset Winsock", "netsh winsock reset", "Network")
            .description("Resets the Winsock catalog; requires a reboot.")
            .admin()
            .critical(),
        CommandSpec::new("R5", "Active Connections", "netstat -ano", "Network"),
        CommandSpec::new("U1", "User Accounts", "netplwiz", "Users"),
        CommandSpec::new("U2", "Local Users", "net user", "Users"),
        CommandSpec::new("P1", "Programs and Features", "appwiz.cpl", "Programs"),
        CommandSpec::new("P2", "Group Policy Update", "gpupdate /force", "Programs")
            .admin(),
        CommandSpec::new("D1", "Disk Management", "diskmgmt.msc", "Disk"),
        CommandSpec::new("D2", "Disk Cleanup", "cleanmgr", "Disk"),
        CommandSpec::new("D3", "Check Disk (read-only)", "chkdsk", "Disk")
            .admin(),
        CommandSpec::new("L1", "Event Viewer", "eventvwr.msc", "Logs"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_keys_are_unique() {
        for family in [OsFamily::Linux, OsFamily::Windows] {
            let builtin = Catalog::builtin(family);
            assert!(Catalog::new(builtin.commands().to_vec()).is_ok());
            assert!(!builtin.is_empty());
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = Catalog::builtin(OsFamily::Linux);
        let spec = catalog.get("r5").expect("R5 exists");
        assert_eq!(spec.key, "R5");
        assert!(spec.requires_admin);
        assert!(catalog.get(" r5 ").is_some());
        assert!(catalog.get("ZZ").is_none());
    }

    #[test]
    fn test_categories_in_first_seen_order() {
        let catalog = Catalog::builtin(OsFamily::Linux);
        let categories = catalog.categories();
        assert_eq!(categories[0], "System");
        assert_eq!(categories[1], "Network");
        assert_eq!(catalog.by_category("network").count(), 6);
    }

    #[test]
    fn test_search_matches_any_field() {
        let catalog = Catalog::builtin(OsFamily::Windows);
        let hits = catalog.search("DNS");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "R3");
        assert_eq!(catalog.search("").len(), catalog.len());
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let result = Catalog::new(vec![
            CommandSpec::new("a1", "One", "true", "X"),
            CommandSpec::new("A1", "Two", "true", "X"),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateKey(_))));
    }

    #[test]
    fn test_load_yaml_catalog() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "- key: K1\n  name: Kernel\n  command: uname -a\n  category: System\n- key: K2\n  name: Wipe\n  command: rm -rf /tmp/scratch\n  category: Disk\n  requires_admin: true\n  is_critical: true"
        )
        .unwrap();
        file.flush().unwrap();

        let catalog = Catalog::load_yaml(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        let wipe = catalog.get("k2").unwrap();
        assert!(wipe.requires_admin && wipe.is_critical);
        assert_eq!(catalog.get("K1").unwrap().description, "No description available.");
    }

    #[test]
    fn test_load_yaml_rejects_empty_command() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "- key: K1\n  name: Nothing\n  command: ''\n  category: System").unwrap();
        file.flush().unwrap();
        assert!(matches!(
            Catalog::load_yaml(file.path()),
            Err(CatalogError::EmptyCommand(_))
        ));
    }
}
