/// Operator commands understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Status,
    ListStatus,
    ProxyStatus,
    PlotProcessingTime,
    PlotAvailability,
    GetData,
    GetLog,
    GetConfig,
    SetConfig,
    Reboot,
    Terminate,
    Help,
}

/// (command name, description) pair used for help and registration listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub kind: CommandKind,
    pub name: &'static str,
    pub description: &'static str,
}

/// Ordered command listing.
pub const COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor { kind: CommandKind::Status, name: "status", description: "retrieve the most recent check" },
    CommandDescriptor { kind: CommandKind::ListStatus, name: "liststatus", description: "retrieve the statuses over the past report interval" },
    CommandDescriptor { kind: CommandKind::ProxyStatus, name: "proxystatus", description: "retrieve the current proxy status" },
    CommandDescriptor { kind: CommandKind::PlotProcessingTime, name: "plotprocessingtime", description: "plot the processing time over time" },
    CommandDescriptor { kind: CommandKind::PlotAvailability, name: "plotavailability", description: "plot the availability over time" },
    CommandDescriptor { kind: CommandKind::GetData, name: "getdata", description: "get the collected data as a CSV file" },
    CommandDescriptor { kind: CommandKind::GetLog, name: "getlog", description: "get the log file as a TXT file" },
    CommandDescriptor { kind: CommandKind::GetConfig, name: "getconfig", description: "get the configuration file" },
    CommandDescriptor { kind: CommandKind::SetConfig, name: "setconfig", description: "set the configuration file to the attachment (requires reboot)" },
    CommandDescriptor { kind: CommandKind::Reboot, name: "reboot", description: "reboot the host" },
    CommandDescriptor { kind: CommandKind::Terminate, name: "terminate", description: "terminate the monitor (it can no longer be accessed via Telegram!)" },
    CommandDescriptor { kind: CommandKind::Help, name: "help", description: "show this command listing" },
];

impl CommandKind {
    /// Case-insensitive lookup by command name (without the slash).
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        COMMANDS.iter().find(|c| c.name == lower).map(|c| c.kind)
    }

    pub fn descriptor(self) -> &'static CommandDescriptor {
        COMMANDS
            .iter()
            .find(|c| c.kind == self)
            .unwrap_or(&COMMANDS[0])
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }
}

/// Render the `name - description` listing, one command per line.
pub fn render_listing(header: &str) -> String {
    let mut text = format!("{}\n", header);
    for cmd in COMMANDS {
        text.push_str(&format!("{} - {}\n", cmd.name, cmd.description));
    }
    text
}
