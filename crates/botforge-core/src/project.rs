use crate::action::SubsystemAction;
use crate::command::AtomicCommand;
use crate::error::{CoreError, Result};
use crate::group::{CommandGroup, Decorator, GroupChild, GroupKind, ParamPlaceholder};
use crate::io;
use crate::state::SubsystemState;
use crate::subsystem::Subsystem;
use crate::types::ParallelEnd;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Controllers
// ---------------------------------------------------------------------------

/// Button-to-command assignments ride along in the document so projects
/// round-trip losslessly; the compiler itself never reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonBinding {
    pub button: String,
    pub command: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controller {
    pub uuid: Uuid,
    pub name: String,
    #[serde(default)]
    pub port: u8,
    #[serde(default)]
    pub bindings: Vec<ButtonBinding>,
}

// ---------------------------------------------------------------------------
// CommandEntry
// ---------------------------------------------------------------------------

/// A project-level command: an atomic command or a named group. On the
/// wire this is a tagged union; the `kind` tag is `Atomic`,
/// `SequentialGroup`, or `ParallelGroup`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EntryWire", into = "EntryWire")]
pub enum CommandEntry {
    Atomic(AtomicCommand),
    Group(CommandGroup),
}

impl CommandEntry {
    pub fn uuid(&self) -> Uuid {
        match self {
            CommandEntry::Atomic(cmd) => cmd.uuid,
            CommandEntry::Group(group) => group.uuid,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            CommandEntry::Atomic(cmd) => &cmd.name,
            CommandEntry::Group(group) => group.name.as_deref().unwrap_or(""),
        }
    }

    pub fn as_atomic(&self) -> Option<&AtomicCommand> {
        match self {
            CommandEntry::Atomic(cmd) => Some(cmd),
            CommandEntry::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&CommandGroup> {
        match self {
            CommandEntry::Atomic(_) => None,
            CommandEntry::Group(group) => Some(group),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind")]
enum EntryWire {
    Atomic(AtomicCommand),
    SequentialGroup(GroupWire),
    ParallelGroup(ParallelGroupWire),
}

#[derive(Serialize, Deserialize)]
struct GroupWire {
    uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    children: Vec<GroupChild>,
    #[serde(default)]
    params: Vec<ParamPlaceholder>,
    #[serde(default)]
    decorators: Vec<Decorator>,
}

#[derive(Serialize, Deserialize)]
struct ParallelGroupWire {
    uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    end: ParallelEnd,
    #[serde(default)]
    children: Vec<GroupChild>,
    #[serde(default)]
    params: Vec<ParamPlaceholder>,
    #[serde(default)]
    decorators: Vec<Decorator>,
}

impl From<EntryWire> for CommandEntry {
    fn from(wire: EntryWire) -> Self {
        match wire {
            EntryWire::Atomic(cmd) => CommandEntry::Atomic(cmd),
            EntryWire::SequentialGroup(g) => CommandEntry::Group(CommandGroup {
                uuid: g.uuid,
                name: g.name,
                kind: GroupKind::Sequential,
                children: g.children,
                params: g.params,
                decorators: g.decorators,
            }),
            EntryWire::ParallelGroup(g) => CommandEntry::Group(CommandGroup {
                uuid: g.uuid,
                name: g.name,
                kind: GroupKind::Parallel { end: g.end },
                children: g.children,
                params: g.params,
                decorators: g.decorators,
            }),
        }
    }
}

impl From<CommandEntry> for EntryWire {
    fn from(entry: CommandEntry) -> Self {
        match entry {
            CommandEntry::Atomic(cmd) => EntryWire::Atomic(cmd),
            CommandEntry::Group(group) => {
                let CommandGroup {
                    uuid,
                    name,
                    kind,
                    children,
                    params,
                    decorators,
                } = group;
                match kind {
                    GroupKind::Sequential => EntryWire::SequentialGroup(GroupWire {
                        uuid,
                        name,
                        children,
                        params,
                        decorators,
                    }),
                    GroupKind::Parallel { end } => EntryWire::ParallelGroup(ParallelGroupWire {
                        uuid,
                        name,
                        end,
                        children,
                        params,
                        decorators,
                    }),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// LoadReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroppedEntry {
    pub location: String,
    pub reason: String,
}

/// Entries discarded during a tolerant load. The load itself succeeds;
/// callers decide whether to surface the drops.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    pub dropped: Vec<DroppedEntry>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub controllers: Vec<Controller>,
    #[serde(default)]
    pub subsystems: Vec<Subsystem>,
    #[serde(default)]
    pub commands: Vec<CommandEntry>,
}

const KNOWN_KINDS: [&str; 3] = ["Atomic", "SequentialGroup", "ParallelGroup"];

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Some(Utc::now()),
            updated_at: None,
            controllers: Vec::new(),
            subsystems: Vec::new(),
            commands: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Parses a project document. Command entries that fail to decode
    /// (unknown kind tag, malformed fields) are dropped into the report
    /// instead of failing the load; structural damage to the document
    /// itself is still an error.
    pub fn from_json_str(s: &str) -> Result<(Self, LoadReport)> {
        let mut value: Value = serde_json::from_str(s)?;
        let mut report = LoadReport::default();
        let Some(root) = value.as_object_mut() else {
            return Err(CoreError::MalformedProject(
                "document root is not an object".to_string(),
            ));
        };

        if let Some(commands) = root.get_mut("commands") {
            let Some(entries) = commands.as_array_mut() else {
                return Err(CoreError::MalformedProject(
                    "'commands' is not an array".to_string(),
                ));
            };
            filter_entries(entries, &mut report, "commands", check_command_entry);
        }

        if let Some(subsystems) = root.get_mut("subsystems") {
            let Some(list) = subsystems.as_array_mut() else {
                return Err(CoreError::MalformedProject(
                    "'subsystems' is not an array".to_string(),
                ));
            };
            for (i, subsystem) in list.iter_mut().enumerate() {
                let Some(commands) = subsystem.get_mut("commands") else {
                    continue;
                };
                let Some(entries) = commands.as_array_mut() else {
                    return Err(CoreError::MalformedProject(format!(
                        "subsystems[{i}].commands is not an array"
                    )));
                };
                let location = format!("subsystems[{i}].commands");
                filter_entries(entries, &mut report, &location, check_subsystem_command);
            }
        }

        let project: Project = serde_json::from_value(value)?;
        Ok((project, report))
    }

    pub fn load(path: &Path) -> Result<(Self, LoadReport)> {
        if !path.exists() {
            return Err(CoreError::ProjectNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.touch();
        let mut data = serde_json::to_string_pretty(self)?;
        data.push('\n');
        io::atomic_write(path, data.as_bytes())
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub fn subsystem(&self, id: Uuid) -> Option<&Subsystem> {
        self.subsystems.iter().find(|s| s.uuid == id)
    }

    pub fn subsystem_by_name(&self, name: &str) -> Option<&Subsystem> {
        self.subsystems.iter().find(|s| s.name == name)
    }

    pub fn find_action(&self, id: Uuid) -> Option<(&Subsystem, &SubsystemAction)> {
        self.subsystems
            .iter()
            .find_map(|s| s.action(id).map(|a| (s, a)))
    }

    pub fn find_state(&self, id: Uuid) -> Option<(&Subsystem, &SubsystemState)> {
        self.subsystems
            .iter()
            .find_map(|s| s.state(id).map(|st| (s, st)))
    }

    /// All atomic commands: project-level entries first, then each
    /// subsystem's own, in declaration order.
    pub fn atomic_commands(&self) -> impl Iterator<Item = &AtomicCommand> {
        self.commands
            .iter()
            .filter_map(CommandEntry::as_atomic)
            .chain(self.subsystems.iter().flat_map(|s| s.commands.iter()))
    }

    pub fn named_groups(&self) -> impl Iterator<Item = &CommandGroup> {
        self.commands.iter().filter_map(CommandEntry::as_group)
    }

    pub fn find_atomic(&self, id: Uuid) -> Option<&AtomicCommand> {
        self.atomic_commands().find(|c| c.uuid == id)
    }

    pub fn find_group(&self, id: Uuid) -> Option<&CommandGroup> {
        self.named_groups().find(|g| g.uuid == id)
    }
}

fn filter_entries(
    entries: &mut Vec<Value>,
    report: &mut LoadReport,
    location: &str,
    check: fn(&Value) -> std::result::Result<(), String>,
) {
    let mut index = 0usize;
    entries.retain(|entry| {
        let i = index;
        index += 1;
        match check(entry) {
            Ok(()) => true,
            Err(reason) => {
                report.dropped.push(DroppedEntry {
                    location: format!("{location}[{i}]"),
                    reason,
                });
                false
            }
        }
    });
}

fn check_command_entry(entry: &Value) -> std::result::Result<(), String> {
    match entry.get("kind").and_then(Value::as_str) {
        None => Err("missing kind tag".to_string()),
        Some(kind) if !KNOWN_KINDS.contains(&kind) => Err(format!("unknown kind '{kind}'")),
        Some(_) => serde_json::from_value::<CommandEntry>(entry.clone())
            .map(|_| ())
            .map_err(|e| e.to_string()),
    }
}

fn check_subsystem_command(entry: &Value) -> std::result::Result<(), String> {
    serde_json::from_value::<AtomicCommand>(entry.clone())
        .map(|_| ())
        .map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
