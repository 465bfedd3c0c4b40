use crate::command::AtomicCommand;
use crate::error::{CoreError, Result};
use crate::ident;
use crate::project::Project;
use crate::state::SubsystemState;
use crate::subsystem::Subsystem;
use crate::types::ParallelEnd;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Placeholders and invocation arguments
// ---------------------------------------------------------------------------

/// Call option a lifted placeholder originally came from, kept so the
/// emitter can recover its declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamOrigin {
    pub command: Uuid,
    pub param: Uuid,
}

/// A named parameter slot on a command group, forwarded down to nested
/// invocations by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamPlaceholder {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<ParamOrigin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvocationArg {
    Placeholder { name: String },
    Literal { value: String },
}

impl InvocationArg {
    pub fn placeholder(param: &ParamRef) -> Self {
        InvocationArg::Placeholder {
            name: param.name().to_string(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        InvocationArg::Placeholder { name: name.into() }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        InvocationArg::Literal {
            value: value.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Decorators
// ---------------------------------------------------------------------------

/// Condition a decorator tests: a subsystem state predicate or a group
/// placeholder bound to a boolean supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditionRef {
    State { subsystem: Uuid, state: Uuid },
    Placeholder { name: String },
}

/// Post-hoc modifier on an invocation or group. Applied strictly in the
/// order attached; reordering changes behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decorator {
    Duration { seconds: f64 },
    Until { cond: ConditionRef },
    Unless { cond: ConditionRef },
    Repeat,
}

// ---------------------------------------------------------------------------
// Tree nodes
// ---------------------------------------------------------------------------

/// Leaf node: a call to an existing atomic command or named group.
/// `subsystems` caches the requirement set when known at build time; an
/// empty cache is resolved lazily through the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandInvocation {
    pub uuid: Uuid,
    #[serde(default)]
    pub subsystems: Vec<Uuid>,
    pub command: Uuid,
    #[serde(default)]
    pub args: Vec<InvocationArg>,
    #[serde(default)]
    pub decorators: Vec<Decorator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum GroupChild {
    Invocation(CommandInvocation),
    Group(CommandGroup),
}

impl GroupChild {
    pub fn uuid(&self) -> Uuid {
        match self {
            GroupChild::Invocation(inv) => inv.uuid,
            GroupChild::Group(group) => group.uuid,
        }
    }

    pub fn decorators(&self) -> &[Decorator] {
        match self {
            GroupChild::Invocation(inv) => &inv.decorators,
            GroupChild::Group(group) => &group.decorators,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroupKind {
    Sequential,
    Parallel { end: ParallelEnd },
}

/// A sequential or parallel composition of commands. Named groups live at
/// the project's top level; anonymous groups only appear nested inside
/// another group's children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandGroup {
    pub uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: GroupKind,
    #[serde(default)]
    pub children: Vec<GroupChild>,
    #[serde(default)]
    pub params: Vec<ParamPlaceholder>,
    #[serde(default)]
    pub decorators: Vec<Decorator>,
}

impl CommandGroup {
    pub fn named(name: impl Into<String>, kind: GroupKind) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: Some(name.into()),
            kind,
            children: Vec::new(),
            params: Vec::new(),
            decorators: Vec::new(),
        }
    }

    pub fn anonymous(kind: GroupKind) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: None,
            kind,
            children: Vec::new(),
            params: Vec::new(),
            decorators: Vec::new(),
        }
    }

    pub fn method_name(&self) -> Option<String> {
        self.name.as_deref().map(ident::lower_camel)
    }

    pub fn placeholder(&self, name: &str) -> Option<&ParamPlaceholder> {
        self.params.iter().find(|p| p.name == name)
    }

    /// De-duplicated union of descendant leaves' subsystem sets, in
    /// first-seen order. Invocations of named groups are followed through
    /// the project; cycles are tolerated.
    pub fn requirements(&self, project: &Project) -> Vec<Uuid> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        self.collect_requirements(project, &mut seen, &mut out, &mut visited);
        out
    }

    fn collect_requirements(
        &self,
        project: &Project,
        seen: &mut HashSet<Uuid>,
        out: &mut Vec<Uuid>,
        visited: &mut HashSet<Uuid>,
    ) {
        if !visited.insert(self.uuid) {
            return;
        }
        for child in &self.children {
            match child {
                GroupChild::Invocation(inv) => {
                    if !inv.subsystems.is_empty() {
                        for id in &inv.subsystems {
                            if seen.insert(*id) {
                                out.push(*id);
                            }
                        }
                    } else if let Some(cmd) = project.find_atomic(inv.command) {
                        if !cmd.subsystem.is_nil() && seen.insert(cmd.subsystem) {
                            out.push(cmd.subsystem);
                        }
                    } else if let Some(group) = project.find_group(inv.command) {
                        group.collect_requirements(project, seen, out, visited);
                    }
                }
                GroupChild::Group(group) => {
                    group.collect_requirements(project, seen, out, visited);
                }
            }
        }
    }

    /// Whether this group or any descendant invokes `id`, following
    /// references to named groups through the project. Used to keep a
    /// group from containing itself.
    pub fn runs_command(&self, id: Uuid, project: &Project) -> bool {
        let mut visited = HashSet::new();
        self.runs_command_inner(id, project, &mut visited)
    }

    fn runs_command_inner(
        &self,
        id: Uuid,
        project: &Project,
        visited: &mut HashSet<Uuid>,
    ) -> bool {
        if !visited.insert(self.uuid) {
            return false;
        }
        for child in &self.children {
            match child {
                GroupChild::Invocation(inv) => {
                    if inv.command == id {
                        return true;
                    }
                    if let Some(nested) = project.find_group(inv.command) {
                        if nested.runs_command_inner(id, project, visited) {
                            return true;
                        }
                    }
                }
                GroupChild::Group(group) => {
                    if group.runs_command_inner(id, project, visited) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Handle to a declared placeholder, handed back to the configuration
/// callback in declaration order.
#[derive(Debug, Clone)]
pub struct ParamRef {
    name: String,
}

impl ParamRef {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Builds a `CommandGroup` tree. Placeholder names and count are declared
/// up front; the callback receives one handle per name:
///
/// ```ignore
/// let group = GroupBuilder::sequential("Score piece")
///     .with_params(["height"], |g, [height]| {
///         g.run(&arm, &raise, [InvocationArg::placeholder(&height)])
///             .with_timeout(2.0);
///         g.run(&claw, &release, []);
///     })
///     .build()?;
/// ```
pub struct GroupBuilder {
    group: CommandGroup,
}

impl GroupBuilder {
    pub fn sequential(name: impl Into<String>) -> Self {
        Self {
            group: CommandGroup::named(name, GroupKind::Sequential),
        }
    }

    pub fn parallel(name: impl Into<String>, end: ParallelEnd) -> Self {
        Self {
            group: CommandGroup::named(name, GroupKind::Parallel { end }),
        }
    }

    /// Declares `N` placeholders and configures the group's children. The
    /// handles are passed back in declaration order.
    pub fn with_params<const N: usize>(
        mut self,
        names: [&str; N],
        f: impl FnOnce(&mut GroupScope<'_>, [ParamRef; N]),
    ) -> Self {
        let refs = names.map(|name| {
            self.group.params.push(ParamPlaceholder {
                name: name.to_string(),
                original: None,
            });
            ParamRef {
                name: name.to_string(),
            }
        });
        let mut scope = GroupScope {
            children: &mut self.group.children,
        };
        f(&mut scope, refs);
        self
    }

    /// Configures children without declaring any placeholders.
    pub fn configure(mut self, f: impl FnOnce(&mut GroupScope<'_>)) -> Self {
        let mut scope = GroupScope {
            children: &mut self.group.children,
        };
        f(&mut scope);
        self
    }

    /// Declares a placeholder lifted from an existing command call option,
    /// remembering where it came from.
    pub fn lift_param(mut self, name: impl Into<String>, command: Uuid, param: Uuid) -> Self {
        self.group.params.push(ParamPlaceholder {
            name: name.into(),
            original: Some(ParamOrigin { command, param }),
        });
        self
    }

    pub fn build(self) -> Result<CommandGroup> {
        let mut seen = HashSet::new();
        for param in &self.group.params {
            if !seen.insert(param.name.as_str()) {
                return Err(CoreError::DuplicatePlaceholder(param.name.clone()));
            }
        }
        Ok(self.group)
    }
}

/// Mutable view of a group's child list during configuration.
pub struct GroupScope<'a> {
    children: &'a mut Vec<GroupChild>,
}

impl GroupScope<'_> {
    /// Appends an invocation of a subsystem command.
    pub fn run(
        &mut self,
        subsystem: &Subsystem,
        command: &AtomicCommand,
        args: impl IntoIterator<Item = InvocationArg>,
    ) -> ChildHandle<'_> {
        self.push_child(GroupChild::Invocation(CommandInvocation {
            uuid: Uuid::new_v4(),
            subsystems: vec![subsystem.uuid],
            command: command.uuid,
            args: args.into_iter().collect(),
            decorators: Vec::new(),
        }))
    }

    /// Appends an invocation of a top-level named group. Requirements are
    /// left to lazy resolution through the project.
    pub fn run_group(
        &mut self,
        group: &CommandGroup,
        args: impl IntoIterator<Item = InvocationArg>,
    ) -> ChildHandle<'_> {
        self.push_child(GroupChild::Invocation(CommandInvocation {
            uuid: Uuid::new_v4(),
            subsystems: Vec::new(),
            command: group.uuid,
            args: args.into_iter().collect(),
            decorators: Vec::new(),
        }))
    }

    /// Appends and configures a nested anonymous sequential group.
    pub fn sequence(&mut self, f: impl FnOnce(&mut GroupScope<'_>)) -> ChildHandle<'_> {
        let mut nested = CommandGroup::anonymous(GroupKind::Sequential);
        {
            let mut scope = GroupScope {
                children: &mut nested.children,
            };
            f(&mut scope);
        }
        self.push_child(GroupChild::Group(nested))
    }

    /// Appends and configures a nested anonymous parallel group.
    pub fn parallel(
        &mut self,
        end: ParallelEnd,
        f: impl FnOnce(&mut GroupScope<'_>),
    ) -> ChildHandle<'_> {
        let mut nested = CommandGroup::anonymous(GroupKind::Parallel { end });
        {
            let mut scope = GroupScope {
                children: &mut nested.children,
            };
            f(&mut scope);
        }
        self.push_child(GroupChild::Group(nested))
    }

    fn push_child(&mut self, child: GroupChild) -> ChildHandle<'_> {
        let idx = self.children.len();
        self.children.push(child);
        ChildHandle {
            child: &mut self.children[idx],
        }
    }
}

/// Handle to a just-appended child; decorator calls append in call order.
pub struct ChildHandle<'a> {
    child: &'a mut GroupChild,
}

impl ChildHandle<'_> {
    fn push(self, decorator: Decorator) -> Self {
        match &mut *self.child {
            GroupChild::Invocation(inv) => inv.decorators.push(decorator),
            GroupChild::Group(group) => group.decorators.push(decorator),
        }
        self
    }

    pub fn with_timeout(self, seconds: f64) -> Self {
        self.push(Decorator::Duration { seconds })
    }

    pub fn until_state(self, subsystem: &Subsystem, state: &SubsystemState) -> Self {
        self.push(Decorator::Until {
            cond: ConditionRef::State {
                subsystem: subsystem.uuid,
                state: state.uuid,
            },
        })
    }

    pub fn until_placeholder(self, param: &ParamRef) -> Self {
        self.push(Decorator::Until {
            cond: ConditionRef::Placeholder {
                name: param.name().to_string(),
            },
        })
    }

    pub fn unless_state(self, subsystem: &Subsystem, state: &SubsystemState) -> Self {
        self.push(Decorator::Unless {
            cond: ConditionRef::State {
                subsystem: subsystem.uuid,
                state: state.uuid,
            },
        })
    }

    pub fn unless_placeholder(self, param: &ParamRef) -> Self {
        self.push(Decorator::Unless {
            cond: ConditionRef::Placeholder {
                name: param.name().to_string(),
            },
        })
    }

    pub fn repeatedly(self) -> Self {
        self.push(Decorator::Repeat)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
