use crate::action::SubsystemAction;
use crate::catalog::ComponentCatalog;
use crate::command::AtomicCommand;
use crate::config::GeneratorConfig;
use crate::group::{CommandGroup, ConditionRef, Decorator, GroupChild, GroupKind, InvocationArg};
use crate::ident;
use crate::project::{CommandEntry, Project};
use crate::resolver;
use crate::state::SubsystemState;
use crate::step::{ActionStep, StepArgument};
use crate::subsystem::Subsystem;
use crate::types::{EndCondition, ParallelEnd, ParamType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Severity / Finding
// ---------------------------------------------------------------------------

/// Errors break the generated source or the model's structure; warnings
/// degrade to inline diagnostics but still emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub location: String,
    pub message: String,
}

pub fn has_errors(findings: &[Finding]) -> bool {
    findings.iter().any(|f| f.severity == Severity::Error)
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

/// Checks a project against the catalog. Validation never blocks emission;
/// it reports what emission will degrade (warnings) and what is structurally
/// wrong (errors).
pub fn validate(
    project: &Project,
    catalog: &ComponentCatalog,
    config: &GeneratorConfig,
) -> Vec<Finding> {
    let mut v = Validator {
        project,
        catalog,
        config,
        findings: Vec::new(),
    };

    for subsystem in &project.subsystems {
        v.check_subsystem(subsystem);
    }
    for entry in &project.commands {
        match entry {
            CommandEntry::Atomic(cmd) => v.check_command(cmd, cmd.name.clone()),
            CommandEntry::Group(group) => v.check_named_group(group),
        }
    }
    for controller in &project.controllers {
        for binding in &controller.bindings {
            if project.find_atomic(binding.command).is_none()
                && project.find_group(binding.command).is_none()
            {
                v.warn(
                    format!("{}/{}", controller.name, binding.button),
                    format!("binds unknown command {}", binding.command),
                );
            }
        }
    }
    v.findings
}

struct Validator<'a> {
    project: &'a Project,
    catalog: &'a ComponentCatalog,
    config: &'a GeneratorConfig,
    findings: Vec<Finding>,
}

impl Validator<'_> {
    fn warn(&mut self, location: String, message: String) {
        self.findings.push(Finding {
            severity: Severity::Warning,
            location,
            message,
        });
    }

    fn error(&mut self, location: String, message: String) {
        self.findings.push(Finding {
            severity: Severity::Error,
            location,
            message,
        });
    }

    fn check_ident(&mut self, location: &str, kind: &str, name: &str) {
        let generated = ident::lower_camel(name);
        if !ident::is_java_ident(&generated) {
            self.warn(
                location.to_string(),
                format!("{kind} name '{name}' generates the invalid Java identifier '{generated}'"),
            );
        }
    }

    // -----------------------------------------------------------------------
    // Subsystems
    // -----------------------------------------------------------------------

    fn check_subsystem(&mut self, subsystem: &Subsystem) {
        self.check_ident(&subsystem.name, "subsystem", &subsystem.name);

        for component in &subsystem.components {
            let location = format!("{}/{}", subsystem.name, component.name);
            self.check_ident(&location, "component", &component.name);
            if self.catalog.lookup(&component.definition).is_none() {
                self.warn(
                    location,
                    format!("references unknown definition '{}'", component.definition),
                );
            }
        }

        for action in &subsystem.actions {
            self.check_action(subsystem, action);
        }
        for state in &subsystem.states {
            self.check_state(subsystem, state);
        }
        for cmd in &subsystem.commands {
            self.check_command(cmd, format!("{}/{}", subsystem.name, cmd.name));
        }
    }

    fn check_action(&mut self, subsystem: &Subsystem, action: &SubsystemAction) {
        let location = format!("{}/{}", subsystem.name, action.name);
        self.check_ident(&location, "action", &action.name);

        for (index, step) in action.steps.iter().enumerate() {
            let step_location = format!("{location}/step {}", index + 1);
            self.check_step(subsystem, action, index, step, &step_location);
        }
    }

    fn check_step(
        &mut self,
        subsystem: &Subsystem,
        action: &SubsystemAction,
        index: usize,
        step: &ActionStep,
        location: &str,
    ) {
        let Some(component) = subsystem.component(step.component) else {
            self.warn(
                location.to_string(),
                format!("calls unknown component {}", step.component),
            );
            return;
        };
        if self.catalog.method(&component.definition, &step.method).is_none()
            && self.catalog.lookup(&component.definition).is_some()
        {
            self.warn(
                location.to_string(),
                format!("unknown method '{}' on '{}'", step.method, component.name),
            );
        }

        for arg in &step.args {
            match &arg.binding {
                StepArgument::ReferenceOutput { step: target } => {
                    if let Some(reason) = resolver::output_ref_reason(
                        action,
                        subsystem,
                        self.catalog,
                        index,
                        *target,
                    ) {
                        self.error(
                            location.to_string(),
                            format!("output reference cannot resolve: {reason}"),
                        );
                    }
                }
                StepArgument::ReferencePassthrough { name, .. } => {
                    let defined_earlier = action.steps[..index]
                        .iter()
                        .filter(|s| subsystem.component(s.component).is_some())
                        .any(|s| s.defined_passthroughs().contains(&name.as_str()));
                    if !defined_earlier {
                        self.warn(
                            location.to_string(),
                            format!("references passthrough '{name}' not defined by an earlier step"),
                        );
                    }
                }
                StepArgument::Hardcode { .. } | StepArgument::DefinePassthrough { .. } => {}
            }
        }
    }

    fn check_state(&mut self, subsystem: &Subsystem, state: &SubsystemState) {
        let location = format!("{}/{}", subsystem.name, state.name);
        self.check_ident(&location, "state", &state.name);
        let Some(step) = &state.step else {
            return;
        };
        let Some(component) = subsystem.component(step.component) else {
            self.warn(
                location,
                format!("calls unknown component {}", step.component),
            );
            return;
        };
        if step
            .args
            .iter()
            .any(|a| !matches!(a.binding, StepArgument::Hardcode { .. }))
        {
            self.warn(
                location.clone(),
                "state arguments must be hardcoded".to_string(),
            );
        }
        if let Some(method) = self.catalog.method(&component.definition, &step.method) {
            let boolean = method
                .returns
                .value()
                .is_some_and(|ty| *ty == ParamType::Boolean);
            if !boolean {
                self.warn(
                    location,
                    format!("method '{}' does not return boolean", step.method),
                );
            }
        }
    }

    // -----------------------------------------------------------------------
    // Atomic commands
    // -----------------------------------------------------------------------

    fn check_command(&mut self, cmd: &AtomicCommand, location: String) {
        self.check_ident(&location, "command", &cmd.name);

        let subsystem = self.project.subsystem(cmd.subsystem);
        if subsystem.is_none() && !cmd.subsystem.is_nil() {
            self.warn(
                location.clone(),
                format!("references unknown subsystem {}", cmd.subsystem),
            );
        }
        let Some(subsystem) = subsystem else {
            return;
        };

        let action = cmd.action.and_then(|id| subsystem.action(id));
        if cmd.action.is_some() && action.is_none() {
            self.warn(location.clone(), "references unknown action".to_string());
        }

        if let Some(EndCondition::State(id)) = &cmd.end_condition {
            if subsystem.state(*id).is_none() {
                self.warn(location.clone(), "references unknown end state".to_string());
            }
        }

        for init in &cmd.to_initialize {
            match subsystem.action(*init) {
                None => {
                    self.warn(
                        location.clone(),
                        "references unknown initialization action".to_string(),
                    );
                }
                Some(init_action) => {
                    let params =
                        init_action.synthesize_params(&subsystem.components, self.catalog);
                    if !params.is_empty() {
                        self.warn(
                            location.clone(),
                            format!(
                                "initialization action '{}' declares parameters; it is invoked without arguments",
                                init_action.name
                            ),
                        );
                    }
                }
            }
        }

        if let Some(action) = action {
            let params = action.synthesize_params(&subsystem.components, self.catalog);
            for option in &cmd.params {
                if !params.iter().any(|p| p.uuid == option.param) {
                    self.warn(
                        location.clone(),
                        "call option references a parameter the action no longer declares"
                            .to_string(),
                    );
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Groups
    // -----------------------------------------------------------------------

    fn check_named_group(&mut self, group: &CommandGroup) {
        let named = group.name.as_deref().filter(|n| !n.trim().is_empty());
        let location = named.unwrap_or("unnamed group").to_string();
        match named {
            Some(name) => self.check_ident(&location, "group", name),
            None => self.warn(
                location.clone(),
                "top-level group has no name and will not be generated".to_string(),
            ),
        }

        if group.runs_command(group.uuid, self.project) {
            self.error(
                location.clone(),
                "group contains itself, directly or transitively".to_string(),
            );
        }

        let mut scope: Vec<String> = Vec::new();
        self.check_group_tree(group, &location, &mut scope);
    }

    fn check_group_tree(&mut self, group: &CommandGroup, location: &str, scope: &mut Vec<String>) {
        let mut names: HashSet<&str> = HashSet::new();
        for placeholder in &group.params {
            if !names.insert(placeholder.name.as_str()) {
                self.error(
                    location.to_string(),
                    format!("duplicate placeholder name '{}'", placeholder.name),
                );
            }
        }
        let added = group.params.len();
        scope.extend(group.params.iter().map(|p| p.name.clone()));

        if let GroupKind::Parallel { end } = group.kind {
            self.check_parallel(group, end, location);
        }

        for (index, child) in group.children.iter().enumerate() {
            let child_location = format!("{location}/child {}", index + 1);
            match child {
                GroupChild::Invocation(inv) => {
                    if self.project.find_atomic(inv.command).is_none()
                        && self.project.find_group(inv.command).is_none()
                    {
                        self.warn(
                            child_location.clone(),
                            format!("invokes unknown command {}", inv.command),
                        );
                    }
                    for arg in &inv.args {
                        if let InvocationArg::Placeholder { name } = arg {
                            self.check_placeholder_bound(name, scope, &child_location);
                        }
                    }
                    self.check_decorators(&inv.decorators, scope, &child_location);
                }
                GroupChild::Group(nested) => {
                    self.check_group_tree(nested, &child_location, scope);
                }
            }
        }

        self.check_decorators(&group.decorators, scope, location);
        scope.truncate(scope.len() - added);
    }

    fn check_parallel(&mut self, group: &CommandGroup, end: ParallelEnd, location: &str) {
        if let ParallelEnd::Child(id) = end {
            if !group.children.iter().any(|c| c.uuid() == id) {
                self.error(
                    location.to_string(),
                    format!("deadline child {id} is not a child of this group"),
                );
            }
        }

        // Sibling requirement overlap is flagged, never silently fixed.
        let mut seen: HashSet<Uuid> = HashSet::new();
        for child in &group.children {
            for requirement in child_requirements(child, self.project) {
                if !seen.insert(requirement) {
                    let name = self
                        .project
                        .subsystem(requirement)
                        .map(|s| s.name.clone())
                        .unwrap_or_else(|| requirement.to_string());
                    let message =
                        format!("parallel children share subsystem requirement '{name}'");
                    if self.config.strict_parallel_requirements {
                        self.error(location.to_string(), message);
                    } else {
                        self.warn(location.to_string(), message);
                    }
                }
            }
        }
    }

    fn check_decorators(&mut self, decorators: &[Decorator], scope: &[String], location: &str) {
        for decorator in decorators {
            let cond = match decorator {
                Decorator::Until { cond } | Decorator::Unless { cond } => cond,
                Decorator::Duration { .. } | Decorator::Repeat => continue,
            };
            match cond {
                ConditionRef::Placeholder { name } => {
                    self.check_placeholder_bound(name, scope, location);
                }
                ConditionRef::State { subsystem, state } => {
                    let resolved = self
                        .project
                        .subsystem(*subsystem)
                        .and_then(|s| s.state(*state));
                    if resolved.is_none() {
                        self.warn(
                            location.to_string(),
                            format!("condition references unknown state {state}"),
                        );
                    }
                }
            }
        }
    }

    fn check_placeholder_bound(&mut self, name: &str, scope: &[String], location: &str) {
        if !scope.iter().any(|n| n == name) {
            self.warn(
                location.to_string(),
                format!("placeholder '{name}' is not declared by this group or an enclosing one"),
            );
        }
    }
}

fn child_requirements(child: &GroupChild, project: &Project) -> Vec<Uuid> {
    match child {
        GroupChild::Group(group) => group.requirements(project),
        GroupChild::Invocation(inv) => {
            if !inv.subsystems.is_empty() {
                let mut seen = HashSet::new();
                return inv
                    .subsystems
                    .iter()
                    .copied()
                    .filter(|id| seen.insert(*id))
                    .collect();
            }
            if let Some(cmd) = project.find_atomic(inv.command) {
                if cmd.subsystem.is_nil() {
                    return Vec::new();
                }
                return vec![cmd.subsystem];
            }
            if let Some(group) = project.find_group(inv.command) {
                return group.requirements(project);
            }
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::group::{CommandInvocation, ParamPlaceholder};

    fn config() -> GeneratorConfig {
        GeneratorConfig::default()
    }

    fn leaf(command: Uuid) -> GroupChild {
        GroupChild::Invocation(CommandInvocation {
            uuid: Uuid::new_v4(),
            subsystems: vec![],
            command,
            args: vec![],
            decorators: vec![],
        })
    }

    /// Arm subsystem with a motor, a no-param action, a boolean state, and
    /// one well-formed command.
    fn clean_project() -> (Project, Uuid, Uuid) {
        let catalog = default_catalog();
        let mut arm = Subsystem::new("Arm");
        let motor = arm.add_component("motor", "motor-controller");

        let mut action = SubsystemAction::new("Raise arm", arm.uuid);
        action.steps = vec![ActionStep::new(motor, "stopMotor")];
        action.refresh_params(&arm.components, &catalog);
        let action_id = action.uuid;
        arm.actions.push(action);

        let mut state = SubsystemState::new("At top", arm.uuid);
        state.step = Some(ActionStep::new(motor, "get"));
        arm.states.push(state);

        let mut cmd = AtomicCommand::new("Raise", arm.uuid);
        cmd.action = Some(action_id);
        cmd.end_condition = Some(EndCondition::Once);
        let cmd_id = cmd.uuid;
        arm.commands.push(cmd);

        let mut project = Project::new("demo");
        project.subsystems.push(arm);
        (project, cmd_id, action_id)
    }

    #[test]
    fn clean_project_yields_only_known_warnings() {
        let (project, _, _) = clean_project();
        let findings = validate(&project, &default_catalog(), &config());
        // The motor's `get` state returns double, which is worth a warning,
        // and nothing else.
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert!(findings[0].message.contains("does not return boolean"));
    }

    #[test]
    fn forward_output_reference_is_an_error() {
        let (mut project, _, _) = clean_project();
        let motor = project.subsystems[0].components[0].uuid;
        let producer = ActionStep::new(motor, "get");
        let producer_id = producer.uuid;
        let consumer = ActionStep::new(motor, "set").with_arg(
            "speed",
            StepArgument::ReferenceOutput { step: producer_id },
        );
        let mut action = SubsystemAction::new("Broken", project.subsystems[0].uuid);
        action.steps = vec![consumer, producer];
        project.subsystems[0].actions.push(action);

        let findings = validate(&project, &default_catalog(), &config());
        assert!(findings.iter().any(|f| f.severity == Severity::Error
            && f.message.contains("forward reference")));
    }

    #[test]
    fn self_containing_group_is_an_error() {
        let (mut project, _, _) = clean_project();
        let mut group = CommandGroup::named("Auto", GroupKind::Sequential);
        group.children = vec![leaf(group.uuid)];
        project.commands.push(CommandEntry::Group(group));

        let findings = validate(&project, &default_catalog(), &config());
        assert!(findings
            .iter()
            .any(|f| f.severity == Severity::Error && f.message.contains("contains itself")));
    }

    #[test]
    fn dangling_deadline_is_an_error() {
        let (mut project, cmd, _) = clean_project();
        let mut group = CommandGroup::named(
            "Deadline",
            GroupKind::Parallel {
                end: ParallelEnd::Child(Uuid::new_v4()),
            },
        );
        group.children = vec![leaf(cmd)];
        project.commands.push(CommandEntry::Group(group));

        let findings = validate(&project, &default_catalog(), &config());
        assert!(findings.iter().any(|f| f.severity == Severity::Error
            && f.message.contains("deadline child")));
    }

    #[test]
    fn duplicate_placeholders_are_an_error() {
        let (mut project, _, _) = clean_project();
        let mut group = CommandGroup::named("Auto", GroupKind::Sequential);
        group.params = vec![
            ParamPlaceholder {
                name: "height".into(),
                original: None,
            },
            ParamPlaceholder {
                name: "height".into(),
                original: None,
            },
        ];
        project.commands.push(CommandEntry::Group(group));

        let findings = validate(&project, &default_catalog(), &config());
        assert!(findings.iter().any(|f| f.severity == Severity::Error
            && f.message.contains("duplicate placeholder")));
    }

    #[test]
    fn parallel_overlap_severity_follows_config() {
        let (mut project, cmd, _) = clean_project();
        let mut group = CommandGroup::named(
            "Both arms",
            GroupKind::Parallel {
                end: ParallelEnd::All,
            },
        );
        group.children = vec![leaf(cmd), leaf(cmd)];
        project.commands.push(CommandEntry::Group(group));

        let findings = validate(&project, &default_catalog(), &config());
        let overlap = findings
            .iter()
            .find(|f| f.message.contains("share subsystem requirement"))
            .unwrap();
        assert_eq!(overlap.severity, Severity::Warning);

        let strict = GeneratorConfig {
            strict_parallel_requirements: true,
            ..GeneratorConfig::default()
        };
        let findings = validate(&project, &default_catalog(), &strict);
        let overlap = findings
            .iter()
            .find(|f| f.message.contains("share subsystem requirement"))
            .unwrap();
        assert_eq!(overlap.severity, Severity::Error);
    }

    #[test]
    fn initializer_with_params_warns() {
        let (mut project, _, _) = clean_project();
        let motor = project.subsystems[0].components[0].uuid;
        let mut prep = SubsystemAction::new("Prepare", project.subsystems[0].uuid);
        prep.steps = vec![ActionStep::new(motor, "set").with_arg(
            "speed",
            StepArgument::DefinePassthrough {
                name: "speed".into(),
            },
        )];
        prep.refresh_params(&project.subsystems[0].components, &default_catalog());
        let prep_id = prep.uuid;
        project.subsystems[0].actions.push(prep);
        project.subsystems[0].commands[0]
            .to_initialize
            .push(prep_id);

        let findings = validate(&project, &default_catalog(), &config());
        assert!(findings
            .iter()
            .any(|f| f.message.contains("invoked without arguments")));
    }

    #[test]
    fn unknown_definition_warns() {
        let (mut project, _, _) = clean_project();
        project.subsystems[0].add_component("mystery", "hoverboard");
        let findings = validate(&project, &default_catalog(), &config());
        assert!(findings
            .iter()
            .any(|f| f.message.contains("unknown definition 'hoverboard'")));
    }

    #[test]
    fn reserved_word_names_warn() {
        let (mut project, _, _) = clean_project();
        project.subsystems[0].add_component("class", "motor-controller");
        let findings = validate(&project, &default_catalog(), &config());
        assert!(findings
            .iter()
            .any(|f| f.message.contains("invalid Java identifier 'class'")));
    }

    #[test]
    fn unbound_placeholder_warns() {
        let (mut project, cmd, _) = clean_project();
        let mut group = CommandGroup::named("Auto", GroupKind::Sequential);
        let mut child = leaf(cmd);
        if let GroupChild::Invocation(inv) = &mut child {
            inv.args = vec![InvocationArg::named("ghost")];
        }
        group.children = vec![child];
        project.commands.push(CommandEntry::Group(group));

        let findings = validate(&project, &default_catalog(), &config());
        assert!(findings
            .iter()
            .any(|f| f.message.contains("placeholder 'ghost'")));
    }

    #[test]
    fn dangling_controller_binding_warns() {
        let (mut project, _, _) = clean_project();
        project.controllers.push(crate::project::Controller {
            uuid: Uuid::new_v4(),
            name: "Driver".into(),
            port: 0,
            bindings: vec![crate::project::ButtonBinding {
                button: "A".into(),
                command: Uuid::new_v4(),
            }],
        });
        let findings = validate(&project, &default_catalog(), &config());
        assert!(findings
            .iter()
            .any(|f| f.location == "Driver/A" && f.message.contains("unknown command")));
    }
}
