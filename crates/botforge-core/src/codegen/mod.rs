//! Java fragment emission.
//!
//! Turns the domain model into WPILib command-based source fragments. Every
//! emitter is a pure function over an immutable snapshot and degrades damage
//! to inline diagnostic comments; an emitter returns `""` only when the
//! model holds too little to generate anything ("not yet generatable").

pub mod action;
pub mod command;
pub mod group;

use crate::catalog::ComponentCatalog;
use crate::project::{CommandEntry, Project};
use crate::subsystem::Subsystem;
use serde::{Deserialize, Serialize};

/// One generated method, destined for embedding in a class the external
/// assembler owns. `subsystem` is the owning subsystem's name, or `None`
/// for container-level group methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub subsystem: Option<String>,
    pub method: String,
    pub text: String,
}

/// Walks a project and collects every generatable fragment. Fragments whose
/// emitter returned `""` are skipped.
pub struct Generator<'a> {
    project: &'a Project,
    catalog: &'a ComponentCatalog,
}

impl<'a> Generator<'a> {
    pub fn new(project: &'a Project, catalog: &'a ComponentCatalog) -> Self {
        Self { project, catalog }
    }

    pub fn emit_subsystem(&self, subsystem: &Subsystem) -> Vec<Fragment> {
        let mut out = Vec::new();
        for action in &subsystem.actions {
            push_fragment(
                &mut out,
                Some(&subsystem.name),
                action.method_name(),
                action::emit_action(action, subsystem, self.catalog),
            );
        }
        for state in &subsystem.states {
            push_fragment(
                &mut out,
                Some(&subsystem.name),
                state.method_name(),
                action::emit_state(state, subsystem, self.catalog),
            );
        }
        for cmd in &subsystem.commands {
            push_fragment(
                &mut out,
                Some(&subsystem.name),
                cmd.method_name(),
                command::assemble(cmd, self.project, self.catalog),
            );
        }
        out
    }

    pub fn emit_project(&self) -> Vec<Fragment> {
        let mut out = Vec::new();
        for subsystem in &self.project.subsystems {
            out.extend(self.emit_subsystem(subsystem));
        }
        for entry in &self.project.commands {
            match entry {
                CommandEntry::Atomic(cmd) => {
                    let owner = self.project.subsystem(cmd.subsystem).map(|s| s.name.as_str());
                    push_fragment(
                        &mut out,
                        owner,
                        cmd.method_name(),
                        command::assemble(cmd, self.project, self.catalog),
                    );
                }
                CommandEntry::Group(g) => {
                    push_fragment(
                        &mut out,
                        None,
                        g.method_name().unwrap_or_default(),
                        group::emit_group(g, self.project, self.catalog),
                    );
                }
            }
        }
        out
    }
}

fn push_fragment(out: &mut Vec<Fragment>, subsystem: Option<&str>, method: String, text: String) {
    if text.is_empty() {
        return;
    }
    out.push(Fragment {
        subsystem: subsystem.map(str::to_string),
        method,
        text,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::SubsystemAction;
    use crate::catalog::default_catalog;
    use crate::command::AtomicCommand;
    use crate::group::{CommandGroup, CommandInvocation, GroupChild, GroupKind};
    use crate::state::SubsystemState;
    use crate::step::{ActionStep, StepArgument};
    use crate::subsystem::Subsystem;
    use crate::types::EndCondition;
    use uuid::Uuid;

    fn demo_project() -> Project {
        let catalog = default_catalog();
        let mut arm = Subsystem::new("Arm");
        let motor = arm.add_component("motor", "motor-controller");

        let mut action = SubsystemAction::new("Raise arm", arm.uuid);
        action.steps = vec![ActionStep::new(motor, "set").with_arg(
            "speed",
            StepArgument::Hardcode {
                value: "0.5".into(),
            },
        )];
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

        let mut auto = CommandGroup::named("Auto", GroupKind::Sequential);
        auto.children.push(GroupChild::Invocation(CommandInvocation {
            uuid: Uuid::new_v4(),
            subsystems: vec![],
            command: cmd_id,
            args: vec![],
            decorators: vec![],
        }));
        project.commands.push(CommandEntry::Group(auto));
        project
    }

    #[test]
    fn project_emission_collects_all_fragments() {
        let project = demo_project();
        let catalog = default_catalog();
        let fragments = Generator::new(&project, &catalog).emit_project();
        let methods: Vec<&str> = fragments.iter().map(|f| f.method.as_str()).collect();
        assert_eq!(methods, vec!["raiseArm", "atTop", "raise", "auto"]);
        assert_eq!(fragments[0].subsystem.as_deref(), Some("Arm"));
        assert_eq!(fragments[3].subsystem, None);
    }

    #[test]
    fn emission_is_idempotent() {
        let project = demo_project();
        let catalog = default_catalog();
        let generator = Generator::new(&project, &catalog);
        assert_eq!(generator.emit_project(), generator.emit_project());
    }

    #[test]
    fn emission_survives_serialization_roundtrip() {
        let project = demo_project();
        let catalog = default_catalog();
        let before = Generator::new(&project, &catalog).emit_project();

        let json = serde_json::to_string(&project).unwrap();
        let (reloaded, report) = Project::from_json_str(&json).unwrap();
        assert!(report.is_clean());
        let after = Generator::new(&reloaded, &catalog).emit_project();
        assert_eq!(before, after);
    }

    #[test]
    fn ungeneratable_fragments_are_skipped() {
        let mut project = demo_project();
        // A command with no end condition is not yet generatable.
        let bare = AtomicCommand::new("Later", project.subsystems[0].uuid);
        project.subsystems[0].commands.push(bare);
        let catalog = default_catalog();
        let fragments = Generator::new(&project, &catalog).emit_project();
        assert!(fragments.iter().all(|f| f.method != "later"));
    }
}
