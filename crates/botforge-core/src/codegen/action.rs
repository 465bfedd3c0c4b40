use crate::action::SubsystemAction;
use crate::catalog::ComponentCatalog;
use crate::resolver::{self, Resolution};
use crate::state::SubsystemState;
use crate::step::{ActionStep, StepArgument};
use crate::subsystem::Subsystem;

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Emits one action as a single-line Java method. Each step becomes one
/// statement; a step whose output is referenced downstream binds a local.
pub fn emit_action(
    action: &SubsystemAction,
    subsystem: &Subsystem,
    catalog: &ComponentCatalog,
) -> String {
    if action.name.trim().is_empty() {
        return String::new();
    }
    let resolution = resolver::resolve(action, subsystem, catalog);
    let params = resolution
        .public_params
        .iter()
        .map(|p| format!("{} {}", p.ty.java_name(), p.name))
        .collect::<Vec<_>>()
        .join(", ");
    let statements: Vec<String> = action
        .steps
        .iter()
        .filter_map(|step| emit_statement(step, subsystem, &resolution))
        .collect();
    if statements.is_empty() {
        format!("public void {}({}) {{ }}", action.method_name(), params)
    } else {
        format!(
            "public void {}({}) {{ {} }}",
            action.method_name(),
            params,
            statements.join(" ")
        )
    }
}

fn emit_statement(
    step: &ActionStep,
    subsystem: &Subsystem,
    resolution: &Resolution,
) -> Option<String> {
    if let Some(text) = resolution.broken.get(&step.uuid) {
        return Some(text.clone());
    }
    let exprs = resolution.bindings.get(&step.uuid)?;
    let component = subsystem.component(step.component)?;
    let call = format!(
        "this.{}.{}({})",
        component.field_name(),
        step.method,
        exprs.join(", ")
    );
    let mut statement = match resolution.locals.get(&step.uuid) {
        Some(local) => format!("{} {} = {};", local.ty.java_name(), local.name, call),
        None => format!("{call};"),
    };
    if let Some(note) = resolution.notes.get(&step.uuid) {
        statement = format!("{statement} {note}");
    }
    Some(statement)
}

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// Emits one state predicate. A state without a step is a stub the user
/// still has to fill in; a state step only supports hardcoded arguments.
pub fn emit_state(
    state: &SubsystemState,
    subsystem: &Subsystem,
    catalog: &ComponentCatalog,
) -> String {
    if state.name.trim().is_empty() {
        return String::new();
    }
    let Some(step) = &state.step else {
        return format!(
            "public boolean {}() {{ return false; /* implement me */ }}",
            state.method_name()
        );
    };
    let Some(component) = subsystem.component(step.component) else {
        return format!(
            "public boolean {}() {{ return false; /* unknown component {} */ }}",
            state.method_name(),
            step.component
        );
    };

    let (exprs, note): (Vec<String>, Option<String>) =
        match catalog.method(&component.definition, &step.method) {
            Some(method) => {
                let exprs = method
                    .params
                    .iter()
                    .map(|mp| {
                        step.args
                            .iter()
                            .find(|a| a.param == mp.name)
                            .map(|a| state_arg(&a.binding))
                            .unwrap_or_else(|| "/* unset */".to_string())
                    })
                    .collect();
                let note = step
                    .args
                    .iter()
                    .any(|a| method.param(&a.param).is_none())
                    .then(|| format!("/* arity mismatch: expected {} args */", method.params.len()));
                (exprs, note)
            }
            None => (
                step.args.iter().map(|a| state_arg(&a.binding)).collect(),
                Some(format!(
                    "/* unknown method {} on {} */",
                    step.method, component.name
                )),
            ),
        };

    let call = format!(
        "return this.{}.{}({});",
        component.field_name(),
        step.method,
        exprs.join(", ")
    );
    let body = match note {
        Some(note) => format!("{call} {note}"),
        None => call,
    };
    format!("public boolean {}() {{ {} }}", state.method_name(), body)
}

fn state_arg(binding: &StepArgument) -> String {
    match binding {
        StepArgument::Hardcode { value } => {
            if value.trim().is_empty() {
                "/* unset */".to_string()
            } else {
                value.clone()
            }
        }
        _ => "/* unsupported in state */".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ComponentDefinition, MethodParam, MethodSpec, ReturnType};
    use crate::types::ParamType;
    use uuid::Uuid;

    fn catalog() -> ComponentCatalog {
        let mut catalog = ComponentCatalog::new();
        catalog.insert(ComponentDefinition {
            id: "actuator".to_string(),
            name: "Actuator".to_string(),
            methods: vec![
                MethodSpec {
                    name: "setValue".to_string(),
                    params: vec![MethodParam {
                        name: "value".to_string(),
                        ty: ParamType::Double,
                    }],
                    returns: ReturnType::Void,
                },
                MethodSpec {
                    name: "getValue".to_string(),
                    params: vec![],
                    returns: ReturnType::Value(ParamType::Double),
                },
                MethodSpec {
                    name: "isExtended".to_string(),
                    params: vec![],
                    returns: ReturnType::Value(ParamType::Boolean),
                },
            ],
        });
        catalog
    }

    fn rig() -> (Subsystem, Uuid) {
        let mut subsystem = Subsystem::new("Arm");
        let comp = subsystem.add_component("actuator", "actuator");
        (subsystem, comp)
    }

    #[test]
    fn passthrough_argument_becomes_method_parameter() {
        let (subsystem, comp) = rig();
        let mut action = SubsystemAction::new("An action", subsystem.uuid);
        action.steps = vec![ActionStep::new(comp, "setValue").with_arg(
            "value",
            StepArgument::DefinePassthrough {
                name: "valuePassedToActuatorSetValueMethod".into(),
            },
        )];
        assert_eq!(
            emit_action(&action, &subsystem, &catalog()),
            "public void anAction(double valuePassedToActuatorSetValueMethod) { this.actuator.setValue(valuePassedToActuatorSetValueMethod); }"
        );
    }

    #[test]
    fn hardcoded_argument_keeps_signature_empty() {
        let (subsystem, comp) = rig();
        let mut action = SubsystemAction::new("An action", subsystem.uuid);
        action.steps = vec![ActionStep::new(comp, "setValue").with_arg(
            "value",
            StepArgument::Hardcode {
                value: "Double.MAX_VALUE".into(),
            },
        )];
        assert_eq!(
            emit_action(&action, &subsystem, &catalog()),
            "public void anAction() { this.actuator.setValue(Double.MAX_VALUE); }"
        );
    }

    #[test]
    fn referenced_output_binds_local_in_declaration_order() {
        let (subsystem, comp) = rig();
        let producer = ActionStep::new(comp, "getValue");
        let producer_id = producer.uuid;
        let consumer = ActionStep::new(comp, "setValue").with_arg(
            "value",
            StepArgument::ReferenceOutput { step: producer_id },
        );
        let mut action = SubsystemAction::new("An action", subsystem.uuid);
        action.steps = vec![producer, consumer];
        assert_eq!(
            emit_action(&action, &subsystem, &catalog()),
            "public void anAction() { double actuatorGetValue = this.actuator.getValue(); this.actuator.setValue(actuatorGetValue); }"
        );
    }

    #[test]
    fn broken_step_leaves_neighbors_intact() {
        let (subsystem, comp) = rig();
        let ghost = ActionStep::new(comp, "setValue").with_arg(
            "value",
            StepArgument::ReferenceOutput {
                step: Uuid::new_v4(),
            },
        );
        let fine = ActionStep::new(comp, "setValue")
            .with_arg("value", StepArgument::Hardcode { value: "1".into() });
        let mut action = SubsystemAction::new("An action", subsystem.uuid);
        action.steps = vec![ghost, fine];
        assert_eq!(
            emit_action(&action, &subsystem, &catalog()),
            "public void anAction() { /* unresolvable step: unknown step */; this.actuator.setValue(1); }"
        );
    }

    #[test]
    fn action_emission_is_idempotent() {
        let (subsystem, comp) = rig();
        let mut action = SubsystemAction::new("An action", subsystem.uuid);
        action.steps = vec![ActionStep::new(comp, "setValue").with_arg(
            "value",
            StepArgument::DefinePassthrough { name: "v".into() },
        )];
        let first = emit_action(&action, &subsystem, &catalog());
        assert_eq!(first, emit_action(&action, &subsystem, &catalog()));
    }

    #[test]
    fn unnamed_action_is_not_generatable() {
        let (subsystem, _) = rig();
        let action = SubsystemAction::new("  ", subsystem.uuid);
        assert_eq!(emit_action(&action, &subsystem, &catalog()), "");
    }

    #[test]
    fn state_with_step_returns_component_call() {
        let (subsystem, comp) = rig();
        let mut state = SubsystemState::new("Is extended", subsystem.uuid);
        state.step = Some(ActionStep::new(comp, "isExtended"));
        assert_eq!(
            emit_state(&state, &subsystem, &catalog()),
            "public boolean isExtended() { return this.actuator.isExtended(); }"
        );
    }

    #[test]
    fn empty_state_emits_stub() {
        let (subsystem, _) = rig();
        let state = SubsystemState::new("At top", subsystem.uuid);
        assert_eq!(
            emit_state(&state, &subsystem, &catalog()),
            "public boolean atTop() { return false; /* implement me */ }"
        );
    }

    #[test]
    fn state_rejects_passthrough_arguments() {
        let (subsystem, comp) = rig();
        let mut state = SubsystemState::new("At value", subsystem.uuid);
        state.step = Some(ActionStep::new(comp, "setValue").with_arg(
            "value",
            StepArgument::DefinePassthrough {
                name: "target".into(),
            },
        ));
        assert_eq!(
            emit_state(&state, &subsystem, &catalog()),
            "public boolean atValue() { return this.actuator.setValue(/* unsupported in state */); }"
        );
    }
}
