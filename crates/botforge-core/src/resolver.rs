use crate::action::{Param, SubsystemAction};
use crate::catalog::{ComponentCatalog, MethodSpec};
use crate::ident;
use crate::step::{ActionStep, StepArgument};
use crate::subsystem::{Subsystem, SubsystemComponent};
use crate::types::ParamType;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// A local variable holding one step's return value, bound because a later
/// step references that output.
#[derive(Debug, Clone, PartialEq)]
pub struct Local {
    pub name: String,
    pub ty: ParamType,
}

/// The resolved view of one action's step graph. Declared step order is
/// evaluation order; every map is keyed by step uuid. A step appears in
/// `bindings` (rendered argument expressions, one per call slot) or in
/// `broken` (a full replacement statement), never both. Resolution never
/// fails; all damage degrades to inline diagnostic comments.
#[derive(Debug, Default)]
pub struct Resolution {
    pub public_params: Vec<Param>,
    pub bindings: BTreeMap<Uuid, Vec<String>>,
    pub locals: BTreeMap<Uuid, Local>,
    pub broken: BTreeMap<Uuid, String>,
    pub notes: BTreeMap<Uuid, String>,
}

// ---------------------------------------------------------------------------
// resolve
// ---------------------------------------------------------------------------

pub fn resolve(
    action: &SubsystemAction,
    subsystem: &Subsystem,
    catalog: &ComponentCatalog,
) -> Resolution {
    let mut resolution = Resolution {
        public_params: action.synthesize_params(&subsystem.components, catalog),
        ..Resolution::default()
    };

    bind_locals(action, subsystem, catalog, &mut resolution);

    // Passthrough names introduced by steps already walked. Steps with an
    // unknown component never introduce names (they synthesize no params).
    let mut defined: BTreeSet<String> = BTreeSet::new();

    for (index, step) in action.steps.iter().enumerate() {
        let Some(component) = subsystem.component(step.component) else {
            resolution
                .broken
                .insert(step.uuid, format!("/* unknown component {} */;", step.component));
            continue;
        };

        let invalid = step.args.iter().find_map(|arg| match &arg.binding {
            StepArgument::ReferenceOutput { step: target } => {
                output_ref_reason(action, subsystem, catalog, index, *target)
            }
            _ => None,
        });

        match invalid {
            Some(reason) => {
                resolution
                    .broken
                    .insert(step.uuid, format!("/* unresolvable step: {reason} */;"));
            }
            None => {
                let method = catalog.method(&component.definition, &step.method);
                render_call(step, component, method, &defined, &mut resolution);
            }
        }

        // Recorded even for broken steps: their passthroughs still become
        // public params, so later references to them stay valid.
        for name in step.defined_passthroughs() {
            defined.insert(name.to_string());
        }
    }

    resolution
}

/// Walks every valid output reference and binds a local to each referenced
/// step, named `lowerCamel(component + method)` and disambiguated with the
/// 1-based step position when that name is already taken.
fn bind_locals(
    action: &SubsystemAction,
    subsystem: &Subsystem,
    catalog: &ComponentCatalog,
    resolution: &mut Resolution,
) {
    let mut referenced: BTreeSet<Uuid> = BTreeSet::new();
    for (index, step) in action.steps.iter().enumerate() {
        for arg in &step.args {
            if let StepArgument::ReferenceOutput { step: target } = &arg.binding {
                if output_ref_reason(action, subsystem, catalog, index, *target).is_none() {
                    referenced.insert(*target);
                }
            }
        }
    }

    let mut taken: BTreeSet<String> = BTreeSet::new();
    for (index, step) in action.steps.iter().enumerate() {
        if !referenced.contains(&step.uuid) {
            continue;
        }
        // Validity of the reference guarantees a known component and a
        // non-void method.
        let Some(component) = subsystem.component(step.component) else {
            continue;
        };
        let Some(method) = catalog.method(&component.definition, &step.method) else {
            continue;
        };
        let Some(ty) = method.returns.value() else {
            continue;
        };
        let base = ident::lower_camel(&format!("{} {}", component.name, step.method));
        let name = if taken.contains(&base) {
            format!("{}{}", base, index + 1)
        } else {
            base
        };
        taken.insert(name.clone());
        resolution.locals.insert(
            step.uuid,
            Local {
                name,
                ty: ty.clone(),
            },
        );
    }
}

/// Why an output reference from the step at `current` to `target` cannot be
/// resolved, or `None` when it can.
pub(crate) fn output_ref_reason(
    action: &SubsystemAction,
    subsystem: &Subsystem,
    catalog: &ComponentCatalog,
    current: usize,
    target: Uuid,
) -> Option<&'static str> {
    let Some(target_index) = action.steps.iter().position(|s| s.uuid == target) else {
        return Some("unknown step");
    };
    if target_index == current {
        return Some("self reference");
    }
    if target_index > current {
        return Some("forward reference");
    }
    let target_step = &action.steps[target_index];
    let Some(component) = subsystem.component(target_step.component) else {
        return Some("referenced step produces no value");
    };
    let Some(method) = catalog.method(&component.definition, &target_step.method) else {
        return Some("referenced step produces no value");
    };
    if method.returns.is_void() {
        return Some("referenced step produces no value");
    }
    None
}

fn render_call(
    step: &ActionStep,
    component: &SubsystemComponent,
    method: Option<&MethodSpec>,
    defined: &BTreeSet<String>,
    resolution: &mut Resolution,
) {
    let exprs: Vec<String>;
    match method {
        Some(method) => {
            // Catalog order wins; a declared parameter with no supplied
            // binding renders as unset.
            exprs = method
                .params
                .iter()
                .map(|mp| {
                    step.args
                        .iter()
                        .find(|a| a.param == mp.name)
                        .map(|a| render_arg(&a.binding, defined, resolution))
                        .unwrap_or_else(|| "/* unset */".to_string())
                })
                .collect();
            if step.args.iter().any(|a| method.param(&a.param).is_none()) {
                resolution.notes.insert(
                    step.uuid,
                    format!("/* arity mismatch: expected {} args */", method.params.len()),
                );
            }
        }
        None => {
            exprs = step
                .args
                .iter()
                .map(|a| render_arg(&a.binding, defined, resolution))
                .collect();
            resolution.notes.insert(
                step.uuid,
                format!("/* unknown method {} on {} */", step.method, component.name),
            );
        }
    }
    resolution.bindings.insert(step.uuid, exprs);
}

fn render_arg(
    binding: &StepArgument,
    defined: &BTreeSet<String>,
    resolution: &Resolution,
) -> String {
    match binding {
        StepArgument::Hardcode { value } => {
            if value.trim().is_empty() {
                "/* unset */".to_string()
            } else {
                value.clone()
            }
        }
        StepArgument::DefinePassthrough { name } => name.clone(),
        StepArgument::ReferencePassthrough { name, .. } => {
            if defined.contains(name) {
                name.clone()
            } else {
                format!("/* unresolved passthrough {name} */")
            }
        }
        StepArgument::ReferenceOutput { step } => match resolution.locals.get(step) {
            Some(local) => local.name.clone(),
            None => "/* unset */".to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
