use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// StepArgument
// ---------------------------------------------------------------------------

/// How one call argument of a step is supplied. The two reference forms
/// must name a strictly earlier step in the same action; that is checked
/// at emission and validation time, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepArgument {
    Hardcode {
        #[serde(default)]
        value: String,
    },
    DefinePassthrough {
        name: String,
    },
    ReferencePassthrough {
        step: Uuid,
        name: String,
    },
    ReferenceOutput {
        step: Uuid,
    },
}

// ---------------------------------------------------------------------------
// ActionStep
// ---------------------------------------------------------------------------

/// One argument slot of a step: the method's declared parameter name and
/// the binding that fills it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepArg {
    pub param: String,
    pub binding: StepArgument,
}

/// One call to a named method on a subsystem component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStep {
    pub uuid: Uuid,
    pub component: Uuid,
    pub method: String,
    #[serde(default)]
    pub args: Vec<StepArg>,
}

impl ActionStep {
    pub fn new(component: Uuid, method: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            component,
            method: method.into(),
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, param: impl Into<String>, binding: StepArgument) -> Self {
        self.args.push(StepArg {
            param: param.into(),
            binding,
        });
        self
    }

    /// Names this step introduces via `define_passthrough`, in argument order.
    pub fn defined_passthroughs(&self) -> Vec<&str> {
        self.args
            .iter()
            .filter_map(|a| match &a.binding {
                StepArgument::DefinePassthrough { name } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Step ids this step's arguments refer back to.
    pub fn referenced_steps(&self) -> Vec<Uuid> {
        self.args
            .iter()
            .filter_map(|a| match &a.binding {
                StepArgument::ReferencePassthrough { step, .. } => Some(*step),
                StepArgument::ReferenceOutput { step } => Some(*step),
                _ => None,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
