use crate::catalog::ComponentCatalog;
use crate::ident;
use crate::step::{ActionStep, StepArgument};
use crate::subsystem::SubsystemComponent;
use crate::types::ParamType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Param
// ---------------------------------------------------------------------------

/// A public parameter of an action. Synthesized from the action's steps,
/// never hand-edited; the uuid is stable across re-synthesis so commands
/// that bound it keep their reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub uuid: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ParamType,
}

// ---------------------------------------------------------------------------
// SubsystemAction
// ---------------------------------------------------------------------------

/// A named sequence of component method calls. `params` is derived from
/// `steps`; every mutation of the step list goes through `refresh_params`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsystemAction {
    pub uuid: Uuid,
    pub name: String,
    pub subsystem: Uuid,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub steps: Vec<ActionStep>,
}

impl SubsystemAction {
    pub fn new(name: impl Into<String>, subsystem: Uuid) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            subsystem,
            params: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn method_name(&self) -> String {
        ident::lower_camel(&self.name)
    }

    pub fn param(&self, id: Uuid) -> Option<&Param> {
        self.params.iter().find(|p| p.uuid == id)
    }

    pub fn param_by_name(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Computes the public parameter list from the steps: one `Param` per
    /// distinct `define_passthrough` name, in first-seen order. Types come
    /// from the catalog method's matching parameter, falling back to
    /// `double` when the method or parameter is unknown. Steps whose
    /// component cannot be found contribute nothing. Uuids of params whose
    /// name survives are preserved from `self.params`.
    pub fn synthesize_params(
        &self,
        components: &[SubsystemComponent],
        catalog: &ComponentCatalog,
    ) -> Vec<Param> {
        let mut out: Vec<Param> = Vec::new();
        for step in &self.steps {
            let Some(component) = components.iter().find(|c| c.uuid == step.component) else {
                continue;
            };
            let method = catalog.method(&component.definition, &step.method);
            for arg in &step.args {
                let StepArgument::DefinePassthrough { name } = &arg.binding else {
                    continue;
                };
                if out.iter().any(|p| &p.name == name) {
                    continue;
                }
                let ty = method
                    .and_then(|m| m.param(&arg.param))
                    .map(|p| p.ty.clone())
                    .unwrap_or_default();
                let uuid = self
                    .param_by_name(name)
                    .map(|p| p.uuid)
                    .unwrap_or_else(Uuid::new_v4);
                out.push(Param {
                    uuid,
                    name: name.clone(),
                    ty,
                });
            }
        }
        out
    }

    /// Re-synthesizes `params` in place. Called after any step mutation.
    pub fn refresh_params(
        &mut self,
        components: &[SubsystemComponent],
        catalog: &ComponentCatalog,
    ) {
        self.params = self.synthesize_params(components, catalog);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
