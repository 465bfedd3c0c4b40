use crate::action::SubsystemAction;
use crate::catalog::ComponentCatalog;
use crate::command::AtomicCommand;
use crate::error::{CoreError, Result};
use crate::ident;
use crate::state::SubsystemState;
use crate::step::ActionStep;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// SubsystemComponent
// ---------------------------------------------------------------------------

/// A hardware component instance on a subsystem, referencing its catalog
/// definition by id. Properties (ports, CAN ids) are pass-through data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsystemComponent {
    pub uuid: Uuid,
    pub name: String,
    pub definition: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl SubsystemComponent {
    pub fn new(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            definition: definition.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn field_name(&self) -> String {
        ident::lower_camel(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Subsystem
// ---------------------------------------------------------------------------

/// Owns its components, actions, states, and locally-scoped commands.
/// Cross-subsystem composition happens in project-level command groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subsystem {
    pub uuid: Uuid,
    pub name: String,
    #[serde(default)]
    pub components: Vec<SubsystemComponent>,
    #[serde(default)]
    pub actions: Vec<SubsystemAction>,
    #[serde(default)]
    pub states: Vec<SubsystemState>,
    #[serde(default)]
    pub commands: Vec<AtomicCommand>,
}

impl Subsystem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            components: Vec::new(),
            actions: Vec::new(),
            states: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Java field the generated container uses to hold this subsystem.
    pub fn field_name(&self) -> String {
        ident::lower_camel(&self.name)
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub fn component(&self, id: Uuid) -> Option<&SubsystemComponent> {
        self.components.iter().find(|c| c.uuid == id)
    }

    pub fn action(&self, id: Uuid) -> Option<&SubsystemAction> {
        self.actions.iter().find(|a| a.uuid == id)
    }

    pub fn state(&self, id: Uuid) -> Option<&SubsystemState> {
        self.states.iter().find(|s| s.uuid == id)
    }

    pub fn command(&self, id: Uuid) -> Option<&AtomicCommand> {
        self.commands.iter().find(|c| c.uuid == id)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub fn add_component(&mut self, name: impl Into<String>, definition: impl Into<String>) -> Uuid {
        let component = SubsystemComponent::new(name, definition);
        let id = component.uuid;
        self.components.push(component);
        id
    }

    /// Replaces an action's step list and re-synthesizes its derived
    /// parameters in the same operation.
    pub fn set_action_steps(
        &mut self,
        action: Uuid,
        steps: Vec<ActionStep>,
        catalog: &ComponentCatalog,
    ) -> Result<()> {
        let components = &self.components;
        let Some(act) = self.actions.iter_mut().find(|a| a.uuid == action) else {
            return Err(CoreError::ActionNotFound(action.to_string()));
        };
        act.steps = steps;
        act.refresh_params(components, catalog);
        Ok(())
    }

    pub fn set_state_step(&mut self, state: Uuid, step: Option<ActionStep>) -> Result<()> {
        let Some(st) = self.states.iter_mut().find(|s| s.uuid == state) else {
            return Err(CoreError::StateNotFound(state.to_string()));
        };
        st.step = step;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
