use crate::ident;
use crate::step::ActionStep;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named boolean-ish predicate on a subsystem: a single zero-argument
/// accessor call. `step` is `None` while the state is still a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsystemState {
    pub uuid: Uuid,
    pub name: String,
    pub subsystem: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<ActionStep>,
}

impl SubsystemState {
    pub fn new(name: impl Into<String>, subsystem: Uuid) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            subsystem,
            step: None,
        }
    }

    pub fn method_name(&self) -> String {
        ident::lower_camel(&self.name)
    }

    pub fn is_placeholder(&self) -> bool {
        self.step.is_none()
    }
}
