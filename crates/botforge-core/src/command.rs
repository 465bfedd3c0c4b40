use crate::ident;
use crate::types::{EndCondition, InvocationType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ParamCallOption
// ---------------------------------------------------------------------------

/// How a command supplies one parameter of its action: a baked-in literal,
/// a value forwarded from the factory's caller, or a supplier polled each
/// time the action runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamCallOption {
    pub action: Uuid,
    pub param: Uuid,
    pub invocation: InvocationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardcoded_value: Option<String>,
}

// ---------------------------------------------------------------------------
// AtomicCommand
// ---------------------------------------------------------------------------

/// One action bound to an end condition, optionally preceded by
/// initialization actions. Partially-authored commands are legal; the
/// assembler reports them as not yet generatable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicCommand {
    pub uuid: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default = "Uuid::nil")]
    pub subsystem: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_condition: Option<EndCondition>,
    #[serde(default)]
    pub params: Vec<ParamCallOption>,
    #[serde(default)]
    pub to_initialize: Vec<Uuid>,
}

impl AtomicCommand {
    pub fn new(name: impl Into<String>, subsystem: Uuid) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            subsystem,
            action: None,
            end_condition: None,
            params: Vec::new(),
            to_initialize: Vec::new(),
        }
    }

    pub fn method_name(&self) -> String {
        ident::lower_camel(&self.name)
    }

    /// Call options the factory method exposes as parameters, in declared
    /// order: everything that is not hardcoded.
    pub fn public_options(&self) -> impl Iterator<Item = &ParamCallOption> {
        self.params
            .iter()
            .filter(|o| o.invocation != InvocationType::Hardcode)
    }

    pub fn option_for(&self, param: Uuid) -> Option<&ParamCallOption> {
        self.params.iter().find(|o| o.param == param)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_options_exclude_hardcodes() {
        let action = Uuid::new_v4();
        let mut cmd = AtomicCommand::new("Score", Uuid::new_v4());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        cmd.params = vec![
            ParamCallOption {
                action,
                param: a,
                invocation: InvocationType::Hardcode,
                hardcoded_value: Some("1.0".into()),
            },
            ParamCallOption {
                action,
                param: b,
                invocation: InvocationType::PassthroughSupplier,
                hardcoded_value: None,
            },
        ];
        let public: Vec<_> = cmd.public_options().collect();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].param, b);
    }

    #[test]
    fn sparse_command_deserializes() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{ "uuid": "{id}" }}"#);
        let cmd: AtomicCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd.uuid, id);
        assert!(cmd.name.is_empty());
        assert!(cmd.subsystem.is_nil());
        assert!(cmd.action.is_none());
        assert!(cmd.end_condition.is_none());
    }

    #[test]
    fn end_condition_state_roundtrip() {
        let mut cmd = AtomicCommand::new("Raise", Uuid::new_v4());
        let state = Uuid::new_v4();
        cmd.end_condition = Some(EndCondition::State(state));
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains(&state.to_string()));
        let parsed: AtomicCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.end_condition, Some(EndCondition::State(state)));
    }

    #[test]
    fn method_name_casing() {
        let cmd = AtomicCommand::new("Score piece high", Uuid::new_v4());
        assert_eq!(cmd.method_name(), "scorePieceHigh");
    }
}
