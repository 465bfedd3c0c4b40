use crate::error::{CoreError, Result};
use crate::types::ParamType;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// ReturnType
// ---------------------------------------------------------------------------

/// Return type of a component method: `"void"` or a type name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReturnType {
    #[default]
    Void,
    Value(ParamType),
}

impl ReturnType {
    pub fn is_void(&self) -> bool {
        matches!(self, ReturnType::Void)
    }

    pub fn value(&self) -> Option<&ParamType> {
        match self {
            ReturnType::Void => None,
            ReturnType::Value(ty) => Some(ty),
        }
    }
}

impl Serialize for ReturnType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ReturnType::Void => serializer.serialize_str("void"),
            ReturnType::Value(ty) => serializer.serialize_str(ty.java_name()),
        }
    }
}

impl<'de> Deserialize<'de> for ReturnType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == "void" {
            Ok(ReturnType::Void)
        } else {
            Ok(ReturnType::Value(ParamType::from(s.as_str())))
        }
    }
}

// ---------------------------------------------------------------------------
// MethodSpec / ComponentDefinition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ParamType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSpec {
    pub name: String,
    #[serde(default)]
    pub params: Vec<MethodParam>,
    #[serde(default)]
    pub returns: ReturnType,
}

impl MethodSpec {
    pub fn param(&self, name: &str) -> Option<&MethodParam> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub methods: Vec<MethodSpec>,
}

impl ComponentDefinition {
    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.iter().find(|m| m.name == name)
    }
}

// ---------------------------------------------------------------------------
// ComponentCatalog
// ---------------------------------------------------------------------------

/// Registry of hardware component definitions, keyed by definition id.
/// The compiler only reads this; curation happens elsewhere.
#[derive(Debug, Clone, Default)]
pub struct ComponentCatalog {
    definitions: BTreeMap<String, ComponentDefinition>,
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, def: ComponentDefinition) {
        self.definitions.insert(def.id.clone(), def);
    }

    pub fn lookup(&self, id: &str) -> Option<&ComponentDefinition> {
        self.definitions.get(id)
    }

    pub fn method(&self, id: &str, name: &str) -> Option<&MethodSpec> {
        self.lookup(id).and_then(|d| d.method(name))
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ComponentDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Parses a catalog from a JSON array of component definitions.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let defs: Vec<ComponentDefinition> = serde_json::from_str(s)?;
        let mut catalog = Self::new();
        for def in defs {
            catalog.insert(def);
        }
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::DefinitionNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }
}

// ---------------------------------------------------------------------------
// Built-in definitions
// ---------------------------------------------------------------------------

/// A small set of common components, available without a catalog file.
pub fn default_catalog() -> ComponentCatalog {
    let mut catalog = ComponentCatalog::new();
    catalog.insert(ComponentDefinition {
        id: "motor-controller".to_string(),
        name: "Motor Controller".to_string(),
        methods: vec![
            MethodSpec {
                name: "set".to_string(),
                params: vec![MethodParam {
                    name: "speed".to_string(),
                    ty: ParamType::Double,
                }],
                returns: ReturnType::Void,
            },
            MethodSpec {
                name: "get".to_string(),
                params: vec![],
                returns: ReturnType::Value(ParamType::Double),
            },
            MethodSpec {
                name: "stopMotor".to_string(),
                params: vec![],
                returns: ReturnType::Void,
            },
            MethodSpec {
                name: "setInverted".to_string(),
                params: vec![MethodParam {
                    name: "isInverted".to_string(),
                    ty: ParamType::Boolean,
                }],
                returns: ReturnType::Void,
            },
        ],
    });
    catalog.insert(ComponentDefinition {
        id: "solenoid".to_string(),
        name: "Solenoid".to_string(),
        methods: vec![
            MethodSpec {
                name: "set".to_string(),
                params: vec![MethodParam {
                    name: "on".to_string(),
                    ty: ParamType::Boolean,
                }],
                returns: ReturnType::Void,
            },
            MethodSpec {
                name: "get".to_string(),
                params: vec![],
                returns: ReturnType::Value(ParamType::Boolean),
            },
            MethodSpec {
                name: "toggle".to_string(),
                params: vec![],
                returns: ReturnType::Void,
            },
        ],
    });
    catalog.insert(ComponentDefinition {
        id: "digital-input".to_string(),
        name: "Digital Input".to_string(),
        methods: vec![MethodSpec {
            name: "get".to_string(),
            params: vec![],
            returns: ReturnType::Value(ParamType::Boolean),
        }],
    });
    catalog.insert(ComponentDefinition {
        id: "encoder".to_string(),
        name: "Encoder".to_string(),
        methods: vec![
            MethodSpec {
                name: "getDistance".to_string(),
                params: vec![],
                returns: ReturnType::Value(ParamType::Double),
            },
            MethodSpec {
                name: "getRate".to_string(),
                params: vec![],
                returns: ReturnType::Value(ParamType::Double),
            },
            MethodSpec {
                name: "reset".to_string(),
                params: vec![],
                returns: ReturnType::Void,
            },
        ],
    });
    catalog.insert(ComponentDefinition {
        id: "servo".to_string(),
        name: "Servo".to_string(),
        methods: vec![
            MethodSpec {
                name: "setAngle".to_string(),
                params: vec![MethodParam {
                    name: "degrees".to_string(),
                    ty: ParamType::Double,
                }],
                returns: ReturnType::Void,
            },
            MethodSpec {
                name: "getAngle".to_string(),
                params: vec![],
                returns: ReturnType::Value(ParamType::Double),
            },
        ],
    });
    catalog
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
