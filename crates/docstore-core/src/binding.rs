// Model binding — the discriminated init-time configuration.
//
// A service binds either a precompiled model or a raw schema plus a model
// name. The enum makes the invalid combinations unrepresentable; resolve()
// collapses both arms into a Model at init time.

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::schema::Schema;

/// A compiled model: the collection name plus its schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub schema: Schema,
}

impl Model {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// What a service hands to `init`: a precompiled model, or a schema and the
/// name to compile it under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModelBinding {
    Model(Model),
    Schema { schema: Schema, model_name: String },
}

impl ModelBinding {
    /// Collapse the binding into a model. An empty collection name is a
    /// configuration error, reported synchronously.
    pub fn resolve(self) -> StoreResult<Model> {
        let model = match self {
            Self::Model(model) => model,
            Self::Schema { schema, model_name } => Model::new(model_name, schema),
        };
        if model.name.trim().is_empty() {
            return Err(StoreError::Config(
                "model name must not be empty".into(),
            ));
        }
        Ok(model)
    }
}
