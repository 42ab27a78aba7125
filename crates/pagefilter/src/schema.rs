//! Schema graph: per-entity field types and named relations.
//!
//! The graph is plain data, built once by the surrounding application (in
//! code through [`SchemaGraph::builder`] or from JSON) and only read by the
//! filter compiler.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Semantic type of a filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticType {
    String,
    Number,
    Boolean,
    #[serde(rename = "UUID", alias = "Uuid")]
    Uuid,
    DateTime,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticType::String => "String",
            SemanticType::Number => "Number",
            SemanticType::Boolean => "Boolean",
            SemanticType::Uuid => "UUID",
            SemanticType::DateTime => "DateTime",
        };
        f.write_str(name)
    }
}

/// Declaration of a single entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Field name → semantic type, in internal (snake_case) naming.
    #[serde(default)]
    pub fields: BTreeMap<String, SemanticType>,
    /// Relation name → target entity name.
    #[serde(default)]
    pub relations: BTreeMap<String, String>,
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<SemanticType> {
        self.fields.get(name).copied()
    }

    pub fn relation(&self, name: &str) -> Option<&str> {
        self.relations.get(name).map(String::as_str)
    }
}

/// Entity name → declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaGraph {
    entities: BTreeMap<String, EntitySchema>,
}

impl SchemaGraph {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Parse a JSON schema document and validate it.
    ///
    /// ```text
    /// { "ingredient_unit": { "fields": { "name": "String" },
    ///                        "relations": { "group": "group" } } }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let graph: SchemaGraph = serde_json::from_str(json)?;
        graph.validate()?;
        Ok(graph)
    }

    pub fn entity(&self, name: &str) -> Option<&EntitySchema> {
        self.entities.get(name)
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Check that every relation points at a declared entity.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (entity, schema) in &self.entities {
            for (relation, target) in &schema.relations {
                if !self.entities.contains_key(target) {
                    return Err(SchemaError::DanglingRelation {
                        entity: entity.clone(),
                        relation: relation.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Builder for [`SchemaGraph`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    entities: BTreeMap<String, EntitySchema>,
}

impl SchemaBuilder {
    /// Declare an entity. Declaring the same name twice merges the two.
    pub fn entity(
        mut self,
        name: impl Into<String>,
        declare: impl FnOnce(EntityBuilder) -> EntityBuilder,
    ) -> Self {
        let name = name.into();
        let existing = self.entities.remove(&name).unwrap_or_default();
        let built = declare(EntityBuilder { schema: existing }).schema;
        self.entities.insert(name, built);
        self
    }

    pub fn build(self) -> Result<SchemaGraph, SchemaError> {
        let graph = SchemaGraph {
            entities: self.entities,
        };
        graph.validate()?;
        Ok(graph)
    }
}

/// Field and relation declarations for one entity.
#[derive(Debug)]
pub struct EntityBuilder {
    schema: EntitySchema,
}

impl EntityBuilder {
    pub fn field(mut self, name: impl Into<String>, ty: SemanticType) -> Self {
        self.schema.fields.insert(name.into(), ty);
        self
    }

    pub fn relation(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.schema.relations.insert(name.into(), target.into());
        self
    }
}
