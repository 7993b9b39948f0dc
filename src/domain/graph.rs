use serde::{Deserialize, Serialize};

pub type GraphId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphMeta {
    pub id: GraphId,
    pub version: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub input_schema: InputSchema,
}

/// JSON-schema style description of a graph's inputs. Only the parts the
/// details view reads are modeled; everything else is ignored on decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InputProperty {
    #[serde(default)]
    pub title: Option<String>,
}

impl InputSchema {
    pub fn property(&self, key: &str) -> Option<InputProperty> {
        let raw = self.properties.get(key)?;
        match serde_json::from_value(raw.clone()) {
            Ok(prop) => Some(prop),
            Err(e) => {
                tracing::debug!("input schema entry {} is not an object: {}", key, e);
                Some(InputProperty::default())
            }
        }
    }

    /// Title declared for `key`. `None` when the key has no schema entry or
    /// the entry carries no usable title.
    pub fn title_for(&self, key: &str) -> Option<String> {
        self.property(key)?
            .title
            .filter(|title| !title.trim().is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> InputSchema {
        serde_json::from_value(value).expect("valid schema")
    }

    #[test]
    fn title_lookup_is_total() {
        let schema = schema(json!({
            "type": "object",
            "properties": {
                "city": {"title": "City Name", "type": "string"},
                "days": {"type": "integer"},
                "blank": {"title": "  "},
                "odd": 5
            }
        }));

        assert_eq!(schema.title_for("city").as_deref(), Some("City Name"));
        assert_eq!(schema.title_for("days"), None);
        assert_eq!(schema.title_for("blank"), None);
        assert_eq!(schema.title_for("odd"), None);
        assert_eq!(schema.title_for("missing"), None);
        assert!(schema.contains("odd"));
        assert!(!schema.contains("missing"));
    }

    #[test]
    fn graph_decodes_without_schema() {
        let graph: GraphMeta =
            serde_json::from_value(json!({"id": "g-1", "version": 3})).expect("graph");
        assert_eq!(graph.id, "g-1");
        assert_eq!(graph.version, 3);
        assert!(graph.input_schema.properties.is_empty());
    }
}
