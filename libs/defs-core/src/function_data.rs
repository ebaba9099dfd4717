use indexmap::IndexMap;
use serde_json::Value;

/// Uniform carrier for both map-shaped function inputs (multiple named
/// parameters) and single-valued outputs.
///
/// A call's argument map and a handler's return value are both
/// `FunctionData` so a portal never needs to know which shape it's
/// forwarding.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionData(Repr);

#[derive(Debug, Clone, PartialEq)]
enum Repr {
    Map(IndexMap<String, Value>),
    Single(Value),
}

impl FunctionData {
    pub fn from_map(map: IndexMap<String, Value>) -> Self {
        Self(Repr::Map(map))
    }

    pub fn from_value(value: Value) -> Self {
        Self(Repr::Single(value))
    }

    pub fn empty() -> Self {
        Self(Repr::Map(IndexMap::new()))
    }

    /// Builds a `FunctionData` from a JSON object, falling back to a
    /// single-valued carrier for anything else.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(Repr::Map(map.into_iter().collect())),
            other => Self(Repr::Single(other)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        match &self.0 {
            Repr::Map(map) => map.get(name),
            Repr::Single(_) => None,
        }
    }

    /// Sets a named entry, promoting a single-valued carrier to a map (the
    /// prior value is kept under the key `"value"`) the first time a name
    /// is set on it.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        if let Repr::Single(existing) = &self.0 {
            let mut map = IndexMap::new();
            map.insert("value".to_string(), existing.clone());
            self.0 = Repr::Map(map);
        }
        if let Repr::Map(map) = &mut self.0 {
            map.insert(name.into(), value);
        }
    }

    pub fn has(&self, name: &str) -> bool {
        match &self.0 {
            Repr::Map(map) => map.contains_key(name),
            Repr::Single(_) => false,
        }
    }

    pub fn keys(&self) -> Vec<&str> {
        match &self.0 {
            Repr::Map(map) => map.keys().map(String::as_str).collect(),
            Repr::Single(_) => Vec::new(),
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self.0, Repr::Single(_))
    }

    /// The parameter map, for both shapes: a single value is wrapped under
    /// the key `"value"`.
    pub fn to_map(&self) -> IndexMap<String, Value> {
        match &self.0 {
            Repr::Map(map) => map.clone(),
            Repr::Single(v) => {
                let mut map = IndexMap::with_capacity(1);
                map.insert("value".to_string(), v.clone());
                map
            }
        }
    }

    /// A `serde_json::Value` view: a JSON object for the map shape, the
    /// held value itself for the single shape. This is what the validation
    /// engine is handed when validating a call's input.
    pub fn value(&self) -> Value {
        match &self.0 {
            Repr::Map(map) => Value::Object(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
            Repr::Single(v) => v.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn map_round_trips_through_get_set_has_keys() {
        let mut data = FunctionData::empty();
        assert!(!data.has("a"));
        data.set("a", json!(1));
        assert!(data.has("a"));
        assert_eq!(data.get("a"), Some(&json!(1)));
        assert_eq!(data.keys(), vec!["a"]);
    }

    #[test]
    fn single_value_promotes_to_map_on_set() {
        let mut data = FunctionData::from_value(json!(42));
        assert!(data.is_single());
        assert_eq!(data.value(), json!(42));
        data.set("extra", json!("x"));
        assert!(!data.is_single());
        assert_eq!(data.get("value"), Some(&json!(42)));
        assert_eq!(data.get("extra"), Some(&json!("x")));
    }

    #[test]
    fn from_json_object_becomes_a_map() {
        let data = FunctionData::from_json(json!({"id": 1, "name": "a"}));
        assert_eq!(data.get("id"), Some(&json!(1)));
        assert_eq!(data.value(), json!({"id": 1, "name": "a"}));
    }
}
