use mongodb::bson::{Bson, Document};
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;

/// Payload of an insert: one document or a list of documents.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DocumentInput {
    Many(Vec<Value>),
    One(Value),
}

impl DocumentInput {
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            DocumentInput::Many(values) => values,
            DocumentInput::One(value) => vec![value],
        }
    }
}

/// Convert a JSON object into a BSON document. Extended JSON wrappers such as
/// `{"$oid": ..}` and `{"$date": ..}` become their BSON types, so ids handed
/// out by an insert can be used in later filters. `field` names the request
/// field for the error message.
pub fn to_document(value: &Value, field: &str) -> Result<Document, AppError> {
    let not_object = || AppError::Validation(format!("{} must be a JSON object", field));
    if !value.is_object() {
        return Err(not_object());
    }
    match Bson::try_from(value.clone()) {
        Ok(Bson::Document(doc)) => Ok(doc),
        Ok(_) => Err(not_object()),
        Err(e) => Err(AppError::Validation(format!("Invalid {}: {}", field, e))),
    }
}

/// Render an inserted `_id` the way clients expect it: ObjectIds as hex.
pub fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use serde_json::json;

    #[test]
    fn objects_convert_and_scalars_are_rejected() {
        let doc = to_document(&json!({"name": "a", "age": 3}), "data").unwrap();
        assert_eq!(doc.get_str("name").unwrap(), "a");
        assert!(to_document(&json!([1, 2]), "data").is_err());
        assert!(to_document(&json!("x"), "filter_query").is_err());
    }

    #[test]
    fn extended_json_ids_become_object_ids() {
        let oid = ObjectId::new();
        let filter = to_document(&json!({"_id": {"$oid": oid.to_hex()}}), "filter_query").unwrap();
        assert_eq!(filter.get_object_id("_id").unwrap(), oid);

        assert!(to_document(&json!({"$oid": oid.to_hex()}), "filter_query").is_err());
        assert!(to_document(&json!({"_id": {"$oid": "not-hex"}}), "filter_query").is_err());
    }

    #[test]
    fn single_document_or_list() {
        let one: DocumentInput = serde_json::from_value(json!({"name": "a"})).unwrap();
        assert_eq!(one.into_vec().len(), 1);
        let many: DocumentInput =
            serde_json::from_value(json!([{"name": "a"}, {"name": "b"}])).unwrap();
        assert_eq!(many.into_vec().len(), 2);
    }

    #[test]
    fn ids_render_as_strings() {
        let oid = ObjectId::new();
        assert_eq!(id_to_string(&Bson::ObjectId(oid)), oid.to_hex());
        assert_eq!(id_to_string(&Bson::String("abc".into())), "abc");
        assert_eq!(id_to_string(&Bson::Int32(7)), "7");
    }
}
