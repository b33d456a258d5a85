use serde::{Deserialize, Serialize};

/// Store-assigned record identity. Opaque to everything but the store.
pub type RecordId = u64;

/// The mutable part of a texture record. Every write replaces all of it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureFields {
    /// External account id, 0 when unassigned.
    #[serde(rename = "userId", default)]
    pub user_id: i64,
    /// 0 means no real skin is assigned and reads fall back to the legacy host.
    #[serde(rename = "skinId", default)]
    pub skin_id: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub hash: String,
    #[serde(rename = "isSlim", default)]
    pub is_slim: bool,
    /// Kept for old writers, never consulted when shaping responses.
    #[serde(rename = "is1_8", default)]
    pub is_1_8: bool,
}

/// One document of the `skins` collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureRecord {
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// Always stored lowercased.
    pub nickname: String,
    #[serde(flatten)]
    pub fields: TextureFields,
}

impl TextureRecord {
    pub fn new(id: RecordId, nickname: &str, fields: TextureFields) -> Self {
        TextureRecord {
            id,
            nickname: nickname.to_lowercase(),
            fields,
        }
    }

    /// Whether this record carries a real skin. Records without one must be
    /// indistinguishable from a missing record on every read path.
    pub fn has_skin(&self) -> bool {
        self.fields.skin_id != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_shape() {
        let record = TextureRecord::new(
            7,
            "ErickSkrauch",
            TextureFields {
                user_id: 1,
                skin_id: 5,
                url: "http://ely.by/minecraft/skins/erick.png".into(),
                hash: "55d2a8848764f5ff04012cdb093458bd".into(),
                is_slim: true,
                is_1_8: false,
            },
        );

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "_id": 7,
                "nickname": "erickskrauch",
                "userId": 1,
                "skinId": 5,
                "url": "http://ely.by/minecraft/skins/erick.png",
                "hash": "55d2a8848764f5ff04012cdb093458bd",
                "isSlim": true,
                "is1_8": false,
            })
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let record: TextureRecord =
            serde_json::from_str(r#"{"_id": 1, "nickname": "notch"}"#).unwrap();
        assert_eq!(record.fields, TextureFields::default());
        assert!(!record.has_skin());
    }
}
