use crate::legacy::LegacyHost;
use crate::types::TextureRecord;
use chrono::NaiveDateTime;
use md5::{Digest, Md5};
use serde::Serialize;

const PLACEHOLDER_HASH_SALT: &str = "non-ely-";
const SECONDS_PER_HOUR: i64 = 3600;

/// Body of `GET /textures/{nickname}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TexturesDescriptor {
    #[serde(rename = "SKIN")]
    pub skin: SkinTexture,
    #[serde(rename = "CAPE")]
    pub cape: CapeTexture,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkinTexture {
    pub url: String,
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SkinMetadata>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkinMetadata {
    pub model: &'static str,
}

impl SkinMetadata {
    pub const SLIM: SkinMetadata = SkinMetadata { model: "slim" };
}

/// Capes are not served, the entry is always blank.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CapeTexture {
    pub url: String,
    pub hash: String,
}

impl TexturesDescriptor {
    /// `nickname` is the name as requested, it only matters when there is no
    /// usable record. `now` is the server's local wall-clock time.
    pub fn build(
        record: Option<&TextureRecord>,
        nickname: &str,
        host: &LegacyHost,
        now: NaiveDateTime,
    ) -> Self {
        let skin = match record.filter(|r| r.has_skin()) {
            Some(record) => SkinTexture {
                url: record.fields.url.clone(),
                hash: record.fields.hash.clone(),
                metadata: record.fields.is_slim.then_some(SkinMetadata::SLIM),
            },
            None => SkinTexture {
                url: host.skin_url(nickname).into(),
                hash: placeholder_hash(nickname, now),
                metadata: None,
            },
        };

        TexturesDescriptor {
            skin,
            cape: CapeTexture::default(),
        }
    }
}

/// Hash for skins served from the legacy host. Clients cache textures by
/// hash, so it rotates at the top of every hour to make them refetch.
///
/// The local wall-clock hour is read as if it were UTC before taking the
/// unix timestamp, matching hashes issued by earlier deployments.
pub fn placeholder_hash(nickname: &str, now: NaiveDateTime) -> String {
    let timestamp = now.and_utc().timestamp();
    let hour = timestamp - timestamp.rem_euclid(SECONDS_PER_HOUR);

    let digest = Md5::digest(format!("{PLACEHOLDER_HASH_SALT}{hour}-{nickname}"));
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TextureFields;
    use chrono::NaiveDate;
    use url::Url;

    fn host() -> LegacyHost {
        LegacyHost::new(Url::parse("http://skins.minecraft.net").unwrap())
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn record(skin_id: i64, is_slim: bool) -> TextureRecord {
        TextureRecord::new(
            1,
            "mock",
            TextureFields {
                user_id: 1,
                skin_id,
                url: "http://ely.by/minecraft/skins/skin.png".into(),
                hash: "55d2a8848764f5ff04012cdb093458bd".into(),
                is_slim,
                is_1_8: false,
            },
        )
    }

    #[test]
    fn test_placeholder_hash() {
        // 2016-01-15 13:00:00 read as UTC is 1452862800.
        let expected = hex::encode(Md5::digest("non-ely-1452862800-Notch"));

        assert_eq!(placeholder_hash("Notch", at(13, 0, 0)), expected);
        assert_eq!(placeholder_hash("Notch", at(13, 59, 59)), expected);
        assert_ne!(placeholder_hash("Notch", at(14, 0, 0)), expected);
        assert_ne!(placeholder_hash("notch", at(13, 30, 0)), expected);
        assert_eq!(expected.len(), 32);
    }

    #[test]
    fn test_without_record() {
        let descriptor = TexturesDescriptor::build(None, "Notch", &host(), at(13, 10, 0));

        assert_eq!(
            descriptor.skin.url,
            "http://skins.minecraft.net/MinecraftSkins/Notch.png"
        );
        assert_eq!(descriptor.skin.hash, placeholder_hash("Notch", at(13, 0, 0)));
        assert_eq!(descriptor.cape, CapeTexture::default());
    }

    #[test]
    fn test_record_without_skin_is_ignored() {
        let record = record(0, true);
        let with_record = TexturesDescriptor::build(Some(&record), "Mock", &host(), at(9, 0, 0));
        let without = TexturesDescriptor::build(None, "Mock", &host(), at(9, 0, 0));

        assert_eq!(with_record, without);
    }

    #[test]
    fn test_json_shape() {
        let slim = record(5, true);
        let descriptor = TexturesDescriptor::build(Some(&slim), "mock", &host(), at(9, 0, 0));
        assert_eq!(
            serde_json::to_value(&descriptor).unwrap(),
            serde_json::json!({
                "SKIN": {
                    "url": "http://ely.by/minecraft/skins/skin.png",
                    "hash": "55d2a8848764f5ff04012cdb093458bd",
                    "metadata": {"model": "slim"},
                },
                "CAPE": {"url": "", "hash": ""},
            })
        );

        let steve = record(5, false);
        let descriptor = TexturesDescriptor::build(Some(&steve), "mock", &host(), at(9, 0, 0));
        let value = serde_json::to_value(&descriptor).unwrap();
        assert!(value["SKIN"].get("metadata").is_none());
    }
}
