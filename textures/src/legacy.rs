//! Back-compat for the first generation of the skin protocol, where clients
//! asked `/minecraft.php?name=..&type=..` and identified themselves with
//! underscore-separated or auth library versions.
use serde::Deserialize;
use url::{Position, Url};

/// Auth library releases and the game version each one shipped with.
pub const AUTHLIB_TO_MINECRAFT: &[(&str, &str)] = &[
    ("1.3", "1.7.2"),
    ("1.2", "1.7.4"),
    ("1.3.1", "1.7.5"),
    ("1.5.13", "1.7.9"),
    ("1.5.16", "1.7.10"),
    ("1.5.17", "1.8.1"),
];

const SKINS_DIR: &str = "MinecraftSkins";
const CAPES_DIR: &str = "MinecraftCloaks";

// Only used to get the canonical path and query percent-encoded by `Url`.
const LOCAL_BASE: &str = "http://localhost/";

/// The upstream image host this service fronts. Never fetched, only
/// redirected to.
#[derive(Clone, Debug, PartialEq)]
pub struct LegacyHost {
    base: Url,
}

impl LegacyHost {
    pub fn new(base: Url) -> Self {
        LegacyHost { base }
    }

    pub fn skin_url(&self, nickname: &str) -> Url {
        self.texture_url(SKINS_DIR, nickname)
    }

    pub fn cape_url(&self, nickname: &str) -> Url {
        self.texture_url(CAPES_DIR, nickname)
    }

    fn texture_url(&self, dir: &str, nickname: &str) -> Url {
        let mut url = self.base.clone();
        // Base URLs are validated with the config, cannot-be-a-base is rejected there.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(dir)
                .push(&format!("{nickname}.png"));
        }
        url
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LegacyParams {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub mine_ver: Option<String>,
    pub auth_lib: Option<String>,
    pub ver: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LegacyTarget {
    /// Straight to the legacy cape host with the nickname as sent.
    Cape { nickname: String },
    /// To the canonical `/skins/{nickname}` endpoint, which does the lookup.
    Skin {
        nickname: String,
        minecraft_version: Option<String>,
        version: Option<String>,
    },
}

impl LegacyTarget {
    pub fn resolve(params: LegacyParams) -> Self {
        let nickname = params.name.unwrap_or_default();

        if matches!(params.kind.as_deref(), Some("cloack" | "cloak")) {
            return LegacyTarget::Cape { nickname };
        }

        let minecraft_version = non_empty(params.mine_ver)
            .map(|v| v.replace('_', "."))
            .or_else(|| non_empty(params.auth_lib).and_then(|lib| minecraft_for_authlib(&lib)));

        let version = non_empty(params.ver).map(|v| {
            if v == "1_0_0" { "1".to_string() } else { v }
        });

        LegacyTarget::Skin {
            nickname,
            minecraft_version,
            version,
        }
    }

    /// Where the client is sent. Skin targets are server-relative.
    pub fn location(&self, host: &LegacyHost) -> Result<String, url::ParseError> {
        match self {
            LegacyTarget::Cape { nickname } => Ok(host.cape_url(nickname).into()),
            LegacyTarget::Skin {
                nickname,
                minecraft_version,
                version,
            } => {
                let mut url = Url::parse(LOCAL_BASE)?;
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.pop_if_empty().push("skins").push(nickname);
                }

                let mut pairs = Vec::new();
                if let Some(mv) = minecraft_version {
                    pairs.push(("minecraft_version", mv.as_str()));
                }
                if let Some(v) = version {
                    pairs.push(("version", v.as_str()));
                }
                if !pairs.is_empty() {
                    url.query_pairs_mut().extend_pairs(pairs);
                }

                Ok(url[Position::BeforePath..].to_string())
            }
        }
    }
}

pub fn minecraft_for_authlib(authlib_version: &str) -> Option<String> {
    AUTHLIB_TO_MINECRAFT
        .iter()
        .find(|(authlib, _)| *authlib == authlib_version)
        .map(|(_, minecraft)| minecraft.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
