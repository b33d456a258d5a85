//! Metrics definitions for the texture endpoints.

use shared::metrics_defs::{MetricDef, MetricType};

pub const SKIN_REQUEST: MetricDef = MetricDef {
    name: "skins.request",
    metric_type: MetricType::Counter,
    description: "Number of skin redirect requests",
};

pub const SKIN_FALLBACK: MetricDef = MetricDef {
    name: "skins.fallback",
    metric_type: MetricType::Counter,
    description: "Number of skin requests redirected to the legacy host",
};

pub const CAPE_REQUEST: MetricDef = MetricDef {
    name: "capes.request",
    metric_type: MetricType::Counter,
    description: "Number of cape redirect requests",
};

pub const TEXTURES_REQUEST: MetricDef = MetricDef {
    name: "textures.request",
    metric_type: MetricType::Counter,
    description: "Number of texture descriptor requests",
};

pub const TEXTURES_FALLBACK: MetricDef = MetricDef {
    name: "textures.fallback",
    metric_type: MetricType::Counter,
    description: "Number of texture descriptors built from the placeholder skin",
};

pub const LEGACY_SKIN_REQUEST: MetricDef = MetricDef {
    name: "skins.minecraft-php-request",
    metric_type: MetricType::Counter,
    description: "Number of skin requests through /minecraft.php",
};

pub const LEGACY_CAPE_REQUEST: MetricDef = MetricDef {
    name: "capes.minecraft-php-request",
    metric_type: MetricType::Counter,
    description: "Number of cape requests through /minecraft.php",
};

pub const SET_SKIN_REQUEST: MetricDef = MetricDef {
    name: "api.skins.post.request",
    metric_type: MetricType::Counter,
    description: "Number of skin write requests",
};

pub const SET_SKIN_FORBIDDEN: MetricDef = MetricDef {
    name: "api.skins.post.forbidden",
    metric_type: MetricType::Counter,
    description: "Number of skin writes rejected for a missing or wrong key",
};

pub const SET_SKIN_FAILURE: MetricDef = MetricDef {
    name: "api.skins.post.failure",
    metric_type: MetricType::Counter,
    description: "Number of skin writes the store failed to persist",
};

pub const ALL_METRICS: &[MetricDef] = &[
    SKIN_REQUEST,
    SKIN_FALLBACK,
    CAPE_REQUEST,
    TEXTURES_REQUEST,
    TEXTURES_FALLBACK,
    LEGACY_SKIN_REQUEST,
    LEGACY_CAPE_REQUEST,
    SET_SKIN_REQUEST,
    SET_SKIN_FORBIDDEN,
    SET_SKIN_FAILURE,
];
