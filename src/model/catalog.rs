use crate::template::Catalogued;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// "N uses of catalog item `id`".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateRef {
    pub id: String,
    pub count: NonZeroU32,
}

impl TemplateRef {
    #[must_use]
    pub fn new(id: impl Into<String>, count: NonZeroU32) -> Self {
        Self {
            id: id.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingTemplate {
    pub id: String,
    pub name: String,
    /// Rated power per fixture in W.
    #[serde(default)]
    pub power: f64,
    #[serde(default)]
    pub efficacy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotovoltaicTemplate {
    pub id: String,
    pub name: String,
    /// Panel area in m².
    #[serde(default)]
    pub area: f64,
    #[serde(default)]
    pub efficiency: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azimuth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FenestrationTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub area: f64,
    #[serde(default)]
    pub u_value: f64,
    #[serde(default)]
    pub shgc: f64,
}

/// Master lists that template references point into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub lighting: Vec<LightingTemplate>,
    #[serde(default)]
    pub photovoltaics: Vec<PhotovoltaicTemplate>,
    #[serde(default)]
    pub fenestrations: Vec<FenestrationTemplate>,
}

macro_rules! catalogued {
    ($($ty:ty),*) => {
        $(
            impl Catalogued for $ty {
                fn catalog_id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

catalogued!(
    TemplateRef,
    LightingTemplate,
    PhotovoltaicTemplate,
    FenestrationTemplate
);
