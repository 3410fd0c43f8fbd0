//! JSON content loading.
//!
//! Only compiled with the `data-loader` feature. Hosts that ship content as
//! data files parse one JSON document into a [`RegistryBuilder`]; the
//! builder's `build()` then runs the usual validation pass. Definition ids
//! are assigned in document order, so content files are also the id space.

use crate::registry::{
    ArtifactDef, BoonDef, HelperClassDef, MissionDef, ModifierDef, PerkDef, ProgressionConfig,
    RegistryBuilder, RegistryError, TonicDef,
};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("content document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// The content document schema. Every section is optional.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ContentDoc {
    #[serde(default)]
    upgrades: Vec<ModifierDef>,
    #[serde(default)]
    research: Vec<ModifierDef>,
    #[serde(default)]
    skills: Vec<ModifierDef>,
    #[serde(default)]
    structures: Vec<ModifierDef>,
    #[serde(default)]
    perks: Vec<PerkDef>,
    #[serde(default)]
    helper_classes: Vec<HelperClassDef>,
    #[serde(default)]
    artifacts: Vec<ArtifactDef>,
    #[serde(default)]
    tonics: Vec<TonicDef>,
    #[serde(default)]
    missions: Vec<MissionDef>,
    #[serde(default)]
    boons: Vec<BoonDef>,
    progression: Option<ProgressionConfig>,
}

/// Parse a JSON content document into a builder, ready for `build()`.
pub fn load_content_json(json: &str) -> Result<RegistryBuilder, DataLoadError> {
    let doc: ContentDoc = serde_json::from_str(json)?;
    let mut builder = RegistryBuilder::new();
    for def in doc.upgrades {
        builder.register_upgrade(def)?;
    }
    for def in doc.research {
        builder.register_research(def)?;
    }
    for def in doc.skills {
        builder.register_skill(def)?;
    }
    for def in doc.structures {
        builder.register_structure(def)?;
    }
    for def in doc.perks {
        builder.register_perk(def)?;
    }
    for def in doc.helper_classes {
        builder.register_helper_class(def)?;
    }
    for def in doc.artifacts {
        builder.register_artifact(def)?;
    }
    for def in doc.tonics {
        builder.register_tonic(def)?;
    }
    for def in doc.missions {
        builder.register_mission(def)?;
    }
    for def in doc.boons {
        builder.register_boon(def)?;
    }
    if let Some(progression) = doc.progression {
        builder.set_progression(progression);
    }
    Ok(builder)
}
