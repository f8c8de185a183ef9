use core::result::Result;

use bevy::asset::io::Reader;
use bevy::asset::{AssetLoader, LoadContext};
use bevy::prelude::*;
use bevy::reflect::TypePath;
use bevy::tasks::ConditionalSendFuture;
use serde::{Deserialize, Serialize};
use shape_balance::prelude::{DistributionPolicy, SpawnerConfig};

/// Asset describing a [`SpawnerConfig`] for `shape_balance`.
///
/// Omitted optional fields fall back to the [`SpawnerConfig`] defaults.
#[derive(Asset, TypePath, Clone, Debug, Serialize, Deserialize)]
pub struct SpawnerConfigAsset {
    pub meshes: Vec<String>,
    pub materials: Vec<String>,
    #[serde(default)]
    pub initial_count: Option<usize>,
    #[serde(default)]
    pub scale: Option<ScaleDef>,
    #[serde(default)]
    pub bounds: Option<BoundsDef>,
    #[serde(default)]
    pub policy: DistributionPolicy,
}

/// Per-axis scale range.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ScaleDef {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

/// Placement box given by center and half extent.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BoundsDef {
    pub center: [f32; 3],
    pub half_extent: [f32; 3],
}

impl From<&SpawnerConfigAsset> for SpawnerConfig {
    fn from(asset: &SpawnerConfigAsset) -> Self {
        let mut config =
            SpawnerConfig::new(asset.meshes.iter().cloned(), asset.materials.iter().cloned())
                .with_policy(asset.policy);
        if let Some(count) = asset.initial_count {
            config = config.with_initial_count(count);
        }
        if let Some(scale) = asset.scale {
            config = config.with_scale_range(
                glam::Vec3::from_array(scale.min),
                glam::Vec3::from_array(scale.max),
            );
        }
        if let Some(bounds) = asset.bounds {
            config = config.with_bounds(
                glam::Vec3::from_array(bounds.center),
                glam::Vec3::from_array(bounds.half_extent),
            );
        }
        config
    }
}

impl From<SpawnerConfigAsset> for SpawnerConfig {
    fn from(asset: SpawnerConfigAsset) -> Self {
        (&asset).into()
    }
}

/// Parse a [`SpawnerConfigAsset`] from RON text.
pub fn parse_spawner_config(bytes: &[u8]) -> anyhow::Result<SpawnerConfigAsset> {
    ron::de::from_bytes(bytes).map_err(|e| anyhow::anyhow!(e))
}

/// Asset loader for [`SpawnerConfigAsset`] using RON files with `.spawner` extension.
#[derive(TypePath)]
pub struct SpawnerConfigAssetLoader;

impl AssetLoader for SpawnerConfigAssetLoader {
    type Asset = SpawnerConfigAsset;
    type Settings = ();
    type Error = anyhow::Error;

    fn extensions(&self) -> &[&str] {
        &["spawner"]
    }

    fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _context: &mut LoadContext,
    ) -> impl ConditionalSendFuture<Output = Result<Self::Asset, Self::Error>> {
        Box::pin(async move {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).await?;
            parse_spawner_config(&bytes)
        })
    }
}

impl FromWorld for SpawnerConfigAssetLoader {
    fn from_world(_: &mut World) -> Self {
        SpawnerConfigAssetLoader
    }
}
