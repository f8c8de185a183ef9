//! Descriptor kinds and the fixed space they are drawn from.
//!
//! Mesh and material kinds are interned as small integer ids in the order they
//! were declared. A [`DescriptorPair`] names one spawn category; the
//! [`DescriptorSpace`] owns the display names and enumerates pairs in declared
//! order (meshes outer, materials inner), which is the iteration order every
//! donor search uses.
use std::fmt;

use crate::error::{Error, Result};

/// Interned id of a mesh (shape) kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshKind(pub u16);

/// Interned id of a material (color) kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaterialKind(pub u16);

impl MeshKind {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl MaterialKind {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MeshKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mesh#{}", self.0)
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "material#{}", self.0)
    }
}

/// A (mesh, material) tuple identifying one spawn category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptorPair {
    pub mesh: MeshKind,
    pub material: MaterialKind,
}

impl DescriptorPair {
    pub fn new(mesh: MeshKind, material: MaterialKind) -> Self {
        Self { mesh, material }
    }
}

impl fmt::Display for DescriptorPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.mesh, self.material)
    }
}

impl From<(MeshKind, MaterialKind)> for DescriptorPair {
    fn from((mesh, material): (MeshKind, MaterialKind)) -> Self {
        Self { mesh, material }
    }
}

/// The two fixed sets of kinds. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct DescriptorSpace {
    mesh_names: Vec<String>,
    material_names: Vec<String>,
}

impl DescriptorSpace {
    /// Builds a space from declared mesh and material names.
    ///
    /// Names must be unique within their set. Empty sets are accepted here;
    /// the balance passes treat an empty dimension as a no-op.
    pub fn new<M, K>(meshes: M, materials: K) -> Result<Self>
    where
        M: IntoIterator,
        M::Item: Into<String>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        let mesh_names = collect_unique(meshes, "mesh")?;
        let material_names = collect_unique(materials, "material")?;
        Ok(Self {
            mesh_names,
            material_names,
        })
    }

    pub fn mesh_count(&self) -> usize {
        self.mesh_names.len()
    }

    pub fn material_count(&self) -> usize {
        self.material_names.len()
    }

    /// Number of descriptor pairs (`Mc * Kc`).
    pub fn pair_count(&self) -> usize {
        self.mesh_count() * self.material_count()
    }

    pub fn meshes(&self) -> impl Iterator<Item = MeshKind> + '_ {
        (0..self.mesh_names.len()).map(|i| MeshKind(i as u16))
    }

    pub fn materials(&self) -> impl Iterator<Item = MaterialKind> + '_ {
        (0..self.material_names.len()).map(|i| MaterialKind(i as u16))
    }

    /// All pairs in declared order, meshes outer and materials inner.
    pub fn pairs(&self) -> impl Iterator<Item = DescriptorPair> + '_ {
        self.meshes()
            .flat_map(move |m| self.materials().map(move |k| DescriptorPair::new(m, k)))
    }

    pub fn contains(&self, pair: DescriptorPair) -> bool {
        pair.mesh.index() < self.mesh_count() && pair.material.index() < self.material_count()
    }

    pub fn mesh_name(&self, mesh: MeshKind) -> Option<&str> {
        self.mesh_names.get(mesh.index()).map(String::as_str)
    }

    pub fn material_name(&self, material: MaterialKind) -> Option<&str> {
        self.material_names.get(material.index()).map(String::as_str)
    }

    pub fn mesh_by_name(&self, name: &str) -> Option<MeshKind> {
        self.mesh_names
            .iter()
            .position(|n| n == name)
            .map(|i| MeshKind(i as u16))
    }

    pub fn material_by_name(&self, name: &str) -> Option<MaterialKind> {
        self.material_names
            .iter()
            .position(|n| n == name)
            .map(|i| MaterialKind(i as u16))
    }

    /// Resolves a pair by display names.
    pub fn pair_by_names(&self, mesh: &str, material: &str) -> Result<DescriptorPair> {
        let m = self.mesh_by_name(mesh).ok_or_else(|| Error::UnknownKind {
            name: mesh.to_owned(),
        })?;
        let k = self
            .material_by_name(material)
            .ok_or_else(|| Error::UnknownKind {
                name: material.to_owned(),
            })?;
        Ok(DescriptorPair::new(m, k))
    }
}

fn collect_unique<I>(names: I, what: &str) -> Result<Vec<String>>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let name = name.into();
        if out.contains(&name) {
            return Err(Error::InvalidConfig(format!(
                "duplicate {what} kind '{name}'"
            )));
        }
        out.push(name);
    }
    if out.len() > u16::MAX as usize {
        return Err(Error::InvalidConfig(format!("too many {what} kinds")));
    }
    Ok(out)
}
