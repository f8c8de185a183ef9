//! Pair selection helpers used while seeding a population.
//!
//! - [pick_random_pair]: uniform mesh and uniform material, drawn independently.
//! - [remainder_pairs]: deterministic, distinct pairs for the remainder of an
//!   even split, spread so that every prefix is within one of even on both
//!   dimensions.
//! - [correction_targets]: pairs the least-populated meshes with the
//!   least-populated materials, clamping the shorter list.
use rand::RngCore;

use crate::descriptor::{DescriptorPair, DescriptorSpace, MaterialKind, MeshKind};
use crate::sampling::rand_index;

pub fn pick_random_pair<R: RngCore>(
    space: &DescriptorSpace,
    rng: &mut R,
) -> Option<DescriptorPair> {
    let meshes = space.mesh_count();
    let materials = space.material_count();
    if meshes == 0 || materials == 0 {
        return None;
    }
    let m = rand_index(rng, meshes);
    let k = rand_index(rng, materials);
    Some(DescriptorPair::new(MeshKind(m as u16), MaterialKind(k as u16)))
}

/// The first `count` pairs of a diagonal walk over the pair grid.
///
/// Index `i` maps to mesh `i % Mc` and material `(i + i / lcm) % Kc`. Within
/// each run of `lcm(Mc, Kc)` indices both coordinates cycle, and each run
/// shifts the material by one, so all `Mc * Kc` pairs are visited exactly
/// once.
pub fn remainder_pairs(space: &DescriptorSpace, count: usize) -> Vec<DescriptorPair> {
    let meshes = space.mesh_count();
    let materials = space.material_count();
    if meshes == 0 || materials == 0 {
        return Vec::new();
    }
    let lcm = meshes / gcd(meshes, materials) * materials;
    (0..count.min(meshes * materials))
        .map(|i| {
            let m = i % meshes;
            let k = (i + i / lcm) % materials;
            DescriptorPair::new(MeshKind(m as u16), MaterialKind(k as u16))
        })
        .collect()
}

pub fn correction_targets(meshes: &[MeshKind], materials: &[MaterialKind]) -> Vec<DescriptorPair> {
    if meshes.is_empty() || materials.is_empty() {
        return Vec::new();
    }
    (0..meshes.len().max(materials.len()))
        .map(|i| {
            DescriptorPair::new(
                meshes[i.min(meshes.len() - 1)],
                materials[i.min(materials.len() - 1)],
            )
        })
        .collect()
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
