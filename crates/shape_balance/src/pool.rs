//! Per-pair instance storage.
use glam::Vec3;

/// Opaque identity of a spawned instance. Stable across swaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceHandle(pub u64);

/// Placement of an instance: world position and per-axis scale.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceTransform {
    pub position: Vec3,
    pub scale: Vec3,
}

impl InstanceTransform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn new(position: Vec3, scale: Vec3) -> Self {
        Self { position, scale }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            scale: Vec3::ONE,
        }
    }
}

impl Default for InstanceTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instance {
    pub handle: InstanceHandle,
    pub transform: InstanceTransform,
}

/// Ordered instances sharing one descriptor pair.
///
/// Appends and pops work on the tail. Removing at an explicit index keeps the
/// relative order of the remaining instances.
#[derive(Debug, Clone, Default)]
pub struct InstancePool {
    instances: Vec<Instance>,
}

impl InstancePool {
    pub fn new() -> Self {
        Self {
            instances: Vec::new(),
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            instances: Vec::with_capacity(cap),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn push(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    pub fn pop(&mut self) -> Option<Instance> {
        self.instances.pop()
    }

    /// Removes the instance at `index`, or `None` if out of range.
    pub fn remove(&mut self, index: usize) -> Option<Instance> {
        if index < self.instances.len() {
            Some(self.instances.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&Instance> {
        self.instances.get(index)
    }

    pub fn last(&self) -> Option<&Instance> {
        self.instances.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter()
    }

    pub fn as_slice(&self) -> &[Instance] {
        &self.instances
    }
}
