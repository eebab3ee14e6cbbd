//! Rigid-body storage and the registries a space keeps over it.

use rapier::data::{Arena, Index};

use crate::dynamics::{BodyChanges, RigidBody};

/// The handle of a rigid-body in a [`BodySet`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub Index);

/// A set of rigid-bodies.
///
/// Mutable accesses through [`BodySet::get_mut`] are recorded so that the owning space can
/// apply the registrations the modified bodies requested.
#[derive(Default)]
pub struct BodySet {
    bodies: Arena<RigidBody>,
    modified: Vec<BodyHandle>,
}

impl BodySet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bodies in this set.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Is this set empty?
    pub fn is_empty(&self) -> bool {
        self.bodies.len() == 0
    }

    pub(crate) fn insert(&mut self, body: RigidBody) -> BodyHandle {
        BodyHandle(self.bodies.insert(body))
    }

    pub(crate) fn remove(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        self.modified.retain(|h| *h != handle);
        self.bodies.remove(handle.0)
    }

    /// Does this set contain the given body?
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    /// The body with the given handle.
    pub fn get(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle.0)
    }

    /// The body with the given handle, flagged as modified.
    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        let body = self.bodies.get_mut(handle.0)?;
        if !body.changes.contains(BodyChanges::MODIFIED) {
            body.changes.insert(BodyChanges::MODIFIED);
            self.modified.push(handle);
        }
        Some(body)
    }

    pub(crate) fn get_mut_internal(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle.0)
    }

    pub(crate) fn iter_mut_internal(
        &mut self,
    ) -> impl Iterator<Item = (BodyHandle, &mut RigidBody)> {
        self.bodies.iter_mut().map(|(i, body)| (BodyHandle(i), body))
    }

    pub(crate) fn take_modified(&mut self) -> Vec<BodyHandle> {
        std::mem::take(&mut self.modified)
    }

    /// Iterates through all the bodies.
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.bodies.iter().map(|(i, body)| (BodyHandle(i), body))
    }
}

/// An ordered list of bodies with idempotent membership.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BodyList {
    members: Vec<BodyHandle>,
}

impl BodyList {
    /// Adds `body` at the end of the list unless it is already a member.
    pub fn insert(&mut self, body: BodyHandle) -> bool {
        if self.contains(body) {
            false
        } else {
            self.members.push(body);
            true
        }
    }

    /// Removes `body` from the list, if it is a member.
    pub fn remove(&mut self, body: BodyHandle) -> bool {
        match self.members.iter().position(|h| *h == body) {
            Some(i) => {
                self.members.remove(i);
                true
            }
            None => false,
        }
    }

    /// Is `body` a member of this list?
    pub fn contains(&self, body: BodyHandle) -> bool {
        self.members.contains(&body)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Is this list empty?
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The members, in insertion order.
    pub fn as_slice(&self) -> &[BodyHandle] {
        &self.members
    }

    pub(crate) fn take(&mut self) -> Vec<BodyHandle> {
        std::mem::take(&mut self.members)
    }
}

/// The body lists a space maintains.
#[derive(Clone, Debug, Default)]
pub struct BodyRegistries {
    /// Bodies integrated at each step.
    pub active: BodyList,
    /// Bodies whose mass properties must be recomputed before they are next read.
    pub mass_properties_update: BodyList,
    /// Bodies whose observers must be notified at the end of the step.
    pub state_query: BodyList,
}

impl BodyRegistries {
    pub(crate) fn remove_body(&mut self, body: BodyHandle) {
        self.active.remove(body);
        self.mass_properties_update.remove(body);
        self.state_query.remove(body);
    }
}
