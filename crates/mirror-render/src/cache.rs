//! Secondary cameras of a mirror surface, one per viewing camera.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use mirror_core::{Camera, CameraId, CameraKind, Skybox, Transform, MIRROR_CAMERA_TAG};

use crate::host::RenderHost;

/// Secondary camera ids live in the upper half of the id space so they never
/// collide with ids handed out by the host.
const FIRST_MIRROR_CAMERA_ID: u32 = 1 << 31;

static NEXT_MIRROR_CAMERA_ID: AtomicU32 = AtomicU32::new(FIRST_MIRROR_CAMERA_ID);

fn next_mirror_camera_id() -> CameraId {
    CameraId(NEXT_MIRROR_CAMERA_ID.fetch_add(1, Ordering::Relaxed))
}

/// A secondary camera owned on behalf of one viewing camera.
#[derive(Debug, Clone)]
pub struct MirrorCameraEntry {
    /// The viewing camera this entry reflects.
    pub viewing_camera: CameraId,
    /// The secondary camera.
    pub camera: Camera,
}

impl MirrorCameraEntry {
    fn new(owner: &str, viewing: &Camera, surface_transform: &Transform) -> Self {
        let mut camera = Camera::new(next_mirror_camera_id(), CameraKind::Reflection)
            .with_name(format!(
                "Mirror Reflection Camera {owner} for {}",
                viewing.id
            ))
            .with_transform(*surface_transform);
        camera.enabled = false;
        camera.persistent = false;
        camera.tag = MIRROR_CAMERA_TAG.to_string();
        camera.skybox = Some(Skybox::default());
        Self {
            viewing_camera: viewing.id,
            camera,
        }
    }
}

/// Cache of secondary cameras keyed by viewing camera identity.
#[derive(Debug)]
pub struct MirrorCameraCache {
    owner: String,
    entries: HashMap<CameraId, MirrorCameraEntry>,
}

impl MirrorCameraCache {
    /// Creates an empty cache for the named surface.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            entries: HashMap::new(),
        }
    }

    /// Returns the secondary camera for `viewing`, creating it on first use.
    ///
    /// New cameras start at the surface transform, disabled for automatic
    /// rendering, tagged as mirror cameras and excluded from persistence.
    pub fn get_or_create(
        &mut self,
        viewing: &Camera,
        surface_transform: &Transform,
    ) -> &mut Camera {
        let owner = &self.owner;
        &mut self
            .entries
            .entry(viewing.id)
            .or_insert_with(|| {
                log::debug!("creating reflection camera of '{owner}' for {}", viewing.id);
                MirrorCameraEntry::new(owner, viewing, surface_transform)
            })
            .camera
    }

    /// Returns the secondary camera for a viewing camera, if one exists.
    pub fn get(&self, viewing: CameraId) -> Option<&Camera> {
        self.entries.get(&viewing).map(|entry| &entry.camera)
    }

    /// Returns whether a secondary camera exists for a viewing camera.
    pub fn contains(&self, viewing: CameraId) -> bool {
        self.entries.contains_key(&viewing)
    }

    /// Returns the number of cached cameras.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over all entries.
    pub fn iter(&self) -> impl Iterator<Item = &MirrorCameraEntry> {
        self.entries.values()
    }

    /// Drops the secondary camera of a viewing camera the host destroyed.
    ///
    /// Returns whether an entry existed.
    pub fn remove_viewing_camera(&mut self, viewing: CameraId, host: &mut dyn RenderHost) -> bool {
        match self.entries.remove(&viewing) {
            Some(entry) => {
                host.destroy_camera(&entry.camera);
                true
            }
            None => false,
        }
    }

    /// Destroys every cached camera.
    pub fn release(&mut self, host: &mut dyn RenderHost) {
        for (_, entry) in self.entries.drain() {
            host.destroy_camera(&entry.camera);
        }
    }
}
