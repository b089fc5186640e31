use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Handle to a decoded preview held by the [`PreviewRegistry`]. Plain id, no
/// Drop glue: release is an explicit, audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewId(u64);

/// Decoded RGBA pixels ready to become a GUI texture.
#[derive(Debug, Clone)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decode raw image bytes (whatever the server or the picker produced) into
/// display pixels.
pub fn decode_preview(bytes: &[u8]) -> anyhow::Result<PreviewImage> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    Ok(PreviewImage {
        width: decoded.width(),
        height: decoded.height(),
        rgba: decoded.into_raw(),
    })
}

/// Owns every preview created during an editing session. Previews are
/// revocable resources: each one acquired here must be released exactly once
/// (on unstage, on successful save, or when the editor closes), and
/// `alive_count` makes a leak visible.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    next: u64,
    alive: HashMap<PreviewId, PreviewImage>,
}

impl PreviewRegistry {
    pub fn acquire(&mut self, image: PreviewImage) -> PreviewId {
        let id = PreviewId(self.next);
        self.next += 1;
        self.alive.insert(id, image);
        id
    }

    pub fn get(&self, id: PreviewId) -> Option<&PreviewImage> {
        self.alive.get(&id)
    }

    /// Returns false if the handle was already released. Double release is
    /// tolerated but reported so tests can assert balance.
    pub fn release(&mut self, id: PreviewId) -> bool {
        self.alive.remove(&id).is_some()
    }

    pub fn release_all(&mut self) {
        self.alive.clear();
    }

    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }
}

/// An image already persisted on the server, identified by its file name.
#[derive(Debug, Clone)]
pub struct RemoteImage {
    pub file_name: String,
    pub preview: Option<PreviewId>,
}

/// A locally staged file, not yet uploaded.
#[derive(Debug, Clone)]
pub struct StagedImage {
    pub path: PathBuf,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub preview: Option<PreviewId>,
}

/// The minimal additions/removals to send on save, as borrowed views of the
/// session state. Building the diff has no side effects.
#[derive(Debug)]
pub struct ImageDiff<'a> {
    pub new_files: &'a [StagedImage],
    pub remove_ids: &'a [String],
}

/// Image state for one editing session, partitioned three ways:
/// server-held images, the subset of those marked for removal, and locally
/// staged additions. Marked-for-removal is a toggle, not destructive until
/// save; staged identifiers are client-local and never collide with server
/// ones. After a successful save the whole session is discarded and rebuilt
/// from a fresh fetch; after a failed save it is left untouched for retry.
#[derive(Debug, Default)]
pub struct ImageSession {
    pub existing: Vec<RemoteImage>,
    pending_removal: Vec<String>,
    pub pending_addition: Vec<StagedImage>,
}

impl ImageSession {
    /// Start a session from the identifiers a record fetch returned.
    /// Previews arrive later, one per identifier, as their fetches resolve.
    pub fn hydrate(file_names: &[String]) -> Self {
        Self {
            existing: file_names
                .iter()
                .map(|name| RemoteImage {
                    file_name: name.clone(),
                    preview: None,
                })
                .collect(),
            pending_removal: Vec::new(),
            pending_addition: Vec::new(),
        }
    }

    pub fn attach_preview(&mut self, file_name: &str, preview: PreviewId) {
        if let Some(img) = self.existing.iter_mut().find(|i| i.file_name == file_name) {
            img.preview = Some(preview);
        }
    }

    /// Stage a local file for upload, with a decoded preview when the bytes
    /// decode (an undecodable file still uploads, it just has no thumbnail).
    pub fn stage_addition(&mut self, path: &Path, bytes: Vec<u8>, registry: &mut PreviewRegistry) {
        let preview = decode_preview(&bytes).ok().map(|img| registry.acquire(img));
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        self.pending_addition.push(StagedImage {
            path: path.to_path_buf(),
            file_name,
            bytes,
            preview,
        });
    }

    /// Drop a staged addition and release its preview. Out of range is a
    /// silent no-op.
    pub fn unstage_addition(&mut self, index: usize, registry: &mut PreviewRegistry) {
        if index >= self.pending_addition.len() {
            return;
        }
        let staged = self.pending_addition.remove(index);
        if let Some(preview) = staged.preview {
            registry.release(preview);
        }
    }

    /// Flip the removal mark on a server-held identifier. Marking twice is
    /// an undo; identifiers not on the server are ignored.
    pub fn toggle_removal(&mut self, file_name: &str) {
        if !self.existing.iter().any(|i| i.file_name == file_name) {
            return;
        }
        if let Some(pos) = self.pending_removal.iter().position(|f| f == file_name) {
            self.pending_removal.remove(pos);
        } else {
            self.pending_removal.push(file_name.to_string());
        }
    }

    pub fn is_marked_removed(&self, file_name: &str) -> bool {
        self.pending_removal.iter().any(|f| f == file_name)
    }

    pub fn build_diff(&self) -> ImageDiff<'_> {
        ImageDiff {
            new_files: &self.pending_addition,
            remove_ids: &self.pending_removal,
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.pending_addition.is_empty() || !self.pending_removal.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.pending_addition.len() + self.pending_removal.len()
    }

    /// End the session: release every preview this session acquired
    /// (existing and staged alike) and clear all three partitions. Called on
    /// editor close and after a successful save; never on failure.
    pub fn close(&mut self, registry: &mut PreviewRegistry) {
        for img in self.existing.drain(..) {
            if let Some(preview) = img.preview {
                registry.release(preview);
            }
        }
        for staged in self.pending_addition.drain(..) {
            if let Some(preview) = staged.preview {
                registry.release(preview);
            }
        }
        self.pending_removal.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{ImageSession, PreviewImage, PreviewRegistry};
    use std::path::Path;

    fn dummy_preview() -> PreviewImage {
        PreviewImage {
            width: 1,
            height: 1,
            rgba: vec![0, 0, 0, 255],
        }
    }

    fn session_with_existing(names: &[&str]) -> ImageSession {
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        ImageSession::hydrate(&names)
    }

    #[test]
    fn toggle_removal_twice_is_identity() {
        let mut s = session_with_existing(&["a.png", "b.png"]);
        s.toggle_removal("a.png");
        assert!(s.is_marked_removed("a.png"));
        s.toggle_removal("a.png");
        assert!(!s.is_marked_removed("a.png"));
        assert!(s.build_diff().remove_ids.is_empty());
    }

    #[test]
    fn toggle_removal_ignores_unknown_identifiers() {
        let mut s = session_with_existing(&["a.png"]);
        s.toggle_removal("ghost.png");
        assert!(s.build_diff().remove_ids.is_empty());
    }

    #[test]
    fn diff_counts_match_staging_actions() {
        let mut registry = PreviewRegistry::default();
        let mut s = session_with_existing(&["a.png", "b.png", "c.png"]);

        // Bytes that don't decode still stage (no preview).
        s.stage_addition(Path::new("/tmp/one.png"), vec![1, 2, 3], &mut registry);
        s.stage_addition(Path::new("/tmp/two.png"), vec![4, 5], &mut registry);
        s.toggle_removal("a.png");
        s.toggle_removal("c.png");

        let diff = s.build_diff();
        assert_eq!(diff.new_files.len(), 2);
        assert_eq!(diff.remove_ids, &["a.png".to_string(), "c.png".to_string()]);
    }

    #[test]
    fn unstage_releases_the_preview_handle() {
        let mut registry = PreviewRegistry::default();
        let mut s = ImageSession::default();
        s.stage_addition(Path::new("/tmp/x.png"), vec![0], &mut registry);
        // Attach a preview by hand since the bytes above don't decode.
        let id = registry.acquire(dummy_preview());
        s.pending_addition[0].preview = Some(id);
        assert_eq!(registry.alive_count(), 1);

        s.unstage_addition(0, &mut registry);
        assert_eq!(registry.alive_count(), 0);
        assert!(s.pending_addition.is_empty());

        // Out of range: no-op.
        s.unstage_addition(3, &mut registry);
    }

    #[test]
    fn close_releases_every_handle_exactly_once() {
        let mut registry = PreviewRegistry::default();
        let mut s = session_with_existing(&["a.png", "b.png"]);
        let p1 = registry.acquire(dummy_preview());
        let p2 = registry.acquire(dummy_preview());
        s.attach_preview("a.png", p1);
        s.attach_preview("b.png", p2);
        s.stage_addition(Path::new("/tmp/x.png"), vec![0], &mut registry);
        let p3 = registry.acquire(dummy_preview());
        s.pending_addition[0].preview = Some(p3);
        s.toggle_removal("a.png");

        s.close(&mut registry);
        assert_eq!(registry.alive_count(), 0);
        assert!(s.existing.is_empty());
        assert!(!s.has_changes());

        // Releasing again reports the imbalance rather than panicking.
        assert!(!registry.release(p1));
    }

    #[test]
    fn attach_preview_only_binds_known_identifiers() {
        let mut registry = PreviewRegistry::default();
        let mut s = session_with_existing(&["a.png"]);
        let id = registry.acquire(dummy_preview());
        s.attach_preview("ghost.png", id);
        assert!(s.existing[0].preview.is_none());
    }
}
