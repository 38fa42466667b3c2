//! Image collaborator interface and a file-backed implementation.

use crate::error::{GuiError, GuiResult};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// Compact key for an image path. Stable for the lifetime of the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Rgba8,
    Rgb8,
    Alpha8,
}

impl ImageFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 => 4,
            Self::Rgb8 => 3,
            Self::Alpha8 => 1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ImageData<'a> {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub pixels: &'a [u8],
}

/// Reference-counted image storage keyed by file path.
pub trait ImageResourceManager {
    /// Loads on first acquisition; each call adds one reference.
    fn acquire_image(&mut self, path: &str) -> GuiResult<ImageHandle>;
    fn release_image(&mut self, image: ImageHandle);
    fn image_data(&self, image: ImageHandle) -> Option<ImageData<'_>>;
    /// Maps a path to its compact key without loading anything.
    fn encode_path(&mut self, path: &str) -> ImageHandle;
    fn decode_path(&self, image: ImageHandle) -> Option<&str>;
}

struct ImageEntry {
    width: u32,
    height: u32,
    format: ImageFormat,
    pixels: Vec<u8>,
    ref_count: u32,
    /// Registered from memory; kept when the last reference goes away.
    resident: bool,
}

/// Decodes images from disk through the `image` crate.
#[derive(Default)]
pub struct FileImageManager {
    keys: FxHashMap<SmolStr, ImageHandle>,
    paths: Vec<SmolStr>,
    entries: FxHashMap<ImageHandle, ImageEntry>,
}

impl FileImageManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes already-decoded RGBA8 pixels available under `path`.
    pub fn register_rgba(&mut self, path: &str, width: u32, height: u32, pixels: Vec<u8>) -> ImageHandle {
        let handle = self.encode_path(path);
        let ref_count = self.entries.get(&handle).map(|e| e.ref_count).unwrap_or(0);
        self.entries.insert(
            handle,
            ImageEntry {
                width,
                height,
                format: ImageFormat::Rgba8,
                pixels,
                ref_count,
                resident: true,
            },
        );
        handle
    }

    pub fn ref_count(&self, image: ImageHandle) -> u32 {
        self.entries.get(&image).map(|e| e.ref_count).unwrap_or(0)
    }

    fn load(path: &str) -> GuiResult<ImageEntry> {
        let decoded = image::open(path).map_err(|source| GuiError::ImageLoad {
            path: path.to_string(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(ImageEntry {
            width,
            height,
            format: ImageFormat::Rgba8,
            pixels: rgba.into_raw(),
            ref_count: 0,
            resident: false,
        })
    }
}

impl ImageResourceManager for FileImageManager {
    fn acquire_image(&mut self, path: &str) -> GuiResult<ImageHandle> {
        let handle = self.encode_path(path);
        if !self.entries.contains_key(&handle) {
            let entry = Self::load(path)?;
            log::debug!("loaded image {path} ({}x{})", entry.width, entry.height);
            self.entries.insert(handle, entry);
        }
        if let Some(entry) = self.entries.get_mut(&handle) {
            entry.ref_count += 1;
        }
        Ok(handle)
    }

    fn release_image(&mut self, image: ImageHandle) {
        let Some(entry) = self.entries.get_mut(&image) else {
            return;
        };
        entry.ref_count = entry.ref_count.saturating_sub(1);
        if entry.ref_count == 0 && !entry.resident {
            self.entries.remove(&image);
        }
    }

    fn image_data(&self, image: ImageHandle) -> Option<ImageData<'_>> {
        self.entries.get(&image).map(|entry| ImageData {
            width: entry.width,
            height: entry.height,
            format: entry.format,
            pixels: &entry.pixels,
        })
    }

    fn encode_path(&mut self, path: &str) -> ImageHandle {
        if let Some(handle) = self.keys.get(path) {
            return *handle;
        }
        let handle = ImageHandle(self.paths.len() as u32);
        let key = SmolStr::new(path);
        self.paths.push(key.clone());
        self.keys.insert(key, handle);
        handle
    }

    fn decode_path(&self, image: ImageHandle) -> Option<&str> {
        self.paths.get(image.0 as usize).map(SmolStr::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::{FileImageManager, ImageResourceManager};
    use crate::error::GuiError;

    #[test]
    fn paths_round_trip_through_compact_keys() {
        let mut images = FileImageManager::new();
        let a = images.encode_path("a.png");
        let b = images.encode_path("b.png");
        assert_ne!(a, b);
        assert_eq!(images.encode_path("a.png"), a);
        assert_eq!(images.decode_path(b), Some("b.png"));
    }

    #[test]
    fn registered_images_are_refcounted_but_resident() {
        let mut images = FileImageManager::new();
        let handle = images.register_rgba("mem://tile", 2, 1, vec![255; 8]);
        assert_eq!(images.acquire_image("mem://tile").ok(), Some(handle));
        assert_eq!(images.acquire_image("mem://tile").ok(), Some(handle));
        assert_eq!(images.ref_count(handle), 2);
        images.release_image(handle);
        images.release_image(handle);
        assert_eq!(images.ref_count(handle), 0);
        assert_eq!(images.image_data(handle).map(|d| d.width), Some(2));
    }

    #[test]
    fn missing_files_report_load_errors() {
        let mut images = FileImageManager::new();
        let err = images
            .acquire_image("/definitely/not/here.png")
            .expect_err("missing file");
        assert!(matches!(err, GuiError::ImageLoad { .. }));
    }
}
