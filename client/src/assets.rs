//! Avatar frame resolution.
//!
//! Frame image references are resolved into draw-ready textures once, when a
//! definition is first seen, so the render pass never loads anything inline.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::warn;
use macroquad::prelude::{Image, Texture2D};
use shared::AvatarDefinition;
use std::collections::HashMap;

/// Ready-to-draw handles keyed by image reference. A `None` entry records a
/// failed resolution so it is not retried every frame; the affected frames
/// simply never draw.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<String, Option<Texture2D>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, image: &str) -> Option<&Texture2D> {
        self.textures.get(image).and_then(|texture| texture.as_ref())
    }

    /// Resolves every frame reference of `definition` not yet attempted.
    /// Idempotent, so redundant definitions cost only hash lookups.
    pub fn register(&mut self, definition: &AvatarDefinition) {
        for frames in definition.frames.values() {
            for image in frames {
                if self.textures.contains_key(image) {
                    continue;
                }
                let texture = decode_image(image);
                if texture.is_none() {
                    warn!("could not resolve avatar frame {}", image);
                }
                self.textures.insert(image.clone(), texture);
            }
        }
    }
}

/// Accepts `data:` URLs with a base64 payload or plain file paths.
fn decode_image(image: &str) -> Option<Texture2D> {
    let bytes = if let Some(rest) = image.strip_prefix("data:") {
        let (_, payload) = rest.split_once(',')?;
        STANDARD.decode(payload).ok()?
    } else {
        std::fs::read(image).ok()?
    };
    let decoded = Image::from_file_with_format(&bytes, None).ok()?;
    Some(Texture2D::from_image(&decoded))
}
