//! Camera computation and the world/avatar draw passes.
//!
//! The draw pass is a synchronous function of the [`StateStore`]: everything
//! it needs (textures included) is resolved before it runs, and all drawing
//! goes through the [`DrawSurface`] trait so the pass can be exercised in
//! tests without a window.

use crate::assets::TextureCache;
use crate::network::ConnectionState;
use crate::state::StateStore;
use macroquad::prelude::*;
use shared::{AVATAR_SIZE, WORLD_HEIGHT, WORLD_WIDTH};

const LABEL_FONT_SIZE: f32 = 16.0;
const LABEL_GAP: f32 = 6.0;

/// The drawing operations the render pass needs from a surface.
pub trait DrawSurface {
    fn size(&self) -> (f32, f32);
    fn clear(&mut self);
    /// Draws a sub-rectangle of the world image into a destination rectangle.
    fn draw_world_region(&mut self, src: Rect, dest: Rect);
    /// Draws one avatar frame, identified by its image reference.
    fn draw_avatar_frame(&mut self, image: &str, dest: Rect);
    /// Draws a username centered on `center_x` with its baseline at `y`.
    fn draw_username(&mut self, text: &str, center_x: f32, y: f32);
}

fn clamp_axis(center: f32, surface: f32, world: f32) -> f32 {
    // A world no larger than the surface would invert the clamp range; pin
    // the viewport to 0 and let the world render with a blank margin.
    if world <= surface {
        0.0
    } else {
        (center - surface / 2.0).clamp(0.0, world - surface)
    }
}

/// Top-left world coordinate of the visible window, centered on `center` and
/// clamped inside world bounds per axis.
pub fn viewport_origin(center: (f32, f32), surface: (f32, f32)) -> (f32, f32) {
    (
        clamp_axis(center.0, surface.0, WORLD_WIDTH),
        clamp_axis(center.1, surface.1, WORLD_HEIGHT),
    )
}

fn avatar_on_screen(x: f32, y: f32, surface: (f32, f32)) -> bool {
    // Cull only when the avatar's box misses the surface expanded by half
    // the avatar size on every side: half for the box, half for the margin.
    let margin = AVATAR_SIZE;
    x >= -margin && x <= surface.0 + margin && y >= -margin && y <= surface.1 + margin
}

/// Full redraw: clear, world pass, avatar pass.
///
/// Players whose avatar cannot be resolved to a non-empty frame sequence for
/// their facing are skipped without a draw call; that is the undrawable-state
/// policy, not an error.
pub fn render(store: &StateStore, surface: &mut dyn DrawSurface) {
    let dimensions = surface.size();
    let origin = match store.local_player() {
        Some(player) => viewport_origin((player.x, player.y), dimensions),
        None => (0.0, 0.0),
    };

    surface.clear();

    let visible_w = dimensions.0.min(WORLD_WIDTH - origin.0);
    let visible_h = dimensions.1.min(WORLD_HEIGHT - origin.1);
    surface.draw_world_region(
        Rect::new(origin.0, origin.1, visible_w, visible_h),
        Rect::new(0.0, 0.0, visible_w, visible_h),
    );

    let half = AVATAR_SIZE / 2.0;
    for player in store.all_players() {
        let x = player.x - origin.0;
        let y = player.y - origin.1;
        if !avatar_on_screen(x, y, dimensions) {
            continue;
        }

        let frames = match store
            .get_avatar(&player.avatar)
            .and_then(|avatar| avatar.frames_for(player.facing))
        {
            Some(frames) => frames,
            None => continue,
        };
        let frame = &frames[player.animation_frame as usize % frames.len()];

        surface.draw_avatar_frame(frame, Rect::new(x - half, y - half, AVATAR_SIZE, AVATAR_SIZE));
        surface.draw_username(&player.username, x, y - half - LABEL_GAP);
    }
}

/// The real window: world texture sub-rect draws plus outlined text.
pub struct ScreenSurface<'a> {
    world: &'a Texture2D,
    textures: &'a TextureCache,
}

impl<'a> ScreenSurface<'a> {
    pub fn new(world: &'a Texture2D, textures: &'a TextureCache) -> Self {
        Self { world, textures }
    }
}

impl DrawSurface for ScreenSurface<'_> {
    fn size(&self) -> (f32, f32) {
        (screen_width(), screen_height())
    }

    fn clear(&mut self) {
        clear_background(Color::from_rgba(26, 26, 26, 255));
    }

    fn draw_world_region(&mut self, src: Rect, dest: Rect) {
        draw_texture_ex(
            self.world,
            dest.x,
            dest.y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(dest.w, dest.h)),
                source: Some(src),
                ..Default::default()
            },
        );
    }

    fn draw_avatar_frame(&mut self, image: &str, dest: Rect) {
        if let Some(texture) = self.textures.get(image) {
            draw_texture_ex(
                texture,
                dest.x,
                dest.y,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(dest.w, dest.h)),
                    ..Default::default()
                },
            );
        }
    }

    fn draw_username(&mut self, text: &str, center_x: f32, y: f32) {
        let measured = measure_text(text, None, LABEL_FONT_SIZE as u16, 1.0);
        let x = center_x - measured.width / 2.0;
        // Stroke pass under the fill so the name stays legible on any
        // background.
        for (dx, dy) in [(-1.0, 0.0), (1.0, 0.0), (0.0, -1.0), (0.0, 1.0)] {
            draw_text(text, x + dx, y + dy, LABEL_FONT_SIZE, BLACK);
        }
        draw_text(text, x, y, LABEL_FONT_SIZE, WHITE);
    }
}

/// Session overlay: connection indicator, player count, and any status line.
pub fn draw_status(connection: ConnectionState, status: Option<&str>, player_count: usize) {
    let (label, color) = match connection {
        ConnectionState::Connected => ("online", GREEN),
        ConnectionState::Connecting => ("connecting", YELLOW),
        ConnectionState::Disconnected => ("offline", RED),
    };

    draw_rectangle(10.0, 10.0, 8.0, 8.0, color);
    draw_text(label, 24.0, 18.0, LABEL_FONT_SIZE, WHITE);

    let players = format!("{} players", player_count);
    draw_text(&players, 24.0, 36.0, LABEL_FONT_SIZE, WHITE);

    if let Some(status) = status {
        draw_text(status, 10.0, 56.0, LABEL_FONT_SIZE, YELLOW);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use shared::{AvatarDefinition, Facing, PlayerRecord};
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingSurface {
        width: f32,
        height: f32,
        clears: usize,
        world_regions: Vec<(Rect, Rect)>,
        frames: Vec<(String, Rect)>,
        labels: Vec<(String, f32, f32)>,
    }

    impl RecordingSurface {
        fn new(width: f32, height: f32) -> Self {
            Self {
                width,
                height,
                ..Default::default()
            }
        }
    }

    impl DrawSurface for RecordingSurface {
        fn size(&self) -> (f32, f32) {
            (self.width, self.height)
        }

        fn clear(&mut self) {
            self.clears += 1;
        }

        fn draw_world_region(&mut self, src: Rect, dest: Rect) {
            self.world_regions.push((src, dest));
        }

        fn draw_avatar_frame(&mut self, image: &str, dest: Rect) {
            self.frames.push((image.to_string(), dest));
        }

        fn draw_username(&mut self, text: &str, center_x: f32, y: f32) {
            self.labels.push((text.to_string(), center_x, y));
        }
    }

    fn hero_avatar() -> AvatarDefinition {
        let mut frames = HashMap::new();
        frames.insert(
            Facing::South,
            vec!["hero-s-0".to_string(), "hero-s-1".to_string()],
        );
        AvatarDefinition {
            name: "hero".to_string(),
            frames,
        }
    }

    fn store_with(players: &[(&str, f32, f32)], local: &str) -> StateStore {
        let mut store = StateStore::new();
        store.upsert_avatar(hero_avatar());
        for (id, x, y) in players {
            store.upsert_player(PlayerRecord::new(id, id, *x, *y, "hero"));
        }
        store.set_local_id(local.to_string());
        store
    }

    #[test]
    fn test_viewport_centers_on_player() {
        let origin = viewport_origin((1024.0, 1024.0), (800.0, 600.0));
        assert_approx_eq!(origin.0, 624.0);
        assert_approx_eq!(origin.1, 724.0);
    }

    #[test]
    fn test_viewport_clamps_to_world_bounds() {
        let low = viewport_origin((100.0, 100.0), (800.0, 600.0));
        assert_eq!(low, (0.0, 0.0));

        let high = viewport_origin((2040.0, 2040.0), (800.0, 600.0));
        assert_approx_eq!(high.0, WORLD_WIDTH - 800.0);
        assert_approx_eq!(high.1, WORLD_HEIGHT - 600.0);
    }

    #[test]
    fn test_viewport_pins_to_zero_when_surface_exceeds_world() {
        // Larger than the world in x only; y still clamps normally.
        let origin = viewport_origin((1024.0, 1024.0), (4096.0, 600.0));
        assert_eq!(origin.0, 0.0);
        assert_approx_eq!(origin.1, 724.0);

        // Exactly world-sized is pinned too, never an inverted range.
        let exact = viewport_origin((2000.0, 2000.0), (WORLD_WIDTH, WORLD_HEIGHT));
        assert_eq!(exact, (0.0, 0.0));
    }

    #[test]
    fn test_world_region_clipped_at_bounds() {
        let store = store_with(&[("a", 2040.0, 2040.0)], "a");
        let mut surface = RecordingSurface::new(800.0, 600.0);
        render(&store, &mut surface);

        assert_eq!(surface.clears, 1);
        let (src, dest) = surface.world_regions[0];
        assert_approx_eq!(src.x, WORLD_WIDTH - 800.0);
        assert_approx_eq!(src.y, WORLD_HEIGHT - 600.0);
        assert_approx_eq!(src.w, 800.0);
        assert_approx_eq!(src.h, 600.0);
        assert_eq!((dest.x, dest.y), (0.0, 0.0));
    }

    #[test]
    fn test_world_smaller_than_surface_leaves_margin() {
        let store = store_with(&[("a", 100.0, 100.0)], "a");
        let mut surface = RecordingSurface::new(4096.0, 4096.0);
        render(&store, &mut surface);

        let (src, _) = surface.world_regions[0];
        assert_eq!((src.x, src.y), (0.0, 0.0));
        assert_approx_eq!(src.w, WORLD_WIDTH);
        assert_approx_eq!(src.h, WORLD_HEIGHT);
    }

    #[test]
    fn test_offscreen_avatar_is_culled_entirely() {
        let store = store_with(&[("a", 100.0, 100.0), ("b", 900.0, 900.0)], "a");
        let mut surface = RecordingSurface::new(800.0, 600.0);
        render(&store, &mut surface);

        // Viewport is (0, 0); b at (900, 900) misses the expanded surface.
        assert_eq!(surface.frames.len(), 1);
        assert_eq!(surface.labels.len(), 1);
        assert_eq!(surface.labels[0].0, "a");
    }

    #[test]
    fn test_visible_avatar_draws_frame_and_label_once() {
        let store = store_with(&[("a", 400.0, 300.0)], "a");
        let mut surface = RecordingSurface::new(800.0, 600.0);
        render(&store, &mut surface);

        assert_eq!(surface.frames.len(), 1);
        let (image, dest) = &surface.frames[0];
        assert_eq!(image, "hero-s-0");
        // Centered: local player sits mid-screen.
        assert_approx_eq!(dest.x, 400.0 - AVATAR_SIZE / 2.0);
        assert_approx_eq!(dest.y, 300.0 - AVATAR_SIZE / 2.0);
        assert_eq!(surface.labels.len(), 1);
    }

    #[test]
    fn test_culling_boundary_is_expanded_by_half_avatar_size() {
        let margin = AVATAR_SIZE;
        let store = store_with(
            &[("a", 100.0, 100.0), ("edge", 800.0 + margin, 300.0), ("out", 800.0 + margin + 1.0, 300.0)],
            "a",
        );
        let mut surface = RecordingSurface::new(800.0, 600.0);
        render(&store, &mut surface);

        let drawn: Vec<&str> = surface.labels.iter().map(|(name, _, _)| name.as_str()).collect();
        assert!(drawn.contains(&"edge"));
        assert!(!drawn.contains(&"out"));
    }

    #[test]
    fn test_animation_frame_wraps_modulo_sequence() {
        let mut store = store_with(&[], "a");
        let mut player = PlayerRecord::new("a", "a", 400.0, 300.0, "hero");
        player.animation_frame = 5; // two frames, so index 1
        store.upsert_player(player);

        let mut surface = RecordingSurface::new(800.0, 600.0);
        render(&store, &mut surface);
        assert_eq!(surface.frames[0].0, "hero-s-1");
    }

    #[test]
    fn test_player_without_usable_frames_is_skipped() {
        let mut store = store_with(&[], "a");
        let mut facing_north = PlayerRecord::new("a", "a", 400.0, 300.0, "hero");
        facing_north.facing = Facing::North; // hero only has south frames
        store.upsert_player(facing_north);
        store.upsert_player(PlayerRecord::new("b", "b", 200.0, 200.0, "unknown-avatar"));

        let mut surface = RecordingSurface::new(800.0, 600.0);
        render(&store, &mut surface);

        assert!(surface.frames.is_empty());
        assert!(surface.labels.is_empty());
    }

    #[test]
    fn test_render_without_local_player_uses_origin() {
        let mut store = StateStore::new();
        store.upsert_avatar(hero_avatar());
        store.upsert_player(PlayerRecord::new("b", "b", 100.0, 100.0, "hero"));

        let mut surface = RecordingSurface::new(800.0, 600.0);
        render(&store, &mut surface);

        let (src, _) = surface.world_regions[0];
        assert_eq!((src.x, src.y), (0.0, 0.0));
        assert_eq!(surface.frames.len(), 1);
    }
}
