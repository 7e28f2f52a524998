pub mod box_overlay;
pub mod dotted_eyes_overlay;
pub mod index_overlay;
pub mod mesh_overlay;
pub mod overlay_renderer;
pub mod rgba_canvas;
pub mod sprite_overlay;
pub mod sprite_sheet;
