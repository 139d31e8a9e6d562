use egui::Color32;

// Dark palette
pub const DARK_CANVAS: Color32 = Color32::from_rgb(0x12, 0x12, 0x12);
pub const DARK_PANEL: Color32 = Color32::from_rgb(0x1E, 0x1E, 0x1E);
pub const DARK_TEXT_PRIMARY: Color32 = Color32::from_rgb(0xE8, 0xE8, 0xE8);
pub const DARK_TEXT_SECONDARY: Color32 = Color32::from_rgb(0xA0, 0xA0, 0xA0);
pub const DARK_ACCENT: Color32 = Color32::from_rgb(0x4D, 0xA8, 0xDA);
pub const DARK_ERROR: Color32 = Color32::from_rgb(0xE0, 0x60, 0x60);
pub const DARK_WARNING: Color32 = Color32::from_rgb(0xD4, 0xA0, 0x40);
pub const DARK_WIDGET_BG: Color32 = Color32::from_rgb(0x2A, 0x2A, 0x2A);
pub const DARK_WIDGET_BG_HOVER: Color32 = Color32::from_rgb(0x35, 0x35, 0x35);
pub const DARK_WIDGET_BG_ACTIVE: Color32 = Color32::from_rgb(0x40, 0x40, 0x40);
pub const DARK_SEPARATOR: Color32 = Color32::from_rgb(0x3A, 0x3A, 0x3A);

// Layout
pub const PANEL_ROUNDING: u8 = 6;
pub const WIDGET_ROUNDING: u8 = 4;
pub const SPACING: f32 = 8.0;
pub const SPACING_Y: f32 = 4.0;
pub const MIN_INTERACT_HEIGHT: f32 = 28.0;
pub const MIN_INTERACT_WIDTH: f32 = 44.0;
pub const SLIDER_WIDTH: f32 = 220.0;

// Typography
pub const BODY_SIZE: f32 = 14.0;
pub const MONO_SIZE: f32 = 13.0;
pub const SMALL_SIZE: f32 = 12.0;
