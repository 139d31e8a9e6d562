pub mod dark;
pub mod tokens;

use egui::{Context, FontId, TextStyle};

/// Dark visuals plus the compact spacing used by the transport bar.
pub fn apply(ctx: &Context) {
    ctx.set_visuals(dark::dark_visuals());

    let mut style = (*ctx.style()).clone();
    style.spacing.interact_size =
        egui::vec2(tokens::MIN_INTERACT_WIDTH, tokens::MIN_INTERACT_HEIGHT);
    style.spacing.item_spacing = egui::vec2(tokens::SPACING, tokens::SPACING_Y);
    style.spacing.slider_width = tokens::SLIDER_WIDTH;
    style.spacing.button_padding = egui::vec2(10.0, 2.0);
    style
        .text_styles
        .insert(TextStyle::Body, FontId::proportional(tokens::BODY_SIZE));
    style
        .text_styles
        .insert(TextStyle::Small, FontId::proportional(tokens::SMALL_SIZE));
    style
        .text_styles
        .insert(TextStyle::Monospace, FontId::monospace(tokens::MONO_SIZE));
    ctx.set_style(style);
}
