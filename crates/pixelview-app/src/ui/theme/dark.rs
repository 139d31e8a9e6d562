use egui::{Color32, CornerRadius, Stroke, Visuals};

use super::tokens::*;

pub fn dark_visuals() -> Visuals {
    let mut v = Visuals::dark();

    v.panel_fill = DARK_PANEL.gamma_multiply(0.92);
    v.window_fill = DARK_PANEL;
    v.extreme_bg_color = DARK_CANVAS;

    v.override_text_color = Some(DARK_TEXT_PRIMARY);
    v.selection.bg_fill = DARK_ACCENT.gamma_multiply(0.4);
    v.selection.stroke = Stroke::new(1.0, DARK_ACCENT);

    v.widgets.noninteractive.bg_fill = DARK_PANEL;
    v.widgets.noninteractive.fg_stroke = Stroke::new(1.0, DARK_TEXT_SECONDARY);
    v.widgets.noninteractive.bg_stroke = Stroke::new(0.5, DARK_SEPARATOR);

    let states = [
        (&mut v.widgets.inactive, DARK_WIDGET_BG, DARK_SEPARATOR),
        (&mut v.widgets.hovered, DARK_WIDGET_BG_HOVER, DARK_ACCENT),
        (&mut v.widgets.active, DARK_WIDGET_BG_ACTIVE, DARK_ACCENT),
    ];
    for (widget, fill, outline) in states {
        widget.bg_fill = fill;
        widget.weak_bg_fill = fill;
        widget.fg_stroke = Stroke::new(1.0, DARK_TEXT_PRIMARY);
        widget.bg_stroke = Stroke::new(1.0, outline);
    }
    for widget in [
        &mut v.widgets.noninteractive,
        &mut v.widgets.inactive,
        &mut v.widgets.hovered,
        &mut v.widgets.active,
    ] {
        widget.corner_radius = CornerRadius::same(WIDGET_ROUNDING);
    }

    v.window_corner_radius = CornerRadius::same(PANEL_ROUNDING);
    v.window_stroke = Stroke::new(1.0, DARK_SEPARATOR);
    v.slider_trailing_fill = true;
    v.hyperlink_color = Color32::from_rgb(0x7C, 0xC4, 0xEA);

    v
}
