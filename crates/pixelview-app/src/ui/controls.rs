use egui::{Context, RichText};

use crate::filter::{INTENSITY_MAX, INTENSITY_MIN};
use crate::ui::theme::tokens::*;

/// The two user-facing controls. The UI writes these; the view reads them
/// on every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewParams {
    pub playing: bool,
    intensity: f32,
}

impl ViewParams {
    pub fn new(playing: bool, intensity: f32) -> Self {
        Self {
            playing,
            intensity: clamp_intensity(intensity),
        }
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = clamp_intensity(intensity);
    }

    pub fn toggle_playing(&mut self) {
        self.playing = !self.playing;
    }
}

impl Default for ViewParams {
    fn default() -> Self {
        Self::new(false, 8.0)
    }
}

fn clamp_intensity(v: f32) -> f32 {
    if v.is_nan() {
        INTENSITY_MIN
    } else {
        v.clamp(INTENSITY_MIN, INTENSITY_MAX)
    }
}

/// Playback snapshot collected before the UI borrow.
pub struct PlaybackInfo {
    pub media_label: String,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub status: &'static str,
    pub ready: bool,
    pub frames_filtered: u64,
    pub error: Option<String>,
}

pub fn draw_controls(ctx: &Context, params: &mut ViewParams, info: &PlaybackInfo) {
    egui::TopBottomPanel::bottom("transport")
        .resizable(false)
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                let play_label = if params.playing { "Pause" } else { "Play" };
                if ui
                    .button(RichText::new(play_label).size(BODY_SIZE))
                    .on_hover_text("Space")
                    .clicked()
                {
                    params.toggle_playing();
                }

                ui.separator();

                let mut intensity = params.intensity();
                let slider = ui.add(
                    egui::Slider::new(&mut intensity, INTENSITY_MIN..=INTENSITY_MAX)
                        .step_by(1.0)
                        .text("Pixellate"),
                );
                if slider.changed() {
                    params.set_intensity(intensity);
                }

                ui.separator();

                ui.label(
                    RichText::new(format!(
                        "{} / {}",
                        format_time(info.position_secs),
                        format_time(info.duration_secs)
                    ))
                    .monospace()
                    .color(DARK_TEXT_PRIMARY),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(err) = &info.error {
                        ui.colored_label(
                            DARK_ERROR,
                            RichText::new(format!("ERR: {err}")).size(SMALL_SIZE),
                        );
                    } else {
                        let color = if info.ready {
                            DARK_TEXT_SECONDARY
                        } else {
                            DARK_WARNING
                        };
                        ui.label(RichText::new(info.status).size(SMALL_SIZE).color(color))
                            .on_hover_text(format!("{} frames filtered", info.frames_filtered));
                    }
                    ui.label(
                        RichText::new(&info.media_label)
                            .size(SMALL_SIZE)
                            .color(DARK_TEXT_SECONDARY),
                    );
                });
            });
            ui.add_space(2.0);
        });
}

/// `mm:ss`, or `h:mm:ss` past an hour.
pub fn format_time(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    let (h, m, s) = (total / 3600, (total / 60) % 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}
