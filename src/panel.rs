//! Light debug panel
//!
//! The panel reads the scene and reports widget changes as [`LightEdit`]s.
//! It never mutates the scene itself; the caller applies the edits before the
//! next frame.

use glam::Vec3;

use crate::scene::{Light, LightChange, LightEdit, LightId, Scene, SLIDER_STEP};

/// One widget of a light folder: its label and the property value it shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Control {
    pub label: &'static str,
    pub value: LightChange,
}

impl Control {
    fn new(label: &'static str, value: LightChange) -> Self {
        Self { label, value }
    }
}

/// Widgets for a light in display order, holding the light's current values
pub fn controls(light: &Light) -> Vec<Control> {
    use LightChange as C;

    match light {
        Light::Ambient(l) => vec![
            Control::new("color", C::Color(l.color)),
            Control::new("intensity", C::Intensity(l.intensity)),
        ],
        Light::Hemisphere(l) => vec![
            Control::new("color", C::Color(l.sky_color)),
            Control::new("groundColor", C::GroundColor(l.ground_color)),
            Control::new("intensity", C::Intensity(l.intensity)),
        ],
        Light::Directional(l) => vec![
            Control::new("color", C::Color(l.color)),
            Control::new("intensity", C::Intensity(l.intensity)),
            Control::new("Cast Shadow", C::CastShadow(l.cast_shadow)),
        ],
        Light::Point(l) => vec![
            Control::new("color", C::Color(l.color)),
            Control::new("intensity", C::Intensity(l.intensity)),
            Control::new("Cast Shadow", C::CastShadow(l.cast_shadow)),
        ],
        Light::Spot(l) => vec![
            Control::new("angle", C::Angle(l.angle)),
            Control::new("penumbra", C::Penumbra(l.penumbra)),
            Control::new("decay", C::Decay(l.decay)),
            Control::new("distance", C::Distance(l.distance)),
            Control::new("color", C::Color(l.color)),
            Control::new("intensity", C::Intensity(l.intensity)),
        ],
        Light::RectArea(l) => vec![
            Control::new("color", C::Color(l.color)),
            Control::new("intensity", C::Intensity(l.intensity)),
        ],
    }
}

/// Draw the widget for `value` and write the user's change back into it.
///
/// Returns whether the value changed this frame.
fn edit_value(ui: &mut egui::Ui, label: &str, value: &mut LightChange) -> bool {
    let range = value.range();
    match value {
        LightChange::Color(color) | LightChange::GroundColor(color) => {
            let mut rgb = color.to_array();
            let changed = ui
                .horizontal(|ui| {
                    let changed = ui.color_edit_button_rgb(&mut rgb).changed();
                    ui.label(label);
                    changed
                })
                .inner;
            if changed {
                *color = Vec3::from_array(rgb);
            }
            changed
        }
        LightChange::CastShadow(on) => ui.checkbox(on, label).changed(),
        LightChange::Intensity(v)
        | LightChange::Angle(v)
        | LightChange::Penumbra(v)
        | LightChange::Decay(v)
        | LightChange::Distance(v) => ui
            .add(
                egui::Slider::new(v, range.unwrap_or(0.0..=1.0))
                    .step_by(SLIDER_STEP)
                    .text(label),
            )
            .changed(),
    }
}

/// egui panel with one folder per light
pub struct LightPanel {
    visible: bool,
}

impl Default for LightPanel {
    fn default() -> Self {
        Self::new(true)
    }
}

impl LightPanel {
    pub fn new(visible: bool) -> Self {
        Self { visible }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Draw the panel and collect the edits made this frame
    pub fn show(&mut self, ctx: &egui::Context, scene: &Scene) -> Vec<LightEdit> {
        let mut edits = Vec::new();
        if !self.visible {
            return edits;
        }

        egui::Window::new("Lights")
            .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
            .default_width(260.0)
            .resizable(false)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for (id, light) in scene.lights_with_ids() {
                        egui::CollapsingHeader::new(light.kind().title())
                            .id_source(id.0)
                            .default_open(true)
                            .show(ui, |ui| {
                                let mut folder = Folder {
                                    ui,
                                    light: id,
                                    edits: &mut edits,
                                };
                                for control in controls(light) {
                                    folder.control(control);
                                }
                            });
                    }
                });
            });

        edits
    }
}

/// Widgets of one light folder
struct Folder<'a> {
    ui: &'a mut egui::Ui,
    light: LightId,
    edits: &'a mut Vec<LightEdit>,
}

impl Folder<'_> {
    fn control(&mut self, control: Control) {
        let mut value = control.value;
        if edit_value(self.ui, control.label, &mut value) {
            self.edits.push(LightEdit::new(self.light, value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{AmbientLight, PointLight, INTENSITY_RANGE};
    use crate::showcase::build_scene;

    fn run_panel(panel: &mut LightPanel, scene: &Scene) -> Vec<LightEdit> {
        let ctx = egui::Context::default();
        let mut edits = Vec::new();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            edits = panel.show(ctx, scene);
        });
        edits
    }

    fn scene() -> Scene {
        let mut scene = Scene::new();
        scene.add_light(Light::Ambient(AmbientLight::new(Vec3::ONE, 0.2)));
        scene.add_light(Light::Point(PointLight::new(Vec3::ONE, 0.5, 10.0)));
        scene
    }

    fn pointer_at(x: f32, y: f32, pressed: bool) -> Vec<egui::Event> {
        let pos = egui::pos2(x, y);
        vec![
            egui::Event::PointerMoved(pos),
            egui::Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed,
                modifiers: egui::Modifiers::default(),
            },
        ]
    }

    /// Run a lone folder control in the top-left corner of the screen, one
    /// frame per entry of `frames`, and collect every edit it reports
    fn drive_control(
        light: LightId,
        control: Control,
        frames: Vec<Vec<egui::Event>>,
    ) -> Vec<LightEdit> {
        let ctx = egui::Context::default();
        let mut edits = Vec::new();
        let mut value = control.value;
        for events in std::iter::once(Vec::new()).chain(frames) {
            let input = egui::RawInput {
                screen_rect: Some(egui::Rect::from_min_size(
                    egui::Pos2::ZERO,
                    egui::vec2(400.0, 300.0),
                )),
                events,
                ..Default::default()
            };
            let _ = ctx.run(input, |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    let mut folder = Folder {
                        ui,
                        light,
                        edits: &mut edits,
                    };
                    folder.control(Control { value, ..control });
                });
            });
            if let Some(edit) = edits.last() {
                value = edit.change;
            }
        }
        edits
    }

    #[test]
    fn test_untouched_panel_emits_nothing() {
        let scene = scene();
        let mut panel = LightPanel::default();
        assert!(run_panel(&mut panel, &scene).is_empty());
    }

    #[test]
    fn test_toggle() {
        let scene = scene();
        let mut panel = LightPanel::default();
        assert!(panel.is_visible());
        panel.toggle();
        assert!(!panel.is_visible());
        assert!(run_panel(&mut panel, &scene).is_empty());
    }

    #[test]
    fn test_clicking_cast_shadow_reports_edit_for_its_light() {
        let control = Control::new("Cast Shadow", LightChange::CastShadow(false));
        let edits = drive_control(
            LightId(3),
            control,
            vec![pointer_at(16.0, 16.0, true), pointer_at(16.0, 16.0, false)],
        );

        assert_eq!(
            edits,
            vec![LightEdit::new(LightId(3), LightChange::CastShadow(true))]
        );
    }

    #[test]
    fn test_dragging_intensity_reports_edit_for_its_light() {
        let control = Control::new("intensity", LightChange::Intensity(0.1));
        let edits = drive_control(
            LightId(1),
            control,
            vec![
                pointer_at(12.0, 16.0, true),
                vec![egui::Event::PointerMoved(egui::pos2(300.0, 16.0))],
                pointer_at(300.0, 16.0, false),
            ],
        );

        let last = edits.last().copied().expect("no edit reported");
        assert!(edits.iter().all(|edit| edit.light == LightId(1)));
        match last.change {
            LightChange::Intensity(value) => assert_eq!(value, *INTENSITY_RANGE.end()),
            other => panic!("unexpected change {other:?}"),
        }
    }

    #[test]
    fn test_controls_follow_light_state() {
        let mut light = PointLight::new(Vec3::X, 0.5, 10.0);
        light.cast_shadow = true;
        let labels: Vec<_> = controls(&Light::Point(light))
            .into_iter()
            .map(|c| (c.label, c.value))
            .collect();

        assert_eq!(
            labels,
            vec![
                ("color", LightChange::Color(Vec3::X)),
                ("intensity", LightChange::Intensity(0.5)),
                ("Cast Shadow", LightChange::CastShadow(true)),
            ]
        );
    }

    #[test]
    fn test_every_control_applies_to_its_light() {
        let (mut scene, _) = build_scene();
        let ids: Vec<LightId> = scene.lights_with_ids().map(|(id, _)| id).collect();
        for id in ids {
            let light = scene.light(id).cloned().expect("light exists");
            for control in controls(&light) {
                assert_eq!(scene.apply_edit(&LightEdit::new(id, control.value)), Ok(()));
            }
            // Re-applying current values leaves the light as it was
            assert_eq!(scene.light(id), Some(&light));
        }
    }
}
