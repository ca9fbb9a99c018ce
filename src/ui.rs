use egui::Context;

use crate::controller::FrameReadout;

pub fn fps_label(readout: &FrameReadout) -> String {
    match readout.fps {
        Some(fps) => format!("FPS: {fps}"),
        None => "FPS: -".to_string(),
    }
}

/// Power rounded to two decimals
pub fn power_label(readout: &FrameReadout) -> String {
    format!("Power: {:.2}", readout.power)
}

/// Build the readout overlay and return egui output
pub fn build_ui(egui_ctx: &Context, raw_input: egui::RawInput, readout: &FrameReadout) -> egui::FullOutput {
    egui_ctx.run(raw_input, |ctx| {
        draw_readouts(ctx, readout);
    })
}

fn draw_readouts(ctx: &Context, readout: &FrameReadout) {
    egui::Area::new(egui::Id::new("readouts"))
        .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
        .show(ctx, |ui| {
            egui::Frame::NONE
                .fill(egui::Color32::from_black_alpha(160))
                .inner_margin(6.0)
                .show(ui, |ui| {
                    for text in [fps_label(readout), power_label(readout)] {
                        ui.label(egui::RichText::new(text).monospace().color(egui::Color32::WHITE));
                    }
                });
        });
}
