use std::collections::HashMap;

use crossbeam_channel::never;
use progressive::{
    NoProgress, PixelBatch, PixelSink, RenderController, RenderSummary, Rgb8, SamplerConfig,
    SamplerKind, WorkerSettings,
};
use scenes::SceneKind;

#[derive(Default)]
struct Canvas {
    pixels: HashMap<(u32, u32), Rgb8>,
    order: Vec<(u32, u32)>,
    summary: Option<RenderSummary>,
}

impl PixelSink for Canvas {
    fn apply_batch(&mut self, batch: PixelBatch) {
        for sample in &batch {
            assert!(
                self.pixels.insert((sample.x, sample.y), sample.color).is_none(),
                "pixel {sample} delivered twice"
            );
            self.order.push((sample.x, sample.y));
        }
    }

    fn on_complete(&mut self, summary: &RenderSummary) {
        self.summary = Some(summary.clone());
    }
}

fn render(kind: SceneKind, width: u32, height: u32, sampler: SamplerConfig) -> Canvas {
    let mut controller = RenderController::new(WorkerSettings {
        max_batch_pixels: Some(16),
        ..WorkerSettings::default()
    });
    controller
        .start(&kind.builder(), sampler, width, height)
        .expect("start render");
    let mut canvas = Canvas::default();
    let summary = controller
        .run(&mut canvas, &mut NoProgress, &never())
        .expect("run render");
    assert!(summary.outcome.is_success(), "{:?}", summary.outcome);
    canvas
}

#[test]
fn single_sphere_is_red_in_the_middle_and_black_in_the_corner() {
    let canvas = render(
        SceneKind::SingleSphere,
        300,
        300,
        SamplerConfig::new(SamplerKind::Regular, 1),
    );
    assert_eq!(canvas.pixels.len(), 300 * 300);
    assert_eq!(canvas.pixels[&(150, 150)], Rgb8::new(255, 0, 0));
    assert_eq!(canvas.pixels[&(0, 0)], Rgb8::BLACK);
    assert_eq!(canvas.summary.unwrap().pixels_rendered, 300 * 300);
}

#[test]
fn rows_arrive_bottom_first() {
    let canvas = render(
        SceneKind::Debug,
        3,
        2,
        SamplerConfig::new(SamplerKind::Regular, 1),
    );
    assert_eq!(
        canvas.order,
        vec![(0, 1), (1, 1), (2, 1), (0, 0), (1, 0), (2, 0)]
    );
    assert!(canvas.pixels.values().all(|c| *c == Rgb8::new(255, 0, 255)));
}

#[test]
fn every_sampler_renders_the_full_image() {
    for kind in SamplerKind::ALL {
        let canvas = render(
            SceneKind::MatteSphere,
            16,
            16,
            SamplerConfig::new(kind, 4).with_seed(1),
        );
        assert_eq!(canvas.pixels.len(), 256, "{kind}");
    }
}
