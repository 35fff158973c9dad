use rectrack::core::{
    FrameBuffer, GrayImage, ImageOrientation, Normalized, Pixel, Point, Quad, Size,
};
use rectrack::rectify::RectifyParams;
use rectrack::tracker::{CandidateMatchingPass, TrackingMode};
use rectrack::{PresentationMode, RectrackConfig, ReplayDetector, Session, SinkCommand, SinkState};

const W: usize = 240;
const H: usize = 180;

fn sheet() -> Quad<Normalized> {
    Quad::new(
        Point::new(0.2, 0.15),
        Point::new(0.8, 0.25),
        Point::new(0.75, 0.85),
        Point::new(0.25, 0.8),
        0.92,
    )
}

fn inside(quad: &Quad<Pixel>, p: Point<Pixel>) -> bool {
    let c = quad.corners();
    (0..4).all(|i| {
        let a = c[i];
        let b = c[(i + 1) % 4];
        (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x) >= 0.0
    })
}

/// Bright keystoned sheet on a dark table.
fn scene() -> FrameBuffer {
    let quad = sheet().to_pixels(Size::new(W as f32, H as f32), Default::default());
    let img = GrayImage::from_fn(W, H, |x, y| {
        if inside(&quad, Point::new(x as f32 + 0.5, y as f32 + 0.5)) {
            230
        } else {
            20
        }
    });
    FrameBuffer::new(0, img)
}

fn run(config: &RectrackConfig, frames: usize) -> (Session, SinkState) {
    let mut session = Session::new(config, scene().as_frame().dimensions());
    let mut detector = ReplayDetector::new(vec![vec![sheet()]; frames]);
    let mut pass = CandidateMatchingPass::default();
    let mut display = SinkState::default();

    for i in 0..frames {
        let mut buf = scene();
        buf.index = i as u64;
        let cmds = session
            .process_frame(&buf.as_frame(), &mut detector, &mut pass)
            .unwrap();
        display.apply_all(cmds);
    }
    (session, display)
}

#[test]
fn keystoned_sheet_is_rectified_to_a_bright_rectangle() {
    let config = RectrackConfig {
        mode: PresentationMode::RectifiedPreview,
        ..RectrackConfig::default()
    };
    let (session, display) = run(&config, 3);
    assert_eq!(session.target().mode, TrackingMode::Locked);

    let preview = display.preview.expect("preview shown");
    let border = 3;
    let mut bright = 0usize;
    let mut total = 0usize;
    for y in border..preview.height - border {
        for x in border..preview.width - border {
            total += 1;
            if preview.get(x, y).unwrap_or(0) > 200 {
                bright += 1;
            }
        }
    }
    assert!(total > 0);
    assert!(bright * 100 >= total * 98, "{bright}/{total} bright pixels");
}

#[test]
fn overlay_tracks_sheet_in_viewport() {
    let config = RectrackConfig {
        viewport: Size::new(W as f32, H as f32),
        ..RectrackConfig::default()
    };
    let (_, display) = run(&config, 2);
    let overlay = display.overlay.expect("overlay shown");
    let expected = sheet().to_pixels(Size::new(W as f32, H as f32), Default::default());
    for (got, want) in overlay.polygon.iter().zip(expected.corners()) {
        assert!(got.distance(want) < 1e-3, "{got:?} vs {want:?}");
    }
    assert!(display.preview.is_none());
}

#[test]
fn output_orientation_rotates_preview() {
    let upright = RectrackConfig {
        mode: PresentationMode::RectifiedPreview,
        ..RectrackConfig::default()
    };
    let rotated = RectrackConfig {
        rectify: RectifyParams {
            output_orientation: ImageOrientation::Right,
            ..RectifyParams::default()
        },
        ..upright.clone()
    };

    let a = run(&upright, 2).1.preview.expect("preview");
    let b = run(&rotated, 2).1.preview.expect("preview");
    assert_eq!((a.width, a.height), (b.height, b.width));
}

#[test]
fn reset_mid_stream_clears_display() {
    let config = RectrackConfig {
        mode: PresentationMode::RectifiedPreview,
        ..RectrackConfig::default()
    };
    let (mut session, mut display) = run(&config, 3);
    assert!(display.overlay.is_some());
    display.apply_all(session.reset());
    assert!(display.is_clear());
    assert!(session.target().quad.is_none());
    assert!(matches!(session.reset()[..], [SinkCommand::Reset]));
}
