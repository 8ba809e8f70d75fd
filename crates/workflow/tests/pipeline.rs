//! Full pipeline: upload, annotate, analyze, generate, compile.

use chrono::NaiveDate;
use image::{Rgba, RgbaImage};

use fieldscope_annotate::{CanvasEngine, Viewport};
use fieldscope_core::Point;
use fieldscope_gateway::{MockAssessor, MockWriter};
use fieldscope_report::ReportDocument;
use fieldscope_workflow::{AnalysisPhase, Sequencer, Stage};

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([60, 60, 60, 255]));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    bytes
}

#[tokio::test]
async fn upload_annotate_analyze_report() {
    let mut seq = Sequencer::new();

    // Upload two images.
    let outcome = seq
        .ingest(vec![
            fieldscope_store::ImageSource::new("furnace.png", png_bytes(64, 64)),
            fieldscope_store::ImageSource::new("flange.png", png_bytes(32, 32)),
        ])
        .unwrap();
    assert_eq!(outcome.added, 2);
    assert_eq!(seq.stage(), Stage::Annotating);
    assert_eq!(seq.cursor(), 0);

    // Annotate image 0 with a five-point stroke.
    let mut engine = CanvasEngine::new();
    let viewport = Viewport::one_to_one(seq.store().get(0).unwrap().original());
    engine.activate(seq.store(), 0, viewport).unwrap();
    engine.pointer_down(Point::new(5.0, 5.0));
    for p in [(15.0, 10.0), (25.0, 20.0), (35.0, 30.0), (45.0, 45.0)] {
        engine.pointer_move(Point::new(p.0, p.1));
    }
    engine.pointer_up(seq.store_mut()).unwrap();
    assert_eq!(seq.store().get(0).unwrap().strokes().len(), 1);
    assert_eq!(seq.store().get(0).unwrap().strokes()[0].points.len(), 5);

    // Describe image 1.
    seq.next();
    let cursor = seq.cursor();
    seq.store_mut()
        .update_description(cursor, "rusted flange")
        .unwrap();

    // Begin analysis; both gateway calls succeed.
    let assessor = MockAssessor::new();
    seq.analyze(&assessor).await.unwrap();
    assert_eq!(seq.stage(), Stage::Analyzing(AnalysisPhase::Ready));
    assert_eq!(assessor.calls(), 2);

    // Generate the report narrative and compile the document.
    seq.generate_report(&MockWriter::new(), "123 Main Street")
        .await
        .unwrap();
    assert_eq!(seq.stage(), Stage::Report);

    let doc = ReportDocument::compile(
        "123 Main Street",
        NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
        seq.store(),
        seq.results(),
        seq.report().unwrap(),
    )
    .unwrap();

    // Two sections in upload order.
    assert_eq!(doc.sections.len(), 2);
    assert_eq!(doc.sections[0].component_type, "64x64 component");
    assert_eq!(doc.sections[1].component_type, "32x32 component");

    // Appendix figures show the original, unannotated bitmaps: the
    // annotated working copy of image 0 differs from its original.
    let item0 = seq.store().get(0).unwrap();
    assert_ne!(item0.working(), item0.original());
    assert_eq!(doc.appendix[0].image, *item0.original());

    // Image 1's caption carries the inspector note.
    assert!(doc.appendix[1].caption.contains("rusted flange"));
}
