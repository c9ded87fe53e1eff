use penumbra_renderer::{FrameSequencer, Pass, RenderError};

#[test]
fn passes_run_in_order_every_frame() {
    let mut seq = FrameSequencer::default();
    for _ in 0..3 {
        seq.begin(Pass::Geometry).unwrap();
        seq.begin(Pass::Shadow).unwrap();
        seq.begin(Pass::Lighting).unwrap();
    }
    assert_eq!(seq.completed_frames(), 3);
    assert_eq!(seq.expected(), Pass::Geometry);
}

#[test]
fn lighting_before_shadow_is_rejected() {
    let mut seq = FrameSequencer::default();
    seq.begin(Pass::Geometry).unwrap();

    let err = seq.begin(Pass::Lighting).unwrap_err();
    assert!(matches!(
        err,
        RenderError::PassOrder {
            expected: Pass::Shadow,
            requested: Pass::Lighting
        }
    ));
    // Rejected call leaves the frame where it was.
    assert_eq!(seq.expected(), Pass::Shadow);
}

#[test]
fn shadow_first_is_rejected() {
    let mut seq = FrameSequencer::default();
    assert!(seq.begin(Pass::Shadow).is_err());
    assert_eq!(seq.completed_frames(), 0);
}

#[test]
fn abandoned_frame_restarts_at_geometry() {
    let mut seq = FrameSequencer::default();
    seq.begin(Pass::Geometry).unwrap();
    seq.abandon();
    assert_eq!(seq.expected(), Pass::Geometry);
    seq.begin(Pass::Geometry).unwrap();
}
