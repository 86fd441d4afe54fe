//! End-to-end tests driving the bridge the way a host pipeline would:
//! reconfig, a push/pull loop, seeks, commands, and teardown.

use framelink_bridge::{
    BridgeError, BridgeOptions, ChainSpec, ControlRequest, ControlResponse, FilterSpecBuilder,
    GraphBridge, GraphBridgeStage, PullResult, VideoStage,
};
use framelink_core::frame::{PixelFormat, VideoFrame, VideoParams};
use framelink_core::hw::{HwDevice, HwDeviceKind, HwFramesContext};
use framelink_core::rational::Rational;

fn frame_at(width: u32, height: u32, pts: f64) -> VideoFrame {
    let mut frame = VideoFrame::new(width, height, PixelFormat::Yuv420p);
    frame.pts = Some(pts);
    frame
}

/// Configure the bridge for the first frame, run the sequence through,
/// and collect the output.
fn run_stream(bridge: &mut GraphBridge, frames: Vec<VideoFrame>) -> Vec<VideoFrame> {
    if let Some(first) = frames.first() {
        bridge.reconfigure(&first.params()).unwrap();
    }
    let mut out = Vec::new();
    for frame in frames {
        bridge.push_frame(frame).unwrap();
        while let PullResult::Frame(f) = bridge.pull_frame().unwrap() {
            out.push(f);
        }
    }
    bridge.push_eof().unwrap();
    loop {
        match bridge.pull_frame().unwrap() {
            PullResult::Frame(f) => out.push(f),
            PullResult::Eof => break,
            PullResult::NeedMore => unreachable!("graph stalled after EOF"),
        }
    }
    out
}

#[test]
fn test_timestamps_survive_the_graph() {
    let mut bridge = GraphBridge::new(BridgeOptions::with_graph("scale=32:24,null")).unwrap();
    let input_pts = [0.0, 0.04, 0.08, 1.0 / 3.0];
    let frames = input_pts.iter().map(|&p| frame_at(64, 48, p)).collect();

    let out = run_stream(&mut bridge, frames);

    assert_eq!(out.len(), input_pts.len());
    for (frame, expected) in out.iter().zip(input_pts) {
        // microsecond tick quantization bounds the error
        assert!((frame.pts.unwrap() - expected).abs() < 1e-5);
    }
}

#[test]
fn test_undefined_timestamp_not_invented() {
    let mut bridge = GraphBridge::new(BridgeOptions::with_graph("null")).unwrap();
    let out = run_stream(
        &mut bridge,
        vec![VideoFrame::new(64, 48, PixelFormat::Yuv420p)],
    );
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].pts, None);
}

#[test]
fn test_geometry_negotiation_propagates() {
    let mut bridge = GraphBridge::new(BridgeOptions::with_graph("scale=320:240,setsar=4/3")).unwrap();
    let out = bridge
        .reconfigure(&VideoParams::new(640, 480, PixelFormat::Yuv420p))
        .unwrap();
    assert_eq!((out.width, out.height), (320, 240));
    assert_eq!(out.par, Rational::new(4, 3));

    let filtered = run_stream(&mut bridge, vec![frame_at(640, 480, 0.0)]);
    assert_eq!(filtered[0].width(), 320);
    assert_eq!(filtered[0].par, Rational::new(4, 3));
}

#[test]
fn test_mid_stream_geometry_change() {
    let mut bridge = GraphBridge::new(BridgeOptions::with_graph("scale=32:24")).unwrap();
    let out = run_stream(
        &mut bridge,
        vec![frame_at(64, 48, 0.0), frame_at(128, 96, 0.04)],
    );
    // both segments land at the scaled geometry
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|f| f.width() == 32 && f.height() == 24));
}

#[test]
fn test_stream_restarts_after_eof() {
    let mut bridge = GraphBridge::new(BridgeOptions::with_graph("null")).unwrap();

    let first = run_stream(&mut bridge, vec![frame_at(64, 48, 0.0)]);
    assert_eq!(first.len(), 1);
    assert!(matches!(bridge.pull_frame().unwrap(), PullResult::Eof));

    // new input after EOF must flow, not vanish into the drained graph
    bridge.push_frame(frame_at(64, 48, 10.0)).unwrap();
    match bridge.pull_frame().unwrap() {
        PullResult::Frame(f) => assert!((f.pts.unwrap() - 10.0).abs() < 1e-6),
        other => panic!("expected frame after restart, got {:?}", other),
    }
}

#[test]
fn test_metadata_snapshot_lifecycle() {
    let mut bridge =
        GraphBridge::new(BridgeOptions::with_graph("setmeta=lavfi.test.score=0.9")).unwrap();

    // no snapshot exists before any frame carried a dictionary
    assert_eq!(
        bridge.control(ControlRequest::GetMetadata),
        ControlResponse::NotAvailable
    );

    run_stream(&mut bridge, vec![frame_at(64, 48, 0.0)]);

    match bridge.control(ControlRequest::GetMetadata) {
        ControlResponse::Metadata(tags) => {
            assert_eq!(tags.get("lavfi.test.score"), Some("0.9"))
        }
        other => panic!("expected metadata, got {:?}", other),
    }

    // teardown discards the snapshot
    bridge.destroy_graph();
    assert_eq!(
        bridge.control(ControlRequest::GetMetadata),
        ControlResponse::NotAvailable
    );
}

#[test]
fn test_push_rejected_until_configured() {
    let mut bridge = GraphBridge::new(BridgeOptions::with_graph("null")).unwrap();

    // a host that never negotiated parameters gets an error, not output
    assert!(matches!(
        bridge.push_frame(frame_at(64, 48, 0.0)),
        Err(BridgeError::NotConfigured)
    ));
    assert!(matches!(bridge.push_eof(), Err(BridgeError::NotConfigured)));
    assert!(!bridge.is_active());

    bridge
        .reconfigure(&VideoParams::new(64, 48, PixelFormat::Yuv420p))
        .unwrap();
    bridge.push_frame(frame_at(64, 48, 0.0)).unwrap();
    assert!(matches!(bridge.pull_frame().unwrap(), PullResult::Frame(_)));
}

#[test]
fn test_runtime_command_changes_output() {
    let mut bridge = GraphBridge::new(BridgeOptions::with_graph("eq=brightness=0.0")).unwrap();
    bridge
        .reconfigure(&VideoParams::new(64, 48, PixelFormat::Yuv420p))
        .unwrap();
    bridge.push_frame(frame_at(64, 48, 0.0)).unwrap();
    let PullResult::Frame(before) = bridge.pull_frame().unwrap() else {
        panic!("no output");
    };

    let resp = bridge.control(ControlRequest::Command {
        target: "eq".into(),
        name: "brightness".into(),
        arg: "0.5".into(),
    });
    assert_eq!(resp, ControlResponse::Ok);

    bridge.push_frame(frame_at(64, 48, 0.04)).unwrap();
    let PullResult::Frame(after) = bridge.pull_frame().unwrap() else {
        panic!("no output");
    };

    let luma_before = before.buffer.plane(0).unwrap()[0];
    let luma_after = after.buffer.plane(0).unwrap()[0];
    assert!(luma_after > luma_before);
}

#[test]
fn test_seek_reset_discards_inflight_state() {
    let mut bridge = GraphBridge::new(BridgeOptions::with_graph("null")).unwrap();
    bridge
        .reconfigure(&VideoParams::new(64, 48, PixelFormat::Yuv420p))
        .unwrap();
    bridge.push_frame(frame_at(64, 48, 0.0)).unwrap();
    bridge.push_eof().unwrap();

    assert_eq!(
        bridge.control(ControlRequest::SeekReset),
        ControlResponse::Ok
    );

    // post-seek frames flow through a fresh graph
    let out = run_stream(&mut bridge, vec![frame_at(64, 48, 42.0)]);
    assert_eq!(out.len(), 1);
}

#[test]
fn test_hardware_frames_pass_through() {
    let device = HwDevice::new(HwDeviceKind::Vaapi, "/dev/dri/renderD128");
    let pool = HwFramesContext::new(device.clone(), PixelFormat::Nv12, 1920, 1080);

    let mut bridge = GraphBridge::new(BridgeOptions::with_graph("null")).unwrap();
    bridge.set_hw_device(device);

    let mut frame = VideoFrame::new(1920, 1080, PixelFormat::Nv12);
    frame.pts = Some(0.0);
    frame.hw_frames = Some(pool.clone());
    bridge.reconfigure(&frame.params()).unwrap();
    bridge.push_frame(frame).unwrap();

    assert_eq!(
        bridge.output_params().unwrap().hw_subfmt,
        Some(PixelFormat::Nv12)
    );
    let PullResult::Frame(out) = bridge.pull_frame().unwrap() else {
        panic!("no output");
    };
    let out_pool = out.hw_frames.expect("pool reference dropped");
    assert!(std::sync::Arc::ptr_eq(&out_pool, &pool));
}

#[test]
fn test_scale_rejects_hardware_input() {
    let device = HwDevice::new(HwDeviceKind::Cuda, "cuda:0");
    let pool = HwFramesContext::new(device.clone(), PixelFormat::Nv12, 1280, 720);

    let mut bridge = GraphBridge::new(BridgeOptions::with_graph("scale=640:360")).unwrap();
    bridge.set_hw_device(device);

    let mut frame = VideoFrame::new(1280, 720, PixelFormat::Nv12);
    frame.hw_frames = Some(pool);
    let err = bridge.reconfigure(&frame.params()).unwrap_err();
    assert!(matches!(err, BridgeError::GraphBuild(_)));
}

#[test]
fn test_built_spec_runs_end_to_end() {
    let spec = ChainSpec::new()
        .then(FilterSpecBuilder::new("scale").arg(32).arg(24))
        .then(FilterSpecBuilder::new("setmeta").opt("comment", "a,b:c=d"))
        .build();

    let mut bridge = GraphBridge::new(BridgeOptions::with_graph(spec)).unwrap();
    let out = run_stream(&mut bridge, vec![frame_at(64, 48, 0.0)]);
    assert_eq!(out[0].width(), 32);

    match bridge.control(ControlRequest::GetMetadata) {
        ControlResponse::Metadata(tags) => assert_eq!(tags.get("comment"), Some("a,b:c=d")),
        other => panic!("expected metadata, got {:?}", other),
    }
}

#[test]
fn test_wrapped_stage_with_hook() {
    let mut stage = GraphBridgeStage::wrap("null").unwrap();
    stage.set_spec("scale=32:24").unwrap();
    stage.set_reconfig_hook(Box::new(|declared, adjusted| {
        // pretend the host crops before the graph sees the stream
        adjusted.width = declared.width / 2;
    }));

    let out = stage
        .reconfig(&VideoParams::new(128, 96, PixelFormat::Yuv420p))
        .unwrap();
    assert_eq!((out.width, out.height), (32, 24));

    stage.push_frame(frame_at(64, 96, 0.0)).unwrap();
    match stage.pull_frame().unwrap() {
        PullResult::Frame(f) => assert_eq!(f.width(), 32),
        other => panic!("expected frame, got {:?}", other),
    }
}

#[test]
fn test_filter_listing_names_chain_filters() {
    let help = framelink_bridge::help::filter_help();
    for name in ["null", "scale", "setsar", "eq", "setmeta"] {
        assert!(help.contains(name), "listing is missing {}", name);
    }
}
