//! Integration tests for the processor driving the beauty boundary.

use silk_core::{BeautyParams, Frame};
use silk_engine::{BeautyBoundary, EngineState};
use silk_pipeline::{FrameProcessor, FrameStore, ProcessorConfig, ProcessorState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const SKIN: [u8; 4] = [60, 110, 200, 255];

fn config() -> ProcessorConfig {
    ProcessorConfig {
        store_capacity: 3,
        target_interval: Duration::from_millis(2),
        output_capacity: 32,
    }
}

fn start_with_boundary(processor: &FrameProcessor, boundary: &Arc<BeautyBoundary>) {
    let engine = Arc::clone(boundary);
    let params = BeautyParams::from_intensity(0.8);
    processor
        .start(move |frame: &Frame| {
            let mut out = frame.clone();
            engine.process(&mut out, &params).map(|()| out)
        })
        .unwrap();
}

#[test]
fn beautified_frames_flow_downstream() {
    let boundary = Arc::new(BeautyBoundary::new());
    let processor = FrameProcessor::new(config()).unwrap();
    let rx = processor.output();
    start_with_boundary(&processor, &boundary);

    let input = Frame::solid(64, 64, SKIN);
    let input_px = input.rgba_at(0, 0).unwrap();
    assert!(processor.submit_frame(input));

    let out = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(out.beautified);
    let px = out.frame.rgba_at(0, 0).unwrap();
    assert!(px[0] > input_px[0], "whitening brightens {px:?}");

    processor.stop();
    boundary.release();
    assert_eq!(boundary.state(), EngineState::Released);
}

#[test]
fn oversized_frame_passes_through_and_loop_survives() {
    let boundary = Arc::new(BeautyBoundary::new());
    let processor = FrameProcessor::new(config()).unwrap();
    let rx = processor.output();
    start_with_boundary(&processor, &boundary);

    let oversized = Frame::solid(4000, 40, SKIN);
    let oversized_id = oversized.id;
    processor.submit_frame(oversized);
    let out = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(!out.beautified);
    assert_eq!(out.frame.id, oversized_id);
    assert_eq!(out.frame.rgba_at(0, 0), Some(SKIN));

    processor.submit_frame(Frame::solid(64, 64, SKIN));
    assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap().beautified);

    processor.stop();
    let stats = processor.statistics();
    assert_eq!(stats.processed, 2);
    assert_eq!(stats.failed, 1);
}

#[test]
fn stop_drains_and_rejects() {
    let boundary = Arc::new(BeautyBoundary::new());
    let processor = FrameProcessor::new(config()).unwrap();
    start_with_boundary(&processor, &boundary);
    processor.pause();
    for _ in 0..5 {
        processor.submit_frame(Frame::solid(64, 64, SKIN));
    }

    processor.stop();
    processor.stop();
    assert_eq!(processor.state(), ProcessorState::Stopped);
    assert_eq!(processor.statistics().store.dropped, 2);
    assert!(!processor.submit_frame(Frame::solid(64, 64, SKIN)));
    assert_eq!(processor.statistics().rejected, 1);
}

#[test]
fn stop_from_another_thread() {
    let boundary = Arc::new(BeautyBoundary::new());
    let processor = Arc::new(FrameProcessor::new(config()).unwrap());
    start_with_boundary(&processor, &boundary);

    let producer = {
        let processor = Arc::clone(&processor);
        thread::spawn(move || {
            let mut accepted = 0;
            for _ in 0..200 {
                if processor.submit_frame(Frame::solid(64, 64, SKIN)) {
                    accepted += 1;
                }
                thread::sleep(Duration::from_micros(200));
            }
            accepted
        })
    };

    thread::sleep(Duration::from_millis(10));
    processor.stop();
    assert_eq!(processor.buffered_frames(), 0);
    let accepted: u64 = producer.join().unwrap();
    assert_eq!(processor.buffered_frames(), 0);
    let stats = processor.statistics();
    assert_eq!(accepted + stats.rejected, 200);
    assert!(stats.store.consumed <= stats.store.submitted);
}

#[test]
fn slow_consumer_sees_only_fresh_frames() {
    let store = FrameStore::new(2);
    let mut last = None;
    for _ in 0..10 {
        let frame = Frame::solid(32, 32, SKIN);
        last = Some(frame.id);
        store.submit(frame);
    }
    assert_eq!(store.peek_latest().map(|f| f.id), last);
    let stats = store.statistics();
    assert_eq!(stats.dropped, 8);
    assert!((stats.drop_rate - 0.8).abs() < 1e-12);
}

#[test]
fn no_processing_after_stop_returns() {
    let boundary = Arc::new(BeautyBoundary::new());
    let processor = Arc::new(FrameProcessor::new(config()).unwrap());
    let calls = Arc::new(AtomicUsize::new(0));
    {
        let engine = Arc::clone(&boundary);
        let calls = Arc::clone(&calls);
        let params = BeautyParams::default();
        processor
            .start(move |frame: &Frame| {
                calls.fetch_add(1, Ordering::SeqCst);
                let mut out = frame.clone();
                engine.process(&mut out, &params).map(|()| out)
            })
            .unwrap();
    }

    let producer = {
        let processor = Arc::clone(&processor);
        thread::spawn(move || {
            for _ in 0..400 {
                processor.submit_frame(Frame::solid(64, 64, SKIN));
                thread::sleep(Duration::from_micros(100));
            }
        })
    };

    thread::sleep(Duration::from_millis(15));
    processor.stop();
    let calls_at_stop = calls.load(Ordering::SeqCst);
    assert_eq!(processor.buffered_frames(), 0);

    producer.join().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), calls_at_stop);
    assert_eq!(processor.buffered_frames(), 0);
    assert_eq!(processor.state(), ProcessorState::Stopped);
    boundary.release();
}
