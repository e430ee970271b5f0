//! SilkCam - real-time skin beautification demo
//!
//! Runs a synthetic capture source into the frame processor, beautifies
//! frames through the engine boundary and prints run statistics as JSON.

mod args;
mod capture;

use anyhow::Result;
use clap::Parser;
use crossbeam_channel::RecvTimeoutError;
use serde::Serialize;
use silk_core::{BeautyParams, Frame, PixelFormat};
use silk_engine::{BeautyBoundary, EngineState};
use silk_pipeline::{CancelFlag, FrameProcessor, ProcessorConfig, ProcessorStats};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::args::Options;
use crate::capture::SyntheticCapture;

#[derive(Debug, Default, Serialize)]
struct ConsumerStats {
    received: u64,
    beautified: u64,
    passed_through: u64,
}

#[derive(Serialize)]
struct RunReport {
    options: Options,
    params: BeautyParams,
    captured: u64,
    processor: ProcessorStats,
    consumer: ConsumerStats,
    engine_state: EngineState,
    last_skin_coverage: Option<f32>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let opts = Options::parse();

    info!("SilkCam starting...");
    let report = run(opts)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run(opts: Options) -> Result<RunReport> {
    let params = BeautyParams::from_intensity(opts.intensity);
    info!(
        smooth = params.smooth_level,
        whiten = params.whiten_level,
        width = opts.size.0,
        height = opts.size.1,
        "beauty parameters"
    );

    let boundary = Arc::new(BeautyBoundary::new());
    let processor = FrameProcessor::new(ProcessorConfig::with_fps(opts.fps))?;

    let done = CancelFlag::new();
    let consumer = {
        let rx = processor.output();
        let done = done.clone();
        thread::Builder::new()
            .name("silk-consumer".into())
            .spawn(move || {
                let mut stats = ConsumerStats::default();
                while !done.is_cancelled() {
                    match rx.recv_timeout(Duration::from_millis(50)) {
                        Ok(out) => {
                            stats.received += 1;
                            if out.beautified {
                                stats.beautified += 1;
                            } else {
                                stats.passed_through += 1;
                            }
                            debug!(
                                frame = out.frame.id.0,
                                ms = out.processing_time.as_secs_f64() * 1000.0,
                                "frame displayed"
                            );
                        }
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                stats
            })?
    };

    let engine = Arc::clone(&boundary);
    processor.start(move |frame: &Frame| {
        let mut out = frame.clone();
        engine.process(&mut out, &params).map(|()| out)
    })?;

    let format = if opts.bgra {
        PixelFormat::Bgra8
    } else {
        PixelFormat::Rgba8
    };
    let mut capture = SyntheticCapture::new(opts.size.0, opts.size.1).with_format(format);
    let frame_interval = Duration::from_secs(1) / opts.capture_fps;
    let started = Instant::now();
    while started.elapsed() < opts.duration {
        let tick = Instant::now();
        processor.submit_frame(capture.next_frame());
        thread::sleep(frame_interval.saturating_sub(tick.elapsed()));
    }

    processor.stop();
    let last_skin_coverage = boundary.skin_coverage();
    boundary.release();
    done.cancel();
    let consumer = consumer
        .join()
        .map_err(|_| anyhow::anyhow!("consumer thread panicked"))?;

    info!(
        captured = capture.frames_captured(),
        displayed = consumer.received,
        "SilkCam finished"
    );

    Ok(RunReport {
        options: opts,
        params,
        captured: capture.frames_captured(),
        processor: processor.statistics(),
        consumer,
        engine_state: boundary.state(),
        last_skin_coverage,
    })
}
