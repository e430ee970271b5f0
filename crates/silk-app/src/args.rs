//! Command-line options for `silkcam`.

use clap::Parser;
use serde::Serialize;
use std::time::Duration;

/// Parse and validate beauty intensity (0.0-1.0)
fn parse_intensity(s: &str) -> Result<f32, String> {
    let intensity: f32 = s.parse().map_err(|_| format!("'{s}' is not a valid number"))?;
    if !(0.0..=1.0).contains(&intensity) {
        return Err(format!("Intensity must be between 0.0 and 1.0, got {intensity}"));
    }
    Ok(intensity)
}

/// Parse and validate a frame rate (1-240 fps)
fn parse_fps(s: &str) -> Result<u32, String> {
    let fps: u32 = s.parse().map_err(|_| format!("'{s}' is not a valid frame rate"))?;
    if !(1..=240).contains(&fps) {
        return Err(format!("Frame rate must be between 1 and 240 fps, got {fps}"));
    }
    Ok(fps)
}

/// Parse a non-negative duration in (fractional) seconds
fn parse_duration(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|_| format!("'{s}' is not a valid number of seconds"))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("Duration must be a non-negative number of seconds, got {s}"));
    }
    Ok(Duration::from_secs_f64(secs))
}

/// Parse a frame size in WIDTHxHEIGHT format
fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(|c: char| c == 'x' || c == 'X')
        .ok_or_else(|| format!("Invalid size '{s}'. Use WIDTHxHEIGHT (e.g., 640x480)"))?;
    let width: u32 = w.parse().map_err(|_| format!("Invalid width '{w}' in size"))?;
    let height: u32 = h.parse().map_err(|_| format!("Invalid height '{h}' in size"))?;
    if width == 0 || height == 0 {
        return Err("Size width and height must be greater than 0".to_string());
    }
    Ok((width, height))
}

/// silkcam: real-time skin beautification demo
#[derive(Debug, Clone, PartialEq, Parser, Serialize)]
#[command(name = "silkcam")]
#[command(version, about = "Run synthetic capture through the SilkCam beauty pipeline")]
pub struct Options {
    /// Beauty intensity (0.0-1.0), mapped onto smoothing and whitening
    #[arg(short, long, default_value = "0.5", value_parser = parse_intensity)]
    pub intensity: f32,

    /// Processing rate in frames per second
    #[arg(short, long, default_value = "30", value_parser = parse_fps)]
    pub fps: u32,

    /// Capture rate; higher than --fps exercises frame dropping
    #[arg(short, long, default_value = "60", value_parser = parse_fps)]
    pub capture_fps: u32,

    /// Run time in seconds
    #[arg(short, long, default_value = "3", value_parser = parse_duration)]
    pub duration: Duration,

    /// Frame size as WIDTHxHEIGHT
    #[arg(short, long, default_value = "640x480", value_parser = parse_size)]
    pub size: (u32, u32),

    /// Capture BGRA instead of RGBA frames
    #[arg(long)]
    pub bgra: bool,
}
