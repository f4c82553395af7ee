//! Pixel-level routes in the wire format existing strip clients use.
//!
//! Bodies are JSON. Anything that does not parse is treated as 0, so a
//! malformed request still changes the strip in a predictable way.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::{
    color::{name_to_rgb, ChannelOrder, Rgb},
    error::ColorError,
    strip::{Pattern, Strip},
    sync::lock_recover,
};

use super::{ApiResult, AppState};

/// Default number of `/op` repetitions
const DEFAULT_COUNT: u32 = 1;
/// Default pause between `/op` repetitions
const DEFAULT_OP_DELAY_MS: u64 = 250;
/// Default `/color` blend steps
const DEFAULT_STEPS: u32 = 1;

/// Roll distance when `/op/roll` gets no usable integer body
const DEFAULT_ROLL_AMOUNT: i32 = 1;
/// Default pause between `/color` blend steps (seconds)
const DEFAULT_STEP_DELAY: f64 = 0.05;

const CHANNELS: [char; 3] = ['r', 'g', 'b'];

/// What a `{channels}` path segment selects
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChannelSpec {
    /// Set every channel to 255
    On,
    /// Set every channel to 0
    Off,
    /// Flat byte list covering the whole strip
    Raw,
    /// Any subset of `r`, `g`, `b` in caller order
    Channels(String),
}

impl ChannelSpec {
    fn parse(spec: &str) -> Self {
        let spec = spec.trim().to_lowercase();
        match spec.as_str() {
            "on" => Self::On,
            "off" => Self::Off,
            "raw" => Self::Raw,
            _ => Self::Channels(spec),
        }
    }
}

/// JSON number reduced to a byte; everything else is 0
fn to_byte(value: &Value) -> u8 {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|v| v.is_finite()).map(|v| v as i64))
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<i64>().ok()))
        .map_or(0, |v| v.rem_euclid(256) as u8)
}

fn parse_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or(Value::Null)
}

/// `{"r","g","b"[,"i"]}` or `[r, g, b]`
fn parse_pixel(value: &Value) -> (Option<usize>, Rgb) {
    match value {
        Value::Object(map) => {
            let channel = |key: &str| map.get(key).map_or(0, to_byte);
            let index = map.get("i").and_then(Value::as_u64).map(|i| i as usize);
            (index, [channel("r"), channel("g"), channel("b")])
        }
        Value::Array(items) => {
            let channel = |i: usize| items.get(i).map_or(0, to_byte);
            (None, [channel(0), channel(1), channel(2)])
        }
        _ => (None, [0, 0, 0]),
    }
}

fn pixel_json(index: usize, [r, g, b]: Rgb) -> Value {
    json!({ "i": index, "r": r, "g": g, "b": b })
}

/// Selected channels in r,g,b order; a single channel is returned bare
fn channel_values(pixel: Rgb, channels: &str) -> Value {
    let values: Vec<u8> = CHANNELS
        .iter()
        .zip(pixel)
        .filter(|(name, _)| channels.contains(**name))
        .map(|(_, value)| value)
        .collect();

    match values.as_slice() {
        [single] => json!(single),
        _ => json!(values),
    }
}

/// Set every selected channel to the same value
fn set_channels(pixel: Rgb, channels: &str, value: u8) -> Rgb {
    let mut pixel = pixel;
    for (slot, name) in pixel.iter_mut().zip(CHANNELS) {
        if channels.contains(name) {
            *slot = value;
        }
    }
    pixel
}

/// Set selected channels from a tuple given in the channel spec's order
fn set_channels_ordered(pixel: Rgb, channels: &str, values: &[Value]) -> Rgb {
    let mut pixel = pixel;
    for (slot, name) in pixel.iter_mut().zip(CHANNELS) {
        if let Some(position) = channels.find(name) {
            *slot = values.get(position).map_or(0, to_byte);
        }
    }
    pixel
}

/// Apply a `/pixels` body to the strip's raw values
fn apply_pixels(strip: &mut Strip, spec: Option<&ChannelSpec>, data: Value, bgr: bool) {
    let count = strip.pixel_count();
    let items = match data {
        Value::Array(items) => items,
        scalar => vec![scalar; count],
    };

    if let Some(ChannelSpec::Raw) = spec {
        let order = if bgr { ChannelOrder::Bgr } else { ChannelOrder::Rgb };
        let bytes: Vec<u8> = items.iter().map(to_byte).collect();
        for (i, chunk) in bytes.chunks_exact(3).take(count).enumerate() {
            strip.set(i, order.decode([chunk[0], chunk[1], chunk[2]]));
        }
        return;
    }

    for (i, item) in items.iter().enumerate() {
        match spec {
            Some(ChannelSpec::On) => strip.set(i, [255, 255, 255]),
            Some(ChannelSpec::Off) => strip.set(i, [0, 0, 0]),
            Some(ChannelSpec::Channels(channels)) => {
                let current = strip.get_raw(i);
                let updated = match item {
                    Value::Array(values) => set_channels_ordered(current, channels, values),
                    value => set_channels(current, channels, to_byte(value)),
                };
                strip.set(i, updated);
            }
            Some(ChannelSpec::Raw) | None => {
                let (index, color) = parse_pixel(item);
                strip.set(index.unwrap_or(i), color);
            }
        }
    }
}

/// Show the strip, logging rather than failing the request on sink errors
fn show(strip: &mut Strip) {
    if let Err(e) = strip.show() {
        warn!("Strip show failed: {}", e);
    }
}

fn lerp(start: Rgb, end: Rgb, t: f64) -> Rgb {
    let mut out = [0u8; 3];
    for ((slot, a), b) in out.iter_mut().zip(start).zip(end) {
        let (a, b) = (f64::from(a), f64::from(b));
        *slot = (a + (b - a) * t) as u8;
    }
    out
}

pub async fn get_pixel(State(state): State<AppState>, Path(index): Path<usize>) -> Json<Value> {
    let strip = lock_recover(&state.strip);
    Json(pixel_json(strip.wrap(index), strip.get(index)))
}

pub async fn set_pixel(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    body: String,
) -> &'static str {
    let (_, color) = parse_pixel(&parse_body(&body));
    let mut strip = lock_recover(&state.strip);
    strip.set(index, color);
    show(&mut strip);
    "OK"
}

pub async fn get_pixel_channels(
    State(state): State<AppState>,
    Path((index, channels)): Path<(usize, String)>,
) -> Json<Value> {
    let strip = lock_recover(&state.strip);
    Json(channel_values(strip.get(index), &channels.to_lowercase()))
}

pub async fn set_pixel_channels(
    State(state): State<AppState>,
    Path((index, channels)): Path<(usize, String)>,
    body: String,
) -> &'static str {
    let value = to_byte(&parse_body(&body));
    let mut strip = lock_recover(&state.strip);
    let color = match ChannelSpec::parse(&channels) {
        ChannelSpec::On => [255, 255, 255],
        ChannelSpec::Off => [0, 0, 0],
        ChannelSpec::Raw => strip.get_raw(index),
        ChannelSpec::Channels(channels) => set_channels(strip.get_raw(index), &channels, value),
    };
    strip.set(index, color);
    show(&mut strip);
    "OK"
}

pub async fn get_pixels(State(state): State<AppState>) -> Json<Value> {
    let strip = lock_recover(&state.strip);
    let pixels: Vec<Value> = strip
        .shown()
        .pixels()
        .iter()
        .enumerate()
        .map(|(i, &pixel)| pixel_json(i, pixel))
        .collect();
    Json(Value::Array(pixels))
}

pub async fn get_pixels_channels(
    State(state): State<AppState>,
    Path(channels): Path<String>,
) -> Json<Value> {
    let channels = channels.to_lowercase();
    let strip = lock_recover(&state.strip);
    let values: Vec<Value> = strip
        .shown()
        .pixels()
        .iter()
        .map(|&pixel| channel_values(pixel, &channels))
        .collect();
    Json(Value::Array(values))
}

pub async fn set_pixels(State(state): State<AppState>, body: String) -> &'static str {
    let data = parse_body(&body);
    let mut strip = lock_recover(&state.strip);
    apply_pixels(&mut strip, None, data, false);
    show(&mut strip);
    "OK"
}

pub async fn set_pixels_channels(
    State(state): State<AppState>,
    Path(channels): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    body: String,
) -> &'static str {
    let spec = ChannelSpec::parse(&channels);
    let bgr = params
        .get("bgr")
        .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1");
    let data = parse_body(&body);

    let mut strip = lock_recover(&state.strip);
    apply_pixels(&mut strip, Some(&spec), data, bgr);
    show(&mut strip);
    "OK"
}

pub async fn color_all(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<String> {
    blend(&state, None, name, &params).await
}

pub async fn color_one(
    State(state): State<AppState>,
    Path((index, name)): Path<(usize, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<String> {
    blend(&state, Some(index), name, &params).await
}

/// Fade from the current raw colors to a named color
async fn blend(
    state: &AppState,
    index: Option<usize>,
    name: String,
    params: &HashMap<String, String>,
) -> ApiResult<String> {
    let target = name_to_rgb(&name).ok_or_else(|| ColorError::UnknownName { name: name.clone() })?;
    let steps = params
        .get("steps")
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|&s| s > 0)
        .unwrap_or(DEFAULT_STEPS);
    let delay = params
        .get("delay")
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(DEFAULT_STEP_DELAY);

    let (indexes, start): (Vec<usize>, Vec<Rgb>) = {
        let strip = lock_recover(&state.strip);
        let indexes: Vec<usize> = match index {
            Some(i) => vec![strip.wrap(i)],
            None => (0..strip.pixel_count()).collect(),
        };
        let start = indexes.iter().map(|&i| strip.get_raw(i)).collect();
        (indexes, start)
    };
    debug!("Blending {} pixels to {} in {} steps", indexes.len(), name, steps);

    for step in 0..steps {
        let t = f64::from(step) / f64::from(steps);
        {
            let mut strip = lock_recover(&state.strip);
            for (&i, &from) in indexes.iter().zip(&start) {
                strip.set(i, lerp(from, target, t));
            }
            show(&mut strip);
        }
        tokio::time::sleep(Duration::from_secs_f64(delay)).await;
    }

    let mut strip = lock_recover(&state.strip);
    for &i in &indexes {
        strip.set(i, target);
    }
    show(&mut strip);
    Ok(name)
}

pub async fn pattern_from_body(State(state): State<AppState>, body: String) -> String {
    let name = match parse_body(&body) {
        Value::String(name) => name,
        _ => body.trim().to_string(),
    };
    run_pattern(&state, name)
}

pub async fn pattern_named(State(state): State<AppState>, Path(name): Path<String>) -> String {
    run_pattern(&state, name)
}

fn run_pattern(state: &AppState, name: String) -> String {
    let mut strip = lock_recover(&state.strip);
    match Pattern::parse_from_str(&name) {
        Some(pattern) => pattern.apply(&mut strip, &mut rand::thread_rng()),
        None => debug!("Unknown pattern {:?}", name),
    }
    show(&mut strip);
    name
}

pub async fn op_from_body(State(state): State<AppState>, body: String) -> String {
    let name = match parse_body(&body) {
        Value::String(name) => name,
        _ => body.trim().to_string(),
    };
    run_op(&state, name, DEFAULT_COUNT, DEFAULT_OP_DELAY_MS, "").await
}

pub async fn op_named(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: String,
) -> String {
    run_op(&state, name, DEFAULT_COUNT, DEFAULT_OP_DELAY_MS, &body).await
}

pub async fn op_counted(
    State(state): State<AppState>,
    Path((name, count)): Path<(String, String)>,
    body: String,
) -> String {
    let count = count.trim().parse().unwrap_or(DEFAULT_COUNT);
    run_op(&state, name, count, DEFAULT_OP_DELAY_MS, &body).await
}

pub async fn op_timed(
    State(state): State<AppState>,
    Path((name, count, delay)): Path<(String, String, String)>,
    body: String,
) -> String {
    let count = count.trim().parse().unwrap_or(DEFAULT_COUNT);
    let delay = delay.trim().parse().unwrap_or(DEFAULT_OP_DELAY_MS);
    run_op(&state, name, count, delay, &body).await
}

async fn run_op(state: &AppState, name: String, count: u32, delay_ms: u64, body: &str) -> String {
    if !name.trim().eq_ignore_ascii_case("roll") {
        debug!("Unknown strip op {:?}", name);
        return name;
    }

    let amount = parse_body(body)
        .as_i64()
        .map_or(DEFAULT_ROLL_AMOUNT, |v| v as i32);

    for _ in 0..count {
        {
            let mut strip = lock_recover(&state.strip);
            strip.rotate(amount);
            show(&mut strip);
        }
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
    name
}

pub async fn list_colorspaces(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.spaces.available_spaces())
}

pub async fn select_colorspace(State(state): State<AppState>, body: String) -> String {
    let name = match parse_body(&body) {
        Value::String(name) => name,
        _ => body.trim().to_string(),
    };
    let space = state.spaces.get_or_default(&name);
    let selected = space.name().to_string();

    let mut strip = lock_recover(&state.strip);
    strip.set_space(space);
    show(&mut strip);
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::NullSink;
    use tokio::sync::broadcast;

    fn strip(len: usize) -> Strip {
        let (tx, _) = broadcast::channel(1);
        Strip::new(len, Box::new(NullSink::new()), tx)
    }

    #[test]
    fn test_to_byte_wraps_and_defaults() {
        assert_eq!(to_byte(&json!(300)), 44);
        assert_eq!(to_byte(&json!(-1)), 255);
        assert_eq!(to_byte(&json!(12.9)), 12);
        assert_eq!(to_byte(&json!("7")), 7);
        assert_eq!(to_byte(&json!({"r": 1})), 0);
        assert_eq!(to_byte(&parse_body("not json")), 0);
    }

    #[test]
    fn test_parse_pixel_shapes() {
        assert_eq!(parse_pixel(&json!({"r": 1, "g": 2, "b": 3})), (None, [1, 2, 3]));
        assert_eq!(parse_pixel(&json!({"i": 4, "g": 9})), (Some(4), [0, 9, 0]));
        assert_eq!(parse_pixel(&json!([5, 6])), (None, [5, 6, 0]));
        assert_eq!(parse_pixel(&Value::Null), (None, [0, 0, 0]));
    }

    #[test]
    fn test_channel_values() {
        assert_eq!(channel_values([1, 2, 3], "g"), json!(2));
        assert_eq!(channel_values([1, 2, 3], "br"), json!([1, 3]));
    }

    #[test]
    fn test_channel_spec_parse() {
        assert_eq!(ChannelSpec::parse(" ON "), ChannelSpec::On);
        assert_eq!(ChannelSpec::parse("raw"), ChannelSpec::Raw);
        assert_eq!(ChannelSpec::parse("GB"), ChannelSpec::Channels("gb".to_string()));
    }

    #[test]
    fn test_set_channels_ordered_uses_spec_order() {
        let pixel = set_channels_ordered([0, 0, 0], "bg", &[json!(10), json!(20)]);
        assert_eq!(pixel, [0, 20, 10]);
    }

    #[test]
    fn test_apply_pixels_scalar_and_lists() {
        let mut strip = strip(3);
        apply_pixels(&mut strip, Some(&ChannelSpec::parse("r")), json!(200), false);
        assert!(strip.raw().pixels().iter().all(|p| *p == [200, 0, 0]));

        apply_pixels(&mut strip, None, json!([{"i": 2, "b": 7}, [1, 1, 1]]), false);
        assert_eq!(strip.raw().pixels(), &[[200, 0, 0], [1, 1, 1], [0, 0, 7]]);

        apply_pixels(&mut strip, Some(&ChannelSpec::Off), json!([0]), false);
        assert_eq!(strip.get_raw(0), [0, 0, 0]);
    }

    #[test]
    fn test_accepts_remote_sink_body() {
        let frame = crate::strip::Frame::new(vec![[9, 8, 7], [0, 255, 0], [1, 2, 3]]);
        let body = crate::output::http::encode_frame(&frame);

        let mut strip = strip(3);
        apply_pixels(&mut strip, Some(&ChannelSpec::parse("rgb")), parse_body(&body), false);
        assert_eq!(strip.raw(), &frame);
    }

    #[test]
    fn test_apply_raw_bytes() {
        let mut strip = strip(2);
        apply_pixels(&mut strip, Some(&ChannelSpec::Raw), json!([1, 2, 3, 4, 5, 6]), false);
        assert_eq!(strip.raw().pixels(), &[[1, 2, 3], [4, 5, 6]]);

        apply_pixels(&mut strip, Some(&ChannelSpec::Raw), json!([1, 2, 3, 4]), true);
        assert_eq!(strip.raw().pixels(), &[[3, 2, 1], [4, 5, 6]]);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp([0, 100, 255], [255, 0, 255], 0.0), [0, 100, 255]);
        assert_eq!(lerp([0, 100, 255], [255, 0, 255], 0.5), [127, 50, 255]);
    }

    #[tokio::test]
    async fn test_roll_body_defaults_to_one() {
        let state = crate::server::test_state(4);
        {
            let mut strip = lock_recover(&state.strip);
            strip.set(0, [255, 0, 0]);
        }

        run_op(&state, "roll".to_string(), 1, 0, "abc").await;
        assert_eq!(lock_recover(&state.strip).get_raw(1), [255, 0, 0]);

        run_op(&state, "Roll".to_string(), 1, 0, "2").await;
        assert_eq!(lock_recover(&state.strip).get_raw(3), [255, 0, 0]);

        run_op(&state, "roll".to_string(), 2, 0, "").await;
        assert_eq!(lock_recover(&state.strip).get_raw(1), [255, 0, 0]);
    }
}
