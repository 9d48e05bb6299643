//! Host-side preview: `cargo run -- --effect snow --frames 300` drives the
//! backdrop against the in-memory host and reports what each frame drew.
//!
//! Flags: `--effect <name>`, `--frames <n>`, `--width <px>`, `--height <px>`,
//! `--config <file>` (JSON, same shape as the page's `data-backdrop-config`).

use std::process::ExitCode;

use backdrop_wasm::headless::{DrawOp, HeadlessBackdrop, MemoryPage, FRAME_MS};
use backdrop_wasm::{BackdropConfig, BackdropError, EffectName, Viewport};
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config = match parse_str(&args, "--config").map(load_config) {
        Some(Ok(config)) => config,
        Some(Err(err)) => {
            eprintln!("bad --config: {err}");
            return ExitCode::FAILURE;
        }
        None => BackdropConfig {
            seed: Some(7),
            ..BackdropConfig::default()
        },
    };

    tracing_subscriber::fmt()
        .with_max_level(config.level())
        .with_target(false)
        .init();

    match run(&args, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "preview failed");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: &str) -> Result<BackdropConfig, String> {
    let json = std::fs::read_to_string(path).map_err(|err| format!("{path}: {err}"))?;
    BackdropConfig::from_json(&json).map_err(|err| format!("{path}: {err}"))
}

fn run(args: &[String], config: BackdropConfig) -> Result<(), BackdropError> {
    let effect = match parse_str(args, "--effect") {
        Some(name) => name.parse()?,
        None => config.default_effect,
    };
    let frames = parse_arg::<u32>(args, "--frames").unwrap_or(120);
    let viewport = Viewport::new(
        parse_arg(args, "--width").unwrap_or(1280.0),
        parse_arg(args, "--height").unwrap_or(720.0),
    );

    info!(
        %effect,
        frames,
        width = viewport.width,
        height = viewport.height,
        "headless preview"
    );

    let mut backdrop = HeadlessBackdrop::headless(config, viewport, MemoryPage::default());
    backdrop.start(false);
    backdrop.set_effect(effect, false);
    backdrop.surface_mut().take_ops();

    report(&mut backdrop, effect, frames);

    // Exercise the remaining user paths: theme flip and an animated switch.
    let theme = backdrop.toggle_theme();
    let next = next_effect(effect);
    backdrop.select(next);
    let fade_ms = f64::from(backdrop.config().fade_out_ms + backdrop.config().fade_in_ms);
    let pumped = backdrop.advance(fade_ms + FRAME_MS);
    info!(%theme, from = %effect, to = %next, pumped, phase = ?backdrop.phase(), "crossfade done");
    backdrop.surface_mut().take_ops();

    report(&mut backdrop, next, frames);

    backdrop.teardown();
    info!(
        outstanding_frames = backdrop.scheduler().outstanding_frames(),
        pending_timers = backdrop.scheduler().pending_timers(),
        "torn down"
    );
    Ok(())
}

/// Run `frames` frames of the active effect and log its particle count, any
/// escaped particles and the draw calls of the last frame.
fn report(backdrop: &mut HeadlessBackdrop, name: EffectName, frames: u32) {
    let mut last = Vec::new();
    for _ in 0..frames {
        backdrop.scheduler_mut().advance_clock(FRAME_MS);
        if !backdrop.pump_frame() {
            warn!(effect = %name, "no frame outstanding");
            break;
        }
        last = backdrop.surface_mut().take_ops();
    }

    let effect = backdrop.effect(name);
    let viewport = effect.viewport();
    let margin = effect.margin();
    let escaped = effect
        .positions()
        .into_iter()
        .filter(|p| !viewport.contains_with_margin(*p, margin))
        .count();

    let mut circles = 0;
    let mut glows = 0;
    let mut lines = 0;
    let mut glyphs = 0;
    for op in &last {
        match op {
            DrawOp::Circle { .. } => circles += 1,
            DrawOp::Glow { .. } => glows += 1,
            DrawOp::Line { .. } => lines += 1,
            DrawOp::Glyph { .. } => glyphs += 1,
            DrawOp::Clear | DrawOp::Veil(_) => {}
        }
    }

    info!(
        effect = %name,
        particles = effect.len(),
        escaped,
        circles,
        glows,
        lines,
        glyphs,
        rendered = backdrop.frames_rendered(),
        "frame report"
    );
    if escaped > 0 {
        warn!(effect = %name, escaped, "particles outside their bounds");
    }
}

fn next_effect(name: EffectName) -> EffectName {
    EffectName::ALL[(name.index() + 1) % EffectName::ALL.len()]
}

fn parse_str<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|v| v == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    parse_str(args, flag).and_then(|v| v.parse().ok())
}
