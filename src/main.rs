//! Astrobelt entry point
//!
//! There is no native graphics backend wired up yet; the binary runs the
//! full three-thread simulation against a headless window for a fixed demo
//! period, which exercises everything except actual rasterization. A real
//! backend only needs to implement `window::RenderTarget` and be handed to
//! `runtime::run`.

use std::time::Duration;

use astrobelt::Settings;
use astrobelt::runtime;
use astrobelt::window::HeadlessWindow;

/// How long the headless demo runs before closing itself.
const DEMO_DURATION: Duration = Duration::from_secs(10);

fn main() {
    env_logger::init();
    let settings = Settings::load();
    log::info!(
        "astrobelt starting: {}x{} window, {} Hz tick, {:?} tick loop",
        settings.window_width,
        settings.window_height,
        settings.tick_hz,
        settings.tick_style
    );

    let window = HeadlessWindow::new(settings.window_width, settings.window_height)
        .close_after(DEMO_DURATION);
    let report = runtime::run(Box::new(window), &settings);

    log::info!(
        "demo finished: score {}, game over: {}, {} ticks",
        report.score,
        report.game_over,
        report.ticks
    );
}
