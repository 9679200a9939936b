//! Three-thread lifecycle coordinator
//!
//! The caller thread becomes the render/event loop; a tick thread advances
//! the simulation at the fixed rate; a spawner thread feeds in asteroids.
//! All three rendezvous on a barrier before any of them touches the world,
//! so the tick thread can never process input against a half-built world.
//!
//! Shutdown is cooperative: closing the window raises the stop flag and
//! pushes an end-of-input sentinel that unblocks the tick thread, then both
//! worker threads are joined before `run` returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use crate::input::{PlayerKey, map_player_key};
use crate::settings::{Settings, TickStyle};
use crate::sim::{Player, World};
use crate::sync::{SharedRng, StagingQueue};
use crate::window::{Color, Event, RenderTarget, SharedWindow};

/// What a finished run looked like.
#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    pub score: u64,
    pub game_over: bool,
    pub ticks: u64,
}

/// Drive the game to completion on the calling thread.
///
/// Returns once the window closes and every worker thread has been joined.
pub fn run(target: Box<dyn RenderTarget>, settings: &Settings) -> RunReport {
    let window = Arc::new(SharedWindow::new(target));
    let seed = settings
        .rng_seed
        .unwrap_or_else(|| rand::random::<u64>());
    log::info!("simulation seed: {seed}");

    let world = Arc::new(World::new(
        window.clone(),
        SharedRng::new(seed),
        settings.tick_dt(),
    ));
    let player = Arc::new(Player::new(window.bounds() / 2.0, settings.shot_cooldown()));
    let control: StagingQueue<PlayerKey> = StagingQueue::new();
    let stop = Arc::new(AtomicBool::new(false));
    // Tick thread, spawner thread, and this (render) thread
    let barrier = Arc::new(Barrier::new(3));

    let tick_thread = {
        let world = world.clone();
        let player = player.clone();
        let control = control.clone();
        let stop = stop.clone();
        let barrier = barrier.clone();
        let settings = settings.clone();
        thread::Builder::new()
            .name("tick".into())
            .spawn(move || tick_loop(&world, &player, &control, &stop, &barrier, &settings))
            .expect("failed to spawn tick thread")
    };

    let spawner_thread = {
        let world = world.clone();
        let stop = stop.clone();
        let barrier = barrier.clone();
        let settings = settings.clone();
        thread::Builder::new()
            .name("spawner".into())
            .spawn(move || spawn_loop(&world, &stop, &barrier, &settings))
            .expect("failed to spawn asteroid spawner thread")
    };

    render_loop(&window, &world, &player, &control, &barrier, settings);

    stop.store(true, Ordering::Release);
    control.push(PlayerKey::EndOfInput);
    let ticks = tick_thread.join().expect("tick thread panicked");
    spawner_thread.join().expect("spawner thread panicked");
    log::info!("all threads joined after {ticks} ticks");

    RunReport {
        score: world.score(),
        game_over: world.is_game_over(),
        ticks,
    }
}

/// Apply one control transition to the player's intent bits.
///
/// Returns `false` on the end-of-input sentinel.
fn apply_key(player: &Player, key: PlayerKey) -> bool {
    match key {
        PlayerKey::None => {}
        PlayerKey::ForwardPressed => player.forward_down(),
        PlayerKey::ForwardReleased => player.forward_up(),
        PlayerKey::BackwardPressed => player.backward_down(),
        PlayerKey::BackwardReleased => player.backward_up(),
        PlayerKey::LeftPressed => player.left_down(),
        PlayerKey::LeftReleased => player.left_up(),
        PlayerKey::RightPressed => player.right_down(),
        PlayerKey::RightReleased => player.right_up(),
        PlayerKey::ShootPressed => player.shoot_down(),
        PlayerKey::ShootReleased => player.shoot_up(),
        PlayerKey::EndOfInput => return false,
    }
    true
}

/// Fixed-rate simulation loop. Returns the number of ticks executed.
fn tick_loop(
    world: &World,
    player: &Player,
    control: &StagingQueue<PlayerKey>,
    stop: &AtomicBool,
    barrier: &Barrier,
    settings: &Settings,
) -> u64 {
    barrier.wait();
    log::debug!(
        "tick thread running at {} Hz ({:?})",
        settings.tick_hz,
        settings.tick_style
    );

    let dt = settings.tick_duration();
    let mut ticks = 0u64;
    let mut next = Instant::now() + dt;

    loop {
        while let Some(key) = control.try_pop() {
            if !apply_key(player, key) {
                return ticks;
            }
        }
        if stop.load(Ordering::Acquire) {
            return ticks;
        }

        player.tick(world);
        world.tick();
        world.sweep_expired();
        ticks += 1;

        match settings.tick_style {
            // Burns the core but hits deadlines with minimal jitter
            TickStyle::Spin => {
                while Instant::now() < next {
                    std::hint::spin_loop();
                }
            }
            // Blocks on the control queue until the deadline; input arriving
            // mid-wait is applied immediately
            TickStyle::Sleep => {
                while let Some(remaining) = next.checked_duration_since(Instant::now()) {
                    match control.wait_pop_timeout(remaining) {
                        Some(key) => {
                            if !apply_key(player, key) {
                                return ticks;
                            }
                        }
                        None => break,
                    }
                }
            }
        }

        next += dt;
        if next < Instant::now() {
            // Fell badly behind (debugger, suspend); resync instead of
            // bursting to catch up
            next = Instant::now() + dt;
        }
    }
}

/// How often the spawner re-checks the stop conditions mid-sleep.
const SPAWN_POLL: Duration = Duration::from_millis(25);

/// Background asteroid feed: sleep a randomized interval, stage one rock.
/// Terminates on stop or game over.
fn spawn_loop(world: &World, stop: &AtomicBool, barrier: &Barrier, settings: &Settings) {
    barrier.wait();
    log::debug!(
        "spawner thread running ({}-{} ms interval)",
        settings.spawn_interval_min_ms,
        settings.spawn_interval_max_ms
    );

    loop {
        let delay = world.rng().range_u64(
            settings.spawn_interval_min_ms,
            settings.spawn_interval_max_ms.max(settings.spawn_interval_min_ms),
        );
        let deadline = Instant::now() + Duration::from_millis(delay);
        while Instant::now() < deadline {
            if stop.load(Ordering::Acquire) || world.is_game_over() {
                return;
            }
            thread::sleep(SPAWN_POLL);
        }
        if stop.load(Ordering::Acquire) || world.is_game_over() {
            return;
        }
        world.spawn_asteroid();
    }
}

/// Render/event loop on the caller thread. Returns when the window closes.
fn render_loop(
    window: &SharedWindow,
    world: &World,
    player: &Player,
    control: &StagingQueue<PlayerKey>,
    barrier: &Barrier,
    settings: &Settings,
) {
    barrier.wait();
    let frame = settings.frame_duration();

    while window.is_open() {
        while let Some(event) = window.poll_event() {
            match event {
                Event::Closed => {
                    log::info!("window closed, shutting down");
                    control.push(PlayerKey::EndOfInput);
                    window.close();
                }
                Event::KeyPressed(code) => {
                    let key = map_player_key(code, true);
                    if key != PlayerKey::None {
                        control.push(key);
                    }
                }
                Event::KeyReleased(code) => {
                    let key = map_player_key(code, false);
                    if key != PlayerKey::None {
                        control.push(key);
                    }
                }
            }
        }
        if !window.is_open() {
            break;
        }

        window.clear(Color::BLACK);
        player.draw(world);
        world.draw_all();
        window.display();
        log::trace!("{} live entities", world.num_entities());

        thread::sleep(frame);
    }
}
