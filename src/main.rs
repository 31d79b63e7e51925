mod renderer;

use quadlife::constants::*;
use quadlife::{FrameDriver, SimulationConfig, SpawnMode, WallMode};
use renderer::Renderer;
use std::{sync::Arc, time::Instant};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

// QUADLIFE_SEED=<u64> makes every reset reproducible.
fn config_from_env() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    if let Ok(raw) = std::env::var("QUADLIFE_SEED") {
        match raw.trim().parse::<u64>() {
            Ok(seed) => config.rng_seed = Some(seed),
            Err(e) => log::warn!("Ignoring QUADLIFE_SEED={:?}: {}", raw, e),
        }
    }
    config
}

/// Keyboard controls. Returns `false` when the app should quit.
fn handle_key(driver: &mut FrameDriver, key: KeyCode) -> bool {
    let result = match key {
        KeyCode::Escape => return false,
        KeyCode::Space => {
            driver.toggle_pause();
            return true;
        }
        KeyCode::KeyR => {
            let next_seed = driver.config().rng_seed.map(|s| s.wrapping_add(1));
            driver.reseed(next_seed);
            return true;
        }
        KeyCode::KeyW => driver.update_config(|c| {
            c.wall_mode = match c.wall_mode {
                WallMode::Wrap => WallMode::Bounce,
                WallMode::Bounce => WallMode::Wrap,
            }
        }),
        KeyCode::KeyG => driver.update_config(|c| c.gravity_enabled = !c.gravity_enabled),
        KeyCode::KeyO => driver.update_config(|c| c.orbit_enabled = !c.orbit_enabled),
        KeyCode::KeyT => {
            driver.update_config(|c| c.grid_overlay_enabled = !c.grid_overlay_enabled)
        }
        KeyCode::KeyP => driver.update_config(|c| c.parallel = !c.parallel),
        KeyCode::KeyM => {
            driver.update_config(|c| c.self_override_enabled = !c.self_override_enabled)
        }
        KeyCode::KeyD => driver.update_config(|c| {
            c.spawn_mode = match c.spawn_mode {
                SpawnMode::Uniform => SpawnMode::Disk,
                SpawnMode::Disk => SpawnMode::Uniform,
            }
        }),
        KeyCode::ArrowUp => driver.update_config(|c| {
            c.particles_per_species += PARTICLES_PER_SPECIES_STEP;
        }),
        KeyCode::ArrowDown => driver.update_config(|c| {
            c.particles_per_species = c
                .particles_per_species
                .saturating_sub(PARTICLES_PER_SPECIES_STEP);
        }),
        KeyCode::ArrowRight => driver.update_config(|c| {
            c.species_count = (c.species_count + 1).min(MAX_SPECIES_COUNT);
        }),
        KeyCode::ArrowLeft => driver.update_config(|c| {
            c.species_count = c.species_count.saturating_sub(1).max(1);
        }),
        _ => return true,
    };
    if let Ok(change) = result {
        log::debug!("{:?} -> {:?}", key, change);
    }
    true
}

fn window_title(driver: &FrameDriver, fps: f64) -> String {
    let counts = driver.simulation().species_counts();
    let config = driver.config();
    let per_species = counts
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("/");
    format!(
        "Quadlife - {} [{}] - {:?}{}{} - FPS: {:.1}{}",
        per_species,
        counts.len(),
        config.wall_mode,
        if config.gravity_enabled { " +gravity" } else { "" },
        if config.orbit_enabled { " +orbit" } else { "" },
        fps,
        if driver.is_paused() { " [PAUSED]" } else { "" }
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Quadlife")
            .with_inner_size(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .build(&event_loop)?,
    );

    // The window's pixel extents are the simulation domain; without them
    // there is nothing to simulate in.
    let size = window.inner_size();
    let mut driver = FrameDriver::new(size.width as f32, size.height as f32, config_from_env())?;
    let mut renderer = pollster::block_on(Renderer::new(window.clone()))?;

    let epoch = Instant::now();
    let mut last_fps_update_time = Instant::now();
    let mut frames_since_last_fps_update = 0;

    event_loop.run(move |event, elwt: &EventLoopWindowTarget<()>| {
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::AboutToWait => {
                driver.tick(epoch.elapsed().as_secs_f64());
                window.request_redraw();
            }
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(physical_size) => {
                    renderer.resize(physical_size);
                    if let Err(e) =
                        driver.resize(physical_size.width as f32, physical_size.height as f32)
                    {
                        log::debug!("Keeping previous simulation area: {}", e);
                    }
                }
                WindowEvent::KeyboardInput {
                    event: key_event, ..
                } => {
                    if key_event.state == ElementState::Pressed && !key_event.repeat {
                        if let PhysicalKey::Code(code) = key_event.physical_key {
                            if !handle_key(&mut driver, code) {
                                elwt.exit();
                            }
                        }
                    }
                }
                WindowEvent::RedrawRequested => {
                    frames_since_last_fps_update += 1;
                    let now = Instant::now();
                    let elapsed_secs = now.duration_since(last_fps_update_time).as_secs_f64();
                    if elapsed_secs >= FPS_UPDATE_INTERVAL_SECS {
                        let current_fps = frames_since_last_fps_update as f64 / elapsed_secs;
                        last_fps_update_time = now;
                        frames_since_last_fps_update = 0;
                        window.set_title(&window_title(&driver, current_fps));
                    }
                    let overlay = driver.overlay();
                    match renderer.render(&driver.snapshot(), overlay.as_deref()) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            renderer.reconfigure()
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("WGPU Error: OutOfMemory");
                            elwt.exit();
                        }
                        Err(e) => log::warn!("WGPU Error: {:?}", e),
                    }
                }
                _ => {}
            },
            _ => {}
        }
    })?;
    Ok(())
}
