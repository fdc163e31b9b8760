#[macro_use]
extern crate slog;

extern crate nalgebra as na;

use clap::clap_app;
use meshviewer_rs::*;
use slog::Drain;
use std::path::Path;
use std::time::Instant;
use winit::{
    dpi::{LogicalSize, Size},
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

fn new_drain(level: slog::Level) -> slog::Fuse<slog::LevelFilter<slog::Fuse<slog_async::Async>>> {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    drain.filter_level(level).fuse()
}

fn exit_with(log: &slog::Logger, err: common::ViewerError) -> ! {
    crit!(log, "{}", err);
    eprintln!("{}", err);
    std::process::exit(err.exit_code());
}

fn main() {
    let matches = match clap_app!(meshviewer_rs =>
        (version: "1.0")
        (author: "Eric F. <eric1221bday@gmail.com>")
        (about: "Interactive mesh viewer")
        (@arg SCENE: +required "Sets the mesh file to view")
        (@arg verbose: -v --verbose "Print trace information verbosely")
    )
    .get_matches_safe()
    {
        Ok(matches) => matches,
        Err(err) => match err.kind {
            clap::ErrorKind::HelpDisplayed | clap::ErrorKind::VersionDisplayed => err.exit(),
            _ => {
                let program = std::env::args().next().unwrap_or_else(|| "meshviewer-rs".into());
                println!("Usage: {} file.gltf", program);
                std::process::exit(0);
            }
        },
    };

    let mut trace_mode = matches.is_present("verbose");
    let drain = slog_atomic::AtomicSwitch::new(new_drain(if trace_mode {
        slog::Level::Trace
    } else {
        slog::Level::Info
    }));
    let ctrl = drain.ctrl();
    let log = slog::Logger::root(drain.fuse(), o!());

    let config = common::ViewerConfig::default();
    let scene_path = match matches.value_of("SCENE") {
        Some(path) => Path::new(path),
        None => std::process::exit(0),
    };

    let manager = common::importer::ImporterManager::with_builtin(&log);
    let prepared = match viewer::load_mesh(&log, &manager, scene_path, &config) {
        Ok(prepared) => prepared,
        Err(err) => exit_with(&log, err),
    };

    let event_loop = EventLoop::new();
    let window = match WindowBuilder::new()
        .with_title(format!("Mesh Viewer: {}", scene_path.display()))
        .with_inner_size(Size::Logical(LogicalSize::new(
            config.resolution.x as f64,
            config.resolution.y as f64,
        )))
        .build(&event_loop)
    {
        Ok(window) => window,
        Err(err) => exit_with(&log, common::ViewerError::Graphics(err.into())),
    };
    let mut renderer =
        match futures::executor::block_on(viewer::Viewer::new(&log, &window, &prepared)) {
            Ok(renderer) => renderer,
            Err(err) => exit_with(&log, common::ViewerError::Graphics(err)),
        };
    drop(prepared);

    let mut session = viewer::session::ViewerSession::new(&log, config);
    let size = window.inner_size();
    session.handle_event(
        &viewer::input::InputEvent::Resize(na::Vector2::new(size.width, size.height)),
        Instant::now(),
    );
    let mut input = viewer::input::WinitInput::default();

    event_loop.run(move |event, _, control_flow| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == window.id() => {
                match event {
                    WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,
                    WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                state: ElementState::Pressed,
                                virtual_keycode: Some(VirtualKeyCode::Escape),
                                ..
                            },
                        ..
                    } => *control_flow = ControlFlow::Exit,
                    WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                state: ElementState::Pressed,
                                virtual_keycode: Some(VirtualKeyCode::T),
                                ..
                            },
                        ..
                    } => {
                        if trace_mode {
                            info!(log, "setting log level to info");
                            ctrl.set(new_drain(slog::Level::Info));
                        } else {
                            info!(log, "setting log level to trace");
                            ctrl.set(new_drain(slog::Level::Trace));
                        }
                        trace_mode = !trace_mode;
                    }
                    WindowEvent::Resized(physical_size) => {
                        renderer.resize(&na::Vector2::new(physical_size.width, physical_size.height));
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        renderer.resize(&na::Vector2::new(new_inner_size.width, new_inner_size.height));
                    }
                    _ => {}
                }

                let now = Instant::now();
                for input_event in input.translate(event) {
                    if let Some(status) = session.handle_event(&input_event, now) {
                        println!("{}", status);
                    }
                }
            }
            Event::RedrawRequested(_) => {
                match renderer.render(&session) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                        renderer.resize(&renderer.size())
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        crit!(log, "graphics device is out of memory");
                        *control_flow = ControlFlow::Exit;
                    }
                    Err(err) => warn!(log, "{:?}", err),
                }
                if let Some(status) = session.frame(Instant::now()) {
                    println!("{}", status);
                }
            }
            Event::MainEventsCleared => {
                if session.wants_redraw() {
                    window.request_redraw();
                }
            }
            Event::RedrawEventsCleared => {
                // keep spinning while frames are being counted
                *control_flow = if session.is_measuring() {
                    ControlFlow::Poll
                } else {
                    ControlFlow::Wait
                };
            }
            _ => {}
        }
    });
}
