// Copyright @yucwang 2026

use genoise::core::scene_loader::load_scene;
use genoise::io::png_utils;
use genoise::renderers::scanline::RenderEngine;

use std::env;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() {
    env::set_var("RUST_LOG", "info");
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Must provide a scene file. See options below:\n\
             \t{prog} path/to/<sceneFile>.xml [--spp N]\n\
             \t{prog} path/to/<sceneFile>.xml path/to/rendered/<image>.png [--spp N]",
            prog = args[0]
        );
        std::process::exit(1);
    }

    let scene_path = &args[1];
    let mut image_path: Option<&String> = None;
    let mut spp: usize = 256;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--spp" => {
                i += 1;
                spp = args
                    .get(i)
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(spp);
            }
            other if image_path.is_none() && !other.starts_with("--") => {
                image_path = Some(&args[i]);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let scene = match load_scene(scene_path) {
        Ok(scene) => scene,
        Err(err) => {
            eprintln!("Could not load scene {}: {}", scene_path, err);
            std::process::exit(1);
        }
    };

    let engine = Arc::new(RenderEngine::new(scene, spp));
    Arc::clone(&engine).begin_render();

    // The worker pool is detached; completion is observed by polling.
    while engine.is_rendering() {
        thread::sleep(Duration::from_millis(10));
    }

    log::info!(
        "rendered {} pixels",
        engine.image().rendered_pixels()
    );

    if let Some(path) = image_path {
        let image = engine.image();
        if let Err(err) = png_utils::write_png_to_file(
            &image.rgb_bytes(),
            image.width() as u32,
            image.height() as u32,
            path,
        ) {
            eprintln!("Could not save PNG file: {}", err);
            std::process::exit(1);
        }
    }
}
