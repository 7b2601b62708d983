use std::{collections::HashMap, path::Path, time::Instant};

// Command line arguments
use clap::Parser;
use log::{error, info};
use shifters::{
    Error, Result,
    camera::Camera,
    image::image_save,
    json::merge_json,
    scene::{DEFAULT_CONFIG, RenderSetup},
    vec::Vec2u,
};
use tinyjson::JsonValue;

#[macro_use]
extern crate scan_fmt;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON render configuration (built-in default when omitted)
    #[arg(short, long)]
    input: Option<String>,

    /// JSON file patched over the configuration
    #[arg(short, long)]
    additional: Option<String>,

    /// inline json
    #[arg(short = 'A', long)]
    additional_inline: Option<String>,

    /// Output image, frames get a `_NNNN` suffix when several are rendered
    #[arg(short, long, default_value = "out.png")]
    output: String,

    /// Time of the first frame, in milliseconds
    #[arg(long)]
    time: Option<f64>,

    /// Number of frames
    #[arg(short, long)]
    frames: Option<u32>,

    /// Image resolution as `WIDTHxHEIGHT`
    #[arg(long)]
    size: Option<String>,

    /// Log ouput
    #[arg(short, long)]
    log: Option<String>,

    /// Number of threads (0 = all cores, -N = all cores - N, N = number of threads)
    #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
    threads: i32,

    /// Factor for image resolution
    #[arg(short, long, default_value_t = 1.0)]
    scale: f32,
}

fn parse_json(contents: &str) -> Result<JsonValue> {
    contents.parse().map_err(|err| Error::Other(Box::new(err)))
}

fn read_json(path: &str) -> Result<HashMap<String, JsonValue>> {
    let contents = std::fs::read_to_string(path).map_err(|err| Error::Other(Box::new(err)))?;
    to_object(parse_json(&contents)?)
}

fn to_object(json: JsonValue) -> Result<HashMap<String, JsonValue>> {
    match json {
        JsonValue::Object(o) => Ok(o),
        _ => Err(Error::UncoveredCaseJson("configuration", json)),
    }
}

/// Image name of frame `index`
fn frame_output(output: &str, index: u32, frames: u32) -> String {
    if frames <= 1 {
        return output.to_string();
    }
    let path = Path::new(output);
    let stem = path
        .file_stem()
        .map_or_else(String::new, |s| s.to_string_lossy().into_owned());
    let name = path.extension().map_or_else(
        || format!("{stem}_{index:04}"),
        |ext| format!("{stem}_{index:04}.{}", ext.to_string_lossy()),
    );
    path.with_file_name(name).to_string_lossy().into_owned()
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(log_out) = args.log {
        let file = std::fs::File::create(log_out).map_err(|err| Error::Other(Box::new(err)))?;
        let target = Box::new(file);
        pretty_env_logger::formatted_builder()
            .filter_level(log::LevelFilter::Info)
            .target(env_logger::Target::Pipe(target))
            .init();
    } else {
        pretty_env_logger::formatted_builder()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    // Set number of threads
    if args.threads != 0 {
        let nbthreads = if args.threads < 0 {
            #[allow(clippy::cast_possible_wrap)]
            (num_cpus::get() as i32 + args.threads).max(1)
        } else {
            args.threads
        };
        info!("Number threads set at : {nbthreads}");
        rayon::ThreadPoolBuilder::new()
            .num_threads(nbthreads as usize)
            .build_global()
            .map_err(|err| Error::Other(Box::new(err)))?;
    }

    // Load configuration
    let start = Instant::now();
    // 1) Main file or the built-in one
    let mut json = match &args.input {
        Some(input) => read_json(input)?,
        None => to_object(parse_json(DEFAULT_CONFIG)?)?,
    };
    // 2) Patches
    if let Some(add) = args.additional {
        merge_json(&mut json, &read_json(&add)?)?;
    }
    if let Some(add) = args.additional_inline {
        merge_json(&mut json, &to_object(parse_json(&add)?)?)?;
    }

    let mut setup = RenderSetup::from_json(&json)?;
    info!("Load configuration time: {:?}", start.elapsed());

    if let Some(size) = args.size {
        let (w, h) = scan_fmt!(&size, "{d}x{d}", u32, u32)
            .map_err(|err| Error::Other(Box::new(err)))?;
        info!("Image resolution set to: {w}x{h}");
        setup.camera = Camera::new(setup.camera.transform, Vec2u::new(w, h), setup.camera.vfov)?;
    }

    // Scale image resolution
    #[allow(clippy::float_cmp)]
    if args.scale != 1.0 {
        info!("Scale image resolution by factor: {}", args.scale);
        setup.camera.scale(args.scale);
    }

    if let Some(time) = args.time {
        info!("Start time set to: {time} ms");
        setup.animation.start_ms = time;
    }
    if let Some(frames) = args.frames {
        setup.animation.frames = frames.max(1);
    }

    // Rendering
    let frames = setup.animation.frames;
    for i in 0..frames {
        let start = Instant::now();
        let frame = setup.animation.frame(i, &setup.camera)?;
        let render = setup.integrator.render(&setup.scene, &frame);
        let invalid = render.count_invalid();
        if invalid > 0 {
            error!("Image contains {invalid} INFs/NaNs pixel(s)");
        }
        info!("Rendering time: {:?}", start.elapsed());

        let output = frame_output(&args.output, i, frames);
        info!("Saving {output}");
        image_save(&output, &render)?;
    }

    Ok(())
}
