//! Measurement report for a saved annotations file.
//!
//! Usage: `kinelytix-report <annotations.json> [current-time-secs]`
//!
//! Prints every saved angle (or only those visible at the given time) with
//! both measurements and the arc layout the overlay would draw.

use std::path::Path;

use kinelytix::AppConfig;
use kinelytix::annotation::{AngleAnnotation, AnnotationStore};
use kinelytix::config::InteractionSettings;
use kinelytix::geometry::arc_drawing;

fn main() {
    let config = AppConfig::load_from_default_path().unwrap_or_default();

    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(path) = args.first() else {
        eprintln!("Usage: kinelytix-report <annotations.json> [current-time-secs]");
        std::process::exit(2);
    };

    if let Err(e) = run(Path::new(path), args.get(1).map(String::as_str), &config) {
        eprintln!("Report error: {}", e);
        std::process::exit(1);
    }
}

fn run(
    path: &Path,
    current_time: Option<&str>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let current_time = current_time.map(str::parse::<f64>).transpose()?;

    let json = std::fs::read_to_string(path)?;
    let store = AnnotationStore::from_json(&json)?;
    log::info!("Loaded {} angles from {:?}", store.len(), path);

    let settings = &config.interaction;
    let annotations: Vec<&AngleAnnotation> = match current_time {
        Some(t) => store.visible_at(t, settings.time_window_secs).collect(),
        None => store.iter().collect(),
    };

    if annotations.is_empty() {
        println!("No angles to report.");
        return Ok(());
    }

    println!(
        "{:>4}  {:>8}  {:>8}  {:>8}  {:>6}  arc",
        "id", "time", "inner", "outer", "shown"
    );
    for ann in annotations {
        report_line(ann, settings);
    }
    Ok(())
}

fn report_line(ann: &AngleAnnotation, settings: &InteractionSettings) {
    let measure = match ann.points.measure() {
        Ok(m) => m,
        Err(e) => {
            log::warn!("Skipping angle {}: {}", ann.id, e);
            return;
        }
    };

    let arc = match arc_drawing(
        &ann.points,
        ann.kind,
        settings.arc_radius,
        settings.label_distance(),
    ) {
        Ok(arc) => format!(
            "{:.1}°..{:.1}° {} label@({:.1}, {:.1})",
            arc.span.start_angle.to_degrees(),
            arc.span.end_angle.to_degrees(),
            if arc.anticlockwise { "ccw" } else { "cw" },
            arc.label_position.x,
            arc.label_position.y
        ),
        Err(e) => e.to_string(),
    };

    println!(
        "{:>4}  {:>7.2}s  {:>7.2}°  {:>7.2}°  {:>6}  {}",
        ann.id,
        ann.time,
        measure.inner,
        measure.outer,
        ann.kind.name(),
        arc
    );
}
