use std::path::Path;

use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use spotter::crs::Crs;
use spotter::dataset::RoleBindings;
use spotter::dedup::{extract_and_merge, CollisionDecision, FixedDecision, MergeOptions};
use spotter::dms::DmsStyle;
use spotter::elevation::rebase;
use spotter::export::{export_csv_file, ExportOptions};
use spotter::geometry::{DrawingFeature, Point};
use spotter::ingest::{import_csv_file, ImportOptions};
use spotter::naming::next_identifier;
use spotter::snap::{nearest, SnapOutcome, SnapRadius};
use spotter::store::{read_store_json, write_store_json, LayerStore};
use spotter::SpotterError;

#[derive(Parser)]
#[command(name = "spotter", about = "CSV and drawing point reconciliation tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum OnCollision {
    Insert,
    Skip,
}

#[derive(Subcommand)]
enum Command {
    /// Import a CSV file into a new layer of the project.
    ImportCsv {
        project: String,
        csv: String,
        #[arg(long)]
        layer: String,
        /// Field holding the point name/number.
        #[arg(long)]
        id: String,
        /// Field holding the X coordinate (longitude/east).
        #[arg(long)]
        x: String,
        /// Field holding the Y coordinate (latitude/north).
        #[arg(long)]
        y: String,
        /// Field holding the elevation, if any.
        #[arg(long)]
        elev: Option<String>,
        /// The file has no header row; fields are named field_1..field_n.
        #[arg(long)]
        no_header: bool,
        /// CRS the source coordinates are authored in.
        #[arg(long, default_value = "EPSG:4326")]
        crs: String,
        /// Projected CRS geographic sources are stored in.
        #[arg(long, default_value = "EPSG:3857")]
        storage_crs: String,
        /// Decode X/Y as degrees-minutes-seconds text.
        #[arg(long)]
        dms: bool,
        /// Comma-separated subset of fields to keep.
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,
    },
    /// Export a layer to CSV in a chosen CRS.
    ExportCsv {
        project: String,
        csv: String,
        #[arg(long)]
        layer: String,
        /// Comma-separated fields to export, in order.
        #[arg(long, value_delimiter = ',', required = true)]
        fields: Vec<String>,
        #[arg(long)]
        no_header: bool,
        #[arg(long, default_value = "EPSG:4326")]
        crs: String,
        /// Emit coordinates as degrees-minutes-seconds text.
        #[arg(long)]
        dms: bool,
        #[arg(long, default_value = "symbols", value_parser = parse_style)]
        style: DmsStyle,
    },
    /// Merge drawing vertices (JSON features) into an existing layer.
    Extract {
        project: String,
        #[arg(long)]
        layer: String,
        /// JSON file with an array of line/polygon features.
        #[arg(long)]
        from: String,
        /// First number to assign instead of continuing the layer numbering.
        #[arg(long)]
        start_number: Option<u32>,
        /// Answer applied to every identifier collision.
        #[arg(long, value_enum, default_value_t = OnCollision::Skip)]
        on_collision: OnCollision,
    },
    /// Snap to the nearest elevation-bearing point and shift the whole layer
    /// so that point reads the given elevation.
    Rebase {
        project: String,
        #[arg(long)]
        layer: String,
        /// Click position, in the layer's storage CRS.
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
        /// Search radius for projected layers, in linear units.
        #[arg(long, default_value_t = 10.0)]
        radius: f64,
        /// Search radius for geographic layers, in degrees.
        #[arg(long, default_value_t = 1e-4)]
        radius_geographic: f64,
        /// New elevation for the snapped anchor point.
        #[arg(long)]
        elevation: f64,
        /// Candidate to pick when several are in radius (0 = closest).
        #[arg(long, default_value_t = 0)]
        pick: usize,
    },
    /// Print the next free point number of a layer.
    NextNumber {
        project: String,
        #[arg(long)]
        layer: String,
    },
}

fn parse_style(text: &str) -> Result<DmsStyle, String> {
    text.parse()
}

fn load_store(path: &str) -> spotter::Result<LayerStore> {
    if Path::new(path).exists() {
        read_store_json(path)
    } else {
        Ok(LayerStore::new())
    }
}

/// Screens a drawing JSON file: every feature must be a line or a polygon.
fn read_drawing_features(path: &str) -> spotter::Result<Vec<DrawingFeature>> {
    let contents = spotter::io::read_to_string(path)?;
    let raw: Vec<serde_json::Value> = serde_json::from_str(&contents)?;
    let total = raw.len();
    let unsupported = raw
        .iter()
        .filter(|v| {
            !matches!(
                v.get("geometry").and_then(|g| g.get("kind")).and_then(|k| k.as_str()),
                Some("line") | Some("polygon")
            )
        })
        .count();
    if unsupported > 0 {
        return Err(SpotterError::UnsupportedGeometry { unsupported, total });
    }
    Ok(serde_json::from_value(serde_json::Value::Array(raw))?)
}

fn run(cli: Cli) -> spotter::Result<()> {
    match cli.command {
        Command::ImportCsv {
            project,
            csv,
            layer,
            id,
            x,
            y,
            elev,
            no_header,
            crs,
            storage_crs,
            dms,
            fields,
        } => {
            let mut store = load_store(&project)?;
            if store.contains(&layer) {
                return Err(SpotterError::DatasetExists { name: layer });
            }
            let mut options = ImportOptions::new(
                layer,
                Crs::parse(&crs),
                RoleBindings {
                    identifier: id,
                    x,
                    y,
                    elevation: elev,
                },
            );
            options.has_header = !no_header;
            options.storage_crs = Crs::parse(&storage_crs);
            options.parse_dms = dms;
            options.fields = fields;
            let dataset = import_csv_file(&csv, &options, None)?;
            println!("imported {} point(s) into {:?}", dataset.records.len(), dataset.name);
            store.create(dataset)?;
            write_store_json(&project, &store)?;
        }
        Command::ExportCsv {
            project,
            csv,
            layer,
            fields,
            no_header,
            crs,
            dms,
            style,
        } => {
            let store = load_store(&project)?;
            let dataset = store.dataset(&layer)?;
            let options = ExportOptions {
                target_crs: Crs::parse(&crs),
                fields,
                header: !no_header,
                dms,
                dms_style: style,
            };
            export_csv_file(&csv, dataset, &options)?;
            println!("exported {} record(s) to {}", dataset.records.len(), csv);
        }
        Command::Extract {
            project,
            layer,
            from,
            start_number,
            on_collision,
        } => {
            let mut store = load_store(&project)?;
            let features = read_drawing_features(&from)?;
            let mut prompt = FixedDecision(match on_collision {
                OnCollision::Insert => CollisionDecision::InsertAll,
                OnCollision::Skip => CollisionDecision::SkipAll,
            });
            store.begin_edit(&layer)?;
            let result = extract_and_merge(
                store.dataset_mut(&layer)?,
                &features,
                MergeOptions { start_number },
                &mut prompt,
                None,
            );
            match result {
                Ok(report) => {
                    store.commit(&layer);
                    println!(
                        "{} vertex(es) added, {} skipped as duplicates ({} feature(s), {} vertex(es) read)",
                        report.added, report.skipped, report.features, report.vertices
                    );
                    write_store_json(&project, &store)?;
                }
                Err(err) => {
                    store.rollback(&layer)?;
                    return Err(err);
                }
            }
        }
        Command::Rebase {
            project,
            layer,
            x,
            y,
            radius,
            radius_geographic,
            elevation,
            pick,
        } => {
            let mut store = load_store(&project)?;
            let click_crs = store.dataset(&layer)?.crs.clone();
            let outcome = nearest(
                &store,
                Point::new(x, y),
                &click_crs,
                SnapRadius {
                    projected: radius,
                    geographic: radius_geographic,
                },
                |ds| ds.name == layer && ds.has_elevation_field(),
            );
            match outcome {
                SnapOutcome::NothingInRadius { closest } => {
                    match closest {
                        Some(c) => eprintln!(
                            "no point within radius; closest is {:.3} away",
                            c.distance
                        ),
                        None => eprintln!("no elevation-bearing point available"),
                    }
                    std::process::exit(1);
                }
                SnapOutcome::Candidates(candidates) => {
                    let candidate = candidates.get(pick).unwrap_or(&candidates[0]);
                    info!(
                        "snapped to record {} at {:.3} away",
                        candidate.record_index, candidate.distance
                    );
                    let updated = rebase(&mut store, &layer, candidate.record_index, elevation)?;
                    println!("rebased {} elevation(s)", updated);
                    write_store_json(&project, &store)?;
                }
            }
        }
        Command::NextNumber { project, layer } => {
            let store = load_store(&project)?;
            println!("{}", next_identifier(store.dataset(&layer)?));
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
