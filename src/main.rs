use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::bail;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use remodel_geometry::cascade::{
    copy_zone, dangling_references, overwrite_floor, remove_adjacent_link, remove_floor,
    remove_surface, remove_zone,
};
use remodel_geometry::export::{export_merged_json, export_surfaces_csv};
use remodel_geometry::io::{load_document, save_document};
use remodel_geometry::linker::{update_surface, SurfacePatch};
use remodel_geometry::merger::{merge_remodeling_data, ItemType, Selection};
use remodel_geometry::model::Version;
use remodel_geometry::store::GeometryStore;
use remodel_geometry::ui::App;

#[derive(Parser, Debug)]
#[command(name = "remodel-geometry")]
#[command(about = "Edit before/after retrofit geometry while keeping adjacency consistent")]
#[command(version)]
struct Args {
    /// Path to the project document (JSON)
    #[arg(required = true)]
    file: PathBuf,

    /// Write the result here instead of back to FILE
    #[arg(long, short, global = true, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VersionArg {
    Before,
    After,
}

impl From<VersionArg> for Version {
    fn from(value: VersionArg) -> Self {
        match value {
            VersionArg::Before => Version::Before,
            VersionArg::After => Version::After,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print floor, zone and surface counts of both versions
    Summary,
    /// List adjacency references to missing surfaces or zones
    Check,
    /// Remove a floor and repair references to it
    RemoveFloor {
        #[arg(long, value_enum, default_value = "before")]
        version: VersionArg,
        floor_id: String,
    },
    /// Remove a zone and repair references to it
    RemoveZone {
        #[arg(long, value_enum, default_value = "before")]
        version: VersionArg,
        zone_id: String,
    },
    /// Remove a surface, its generated mirrors, and references to it
    RemoveSurface {
        #[arg(long, value_enum, default_value = "before")]
        version: VersionArg,
        zone_id: String,
        surface_id: String,
    },
    /// Break the adjacency of a surface
    Unlink {
        #[arg(long, value_enum, default_value = "before")]
        version: VersionArg,
        surface_id: String,
    },
    /// Append a copy of a zone to each target floor
    CopyZone {
        #[arg(long, value_enum, default_value = "before")]
        version: VersionArg,
        zone_id: String,
        #[arg(required = true)]
        floor_ids: Vec<String>,
    },
    /// Replace the zones of target floors with those of a source floor
    OverwriteFloor {
        #[arg(long, value_enum, default_value = "before")]
        version: VersionArg,
        source_floor_id: String,
        #[arg(required = true)]
        target_floor_ids: Vec<String>,
    },
    /// Update a surface and, optionally, its linked partner
    UpdateSurface {
        #[arg(long, value_enum, default_value = "before")]
        version: VersionArg,
        surface_id: String,
        /// Id of the linked partner surface
        #[arg(long)]
        adjacent: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        construction: Option<String>,
        #[arg(long)]
        area: Option<f64>,
        /// Cool-roof reflectance in percent
        #[arg(long)]
        coolroof: Option<f64>,
        /// Clear the adjacent zone and every adjacent_from pointing here
        #[arg(long)]
        unlink: bool,
    },
    /// Copy selected floors, zones, surfaces and panels between versions
    Merge {
        #[arg(long, value_enum, default_value = "before")]
        from: VersionArg,
        #[arg(long, value_enum, default_value = "after")]
        to: VersionArg,
        /// Ids to copy, comma separated
        #[arg(long = "select", value_delimiter = ',')]
        ids: Vec<String>,
        /// Copy everything
        #[arg(long)]
        all: bool,
        /// Only write the merged result to this JSON file
        #[arg(long, value_name = "FILE")]
        preview: Option<PathBuf>,
    },
    /// Pick what to copy between versions interactively
    Pick {
        #[arg(long, value_enum, default_value = "before")]
        from: VersionArg,
        #[arg(long, value_enum, default_value = "after")]
        to: VersionArg,
    },
    /// Export the surface schedule of a version to CSV
    ExportCsv {
        #[arg(long, value_enum, default_value = "before")]
        version: VersionArg,
        out: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut store = GeometryStore::new(load_document(&args.file)?);

    if run(&mut store, args.command)? {
        let path = args.output.as_ref().unwrap_or(&args.file);
        save_document(store.document(), path)?;
        println!("Saved: {}", path.display());
    }

    Ok(())
}

/// Executes a command. Returns whether the document changed.
fn run(store: &mut GeometryStore, command: Command) -> Result<bool> {
    match command {
        Command::Summary => {
            print_summary(store);
            Ok(false)
        }
        Command::Check => check(store).map(|()| false),
        Command::RemoveFloor { version, floor_id } => {
            store.apply(version.into(), |tree| remove_floor(tree, &floor_id))?;
            Ok(true)
        }
        Command::RemoveZone { version, zone_id } => {
            store.apply(version.into(), |tree| remove_zone(tree, &zone_id))?;
            Ok(true)
        }
        Command::RemoveSurface {
            version,
            zone_id,
            surface_id,
        } => {
            store.apply(version.into(), |tree| {
                remove_surface(tree, &zone_id, &surface_id)
            })?;
            Ok(true)
        }
        Command::Unlink {
            version,
            surface_id,
        } => {
            store.apply(version.into(), |tree| {
                remove_adjacent_link(tree, &surface_id)
            })?;
            Ok(true)
        }
        Command::CopyZone {
            version,
            zone_id,
            floor_ids,
        } => {
            let targets: Vec<&str> = floor_ids.iter().map(String::as_str).collect();
            store.apply(version.into(), |tree| copy_zone(tree, &zone_id, &targets))?;
            Ok(true)
        }
        Command::OverwriteFloor {
            version,
            source_floor_id,
            target_floor_ids,
        } => {
            let targets: Vec<&str> = target_floor_ids.iter().map(String::as_str).collect();
            store.apply(version.into(), |tree| {
                overwrite_floor(tree, &source_floor_id, &targets)
            })?;
            Ok(true)
        }
        Command::UpdateSurface {
            version,
            surface_id,
            adjacent,
            name,
            construction,
            area,
            coolroof,
            unlink,
        } => {
            let patch = SurfacePatch {
                name,
                construction_id: construction,
                area,
                coolroof_reflectance: coolroof,
                adjacent_zone_id: unlink.then(String::new),
                ..SurfacePatch::default()
            };
            store.apply_linked(version.into(), |tree| {
                update_surface(tree, &surface_id, &patch, adjacent.as_deref())
            })?;
            Ok(true)
        }
        Command::Merge {
            from,
            to,
            ids,
            all,
            preview,
        } => {
            let (origin, target) = (from.into(), to.into());
            let mut selection: Selection = ids.into_iter().collect();
            if all {
                let data = store.read(origin)?;
                selection = Selection::new();
                selection.toggle("", ItemType::Building, data);
                selection.toggle("", ItemType::PhotovoltaicAll, data);
            }

            if let Some(preview_path) = preview {
                let merged = merge_remodeling_data(&selection, store.read(origin)?, store.read(target)?);
                export_merged_json(&merged, &preview_path)?;
                println!("Exported merge preview: {}", preview_path.display());
                return Ok(false);
            }

            store.merge_into(origin, target, &selection)?;
            Ok(true)
        }
        Command::Pick { from, to } => {
            let (origin, target) = (from.into(), to.into());
            let app = App::new(
                origin,
                store.read(origin)?.clone(),
                target,
                store.read(target)?.clone(),
            );

            let terminal = ratatui::init();
            let picked = app.run(terminal);
            ratatui::restore();

            match picked? {
                Some(selection) => {
                    store.merge_into(origin, target, &selection)?;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
        Command::ExportCsv { version, out } => {
            export_surfaces_csv(store.floors(version.into())?, &out)?;
            println!("Exported to CSV: {}", out.display());
            Ok(false)
        }
    }
}

fn print_summary(store: &GeometryStore) {
    println!("Project: {}", store.document().name);
    for version in [Version::Before, Version::After] {
        match store.read(version) {
            Ok(data) => {
                let generated = data
                    .floors
                    .iter()
                    .flat_map(|f| f.surfaces())
                    .filter(|s| s.is_generated)
                    .count();
                println!(
                    "{version}: {} floors, {} zones, {} surfaces ({generated} generated), {} panel refs",
                    data.floors.len(),
                    data.total_zones(),
                    data.total_surfaces(),
                    data.photovoltaics.len()
                );
            }
            Err(err) => println!("{version}: {err}"),
        }
    }
}

fn check(store: &GeometryStore) -> Result<()> {
    let mut total = 0;
    for version in [Version::Before, Version::After] {
        let Ok(floors) = store.floors(version) else {
            continue;
        };
        for reference in dangling_references(floors) {
            println!("{version}: {reference}");
            total += 1;
        }
    }

    if total > 0 {
        bail!("{total} dangling adjacency references");
    }
    println!("No dangling adjacency references");
    Ok(())
}
