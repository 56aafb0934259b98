use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use fragment::{FragmentRecord, GroupFilter, LoadPolicy, Project, SerializedFragment};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the contour of one raster and print the serialized record
    Extract {
        /// Path to the fragment raster (RGBA, alpha defines the mask)
        input: PathBuf,
        /// World x offset of the fragment on the canvas
        #[arg(long, default_value = "0")]
        offset_x: i32,
        /// World y offset of the fragment on the canvas
        #[arg(long, default_value = "0")]
        offset_y: i32,
        /// Fragment id to assign
        #[arg(long, default_value = "0")]
        id: u32,
    },
    /// Export fragment outlines from a project file as GeoJSON
    Geojson {
        /// Path to the project file (JSON array of fragment records)
        project: PathBuf,
        /// Output .geojson path
        #[arg(short, long)]
        output: PathBuf,
        /// Re-derive geometry from the rasters instead of trusting the file
        #[arg(long)]
        rederive: bool,
        /// Only export fragments of this group
        #[arg(long)]
        group: Option<i32>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            input,
            offset_x,
            offset_y,
            id,
        } => {
            let record = FragmentRecord::from_path(&input, offset_x, offset_y, id)?;
            info!(
                points = record.geometry.outer.len(),
                holes = record.geometry.holes.len(),
                back = record.has_back(),
                "extracted fragment outline"
            );
            println!("{}", serde_json::to_string_pretty(&record.to_record())?);
        }
        Commands::Geojson {
            project,
            output,
            rederive,
            group,
        } => {
            let records: Vec<SerializedFragment> =
                serde_json::from_str(&fs::read_to_string(&project)?)?;

            let loaded = if rederive {
                Project::load_records_with_rasters(records, LoadPolicy::Placeholder)?
            } else {
                Project::from_records(records)
            };

            let filter = group.map_or(GroupFilter::All, GroupFilter::Group);
            let mut filtered = Project::new();
            for fragment in loaded.fragments(filter) {
                filtered.add(fragment.clone());
            }

            filtered.save_geojson(&output)?;
            info!(fragments = filtered.len(), path = %output.display(), "wrote GeoJSON");
        }
    }

    Ok(())
}
