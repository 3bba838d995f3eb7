use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gridplot::chart::{iteration_series, write_pdf};
use gridplot::map::{read_geojson, render_map, write_map, MapOptBuilder};
use gridplot::table::{summary_table, sweep_table};
use gridplot::{load_topology, read_log, ChartOpt, LoadOpt, Study};
use std::path::PathBuf;

/// Maps, tables and charts for power grid interdiction studies.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Network map
    Map(MapArgs),

    /// Network map with interdicted branches and load shed
    ShedMap(ShedMapArgs),

    /// LaTeX summary rows per problem type
    Table(TableArgs),

    /// LaTeX rows of the planar distance sweep
    SweepTable(TableArgs),

    /// 3D bar chart of planar iterations
    Chart(ChartArgs),
}

#[derive(Copy, Clone, ValueEnum)]
enum System {
    /// IEEE RTS-96, 24 buses.
    Rts96,
    /// WECC, 240 buses.
    Wecc,
}

impl System {
    fn study(&self) -> Study {
        match self {
            System::Rts96 => Study::rts96(),
            System::Wecc => Study::wecc(),
        }
    }
}

#[derive(Args)]
struct MapArgs {
    /// Bus coordinate table.
    #[arg(long, default_value = "../data/240_geo.csv")]
    geo: PathBuf,

    /// Branch endpoint table.
    #[arg(long, default_value = "../data/240_branches.csv")]
    branches: PathBuf,

    /// The branch table has no header row.
    #[arg(long, default_value_t = false)]
    no_branch_header: bool,

    /// GeoJSON boundary layers.
    #[arg(long, default_values = ["canada-states.json", "us-states.json"])]
    boundary: Vec<PathBuf>,

    /// Output file
    #[arg(short, long, default_value = "output.html")]
    output: PathBuf,

    /// Initial zoom level.
    #[arg(long)]
    zoom: Option<u8>,

    /// CSS width of the map.
    #[arg(long)]
    width: Option<String>,

    /// CSS height of the map.
    #[arg(long)]
    height: Option<String>,
}

#[derive(Args)]
struct ShedMapArgs {
    /// Heuristic solver report.
    #[arg(required = true)]
    log: PathBuf,

    #[command(flatten)]
    map: MapArgs,
}

#[derive(Args)]
struct TableArgs {
    /// Test system the runs were made on.
    #[arg(long, value_enum, default_value_t = System::Rts96)]
    system: System,

    /// Directory of the heuristic solver reports.
    #[arg(long, default_value = "../output")]
    dir: PathBuf,
}

#[derive(Args)]
struct ChartArgs {
    /// Test system the runs were made on.
    #[arg(long, value_enum, default_value_t = System::Wecc)]
    system: System,

    /// Directory of the heuristic solver reports.
    #[arg(long, default_value = "../output")]
    dir: PathBuf,

    /// Output file
    #[arg(short, long, default_value = "iterations.pdf")]
    output: PathBuf,

    /// Chart caption.
    #[arg(long)]
    caption: Option<String>,
}

fn main() {
    env_logger::Builder::from_default_env()
        .format_level(false)
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    match execute(&cli) {
        Ok(_) => {
            std::process::exit(0);
        }
        Err(err) => {
            eprintln!("error: {:#}", err);
            std::process::exit(2);
        }
    }
}

fn execute(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Map(args) => map(args, None),
        Commands::ShedMap(args) => map(&args.map, Some(&args.log)),
        Commands::Table(args) => {
            let table = summary_table(&args.system.study(), &args.dir)?;
            for (problem, rows) in table {
                println!("{}", problem);
                for row in rows {
                    println!("{}", row);
                }
            }
            Ok(())
        }
        Commands::SweepTable(args) => {
            for row in sweep_table(&args.system.study(), &args.dir)? {
                println!("{}", row);
            }
            Ok(())
        }
        Commands::Chart(args) => {
            let series = iteration_series(&args.system.study(), &args.dir)?;
            let mut opt = ChartOpt::default();
            if let Some(caption) = &args.caption {
                opt.caption = caption.clone();
            }
            write_pdf(&args.output, &series, &opt)?;
            Ok(())
        }
    }
}

fn map(args: &MapArgs, log_path: Option<&PathBuf>) -> Result<()> {
    let load_opt = LoadOpt {
        branch_headers: !args.no_branch_header,
        ..LoadOpt::default()
    };
    let topology = load_topology(&args.geo, &args.branches, &load_opt)?;

    let boundaries = args
        .boundary
        .iter()
        .map(|path| read_geojson(path).with_context(|| format!("boundary {}", path.display())))
        .collect::<Result<Vec<_>>>()?;

    let record = match log_path {
        Some(path) => {
            let log = read_log(path).with_context(|| format!("log {}", path.display()))?;
            Some(log.record)
        }
        None => None,
    };

    let mut builder = MapOptBuilder::default();
    if let Some(zoom) = args.zoom {
        builder.zoom(zoom);
    }
    if let Some(width) = &args.width {
        builder.width(width.clone());
    }
    if let Some(height) = &args.height {
        builder.height(height.clone());
    }
    let opt = builder.build()?;

    let html = render_map(&topology, &boundaries, record.as_ref(), &opt)?;
    write_map(&args.output, &html)?;
    Ok(())
}
