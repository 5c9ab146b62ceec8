#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod export;
mod render;
mod report;
mod scenario;

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use structopt::StructOpt;

use model::{Category, ObjectID, ShortPathPolicy, Trajectory};
use recordings::TimeFormat;

use self::render::Coloring;
use self::report::Analysis;
use self::scenario::Scenario;

#[derive(StructOpt)]
#[structopt(about = "Detects and plots trajectories crossing reference lines")]
enum Command {
    /// Turn a text recording into the CSV form
    Convert {
        /// The path to a text recording
        #[structopt(long)]
        input: String,
        /// Where to write the CSV
        #[structopt(long)]
        output: String,
        /// Start and end times are date-times, not seconds
        #[structopt(long)]
        datetime: bool,
    },
    /// Render trajectories and reference lines to a PNG, and report crossings
    Plot {
        #[structopt(flatten)]
        input: Input,
        /// Where to write the PNG
        #[structopt(long)]
        output: String,
        /// Cycle through a palette instead of coloring by category
        #[structopt(long, conflicts_with = "category")]
        uncategorized: bool,
    },
    /// Just report crossings
    Crossings {
        #[structopt(flatten)]
        input: Input,
    },
}

#[derive(StructOpt)]
struct Input {
    /// The path to a CSV file of samples
    #[structopt(long)]
    csv: String,
    /// The path to a JSON scenario describing the view and reference lines
    #[structopt(long)]
    scenario: String,
    /// Only use trajectories of this category
    #[structopt(long)]
    category: Option<u32>,
    /// Also write all crossings to this JSON file
    #[structopt(long)]
    report: Option<String>,
    /// Also write trajectories and crossings to this GeoJSON file
    #[structopt(long)]
    geojson: Option<String>,
    /// Leave out objects with a single sample, instead of failing
    #[structopt(long)]
    skip_short: bool,
}

impl Input {
    fn load(&self) -> Result<(Scenario, BTreeMap<ObjectID, Trajectory>)> {
        let scenario = Scenario::load(&self.scenario)?;
        let policy = if self.skip_short {
            ShortPathPolicy::Skip
        } else {
            ShortPathPolicy::Reject
        };
        let trajectories = model::load_csv(fs_err::File::open(&self.csv)?, policy)
            .with_context(|| format!("loading {}", self.csv))?;
        info!(
            "Loaded {} trajectories from {}",
            trajectories.len(),
            self.csv
        );
        Ok((scenario, trajectories))
    }

    /// Analyzes the selected trajectories and writes every requested output besides the plot
    fn analyze<'a>(
        &self,
        scenario: &Scenario,
        trajectories: &'a BTreeMap<ObjectID, Trajectory>,
    ) -> Result<(Vec<&'a Trajectory>, Analysis)> {
        let selected = scenario.select(trajectories, self.category.map(Category))?;
        if selected.is_empty() {
            warn!("No trajectories to analyze");
        }
        let analysis = Analysis::run(&scenario.lines, &selected);
        analysis.print_report();
        if let Some(ref path) = self.report {
            analysis.write_json(path)?;
        }
        if let Some(ref path) = self.geojson {
            export::write_geojson(path, scenario, &selected, &analysis)?;
        }
        Ok((selected, analysis))
    }
}

fn main() -> Result<()> {
    setup_logger();

    match Command::from_args() {
        Command::Convert {
            input,
            output,
            datetime,
        } => {
            let format = if datetime {
                TimeFormat::DateTime
            } else {
                TimeFormat::Seconds
            };
            recordings::convert(&input, &output, format)?;
        }
        Command::Plot {
            input,
            output,
            uncategorized,
        } => {
            let (scenario, trajectories) = input.load()?;
            let (selected, analysis) = input.analyze(&scenario, &trajectories)?;
            let background = match scenario.background {
                Some(ref bg) => Some(render::load_background(bg)?),
                None => None,
            };
            let coloring = if uncategorized {
                Coloring::Cycle
            } else {
                Coloring::ByCategory
            };
            let img = render::render(
                &scenario,
                &selected,
                &analysis,
                coloring,
                background.as_ref(),
            );
            render::save(&img, &output)?;
        }
        Command::Crossings { input } => {
            let (scenario, trajectories) = input.load()?;
            input.analyze(&scenario, &trajectories)?;
        }
    }
    Ok(())
}

fn setup_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}
