use anyhow::Result;
use clap::Parser;

use wkplan::app::{self, GenerateOptions};
use wkplan::cli::{Cli, Commands};
use wkplan::logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = app::load_config(cli.config.as_deref())?;

    let output = match cli.command {
        Commands::Generate {
            date,
            proposals,
            uncertainty,
            seed,
            unavailable,
            sequential,
        } => {
            let options = GenerateOptions {
                proposals,
                uncertainty,
                seed,
                unavailable,
                sequential,
            };
            app::generate(&cli.data_dir, &cli.output_dir, config, date, &options)?
        }
        Commands::Demand { year, month } => app::demand(&cli.data_dir, year, month)?,
        Commands::Operators => app::operators(&cli.data_dir)?,
        Commands::Show { date, proposal } => {
            app::show(&cli.data_dir, &cli.output_dir, &config, date, proposal)?
        }
    };

    print!("{}", output);
    Ok(())
}
