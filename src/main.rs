use anyhow::Result;
use battery_cost::{
    calculators::{CellCostCalculator, PackCostCalculator},
    config, init_tracing,
};
use clap::Parser;

mod cli;
mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.get_command();

    if let cli::Commands::Version = command {
        println!("Battery Cost Estimator v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Logging settings live in the configuration, so it is loaded first
    let cfg = config::load_config(&args.config)?;
    init_tracing(&cfg.server.log_level, &cfg.server.log_format);

    match command {
        cli::Commands::Cell(calc_args) => {
            commands::calculate::execute::<CellCostCalculator>(&cfg, calc_args)?;
        }
        cli::Commands::Pack(calc_args) => {
            commands::calculate::execute::<PackCostCalculator>(&cfg, calc_args)?;
        }
        cli::Commands::Fields => commands::fields::execute(&cfg)?,
        cli::Commands::Serve => commands::serve::execute(cfg, args.config).await?,
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&cfg)?,
            cli::ConfigCommands::Validate => commands::config::validate(&cfg, &args.config)?,
        },
        // Printed before configuration is loaded
        cli::Commands::Version => {}
    }

    Ok(())
}
