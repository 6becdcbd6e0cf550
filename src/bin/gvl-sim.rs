use gvl_sim::catalog::Catalog;
use gvl_sim::config::{self, Command, FormatArg, RunArgs};
use gvl_sim::engine;
use gvl_sim::error::Result;
use gvl_sim::models::SimConfig;
use gvl_sim::output::{
    Formatter, HumanFormatter, JsonFormatter, SummaryFormatter, TimelineFormatter,
};
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = config::parse_args()?;
    match cli.command {
        Some(Command::ListProfiles) => {
            print!("{}", list_profiles(Catalog::builtin()));
            Ok(())
        }
        Some(Command::ShowConfig(args)) => {
            let (config, format) = config::build_config(args)?;
            print!("{}", show_config(&config, &format)?);
            Ok(())
        }
        Some(Command::Run(args)) => run_simulation(args),
        None => run_simulation(cli.run),
    }
}

fn run_simulation(args: RunArgs) -> Result<()> {
    init_tracing(args.verbose);
    let (config, format) = config::build_config(args)?;
    let result = engine::run_simulation(&config)?;

    let formatter = formatter_for(&format, &config);
    let output = formatter.write(&result);
    print!("{}", output);

    Ok(())
}

fn init_tracing(verbose: bool) {
    if verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn formatter_for(format: &FormatArg, config: &SimConfig) -> Box<dyn Formatter> {
    match format {
        FormatArg::Human => Box::new(HumanFormatter),
        FormatArg::Summary => Box::new(SummaryFormatter),
        FormatArg::Timeline => Box::new(TimelineFormatter {
            width: config.timeline_width,
        }),
        FormatArg::Json => Box::new(JsonFormatter),
    }
}

fn list_profiles(catalog: &Catalog) -> String {
    let mut out = String::new();
    for profile in catalog.profiles() {
        let phases = profile
            .phases
            .iter()
            .map(|phase| phase.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&format!(
            "{} ({}): {} [{}] ({} ticks)\n",
            profile.key,
            profile.label,
            profile.description,
            phases,
            profile.total_duration()
        ));
    }
    out
}

fn show_config(config: &SimConfig, format: &FormatArg) -> Result<String> {
    let profiles = Catalog::builtin().resolve(&config.threads)?;
    let mut out = String::new();
    out.push_str(&format!("Format: {}\n", format));
    out.push_str(&format!("Timeline width: {}\n", config.timeline_width));
    out.push_str("Threads:\n");
    for (idx, profile) in profiles.iter().enumerate() {
        out.push_str(&format!(
            "- {}: {} ({} ticks)\n",
            idx,
            profile.key,
            profile.total_duration()
        ));
    }
    Ok(out)
}
