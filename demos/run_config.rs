use clap::Parser;
use fdtm::cli::CommonArgs;
use fdtm::config::Scenario;
use std::path::PathBuf;

/// Run a TOML scenario file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Scenario file.
    scenario: PathBuf,
}

fn main() -> fdtm::Result<()> {
    let args = Args::parse();
    args.common.cli_setup("run_config")?;

    let scenario = Scenario::from_file(&args.scenario)?;
    let report = scenario.run(
        args.common.output_dir.as_deref(),
        args.common.operator_parameters(),
    )?;
    println!(
        "{}D: {} steps, dt {}, critical dt {}, max |u| {}",
        report.dimension,
        report.summary.steps,
        report.dt,
        report.critical_dt,
        report.summary.max_abs
    );
    if let Some(traces) = &report.traces {
        println!("{} traces of {} samples", traces.npoint(), traces.nt());
    }
    Ok(())
}
