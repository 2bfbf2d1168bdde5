use clap::Parser;
use fdtm::acoustic::*;
use fdtm::cli::CommonArgs;
use fdtm::grid::Grid;
use fdtm::image::{gather_image, image2d, ColorMap};
use fdtm::model::VelocityModel;
use fdtm::sparse::TimeAxis;
use fdtm::util::*;

/// One shot over a two layer model, axis 0 is depth.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Grid points per axis, 10 m apart.
    #[arg(long, default_value = "101")]
    domain_size: usize,

    /// Damping layer width in points.
    #[arg(long, default_value = "40")]
    nbl: usize,

    #[arg(long, default_value = "4")]
    space_order: usize,

    /// Ricker peak frequency in Hz.
    #[arg(long, default_value = "10.0")]
    f0: f64,

    /// Recording time in seconds.
    #[arg(long, default_value = "1.0")]
    duration: f64,
}

fn main() -> fdtm::Result<()> {
    let args = Args::parse();
    args.common.cli_setup("acoustic_2d")?;
    let params = args.common.operator_parameters();

    let n = args.domain_size;
    let h = 10.0;
    let grid = Grid::<2>::from_spacing(&[n, n], &[h, h], &[0.0, 0.0])?;
    let velocity: Vec<f64> = (0..n * n)
        .map(|i| if i / n < n / 2 { 1500.0 } else { 2500.0 })
        .collect();
    let model = VelocityModel::new(
        grid,
        &velocity,
        args.nbl,
        args.space_order,
        params.chunk_size,
    )?;

    let dt = 0.9 * model.critical_dt();
    let time_axis = TimeAxis::from_stop(0.0, args.duration, dt)?;
    let width = (n - 1) as f64 * h;
    let geometry = Geometry {
        receiver_positions: (0..n)
            .map(|i| vector![2.0 * h, i as f64 * h])
            .collect(),
        f0: args.f0,
        amplitude: 1.0,
        time_axis,
    };
    println!(
        "vmin {} vmax {}, dt {dt}, {} steps",
        model.vmin(),
        model.vmax(),
        time_axis.num
    );

    let solver = AcousticSolver::new(model, geometry, params)?;
    let (traces, field) = solver.forward(vector![2.0 * h, 0.5 * width], false)?;
    println!("max |trace| {}", traces.max_abs());

    if let Some(path) = args.common.output_path("gather.png") {
        gather_image(&traces, &path)?;
    }
    if let Some(path) = args.common.output_path("traces.csv") {
        fdtm::csv::write_traces_csv(&traces, &time_axis, &path)?;
    }
    if let Some(path) = args.common.output_path("wavefield.png") {
        image2d(field.current(), ColorMap::RedBlue, &path)?;
    }
    Ok(())
}
