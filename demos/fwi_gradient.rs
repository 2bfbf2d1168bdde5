use clap::Parser;
use fdtm::acoustic::*;
use fdtm::cli::CommonArgs;
use fdtm::domain::*;
use fdtm::grid::Grid;
use fdtm::image::{image2d, ColorMap};
use fdtm::inversion::*;
use fdtm::model::VelocityModel;
use fdtm::sparse::TimeAxis;
use fdtm::util::*;

/// Misfit and gradient of a smooth model against data
/// from a model with a circular anomaly.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Grid points per axis, 10 m apart.
    #[arg(long, default_value = "81")]
    domain_size: usize,

    #[arg(long, default_value = "20")]
    nbl: usize,

    #[arg(long, default_value = "5")]
    shots: usize,

    #[arg(long, default_value = "10.0")]
    f0: f64,

    #[arg(long, default_value = "0.8")]
    duration: f64,

    /// Reuse one pair of fields for all shots instead of running them
    /// in parallel.
    #[arg(long)]
    sequential: bool,
}

fn main() -> fdtm::Result<()> {
    let args = Args::parse();
    args.common.cli_setup("fwi_gradient")?;
    let params = args.common.operator_parameters();
    let chunk_size = params.chunk_size;

    let n = args.domain_size;
    let h = 10.0;
    let width = (n - 1) as f64 * h;
    let grid = Grid::<2>::from_spacing(&[n, n], &[h, h], &[0.0, 0.0])?;

    let center = 0.5 * width;
    let radius = 0.15 * width;
    let true_velocity: Vec<f64> = (0..n * n)
        .map(|i| {
            let z = (i / n) as f64 * h - center;
            let x = (i % n) as f64 * h - center;
            if (z * z + x * x).sqrt() < radius {
                3000.0
            } else {
                2500.0
            }
        })
        .collect();
    let true_model = VelocityModel::new(
        grid.clone(),
        &true_velocity,
        args.nbl,
        4,
        chunk_size,
    )?;
    let smooth_model =
        VelocityModel::constant(grid, 2500.0, args.nbl, 4, chunk_size)?;

    // Both models share the time axis, the faster one bounds dt
    let dt = 0.9 * true_model.critical_dt().min(smooth_model.critical_dt());
    let geometry = Geometry {
        receiver_positions: (0..n)
            .map(|i| vector![width - 2.0 * h, i as f64 * h])
            .collect(),
        f0: args.f0,
        amplitude: 1.0,
        time_axis: TimeAxis::from_stop(0.0, args.duration, dt)?,
    };
    let true_solver =
        AcousticSolver::new(true_model, geometry.clone(), params)?;
    let solver = AcousticSolver::new(smooth_model, geometry, params)?;

    let shots = (0..args.shots)
        .map(|s| -> fdtm::Result<Shot<2>> {
            let x = (s as f64 + 0.5) * width / args.shots as f64;
            let source_position = vector![2.0 * h, x];
            let (observed, _) = true_solver.forward(source_position, false)?;
            Ok(Shot {
                source_position,
                observed,
            })
        })
        .collect::<fdtm::Result<Vec<_>>>()?;

    let mut result = if args.sequential {
        sequential_gradient(&solver, &shots)?
    } else {
        gradient(&solver, &shots)?
    };
    println!("misfit {}", result.misfit);

    let max_abs = result.gradient.par_max_abs(chunk_size);
    if max_abs > 0.0 {
        fdtm::par_slice::scale(
            result.gradient.buffer_mut(),
            1.0 / max_abs,
            chunk_size,
        );
    }
    println!("gradient max |g| {max_abs}");

    if let Some(path) = args.common.output_path("gradient.png") {
        image2d(&result.gradient, ColorMap::RedBlue, &path)?;
    }
    Ok(())
}
