use clap::Parser;
use fdtm::cli::CommonArgs;
use fdtm::domain::*;
use fdtm::field::TimeField;
use fdtm::grid::Grid;
use fdtm::image::{image2d, ColorMap};
use fdtm::operator::*;
use fdtm::pde::Pde;
use fdtm::util::*;

/// 2D periodic convection of a Gaussian along the diagonal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Grid points per axis.
    #[arg(long, default_value = "200")]
    domain_size: usize,

    /// How many frames to output.
    #[arg(long, default_value = "20")]
    images: usize,

    /// How many steps to take per frame.
    #[arg(long, default_value = "20")]
    steps_per_image: usize,

    /// Fraction of the critical time step.
    #[arg(long, default_value = "0.9")]
    cfl: f64,
}

fn main() -> fdtm::Result<()> {
    let args = Args::parse();
    args.common.cli_setup("convection_2d")?;
    let params = args.common.operator_parameters();

    let n = args.domain_size;
    let grid = Grid::<2>::from_extent(&[n, n], &[1.0, 1.0], &[0.0, 0.0])?;
    let pde = Pde::convection(&vector![1.0, 0.5], 1, &grid.spacing())?;
    let dt = args.cfl * fdtm::stability::critical_dt(&pde);
    let operator = Operator::new(&grid, pde, dt, Boundary::Periodic, params)?;

    let mut field = TimeField::new(&grid, 1, false)?;
    let mut initial = OwnedDomain::new(grid.aabb());
    fdtm::init::gaussian(
        &mut initial,
        &grid,
        &vector![0.3, 0.3],
        0.05,
        1.0,
        params.chunk_size,
    );
    field.set_initial_from(&initial, params.chunk_size)?;

    for i in 0..args.images {
        if let Some(path) = args.common.frame_path("frame", i) {
            image2d(field.current(), ColorMap::Turbo, &path)?;
        }
        let summary =
            operator.apply(&mut field, None, None, args.steps_per_image)?;
        log::info!(
            "frame {i}: t = {}, max |u| = {}",
            ((i + 1) * args.steps_per_image) as f64 * dt,
            summary.max_abs
        );
    }
    Ok(())
}
