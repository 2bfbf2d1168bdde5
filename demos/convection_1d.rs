use clap::Parser;
use fdtm::cli::CommonArgs;
use fdtm::domain::*;
use fdtm::field::TimeField;
use fdtm::grid::Grid;
use fdtm::image::Image1D;
use fdtm::operator::*;
use fdtm::pde::Pde;
use fdtm::util::*;

/// 1D periodic convection of a box pulse, one image line per frame.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Grid points.
    #[arg(long, default_value = "400")]
    domain_size: usize,

    /// How many lines the output image should have.
    #[arg(long, default_value = "300")]
    lines: usize,

    /// How many steps to take per line.
    #[arg(long, default_value = "4")]
    steps_per_line: usize,

    /// Convection velocity, negative moves left.
    #[arg(long, default_value = "1.0", allow_hyphen_values = true)]
    velocity: f64,

    /// Formal accuracy of the upwind differences.
    #[arg(long, default_value = "1")]
    space_order: usize,

    /// Fraction of the critical time step.
    #[arg(long, default_value = "0.9")]
    cfl: f64,
}

fn main() -> fdtm::Result<()> {
    let args = Args::parse();
    args.common.cli_setup("convection_1d")?;
    let params = args.common.operator_parameters();

    let grid = Grid::<1>::from_extent(&[args.domain_size], &[1.0], &[0.0])?;
    let pde = Pde::convection(
        &vector![args.velocity],
        args.space_order,
        &grid.spacing(),
    )?;
    let critical_dt = fdtm::stability::critical_dt(&pde);
    let dt = args.cfl * critical_dt;
    log::info!("dt = {dt}, critical dt = {critical_dt}");

    let operator = Operator::new(&grid, pde, dt, Boundary::Periodic, params)?;
    let mut field = TimeField::new(&grid, 1, false)?;
    let mut initial = OwnedDomain::new(grid.aabb());
    fdtm::init::box_pulse(
        &mut initial,
        &grid,
        &vector![0.2],
        &vector![0.35],
        1.0,
        0.0,
        params.chunk_size,
    );
    field.set_initial_from(&initial, params.chunk_size)?;

    let mut img = Image1D::new(grid.aabb(), args.lines as u32, 0.0, 1.0);
    img.add_line(0, field.current().buffer());
    for l in 1..args.lines as u32 {
        operator.apply(&mut field, None, None, args.steps_per_line)?;
        img.add_line(l, field.current().buffer());
    }

    println!(
        "final max |u|: {}",
        field.current().par_max_abs(params.chunk_size)
    );

    if let Some(path) = args.common.output_path("convection_1d.png") {
        img.write(&path)?;
    }
    Ok(())
}
