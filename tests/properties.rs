use fdtm::acoustic::*;
use fdtm::domain::*;
use fdtm::field::TimeField;
use fdtm::grid::Grid;
use fdtm::model::VelocityModel;
use fdtm::operator::*;
use fdtm::pde::*;
use fdtm::sparse::*;
use fdtm::stability::{critical_dt, StabilityPolicy};
use fdtm::util::*;
use fdtm::Error;

use float_cmp::assert_approx_eq;

fn first_moment(grid: &Grid<1>, domain: &OwnedDomain<1>) -> (f64, f64) {
    let mut mass = 0.0;
    let mut moment = 0.0;
    for (coord, value) in domain.aabb().coord_iter().zip(domain.buffer()) {
        mass += value;
        moment += grid.position(&coord)[0] * value;
    }
    (mass, moment / mass)
}

#[test]
fn zero_stays_zero() {
    let grid =
        Grid::<2>::from_spacing(&[21, 21], &[10.0, 10.0], &[0.0, 0.0]).unwrap();
    let model = VelocityModel::constant(grid, 2000.0, 5, 4, 64).unwrap();
    let dt = 0.9 * model.critical_dt();
    let operator = Operator::new(
        model.grid(),
        model.pde(64).unwrap(),
        dt,
        Boundary::Dirichlet(0.0),
        OperatorParameters::default(),
    )
    .unwrap();
    let axis = TimeAxis::new(0.0, dt, 50).unwrap();
    let source = Source::from_wavelet(
        model.grid(),
        vec![vector![100.0, 100.0]],
        &RickerWavelet::new(20.0),
        0.0,
        &axis,
        model.injection_scale(dt, 64),
    )
    .unwrap();
    let mut receivers =
        Receivers::new(
            model.grid(),
            vec![vector![50.0, 150.0], vector![13.0, 7.0]],
        )
        .unwrap();

    let mut field = TimeField::new(model.grid(), 2, true).unwrap();
    let summary = operator
        .apply(&mut field, Some(&source), Some(&mut receivers), 50)
        .unwrap();
    assert_eq!(summary.max_abs, 0.0);
    for level in field.history().unwrap() {
        assert!(level.buffer().iter().all(|v| *v == 0.0));
    }
    assert!(receivers.traces().data().iter().all(|v| *v == 0.0));
}

#[test]
fn convection_translates_at_velocity() {
    let n = 401;
    let steps = 100;
    for (c, lo, hi) in [(1.0, 0.2, 0.3), (-1.0, 0.7, 0.8), (2.5, 0.1, 0.15)] {
        let grid = Grid::<1>::from_extent(&[n], &[1.0], &[0.0]).unwrap();
        let pde = Pde::convection(&vector![c], 1, &grid.spacing()).unwrap();
        let h = grid.spacing()[0];
        assert_approx_eq!(
            f64,
            critical_dt(&pde),
            h / f64::abs(c),
            epsilon = 1e-12
        );
        let dt = 0.8 * h / f64::abs(c);
        let operator = Operator::new(
            &grid,
            pde,
            dt,
            Boundary::Dirichlet(0.0),
            OperatorParameters::default(),
        )
        .unwrap();

        let mut initial = OwnedDomain::new(grid.aabb());
        fdtm::init::box_pulse(
            &mut initial,
            &grid,
            &vector![lo],
            &vector![hi],
            1.0,
            0.0,
            64,
        );
        let mut field = TimeField::new(&grid, 1, false).unwrap();
        field.set_initial_from(&initial, 64).unwrap();
        let (mass_0, x_0) = first_moment(&grid, field.current());

        for step in 1..=steps {
            let summary = operator.apply(&mut field, None, None, 1).unwrap();
            assert!(summary.max_abs <= 1.0 + 1e-12);
            let (mass, x) = first_moment(&grid, field.current());
            assert_approx_eq!(f64, mass, mass_0, epsilon = 1e-9);
            let expected = x_0 + c * dt * step as f64;
            assert_approx_eq!(f64, x, expected, epsilon = 1e-9);
        }
    }
}

#[test]
fn convection_above_bound_blows_up() {
    let grid = Grid::<1>::from_extent(&[101], &[1.0], &[0.0]).unwrap();
    let pde = Pde::convection(&vector![1.0], 1, &grid.spacing()).unwrap();
    let dt = 2.5 * critical_dt(&pde);

    let rejecting = Operator::new(
        &grid,
        pde.clone(),
        dt,
        Boundary::Periodic,
        OperatorParameters::default(),
    )
    .unwrap();
    let mut field = TimeField::new(&grid, 1, false).unwrap();
    field.set_initial(|c| if (40..60).contains(&c[0]) { 1.0 } else { 0.0 }, 16);
    assert!(matches!(
        rejecting.apply(&mut field, None, None, 10),
        Err(Error::UnstableTimestep { .. })
    ));

    let params = OperatorParameters {
        stability: StabilityPolicy::Warn,
        ..Default::default()
    };
    let warning =
        Operator::new(&grid, pde, dt, Boundary::Periodic, params).unwrap();
    let result = warning.apply(&mut field, None, None, 2000);
    match result {
        Err(e @ Error::NonFinite { step }) => {
            assert!(e.is_instability());
            assert!(step > 0 && step <= 2000);
            assert_eq!(step % params.check_interval, 0);
        }
        other => panic!("expected a non-finite error, got {other:?}"),
    }
}

#[test]
fn impulse_round_trip_is_self_weight() {
    let grid = Grid::<2>::from_spacing(&[11, 9], &[10.0, 12.5], &[-50.0, 0.0])
        .unwrap()
        .with_damping_layer(3)
        .unwrap();
    let positions = vec![
        vector![-13.0, 47.0],
        vector![0.0, 0.0],
        vector![50.0, 100.0],
        vector![-80.0, -37.5],
    ];
    for p in positions {
        let points = SparsePoints::new(&grid, vec![p]).unwrap();
        let mut domain = OwnedDomain::new(grid.aabb());
        points.inject(&mut domain, &[1.0], &Parameter::Constant(1.0));
        let mut sample = [0.0];
        points.interpolate(&domain, &mut sample);
        assert_approx_eq!(
            f64,
            sample[0],
            points.self_weight(0),
            epsilon = 1e-14
        );
    }

    let grid =
        Grid::<3>::from_spacing(&[5, 5, 5], &[1.0, 2.0, 3.0], &[0.0; 3])
            .unwrap();
    let points =
        SparsePoints::new(&grid, vec![vector![1.3, 4.1, 11.9]]).unwrap();
    assert_eq!(points.support(0).len(), 8);
    let mut domain = OwnedDomain::new(grid.aabb());
    points.inject(&mut domain, &[1.0], &Parameter::Constant(1.0));
    let mut sample = [0.0];
    points.interpolate(&domain, &mut sample);
    assert_approx_eq!(f64, sample[0], points.self_weight(0), epsilon = 1e-14);
    assert!(points.self_weight(0) < 1.0);
}

#[test]
fn trace_length_is_step_count() {
    let grid = Grid::<1>::from_spacing(&[31], &[1.0], &[0.0]).unwrap();
    let pde = Pde::wave(Parameter::Constant(1.0), None, 2, &grid.spacing())
        .unwrap();
    let operator = Operator::new(
        &grid,
        pde,
        0.5,
        Boundary::Dirichlet(0.0),
        OperatorParameters::default(),
    )
    .unwrap();
    let mut receivers =
        Receivers::new(&grid, vec![vector![3.5], vector![10.0], vector![30.0]])
            .unwrap();
    for nt in [0, 1, 7, 64] {
        let mut field = TimeField::new(&grid, 2, false).unwrap();
        field.set_initial(|c| if c[0] == 15 { 1.0 } else { 0.0 }, 8);
        operator
            .apply(&mut field, None, Some(&mut receivers), nt)
            .unwrap();
        assert_eq!(receivers.traces().nt(), nt);
        assert_eq!(receivers.traces().npoint(), 3);
        assert_eq!(receivers.traces().data().len(), 3 * nt);
    }
}

#[test]
fn wave_bound_scales_with_spacing_over_velocity() {
    for (h, v) in [(1.0, 1.0), (10.0, 1500.0), (2.5, 4000.0)] {
        let mass = Parameter::Constant(1.0 / (v * v));
        let order_2 =
            Pde::<1>::wave(mass.clone(), None, 2, &vector![h]).unwrap();
        assert_approx_eq!(
            f64,
            critical_dt(&order_2),
            h / v,
            epsilon = 1e-12 * h / v
        );

        let order_4 =
            Pde::<1>::wave(mass.clone(), None, 4, &vector![h]).unwrap();
        assert_approx_eq!(
            f64,
            critical_dt(&order_4),
            0.75f64.sqrt() * h / v,
            epsilon = 1e-12 * h / v
        );

        let mass = Parameter::Constant(1.0 / (v * v));
        let order_2_2d = Pde::<2>::wave(mass, None, 2, &vector![h, h]).unwrap();
        assert_approx_eq!(
            f64,
            critical_dt(&order_2_2d),
            h / (v * 2.0f64.sqrt()),
            epsilon = 1e-12 * h / v
        );
    }
}

#[test]
fn reset_reproduces_runs() {
    let grid =
        Grid::<2>::from_spacing(&[25, 25], &[10.0, 10.0], &[0.0, 0.0]).unwrap();
    let model = VelocityModel::constant(grid, 1500.0, 8, 4, 128).unwrap();
    let dt = 0.8 * model.critical_dt();
    let geometry = Geometry {
        receiver_positions: vec![vector![20.0, 60.0], vector![20.0, 180.0]],
        f0: 20.0,
        amplitude: 1.0,
        time_axis: TimeAxis::new(0.0, dt, 80).unwrap(),
    };
    let solver =
        AcousticSolver::new(model, geometry, OperatorParameters::default())
            .unwrap();
    let source = vector![120.0, 120.0];

    let mut field = solver.new_field(false).unwrap();
    let first = solver.forward_into(&mut field, source).unwrap();
    assert!(first.max_abs() > 0.0);

    // the second run starts from where the first stopped
    let accumulated = solver.forward_into(&mut field, source).unwrap();
    assert_ne!(accumulated, first);

    field.reset(1024);
    let again = solver.forward_into(&mut field, source).unwrap();
    assert_eq!(again.data(), first.data());
}
