use ndarray as nd;
use gcmq::{
    grid::Grid,
    utils::trapz2,
    BasisIndex,
    Config,
    GcmError,
    Method,
    NullSink,
    Parity,
    ParityClass,
    SavedState,
    Solver,
    Strategy,
    Symmetry,
    TextSink,
};

const POLAR: &str = r#"
    max_e = 12
    count = 6
    method = "banded"
    strategy = "algebraic"

    [basis]
    family = "polar"

    [params]
    a = -0.5
    b = 0.9
    c = 0.4
    k = 2.0
"#;

const PURE_COLLECTIVE: &str = r#"
    max_e = 8
    count = 0
    method = "dense"
    strategy = "algebraic"

    [basis]
    family = "collective"

    [params]
    a = 1.0
    b = 0.0
    c = 0.0
    k = 2.0
"#;

#[test]
fn basis_sizes() {
    for e in 0..12 {
        let all = BasisIndex::polar(e, Symmetry::None, ParityClass::Both);
        assert_eq!(all.len(), e * (e + 1) / 2);
        let even = BasisIndex::polar(e, Symmetry::None, ParityClass::Even);
        let odd = BasisIndex::polar(e, Symmetry::None, ParityClass::Odd);
        assert_eq!(even.len() + odd.len(), all.len());
        let three = BasisIndex::polar(e, Symmetry::Threefold, ParityClass::Both);
        assert!(three.len() <= all.len());
        assert!(three.iter().all(|(_, m)| m % 3 == 0));
        assert_eq!(BasisIndex::cartesian(e).len(), all.len());
        let coll = BasisIndex::collective(e);
        assert!(coll.iter().all(|(n, mu)| 2 * n + 3 * mu as usize + 1 <= e));
    }
}

#[test]
fn pure_oscillator_spectrum() {
    let cfg = Config::from_toml_str(PURE_COLLECTIVE).unwrap();
    let solver = cfg.solver().unwrap();
    let res = solver.compute(cfg.max_e, cfg.count, cfg.vectors, cfg.method, &mut NullSink)
        .unwrap();
    assert_eq!(res.len(), BasisIndex::collective(8).len());
    for (e, expected) in res.values.iter().zip([2.5, 4.5, 5.5, 6.5]) {
        assert!((e - expected).abs() < 1e-10, "{e} != {expected}");
    }
    for k in 0..4 {
        assert!((solver.mean_quanta(k).unwrap() - res.values[k]).abs() < 1e-8);
    }
}

#[test]
fn strategies_and_methods_agree() {
    let cfg = Config::from_toml_str(POLAR).unwrap();
    let alg = cfg.solver().unwrap();
    let banded = alg.compute(cfg.max_e, cfg.count, true, Method::Banded, &mut NullSink)
        .unwrap();
    let dense = alg.compute(cfg.max_e, 0, false, Method::Dense, &mut NullSink)
        .unwrap();
    for k in 0..cfg.count {
        assert!((banded.values[k] - dense.values[k]).abs() < 1e-9);
    }

    let quad = Config {
        strategy: gcmq::StrategyKind::Quadrature,
        quadrature: gcmq::QuadratureOptions { epsilon: 1e-10, points: 3000, maxiters: 1000 },
        ..cfg.clone()
    };
    let quad = quad.solver().unwrap();
    let mut sink = TextSink::new();
    let numeric = quad.compute(cfg.max_e, cfg.count, false, Method::Banded, &mut sink)
        .unwrap();
    assert!(!sink.lines().is_empty());
    for k in 0..cfg.count {
        assert!(
            (numeric.values[k] - banded.values[k]).abs() < 1e-5,
            "state {k}: {} vs {}", numeric.values[k], banded.values[k],
        );
    }
}

#[test]
fn cartesian_and_polar_spectra_coincide() {
    let cfg = Config { max_e: 10, ..Config::from_toml_str(POLAR).unwrap() };
    let cart = Config { basis: gcmq::BasisFamily::Cartesian, ..cfg.clone() };
    let cart = cart.solver().unwrap();
    let cart = cart.compute(cfg.max_e, 0, false, Method::Dense, &mut NullSink).unwrap();

    let polar = Config {
        basis: gcmq::BasisFamily::Polar {
            symmetry: Symmetry::None,
            parity: ParityClass::Both,
        },
        strategy: gcmq::StrategyKind::Quadrature,
        quadrature: gcmq::QuadratureOptions { epsilon: 1e-10, points: 3000, maxiters: 1000 },
        ..cfg.clone()
    };
    let polar = polar.solver().unwrap();
    let polar = polar.compute(cfg.max_e, 0, false, Method::Dense, &mut NullSink).unwrap();

    assert_eq!(cart.len(), cfg.max_e * (cfg.max_e + 1) / 2);
    assert_eq!(cart.len(), polar.len());
    for (k, (a, b)) in cart.values.iter().zip(polar.values.iter()).enumerate() {
        assert!((a - b).abs() < 1e-5, "state {k}: {a} vs {b}");
    }
}

#[test]
fn ground_state_is_variational() {
    let cfg = Config {
        basis: gcmq::BasisFamily::Collective,
        ..Config::from_toml_str(POLAR).unwrap()
    };
    let solver = cfg.solver().unwrap();
    let e0: Vec<f64>
        = [16, 20, 24, 32].into_iter()
        .map(|max_e| {
            solver.compute(max_e, 1, false, Method::Banded, &mut NullSink)
                .unwrap()
                .values[0]
        })
        .collect();
    // nested bases: each enlargement can only lower the ground state
    for pair in e0.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-10, "{e0:?}");
    }
    assert!(e0[0] - e0[3] > 1e-4, "{e0:?}");
    assert!(e0[2] - e0[3] < 1e-4, "{e0:?}");
}

#[test]
fn save_restore_and_tabulate() {
    let cfg = Config::from_toml_str(POLAR).unwrap();
    let solver = cfg.solver().unwrap();
    solver.compute(cfg.max_e, cfg.count, true, cfg.method, &mut NullSink).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.toml");
    solver.save_state().unwrap().write(&path).unwrap();
    let restored = Solver::restore(&SavedState::read(&path).unwrap(), Strategy::default())
        .unwrap();

    let grid = Grid::closed(-6.0, 6.0, 481).unwrap();
    let x = grid.points();
    for k in 0..3 {
        assert_eq!(solver.parity(k).unwrap(), restored.parity(k).unwrap());
        let rho = restored.density_matrix(k, &x, &x).unwrap();
        assert!(rho.iter().all(|r| *r >= 0.0));
        let norm = trapz2(&rho, grid.step(), grid.step());
        assert!((norm - 1.0).abs() < 1e-4, "state {k}: norm {norm}");
    }

    // states of definite parity are symmetric under y -> -y
    assert_eq!(restored.parity(0).unwrap(), Parity::Even);
    let rho = restored.density_matrix(0, &x, &x).unwrap();
    let flipped = rho.slice(nd::s![.., ..;-1]);
    assert!(rho.iter().zip(flipped.iter()).all(|(a, b)| (a - b).abs() < 1e-10));

    assert!(matches!(restored.density_matrix(cfg.count, &x, &x), Err(GcmError::StateIndex(..))));
}
