#![allow(non_snake_case)]

use krylov::{algebra::*, solver::traits::EigenMethod, solver::*, timers::Timers};
use std::rc::Rc;

// plain power iteration, as an example of a user supplied method
struct PowerMethod {}

impl EigenMethod<f64> for PowerMethod {
    fn name(&self) -> &'static str {
        "power"
    }

    fn validate(&self, _op: &SpectralTransform<f64>, settings: &EigenSettings<f64>) -> Result<(), KrylovError> {
        match settings.nev {
            1 => Ok(()),
            _ => Err(KrylovError::PreconditionViolation("power method finds one eigenpair".to_string())),
        }
    }

    fn solve(
        &mut self,
        ctx: &SolveContext<'_, f64>,
        info: &mut EigenInfo<f64>,
        _timers: &mut Timers,
    ) -> Result<EigenSolution<f64>, KrylovError> {
        let n = ctx.n();
        let mut x = vec![1.; n];
        x.normalize();
        let mut y = vec![0.; n];
        let mut θ = 0.;

        for its in 1..=ctx.max_it() {
            ctx.op.apply(&x, &mut y)?;
            θ = x.dot(&y);
            let mut r = y.clone();
            r.axpby(-θ, &x, 1.);
            let errest = ctx.criterion.error_estimate(θ, 0., r.norm());
            let nconv = usize::from(ctx.criterion.passes(errest));
            if ctx.report(info, its, nconv, Some(errest), 1) {
                info.reason = ConvergedReason::StoppedByUser;
                break;
            }
            if nconv == 1 {
                info.reason = ConvergedReason::ConvergedTol;
                break;
            }
            x.copy_from(&y);
            x.normalize();
        }

        let nconv = usize::from(info.reason.is_converged());
        let mut solution = EigenSolution::new(n, nconv, 1);
        if nconv == 1 {
            let (re, im) = ctx.op.back_transform(θ, 0.);
            solution.push(re, im, info.errest, &x, None)?;
        }
        ctx.finish(&mut solution, info);
        Ok(solution)
    }
}

#[test]
fn test_register_method() {
    let registry = f64::method_registry();
    registry.register("power", |_| Box::new(PowerMethod {}));
    assert!(registry.names().contains(&"power".to_string()));

    let A = Matrix::diagonal(&[1., 2., 3., 10.]);
    let settings = EigenSettingsBuilder::<f64>::default()
        .method("power".to_string())
        .tol(1e-10)
        .build()
        .unwrap();
    let mut solver = EigenSolver::new(EigenProblem::new(Rc::new(A.clone())), settings).unwrap();
    assert_eq!(solver.method_name(), "power");
    solver.solve().unwrap();
    assert!((solver.solution.eigenvalue(0).0 - 10.).abs() < 1e-9);

    // the method checks its own preconditions
    let settings = EigenSettingsBuilder::<f64>::default()
        .method("power".to_string())
        .nev(2)
        .build()
        .unwrap();
    let err = EigenSolver::new(EigenProblem::new(Rc::new(A)), settings).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::PreconditionViolation);
}

#[test]
fn test_unknown_method() {
    let A = Matrix::<f64>::identity(5);
    let settings = EigenSettingsBuilder::<f64>::default()
        .method("jacobi-davidson".to_string())
        .build()
        .unwrap();
    let err = EigenSolver::new(EigenProblem::new(Rc::new(A)), settings).err().unwrap();
    assert!(matches!(err, KrylovError::PreconditionViolation(_)));
}

#[test]
fn test_bad_settings() {
    assert!(EigenSettingsBuilder::<f64>::default().keep(1.5).build().is_err());
    let mut settings = EigenSettings::<f64>::default();
    settings.keep = 1.5;
    assert_eq!(settings.validate(), Err(SettingsError::BadFieldValue("keep")));

    // invalid values set after construction are caught by the solver
    let A = Matrix::<f64>::identity(5);
    let mut settings = EigenSettings::default();
    settings.tol = -1.;
    let err = EigenSolver::new(EigenProblem::new(Rc::new(A.clone())), settings).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::PreconditionViolation);

    // subspace too small for the requested pairs
    let settings = EigenSettingsBuilder::<f64>::default().nev(3).ncv(2).build().unwrap();
    assert!(EigenSolver::new(EigenProblem::new(Rc::new(A.clone())), settings).is_err());

    // krylov methods need ncv > nev unless the whole space fits
    let A = Matrix::<f64>::identity(10);
    let settings = EigenSettingsBuilder::<f64>::default().nev(3).ncv(3).build().unwrap();
    assert!(EigenSolver::new(EigenProblem::new(Rc::new(A.clone())), settings).is_err());
    let settings = EigenSettingsBuilder::<f64>::default()
        .nev(3)
        .ncv(3)
        .method("dense".to_string())
        .build()
        .unwrap();
    assert!(EigenSolver::new(EigenProblem::new(Rc::new(A)), settings).is_ok());
}

#[test]
fn test_user_test_requires_function() {
    let A = Matrix::<f64>::identity(5);
    let settings = EigenSettingsBuilder::<f64>::default()
        .conv_test(ConvergenceTest::User)
        .method("dense".to_string())
        .build()
        .unwrap();
    let mut solver = EigenSolver::new(EigenProblem::new(Rc::new(A)), settings).unwrap();
    let err = solver.solve().err().unwrap();
    assert_eq!(err.kind(), ErrorKind::PreconditionViolation);
    assert_eq!(solver.solution.nconv, 0);
}

#[cfg(feature = "serde")]
#[test]
fn test_settings_json() {
    let settings = EigenSettingsBuilder::<f64>::default()
        .nev(6)
        .which(Which::TargetReal)
        .target(2.5)
        .restart(RestartType::Explicit)
        .build()
        .unwrap();
    let json = serde_json::to_string(&settings).unwrap();
    let back: EigenSettings<f64> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.nev, 6);
    assert_eq!(back.which, Which::TargetReal);
    assert_eq!(back.target, 2.5);
    assert_eq!(back.restart, RestartType::Explicit);

    // missing fields take their defaults
    let partial: EigenSettings<f64> = serde_json::from_str(r#"{"nev": 3}"#).unwrap();
    assert_eq!(partial.nev, 3);
    assert_eq!(partial.method, "arnoldi");
}

#[test]
fn test_timers_are_recorded() {
    let n = 30;
    let A = Matrix::<f64>::tridiagonal(&vec![2.; n], &vec![-1.; n - 1]);
    let settings = EigenSettingsBuilder::<f64>::default()
        .nev(2)
        .problem_type(ProblemType::Hermitian)
        .method("lanczos".to_string())
        .build()
        .unwrap();
    let mut solver = EigenSolver::new(EigenProblem::new(Rc::new(A)), settings).unwrap();
    solver.solve().unwrap();

    let timers = solver.timers.as_ref().unwrap();
    assert!(timers.elapsed(&["setup"]).is_some());
    assert!(timers.elapsed(&["solve", "factorization"]).is_some());
    assert!(solver.info.solve_time > 0.);
    assert_eq!(solver.solution.solve_time, solver.info.solve_time);
}
