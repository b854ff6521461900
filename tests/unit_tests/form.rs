use fenris_dpg::coefficient::CoefficientFunction;
use fenris_dpg::error::DpgError;
use fenris_dpg::form::{build_integrator, parse_forms, CoefficientExpression, CoefficientTable, FormDefinition, FormOptions};
use fenris_dpg::integrator::{CompoundIndices, IntegratorKind, VolumeCoefficientPolicy};
use num::Complex;

fn table() -> CoefficientTable {
    CoefficientTable::new()
        .with("a", 2.0)
        .with("kappa", Complex::new(0.0, 1.0))
        .with("gx", CoefficientFunction::from_fn(|x| x[0]))
        .with("gy", 0.0)
}

#[test]
fn parse_pairing_definition() {
    let definition: FormDefinition = "GradGrad 1 2 a".parse().unwrap();
    assert_eq!(definition.kind, IntegratorKind::GradGrad);
    assert_eq!(
        definition.arguments,
        vec![
            CoefficientExpression::Real(1.0),
            CoefficientExpression::Real(2.0),
            CoefficientExpression::Named("a".to_string()),
        ]
    );

    let integrator = build_integrator(&definition, &table(), &FormOptions::default()).unwrap();
    let pairing = integrator.as_pairing().unwrap();
    assert_eq!(pairing.indices(), CompoundIndices::new(0, 1));
    assert_eq!(pairing.coefficient().constant_value(), Some(Complex::new(2.0, 0.0)));
}

#[test]
fn parse_complex_literals_with_spaces() {
    let definition: FormDefinition = "  FluxTrace 2   1 ( 1.5, -2.0 ) ".parse().unwrap();
    assert_eq!(definition.kind, IntegratorKind::FluxTrace);
    assert_eq!(definition.arguments[2], CoefficientExpression::Complex(Complex::new(1.5, -2.0)));

    let integrator = build_integrator(&definition, &table(), &FormOptions::default()).unwrap();
    assert!(integrator.is_complex());
    assert!(!integrator.is_symmetric());
}

#[test]
fn parse_neumann_definition() {
    let definition: FormDefinition = "NeumannVolume 1 0.0 gx gy".parse().unwrap();
    let integrator = build_integrator(&definition, &table(), &FormOptions::default()).unwrap();
    assert_eq!(integrator.kind(), IntegratorKind::NeumannVolume);
    assert_eq!(integrator.summary().components, vec![1]);
}

#[test]
fn malformed_definitions_are_rejected() {
    assert!(matches!(
        "".parse::<FormDefinition>(),
        Err(DpgError::MalformedExpression { .. })
    ));
    assert!(matches!(
        "EyeEye 1 1 (1.0".parse::<FormDefinition>(),
        Err(DpgError::MalformedExpression { .. })
    ));
    assert!(matches!(
        "EyeEye 1 1 1.0)".parse::<FormDefinition>(),
        Err(DpgError::MalformedExpression { .. })
    ));
    assert!(matches!(
        "EyeEye 1 1 (1.0;2.0)".parse::<FormDefinition>(),
        Err(DpgError::MalformedExpression { .. })
    ));
    assert!(matches!(
        "EyeEye 1 1 2x".parse::<FormDefinition>(),
        Err(DpgError::MalformedExpression { .. })
    ));
    assert_eq!(
        "Laplace 1 1 1".parse::<FormDefinition>(),
        Err(DpgError::UnknownIntegrator {
            name: "Laplace".to_string()
        })
    );
}

#[test]
fn configuration_errors_are_reported() {
    let options = FormOptions::default();
    let build = |line: &str| build_integrator(&line.parse().unwrap(), &table(), &options);

    assert_eq!(
        build("EyeEye 1 1 b").unwrap_err(),
        DpgError::UnknownCoefficient { name: "b".to_string() }
    );
    assert_eq!(build("EyeEye gx 1 a").unwrap_err(), DpgError::NonConstantComponentIndex);
    assert_eq!(
        build("EyeEye 0 1 a").unwrap_err(),
        DpgError::InvalidComponentIndex { value: 0.0 }
    );
    assert!(matches!(
        build("TraceTrace 1 1"),
        Err(DpgError::WrongArgumentCount { found: 2, .. })
    ));
}

#[test]
fn options_select_volume_coefficient_policy() {
    let strict = FormOptions {
        volume_coefficient_policy: VolumeCoefficientPolicy::RequireConstant,
    };
    let definition: FormDefinition = "RobinVolume 1 1 gx".parse().unwrap();
    assert!(build_integrator(&definition, &table(), &FormOptions::default()).is_ok());
    assert!(matches!(
        build_integrator(&definition, &table(), &strict),
        Err(DpgError::UnsupportedCoefficient { .. })
    ));
}

#[test]
fn form_options_deserialize_with_defaults() {
    let options: FormOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(options, FormOptions::default());

    let options: FormOptions = serde_json::from_str(r#"{ "volume_coefficient_policy": "RequireConstant" }"#).unwrap();
    assert_eq!(options.volume_coefficient_policy, VolumeCoefficientPolicy::RequireConstant);

    let json = serde_json::to_string(&options).unwrap();
    assert_eq!(serde_json::from_str::<FormOptions>(&json).unwrap(), options);
}

#[test]
fn parse_form_block() {
    let text = "
        # Ultraweak Poisson
        GradGrad 1 1 a
        FluxTrace 2 1 1.0

        TraceTraceBoundary 1 1 kappa
    ";
    let integrators = parse_forms(text, &table(), &FormOptions::default()).unwrap();
    let kinds: Vec<_> = integrators.iter().map(|integrator| integrator.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            IntegratorKind::GradGrad,
            IntegratorKind::FluxTrace,
            IntegratorKind::TraceTraceBoundary
        ]
    );

    let error = parse_forms("GradGrad 1 1 a\nEyeEye 1 1 missing", &table(), &FormOptions::default()).unwrap_err();
    assert_eq!(
        error,
        DpgError::UnknownCoefficient {
            name: "missing".to_string()
        }
    );
}
