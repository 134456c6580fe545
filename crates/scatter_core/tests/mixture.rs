use glam::DVec3;
use scatter_core::{
    allocate_samples,
    config::palette,
    evaluate_density_grid, generate_mixture_samples,
    metrics::SampleMoments,
    render_projection, CholeskyError, Covariance, EngineError, MixtureComponent, ProjectionPlane,
    RasterSettings, Rgba8,
};

fn two_cluster_mixture() -> Vec<MixtureComponent> {
    vec![
        MixtureComponent {
            weight: 0.5,
            mean: DVec3::new(-1.0, 0.0, 0.0),
            covariance: Covariance::diagonal(0.4, 0.2, 0.6),
            sample_count: 0,
            color: palette::steel_blue(),
        },
        MixtureComponent {
            weight: 0.5,
            mean: DVec3::new(1.5, 0.5, -0.5),
            covariance: Covariance {
                c11: 0.3,
                c12: 0.1,
                c13: 0.0,
                c22: 0.5,
                c23: -0.05,
                c33: 0.3,
            },
            sample_count: 0,
            color: palette::indian_red(),
        },
    ]
}

#[test]
fn two_cluster_scene_end_to_end() {
    let components = two_cluster_mixture();
    let counts = allocate_samples(&components, Some(1000)).expect("allocation failed");
    assert_eq!(counts, vec![500, 500]);

    let cloud = generate_mixture_samples(&components, Some(1000), 42).expect("sampling failed");
    assert_eq!(cloud.len(), 1000);
    assert_eq!(cloud.colors.len(), 1000);

    let blue = palette::steel_blue();
    let blue_count = cloud.colors.iter().filter(|&&c| c == blue).count();
    assert_eq!(blue_count, 500);

    // Each cluster's sample mean lands near its configured mean.
    for (range, component) in [(0..500, &components[0]), (500..1000, &components[1])] {
        let moments = SampleMoments::from_points(
            cloud.positions[range].iter().map(|p| p.as_dvec3()),
        );
        let drift = (moments.mean - component.mean).abs().max_element();
        assert!(drift < 0.15, "cluster mean drifted by {drift}");
    }

    let settings = RasterSettings::default();
    for plane in ProjectionPlane::ALL {
        let image = render_projection(&cloud.positions, &cloud.colors, plane, &settings)
            .expect("projection failed");
        let lit = image.pixels().iter().filter(|&&p| p != Rgba8::WHITE).count();
        assert!(lit > 0, "{} projection is blank", plane.label());
        assert!(image
            .pixels()
            .iter()
            .all(|&p| p == Rgba8::WHITE
                || p == palette::steel_blue().to_rgba8()
                || p == palette::indian_red().to_rgba8()));
    }

    let grid = evaluate_density_grid(&components, 32, 3.0).expect("density failed");
    let peak = grid.values().iter().copied().fold(0.0f32, f32::max);
    assert_eq!(peak, 1.0);
}

#[test]
fn generation_is_bit_for_bit_reproducible() {
    let components = two_cluster_mixture();
    let first = generate_mixture_samples(&components, Some(2500), 0xDEADBEEF).unwrap();
    let second = generate_mixture_samples(&components, Some(2500), 0xDEADBEEF).unwrap();
    assert_eq!(first, second);

    let settings = RasterSettings::default();
    let a = render_projection(&first.positions, &first.colors, ProjectionPlane::XZ, &settings).unwrap();
    let b = render_projection(&second.positions, &second.colors, ProjectionPlane::XZ, &settings).unwrap();
    assert_eq!(a, b);
}

#[test]
fn density_tolerates_what_sampling_rejects() {
    let mut components = two_cluster_mixture();
    components[0].covariance = Covariance::diagonal(0.0, 1.0, 1.0);

    let err = generate_mixture_samples(&components, Some(100), 1).unwrap_err();
    assert_eq!(
        err,
        EngineError::NonPositiveDefinite {
            index: 0,
            reason: CholeskyError::FirstPivot,
        }
    );
    assert!(err.to_string().contains("C11<=0"));

    let grid = evaluate_density_grid(&components, 16, 3.0).expect("density must skip the bad component");
    let peak = grid.values().iter().copied().fold(0.0f32, f32::max);
    assert_eq!(peak, 1.0);
    assert!(grid.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
}

#[test]
fn explicit_counts_override_total() {
    let mut components = two_cluster_mixture();
    components[0].sample_count = 120;
    components[1].sample_count = 30;
    let cloud = generate_mixture_samples(&components, Some(1000), 5).unwrap();
    assert_eq!(cloud.len(), 150);
}
