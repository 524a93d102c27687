//! End-to-end evaluations against canned provider responses and the JSON
//! model fixtures in `tests/fixtures`.
use async_trait::async_trait;
use fire_risk_core::weather::open_meteo::parse_current;
use fire_risk_core::{
    ArtifactCell, BaselineConfig, Coordinates, FeatureVector, MeteorologicalRiskService,
    ModelArtifacts, RiskClassifier, RiskError, RiskVerdict, ScaledFeatures, StandardScaler,
    WeatherObservation, WeatherProvider, FEATURE_NAMES,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const HOT: &str = include_str!("fixtures/open_meteo_hot.json");
const WET: &str = include_str!("fixtures/open_meteo_wet.json");
const NO_WIND: &str = include_str!("fixtures/open_meteo_no_wind.json");

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Serves the same provider body for every coordinate.
struct CannedResponse {
    body: &'static str,
    calls: AtomicUsize,
}

impl CannedResponse {
    fn new(body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            body,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl WeatherProvider for CannedResponse {
    async fn fetch_current(&self, _coords: Coordinates) -> fire_risk_core::Result<WeatherObservation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        parse_current(self.body)
    }
    fn name(&self) -> &str {
        "canned"
    }
}

struct Unreachable;

#[async_trait]
impl WeatherProvider for Unreachable {
    async fn fetch_current(&self, _coords: Coordinates) -> fire_risk_core::Result<WeatherObservation> {
        Err(RiskError::WeatherFetch {
            message: "gave up after 6 attempts: connection refused".into(),
            transient: false,
        })
    }
    fn name(&self) -> &str {
        "unreachable"
    }
}

/// Classifier answering a fixed probability
struct Fixed(f64);

impl RiskClassifier for Fixed {
    fn predict(&self, _features: &ScaledFeatures) -> fire_risk_core::Result<f64> {
        Ok(self.0)
    }
    fn name(&self) -> &str {
        "fixed"
    }
}

fn fixture_artifacts() -> Arc<ModelArtifacts> {
    Arc::new(
        ModelArtifacts::load(
            &fixture("std_scaler_weather.json"),
            &fixture("meteorological-classifier.json"),
        )
        .unwrap(),
    )
}

fn stub_artifacts(probability: f64) -> Arc<ModelArtifacts> {
    Arc::new(ModelArtifacts::new(StandardScaler::identity(), Arc::new(Fixed(probability))).unwrap())
}

fn service(
    provider: Arc<dyn WeatherProvider>,
    artifacts: Arc<ModelArtifacts>,
) -> MeteorologicalRiskService {
    MeteorologicalRiskService::new(provider, artifacts, BaselineConfig::default())
}

#[tokio::test]
async fn test_hot_dry_afternoon_is_high_risk() {
    init_tracing();
    let provider = CannedResponse::new(HOT);
    let svc = service(provider.clone(), fixture_artifacts());

    let assessment = svc.evaluate_meteorological_risk(-33.87, 151.21).await.unwrap();
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert!(assessment.probability > 0.99, "p = {}", assessment.probability);
    assert_eq!(assessment.status, 1);
    assert_eq!(assessment.confidence, 100);
    // January from the provider-local timestamp selects the 6.5 day-length factor
    assert!((assessment.indices.dc - (15.0 + 6.5 * 34.2 * 0.036)).abs() < 1e-9);
}

#[tokio::test]
async fn test_cool_wet_morning_is_low_risk() {
    let svc = service(CannedResponse::new(WET), fixture_artifacts());

    let assessment = svc.evaluate_meteorological_risk(47.5, 8.5).await.unwrap();
    assert!(assessment.probability < 0.01);
    assert_eq!(assessment.status, 0);
    assert!(assessment.confidence >= 99);
    assert!(assessment.indices.ffmc < 50.0);
}

#[tokio::test]
async fn test_missing_wind_speed_is_incomplete_observation() {
    let svc = service(CannedResponse::new(NO_WIND), stub_artifacts(0.9));

    let err = svc.evaluate_meteorological_risk(36.75, 3.0).await.unwrap_err();
    assert!(
        matches!(err, RiskError::IncompleteObservation { field: "wind_speed", .. }),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn test_fetch_failure_has_no_fallback_probability() {
    let svc = service(Arc::new(Unreachable), stub_artifacts(0.9));

    let err = svc.evaluate_meteorological_risk(0.0, 0.0).await.unwrap_err();
    assert!(matches!(err, RiskError::WeatherFetch { .. }));
}

#[test]
fn test_nine_feature_vector_is_schema_mismatch() {
    let svc = service(CannedResponse::new(HOT), stub_artifacts(0.9));
    let names = FEATURE_NAMES[..9].iter().map(ToString::to_string).collect();
    let features = FeatureVector::from_parts(names, vec![1.0; 9]).unwrap();

    let err = svc.classify(&features).unwrap_err();
    assert!(matches!(err, RiskError::SchemaMismatch(_)));
}

#[test]
fn test_reordered_features_are_schema_mismatch() {
    let svc = service(CannedResponse::new(HOT), stub_artifacts(0.9));
    let mut names: Vec<String> = FEATURE_NAMES.iter().map(ToString::to_string).collect();
    names.swap(4, 5);
    let features = FeatureVector::from_parts(names, vec![1.0; 10]).unwrap();

    assert!(matches!(
        svc.classify(&features),
        Err(RiskError::SchemaMismatch(_))
    ));
}

#[tokio::test]
async fn test_status_and_confidence_follow_probability() {
    // Confidence rounds half to even: 62.5 -> 62
    let cases = [
        (0.5, 0, 50),
        (0.500_001, 1, 50),
        (0.625, 1, 62),
        (0.375, 0, 62),
        (0.97, 1, 97),
        (0.03, 0, 97),
    ];
    for (probability, status, confidence) in cases {
        let svc = service(CannedResponse::new(HOT), stub_artifacts(probability));
        let assessment = svc.evaluate_meteorological_risk(-33.87, 151.21).await.unwrap();
        assert_eq!(assessment.probability, probability);
        assert_eq!(assessment.status, status, "p = {probability}");
        assert_eq!(assessment.confidence, confidence, "p = {probability}");
        assert!(assessment.confidence >= 50);
    }
}

#[test]
fn test_confidence_never_below_half_for_any_probability() {
    for step in 0..=1000 {
        let p = f64::from(step) / 1000.0;
        let verdict = RiskVerdict::from_probability(p).unwrap();
        assert!(verdict.confidence >= 50, "p = {p}");
        assert_eq!(verdict.status == 1, p > 0.5, "p = {p}");
    }
}

#[tokio::test]
async fn test_out_of_range_classifier_output_is_numeric_error() {
    for probability in [f64::NAN, 1.3] {
        let svc = service(CannedResponse::new(HOT), stub_artifacts(probability));
        let err = svc.evaluate_meteorological_risk(-33.87, 151.21).await.unwrap_err();
        assert!(
            matches!(err, RiskError::NumericDomain { stage: "verdict", .. }),
            "p = {probability}: {err}"
        );
    }
}

#[tokio::test]
async fn test_concurrent_evaluations_share_artifacts() {
    init_tracing();
    let svc = Arc::new(service(CannedResponse::new(HOT), fixture_artifacts()));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let svc = Arc::clone(&svc);
            tokio::spawn(async move {
                svc.evaluate_meteorological_risk(-33.0 - f64::from(i) * 0.1, 151.0)
                    .await
            })
        })
        .collect();

    let mut probabilities = Vec::new();
    for handle in handles {
        probabilities.push(handle.await.unwrap().unwrap().probability);
    }
    assert!(probabilities.windows(2).all(|w| w[0].to_bits() == w[1].to_bits()));
}

#[test]
fn test_artifact_cell_loads_once_and_survives_failure() {
    let cell = ArtifactCell::new();

    let missing = cell.get_or_load(|| {
        ModelArtifacts::load(&fixture("absent.json"), &fixture("meteorological-classifier.json"))
    });
    assert!(matches!(missing, Err(RiskError::Artifact { .. })));
    assert!(cell.get().is_none());

    let first = cell.get_or_load(|| Ok((*fixture_artifacts()).clone())).unwrap();
    let second = cell
        .get_or_load(|| panic!("artifacts must not be reloaded"))
        .unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}
