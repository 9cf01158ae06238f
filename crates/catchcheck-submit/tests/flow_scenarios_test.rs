//! End-to-end submission scenarios against in-process collaborators

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use catchcheck_core::error::{CatchError, Result};
use catchcheck_core::models::{
    Catch, CatchId, Coordinate, FishingGround, GroundSuggestion, HealthReport, OracleVerdict,
    Submitter, VerificationStatus,
};
use catchcheck_geo::{
    FixedPosition, GeolocationError, GeolocationProvider, GroundCatalog, GroundResolver,
};
use catchcheck_store::{CatchStore, MemoryCatchStore};
use catchcheck_submit::{
    run_analysis, run_location, Applied, FlowServices, FlowSettings, Phase, SessionContext,
    SubmissionFlow,
};
use image::{DynamicImage, ImageFormat, RgbImage};

enum Behavior {
    Verdict(OracleVerdict),
    NetworkDown,
}

struct ScriptedOracle {
    behavior: Behavior,
    delay: Duration,
}

#[async_trait]
impl catchcheck_oracle::ImageOracle for ScriptedOracle {
    async fn analyze(&self, _image: &[u8], _mime_type: &str) -> Result<OracleVerdict> {
        tokio::time::sleep(self.delay).await;
        match &self.behavior {
            Behavior::Verdict(verdict) => Ok(verdict.clone()),
            Behavior::NetworkDown => {
                Err(CatchError::OracleUnavailable { reason: "connection reset".to_string() })
            }
        }
    }

    async fn diagnose(&self, _image: &[u8], _mime_type: &str) -> Result<HealthReport> {
        Err(CatchError::OracleUnavailable { reason: "unsupported".to_string() })
    }

    async fn nearest_ground(&self, _at: Coordinate) -> Result<Option<GroundSuggestion>> {
        Err(CatchError::OracleUnavailable { reason: "search disabled".to_string() })
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

struct BrokenStore;

#[async_trait]
impl CatchStore for BrokenStore {
    async fn save(&self, _record: &Catch) -> Result<()> {
        Err(CatchError::PersistenceFailure { reason: "database offline".to_string() })
    }

    async fn get(&self, _id: CatchId) -> Result<Option<Catch>> {
        Ok(None)
    }

    async fn list(&self) -> Result<Vec<Catch>> {
        Ok(Vec::new())
    }

    async fn update_status(
        &self,
        id: CatchId,
        _expected: VerificationStatus,
        _status: VerificationStatus,
    ) -> Result<Catch> {
        Err(CatchError::CatchNotFound { id: id.to_string() })
    }

    async fn verified_count(&self, _submitter_id: &str) -> Result<usize> {
        Ok(0)
    }
}

struct SilentGps;

#[async_trait]
impl GeolocationProvider for SilentGps {
    async fn current_position(&self) -> std::result::Result<Coordinate, GeolocationError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(GeolocationError::Unavailable)
    }
}

fn fish(species: &str, suspicious: bool) -> OracleVerdict {
    OracleVerdict {
        is_fish: true,
        species: Some(species.to_string()),
        estimated_length: Some(55.0),
        estimated_weight: Some(2.4),
        is_suspicious: suspicious,
        suspicion_reason: suspicious.then(|| "photo looks like a screenshot".to_string()),
        detected_object_label: None,
    }
}

fn boot() -> OracleVerdict {
    OracleVerdict {
        is_fish: false,
        species: None,
        estimated_length: None,
        estimated_weight: None,
        is_suspicious: false,
        suspicion_reason: None,
        detected_object_label: Some("rubber boot".to_string()),
    }
}

fn photo() -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(1280, 960, image::Rgb([40, 90, 60])))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn catalog() -> GroundCatalog {
    GroundCatalog::from_grounds(vec![
        FishingGround {
            id: "3-1370-1-1".to_string(),
            name: "Ružiná".to_string(),
            region: "MsO Lučenec".to_string(),
            latitude: 48.42,
            longitude: 19.52,
        },
        FishingGround {
            id: "4-0350-1-1".to_string(),
            name: "Váh".to_string(),
            region: "MsO Žilina".to_string(),
            latitude: 49.22,
            longitude: 18.74,
        },
    ])
    .unwrap()
}

struct Harness {
    oracle: Behavior,
    delay: Duration,
    locator: Arc<dyn GeolocationProvider>,
    store: Arc<dyn CatchStore>,
}

impl Harness {
    fn new(oracle: Behavior) -> Self {
        Self {
            oracle,
            delay: Duration::ZERO,
            locator: Arc::new(FixedPosition(None)),
            store: Arc::new(MemoryCatchStore::new()),
        }
    }

    fn open(self) -> SubmissionFlow {
        let oracle: Arc<dyn catchcheck_oracle::ImageOracle> =
            Arc::new(ScriptedOracle { behavior: self.oracle, delay: self.delay });
        let services = FlowServices {
            resolver: GroundResolver::new(catalog(), Arc::clone(&oracle)),
            oracle,
            locator: self.locator,
            store: self.store,
        };
        let session = SessionContext::new(Submitter {
            id: "angler-7".to_string(),
            name: "Marek".to_string(),
            avatar: String::new(),
        });
        SubmissionFlow::open(session, services, FlowSettings::default())
    }
}

#[tokio::test]
async fn oracle_outage_stores_pending_catch() {
    let store = Arc::new(MemoryCatchStore::new());
    let mut flow = Harness { store: store.clone(), ..Harness::new(Behavior::NetworkDown) }.open();

    flow.capture(&photo()).await.unwrap();
    flow.draft_mut().unwrap().species = "Carp".to_string();
    flow.select_ground("3-1370-1-1").unwrap();
    let record = flow.submit().await.unwrap();

    assert_eq!(record.verification_status, VerificationStatus::Pending);
    assert!(record.is_suspicious);
    let stored = store.get(record.id).await.unwrap().unwrap();
    assert_eq!(stored.verification_status, VerificationStatus::Pending);
    assert_eq!(store.verified_count("angler-7").await.unwrap(), 0);
}

#[tokio::test]
async fn clean_fish_photo_is_verified_and_prefilled() {
    let store = Arc::new(MemoryCatchStore::new());
    let mut flow = Harness {
        store: store.clone(),
        ..Harness::new(Behavior::Verdict(fish("Pike", false)))
    }
    .open();

    flow.draft_mut().unwrap().weight = Some(4.0);
    flow.capture(&photo()).await.unwrap();
    flow.select_ground("4-0350-1-1").unwrap();

    let draft = flow.draft().unwrap();
    assert_eq!(draft.species, "Pike");
    assert_eq!(draft.length, Some(55.0));
    assert_eq!(draft.weight, Some(4.0));
    let image = draft.image.as_ref().unwrap();
    assert_eq!((image.width, image.height), (1024, 768));

    let record = flow.submit().await.unwrap();
    assert_eq!(record.verification_status, VerificationStatus::Verified);
    assert_eq!(record.ground_id.as_deref(), Some("4-0350-1-1"));
    assert_eq!(store.verified_count("angler-7").await.unwrap(), 1);
}

#[tokio::test]
async fn suspicious_verdict_goes_to_review() {
    let mut flow = Harness::new(Behavior::Verdict(fish("Zander", true))).open();
    flow.capture(&photo()).await.unwrap();
    flow.set_custom_location("Gravel pit Senec").unwrap();

    let record = flow.submit().await.unwrap();

    assert_eq!(record.verification_status, VerificationStatus::Pending);
    assert_eq!(record.suspicion_reason.as_deref(), Some("photo looks like a screenshot"));
    assert_eq!(record.location_name, "Gravel pit Senec");
    assert_eq!(record.ground_id, None);
}

#[tokio::test]
async fn competition_entry_is_always_pending() {
    let mut flow = Harness::new(Behavior::Verdict(fish("Perch", false))).open();
    flow.capture(&photo()).await.unwrap();
    flow.select_ground("3-1370-1-1").unwrap();
    flow.draft_mut().unwrap().competition_id = Some("spring-cup".to_string());

    let record = flow.submit().await.unwrap();

    assert_eq!(record.verification_status, VerificationStatus::Pending);
    assert_eq!(record.competition_id.as_deref(), Some("spring-cup"));
}

#[tokio::test]
async fn non_fish_photo_blocks_submission() {
    let store = Arc::new(MemoryCatchStore::new());
    let mut flow = Harness {
        store: store.clone(),
        ..Harness::new(Behavior::Verdict(boot()))
    }
    .open();

    flow.capture(&photo()).await.unwrap();
    flow.draft_mut().unwrap().species = "Carp".to_string();
    flow.select_ground("3-1370-1-1").unwrap();

    assert!(!flow.can_submit());
    assert!(matches!(
        flow.last_error(),
        Some(CatchError::RejectedContent { detected_object }) if detected_object == "rubber boot"
    ));
    let err = flow.submit().await.unwrap_err();
    assert!(matches!(err, CatchError::RejectedContent { .. }));
    assert!(store.is_empty());
    assert_eq!(flow.phase(), Phase::Assembling);

    // Removing the photo unblocks a photo-less record
    flow.clear_image().unwrap();
    assert!(flow.can_submit());
}

#[tokio::test]
async fn missing_fields_refuse_submission_without_changes() {
    let mut flow = Harness::new(Behavior::Verdict(fish("Pike", false))).open();
    let before = flow.draft().cloned();

    let err = flow.submit().await.unwrap_err();

    match err {
        CatchError::SubmitNotReady { missing } => assert_eq!(missing, "species, location"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(flow.draft().cloned(), before);
    assert_eq!(flow.phase(), Phase::Idle);
    assert!(flow.last_error().is_none());
}

#[tokio::test]
async fn storage_failure_keeps_draft_for_retry() {
    let mut flow = Harness {
        store: Arc::new(BrokenStore),
        ..Harness::new(Behavior::Verdict(fish("Pike", false)))
    }
    .open();
    flow.capture(&photo()).await.unwrap();
    flow.select_ground("3-1370-1-1").unwrap();
    let before = flow.draft().cloned();

    let err = flow.submit().await.unwrap_err();

    assert!(matches!(err, CatchError::PersistenceFailure { .. }));
    assert!(err.is_retriable());
    assert_eq!(flow.phase(), Phase::Assembling);
    assert_eq!(flow.draft().cloned(), before);
    assert!(matches!(flow.last_error(), Some(CatchError::PersistenceFailure { .. })));
    assert!(flow.can_submit());
}

#[tokio::test(start_paused = true)]
async fn abandoned_draft_ignores_late_analysis() {
    let mut flow = Harness {
        delay: Duration::from_secs(30),
        ..Harness::new(Behavior::Verdict(fish("Pike", false)))
    }
    .open();

    let ticket = flow.begin_capture(&photo()).unwrap();
    let pending = tokio::spawn(run_analysis(ticket));
    flow.abandon();

    let late = pending.await.unwrap();
    assert_eq!(flow.apply_analysis(late), Applied::Discarded);
    assert!(flow.draft().is_none());
    assert!(flow.last_error().is_none());
    assert!(matches!(flow.draft_mut(), Err(CatchError::NoActiveDraft)));
}

#[tokio::test]
async fn newer_capture_wins_over_stale_result() {
    let mut flow = Harness::new(Behavior::Verdict(fish("Pike", false))).open();

    let first = flow.begin_capture(&photo()).unwrap();
    let second = flow.begin_capture(&photo()).unwrap();
    assert!(second.sequence() > first.sequence());

    let second_done = run_analysis(second).await;
    let first_done = run_analysis(first).await;

    assert_eq!(flow.apply_analysis(second_done), Applied::Updated);
    assert_eq!(flow.apply_analysis(first_done), Applied::Discarded);
    assert_eq!(flow.draft().unwrap().species, "Pike");
}

#[tokio::test(start_paused = true)]
async fn silent_gps_times_out_and_manual_search_still_works() {
    let mut flow = Harness {
        locator: Arc::new(SilentGps),
        ..Harness::new(Behavior::NetworkDown)
    }
    .open();

    assert_eq!(flow.locate().await.unwrap(), Applied::Updated);

    assert!(matches!(flow.last_error(), Some(CatchError::LocationUnavailable { .. })));
    assert!(!flow.should_auto_locate());
    let nearest = flow.search_grounds("");
    assert_eq!(nearest[0].ground.id, "3-1370-1-1");
    assert_eq!(flow.search_grounds("váh").len(), 1);
}

#[tokio::test]
async fn location_and_analysis_run_concurrently() {
    let mut flow = Harness {
        locator: Arc::new(FixedPosition(Some(Coordinate::new(49.2, 18.7)))),
        ..Harness::new(Behavior::Verdict(fish("Grayling", false)))
    }
    .open();

    let location = flow.begin_location().unwrap();
    let analysis = flow.begin_capture(&photo()).unwrap();
    let (located, analyzed) = tokio::join!(run_location(location), run_analysis(analysis));

    flow.apply_analysis(analyzed);
    assert_eq!(flow.phase(), Phase::Resolving);
    flow.apply_location(located);
    assert_eq!(flow.phase(), Phase::Assembling);

    // The proximity lookup failed, so the user picks from the ranked list
    let draft = flow.draft().unwrap();
    assert_eq!(draft.coordinates, Coordinate::new(49.2, 18.7));
    assert!(draft.ground.is_none());
    assert_eq!(flow.search_grounds("")[0].ground.id, "4-0350-1-1");

    let session = flow.into_session();
    assert_eq!(session.last_fix(), Some(Coordinate::new(49.2, 18.7)));
}
