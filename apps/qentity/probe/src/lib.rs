//! Qdrant probe
//!
//! Small operational check for a qentity deployment:
//!
//! 1. boots tracing for the current `APP_ENV`
//! 2. initializes the global session from `QDRANT_URL` / `QDRANT_API_KEY`
//! 3. reports whether the server answers
//! 4. round-trips a sample entity through the point wire shape
//!
//! Exits non-zero when the configuration is missing or the client cannot be
//! built, or when the sample does not survive the round trip.

use core_config::Environment;
use eyre::{ensure, Result, WrapErr};
use qentity::{HasTimestamps, PointId, PointModel, SessionManager, Timestamps, VectorMap};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Entity used for the round trip check.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, PointModel)]
#[point_model(point_type = "probe")]
pub struct ProbeRecord {
    pub id: PointId,
    pub vector: Option<VectorMap>,
    pub host: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl HasTimestamps for ProbeRecord {
    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }
}

impl ProbeRecord {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            vector: Some(VectorMap::from([("probe".to_string(), vec![0.0, 1.0])])),
            ..Default::default()
        }
    }
}

/// Encode `record`, decode it again and check nothing was lost.
pub fn round_trip(record: &ProbeRecord) -> Result<ProbeRecord> {
    let point = record
        .to_qdrant(true)
        .wrap_err("Failed to encode probe record")?;
    info!(
        point = %point.to_json().wrap_err("Failed to render probe point")?,
        "Encoded probe record"
    );

    let decoded = ProbeRecord::from_qdrant(point).wrap_err("Failed to decode probe record")?;
    ensure!(
        &decoded == record,
        "Probe record changed during round trip: {:?} != {:?}",
        decoded,
        record
    );

    Ok(decoded)
}

pub async fn run() -> Result<()> {
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    let session = SessionManager::global();
    session
        .init()
        .wrap_err("Failed to initialize Qdrant session")?;

    if session.connected().await {
        info!("Qdrant is reachable");
    } else {
        warn!("Qdrant did not answer the liveness probe");
    }

    let host = std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
    let record = ProbeRecord::new(host);
    let decoded = round_trip(&record)?;
    info!(id = %decoded.id, created_at = %decoded.created_at(), "Round trip succeeded");

    session.close();
    Ok(())
}
