//! Passenger store backed by a single JSON snapshot file.
//!
//! Every save rewrites the whole snapshot: the payload is written to a
//! sibling temp file and renamed over the target, so readers never see a
//! half-written file. A mutex serialises writers within the process.

use super::memory::upsert;
use checkin_domain::{Passenger, PassengerId};
use checkin_ports::{BoxFuture, PassengerStorePort};
use checkin_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PassengerSnapshot {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    passengers: Vec<Passenger>,
}

/// JSON-file passenger store.
#[derive(Debug, Clone)]
pub struct JsonFilePassengerStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFilePassengerStore {
    /// Store at `path`. The file and its parent directories are created on
    /// first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Snapshot location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<PassengerSnapshot> {
        match tokio::fs::read(&self.path).await {
            Ok(payload) => {
                let snapshot: PassengerSnapshot = serde_json::from_slice(&payload)
                    .map_err(|error| snapshot_error("snapshot_parse_failed", &self.path, &error))?;
                if snapshot.version > SNAPSHOT_VERSION {
                    return Err(ErrorEnvelope::expected(
                        ErrorCode::new("passenger", "snapshot_version_unsupported"),
                        format!("passenger snapshot version {} is newer than supported", snapshot.version),
                    )
                    .with_metadata("path", self.path.display().to_string()));
                }
                Ok(snapshot)
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                Ok(PassengerSnapshot::default())
            },
            Err(error) => Err(ErrorEnvelope::from(error)
                .with_metadata("path", self.path.display().to_string())),
        }
    }

    async fn write(&self, snapshot: &PassengerSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let payload = serde_json::to_vec_pretty(snapshot)
            .map_err(|error| snapshot_error("snapshot_serialize_failed", &self.path, &error))?;

        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);
        tokio::fs::write(&temp, payload).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

fn snapshot_error(code: &str, path: &Path, error: &serde_json::Error) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("passenger", code),
        format!("passenger snapshot {}: {error}", path.display()),
        ErrorClass::NonRetriable,
    )
    .with_metadata("path", path.display().to_string())
}

impl PassengerStorePort for JsonFilePassengerStore {
    fn save(&self, ctx: &RequestContext, passenger: Passenger) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("passenger.save")?;
            let _guard = self.write_lock.lock().await;
            let mut snapshot = self.load().await?;
            snapshot.version = SNAPSHOT_VERSION;
            upsert(&mut snapshot.passengers, passenger);
            self.write(&snapshot).await
        })
    }

    fn list(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<Passenger>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("passenger.list")?;
            Ok(self.load().await?.passengers)
        })
    }

    fn get(
        &self,
        ctx: &RequestContext,
        id: PassengerId,
    ) -> BoxFuture<'_, Result<Option<Passenger>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("passenger.get")?;
            let snapshot = self.load().await?;
            Ok(snapshot.passengers.into_iter().find(|record| record.id == id))
        })
    }
}
