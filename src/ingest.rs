//! Batch ingestion entry point — bridges the decision engine (C8) to the
//! sink (C10 + C9 + optional Lattice forward).
//!
//! This is the "caller of `process_detections`" spec.md §7 refers to: in
//! prod mode a sink failure partway through a batch is fatal to that batch
//! and propagates to whoever invoked ingestion (the CLI); in dev mode only a
//! persistence error can fail it.

use crate::core::assets::AssetRegistry;
use crate::core::detection::Detection;
use crate::core::sentry::{ProcessStats, Sentry};
use crate::sink::Sink;

pub async fn ingest_batch(
    detections: &[Detection],
    sentry: &Sentry,
    assets: &AssetRegistry,
    sink: &Sink,
) -> anyhow::Result<ProcessStats> {
    let (processed, stats) = sentry.process_detections(detections, assets);

    for item in processed {
        sink.publish_track(&item.track).await?;
        if let Some(task) = &item.task {
            sink.publish_task(task).await?;
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::detection::BBox;
    use crate::sink::SinkMode;
    use crate::store::sqlite_store::SqliteStore;
    use crate::store::Store;
    use std::sync::Arc;

    fn sink_and_store() -> (Sink, Arc<dyn Store>) {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::open(":memory:").unwrap());
        let bus = Arc::new(crate::core::events::EventBus::new());
        let sink = Sink::new(SinkMode::Dev, store.clone(), bus, None).unwrap();
        (sink, store)
    }

    #[tokio::test]
    async fn s1_high_confidence_airplane_cueing_persists_track_and_task() {
        let sentry = Sentry::new();
        let assets = AssetRegistry::new();
        let (sink, store) = sink_and_store();

        let detections = vec![
            Detection::new("airplane", 0.92, BBox(0, 0, 10, 10)).with_geo(33.94, -118.40),
        ];

        let stats = ingest_batch(&detections, &sentry, &assets, &sink).await.unwrap();
        assert_eq!(stats.tracks, 1);
        assert_eq!(stats.tasks, 1);
        assert_eq!(store.get_tracks().unwrap().len(), 1);
        assert_eq!(store.get_tasks(None).unwrap().len(), 1);
    }
}
