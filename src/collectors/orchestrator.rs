use crate::{
    collectors::{
        CameraCollector,
        Collector,
        OverviewCollector,
        StorageCollector,
    },
    source::DocumentSource,
};
use chrono::{
    DateTime,
    Utc,
};
use color_eyre::Result;
use vrm_report::{
    EndpointReport,
    MergePolicy,
    Snapshot,
};

/// An endpoint left out of the snapshot and why.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Omission {
    pub endpoint: String,
    pub error: String,
}

/// Loads all endpoints of a source in order, merges them and feeds the collectors
pub struct Orchestrator {
    source: Box<dyn DocumentSource + Send + Sync>,
    policy: MergePolicy,
    overview_collector: OverviewCollector,
    camera_collector: CameraCollector,
    storage_collector: StorageCollector,
    snapshot: Option<Snapshot>,
    omitted: Vec<Omission>,
    collected_at: Option<DateTime<Utc>>,
}

impl Orchestrator {
    pub fn new(source: Box<dyn DocumentSource + Send + Sync>, policy: MergePolicy) -> Self {
        Self {
            source,
            policy,
            overview_collector: OverviewCollector::new(),
            camera_collector: CameraCollector::new(),
            storage_collector: StorageCollector::new(),
            snapshot: None,
            omitted: Vec::new(),
            collected_at: None,
        }
    }

    fn collectors_mut(&mut self) -> [&mut dyn Collector; 3] {
        [&mut self.overview_collector, &mut self.camera_collector, &mut self.storage_collector]
    }

    fn collectors(&self) -> [&dyn Collector; 3] {
        [&self.overview_collector, &self.camera_collector, &self.storage_collector]
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn omitted(&self) -> &[Omission] {
        &self.omitted
    }

    /// Loads the endpoints one after the other. An endpoint that cannot be loaded is logged and left out, it never
    /// fails the whole collection.
    pub async fn collect(&mut self) -> Result<()> {
        let mut snapshot = Snapshot::new(self.policy);
        let mut omitted = Vec::new();

        for endpoint in self.source.endpoints() {
            let label = endpoint.label();
            match self.source.load(endpoint).await {
                Ok(documents) => {
                    let report = EndpointReport::from_documents(&documents);
                    info!(
                        endpoint = %label,
                        source = %report.source,
                        channels = report.overview_final.totals.total_channels,
                        cameras = report.cameras.len(),
                        "Merged endpoint"
                    );
                    snapshot.merge(report);
                }
                Err(err) => {
                    warn!(endpoint = %label, %err, "Omitting endpoint");
                    omitted.push(Omission {
                        endpoint: label,
                        error: err.to_string(),
                    });
                }
            }
        }

        for collector in self.collectors_mut() {
            collector.collect(&snapshot)?;
            debug!(collector = collector.name(), "Collected");
        }

        self.snapshot = Some(snapshot);
        self.omitted = omitted;
        self.collected_at = Some(Utc::now());
        Ok(())
    }

    pub fn format(&self) -> String {
        let (snapshot, collected_at) = match (&self.snapshot, &self.collected_at) {
            (Some(s), Some(t)) => (s, t),
            _ => return "No endpoints collected yet. Call collect() first.".to_string(),
        };

        let mut report = String::new();

        report.push_str(&format!("\n{}\n", "=".repeat(80)));
        report.push_str(&format!("{:^80}\n", "VRM DASHBOARD REPORT"));
        report.push_str(&format!("{}\n", "=".repeat(80)));

        report.push_str(&format!(
            "\nCollection Summary:\n\
            • Collected at: {}\n\
            • Endpoints merged: {} of {}\n\
            • Per-unit merge: {}\n\n",
            collected_at.format("%Y-%m-%d %H:%M:%S UTC"),
            snapshot.endpoints,
            self.source.endpoints().len(),
            self.policy,
        ));

        for omission in &self.omitted {
            report.push_str(&format!("⚠ {} omitted: {}\n", omission.endpoint, omission.error));
        }

        for collector in self.collectors() {
            report.push_str(&collector.format());
        }

        report.push_str(&format!("\n{}\n", "=".repeat(80)));
        report
    }

    /// The snapshot in the dashboard's JSON layout, plus collection metadata.
    pub fn summary(&self) -> serde_json::Value {
        if self.snapshot.is_none() {
            return serde_json::json!({"error": "No endpoints collected yet"});
        }

        let mut json_data = serde_json::json!({
            "collectionInfo": {
                "collectedAt": self.collected_at,
                "endpoints": self.source.endpoints().len(),
                "merged": self.snapshot.as_ref().map(|s| s.endpoints),
                "perUnitMerge": self.policy,
                "omitted": self.omitted,
            }
        });

        for collector in self.collectors() {
            if let serde_json::Value::Object(fields) = collector.summary() {
                for (key, value) in fields {
                    json_data[key] = value;
                }
            }
        }

        json_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceError;
    use pretty_assertions::assert_eq;
    use std::{
        future::Future,
        path::PathBuf,
        pin::Pin,
    };
    use vrm_dashboard_config::EndpointConfig;
    use vrm_report::EndpointDocuments;

    /// Serves a fixed index page per endpoint; endpoints without one fail.
    struct StaticSource {
        endpoints: Vec<EndpointConfig>,
        pages: Vec<Option<&'static str>>,
    }

    impl DocumentSource for StaticSource {
        fn endpoints(&self) -> &[EndpointConfig] {
            &self.endpoints
        }

        fn load<'a>(
            &'a self,
            endpoint: &'a EndpointConfig,
        ) -> Pin<Box<dyn Future<Output = Result<EndpointDocuments, SourceError>> + Send + 'a>> {
            Box::pin(async move {
                let position = self.endpoints.iter().position(|e| e == endpoint).unwrap();
                let page = self.pages[position].ok_or_else(|| SourceError::NoDocuments(PathBuf::from(&endpoint.ip)))?;
                Ok(EndpointDocuments {
                    index: Some(page.as_bytes().to_vec()),
                    targets: Some("<h1>Targets</h1><table><tr><td>Total number of targets</td><td>1</td></tr></table>".to_string()),
                    unit: Some(endpoint.unit()),
                    ..Default::default()
                })
            })
        }
    }

    fn endpoint(vrm: &str) -> EndpointConfig {
        EndpointConfig {
            bvms: "BVMS1".to_string(),
            vrm: vrm.to_string(),
            ip: format!("10.0.0.{}", vrm.len()),
        }
    }

    fn source() -> StaticSource {
        StaticSource {
            endpoints: vec![endpoint("A"), endpoint("BB"), endpoint("CCC")],
            pages: vec![
                Some("--B\r\nContent-Type: text/html\r\n\r\n<table><tr><td>Total channels</td><td>5</td></tr></table>\r\n--B--"),
                None,
                Some("--B\r\nContent-Type: text/html\r\n\r\n<table><tr><td>Total channels</td><td>7</td></tr></table>\r\n--B--"),
            ],
        }
    }

    #[tokio::test]
    async fn failed_endpoints_are_omitted() {
        let mut orchestrator = Orchestrator::new(Box::new(source()), MergePolicy::Overwrite);
        orchestrator.collect().await.unwrap();

        let snapshot = orchestrator.snapshot().unwrap();
        assert_eq!(snapshot.endpoints, 2);
        assert_eq!(snapshot.overview_final.totals.total_channels, 12);
        assert_eq!(snapshot.targets.targets_summary["Total number of targets"], 2.0);
        assert_eq!(snapshot.targets.per_vrm.len(), 2);
        assert_eq!(orchestrator.omitted().len(), 1);
        assert_eq!(orchestrator.omitted()[0].endpoint, "BVMS1/BB");

        let text = orchestrator.format();
        assert!(text.contains("Endpoints merged: 2 of 3"), "{text}");
        assert!(text.contains("BVMS1/BB omitted"), "{text}");
    }

    #[tokio::test]
    async fn summary_uses_dashboard_field_names() {
        let mut orchestrator = Orchestrator::new(Box::new(source()), MergePolicy::Sum);
        assert_eq!(orchestrator.summary()["error"], "No endpoints collected yet");
        orchestrator.collect().await.unwrap();

        let json = orchestrator.summary();
        assert_eq!(json["overviewFinal"]["totals"]["totalChannels"], 12);
        assert!(json["perVrmCounters"].is_object());
        assert!(json["cameras"].is_array());
        assert_eq!(json["targets"]["perVrm"]["BVMS1/A"]["meta"]["ip"], "10.0.0.1");
        assert_eq!(json["collectionInfo"]["perUnitMerge"], "sum");
        assert_eq!(json["collectionInfo"]["omitted"][0]["endpoint"], "BVMS1/BB");
    }
}
