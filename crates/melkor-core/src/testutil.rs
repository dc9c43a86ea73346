//! Test utilities: mock crawlers, providers and record fixtures.
//!
//! Handwritten mocks for dependency injection in unit and integration tests.
//! Scripted results live behind `Arc<Mutex<_>>` so tests can assert on the
//! number of calls afterwards.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::tags::normalize_tags;
use crate::traits::{Crawler, ResourceProvider};
use crate::value::{Record, record_from_json};

pub const FIXTURE_ID_FIELD: &str = "InstanceId";

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Timestamp stamped on snapshots built by [`MockCrawler::with_records`].
pub fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2017, 2, 28, 10, 15, 22)
        .single()
        .unwrap_or_default()
}

/// One EC2-shaped instance record, as the instances provider would emit it
/// before tag normalization.
pub fn instance_record(i: usize, team: &str) -> Record {
    let account = "123456789";
    let attach_time = "2017-02-28T10:15:22Z";
    let dns = format!("ip-10-20-30-{i}.eu-west-1.compute.internal");
    let ip = format!("10.20.30.{i}");
    let group = json!({
        "GroupId": format!("sg-{i}"),
        "GroupName": format!("{team}-eu-staging-ServerSecurityGroup-{i}"),
    });

    let value = json!({
        "AmiLaunchIndex": i,
        "Architecture": "x86_64",
        "BlockDeviceMappings": [{
            "DeviceName": "/dev/sda1",
            "Ebs": {
                "AttachTime": attach_time,
                "DeleteOnTermination": true,
                "Status": "attached",
                "VolumeId": format!("vol-{i}"),
            },
        }],
        "ClientToken": format!("smart-{team}-2M3GIISBQQ3U"),
        "EbsOptimized": false,
        "EnaSupport": null,
        "Hypervisor": "xen",
        "IamInstanceProfile": {
            "Arn": format!("arn:aws:iam::{account}:instance-profile/{team}"),
            "Id": "KIRUNAVARA",
        },
        "ImageId": format!("ami-{i}"),
        "InstanceId": format!("i-{i}"),
        "InstanceType": "m3.medium",
        "KeyName": format!("ssh_key_{team}"),
        "LaunchTime": attach_time,
        "Monitoring": { "State": "disabled" },
        "NetworkInterfaces": [{
            "Association": null,
            "Description": "",
            "Groups": [group.clone()],
            "MacAddress": "02:a6:fd:3a:b7:4f",
            "NetworkInterfaceId": format!("eni-{i}"),
            "OwnerId": account,
            "PrivateDnsName": dns,
            "PrivateIpAddress": ip,
            "Status": "in-use",
            "SubnetId": "subnet-11aa22bb",
            "VpcId": "vpc-987654321",
        }],
        "Placement": {
            "AvailabilityZone": "eu-west-1b",
            "GroupName": "",
            "Tenancy": "default",
        },
        "Platform": null,
        "PrivateDnsName": dns,
        "PrivateIpAddress": ip,
        "PublicIpAddress": null,
        "RootDeviceName": "/dev/sda1",
        "RootDeviceType": "ebs",
        "SecurityGroups": [group],
        "SourceDestCheck": true,
        "State": { "Code": 16, "Name": "running" },
        "StateTransitionReason": "",
        "SubnetId": "subnet-11aa22bb",
        "Tags": [
            { "Key": "Name", "Value": format!("fake-service-{i}") },
            { "Key": "Service", "Value": "fake-service" },
            { "Key": "Team", "Value": team },
            { "Key": "Environment", "Value": "staging" },
        ],
        "VirtualizationType": "hvm",
        "VpcId": "vpc-987654321",
    });

    record_from_json(value).unwrap_or_default()
}

/// `n` instance records with ids `i-0..i-{n-1}`, owned by `team0..team{n-1}`.
pub fn fixture_records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| instance_record(i, &format!("team{i}")))
        .collect()
}

// ---------------------------------------------------------------------------
// StaticProvider
// ---------------------------------------------------------------------------

/// Provider that returns scripted results.
///
/// Each call pops the first scripted result. Once the script is exhausted,
/// every call returns the default records.
#[derive(Clone)]
pub struct StaticProvider {
    resource: String,
    default: Vec<Record>,
    results: Arc<Mutex<Vec<Result<Vec<Record>, AppError>>>>,
    calls: Arc<AtomicUsize>,
}

impl StaticProvider {
    pub fn new(resource: &str, records: Vec<Record>) -> Self {
        Self {
            resource: resource.to_string(),
            default: records,
            results: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_results(resource: &str, results: Vec<Result<Vec<Record>, AppError>>) -> Self {
        Self {
            results: Arc::new(Mutex::new(results)),
            ..Self::new(resource, Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ResourceProvider for StaticProvider {
    fn resource(&self) -> &str {
        &self.resource
    }

    fn identifier_field(&self) -> &str {
        FIXTURE_ID_FIELD
    }

    async fn fetch(&self, _cancel: &CancellationToken) -> Result<Vec<Record>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut results = self.results.lock().unwrap();
        if results.is_empty() {
            Ok(self.default.clone())
        } else {
            results.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockCrawler
// ---------------------------------------------------------------------------

/// Crawler with a scripted sequence of crawl outcomes.
///
/// `Ok(records)` publishes a new snapshot, `Err` leaves the current one in
/// place. An exhausted script publishes an empty snapshot.
pub struct MockCrawler {
    resource: String,
    store: SnapshotStore,
    results: Mutex<Vec<Result<Vec<Record>, AppError>>>,
    crawl_calls: AtomicUsize,
}

impl MockCrawler {
    pub fn new(resource: &str) -> Self {
        Self::with_results(resource, Vec::new())
    }

    pub fn with_results(resource: &str, results: Vec<Result<Vec<Record>, AppError>>) -> Self {
        Self {
            resource: resource.to_string(),
            store: SnapshotStore::new(Snapshot::empty(FIXTURE_ID_FIELD)),
            results: Mutex::new(results),
            crawl_calls: AtomicUsize::new(0),
        }
    }

    /// A crawler that has already crawled `records` at [`fixture_time`].
    pub fn with_records(resource: &str, records: Vec<Record>) -> Self {
        let crawler = Self::new(resource);
        crawler.publish(records, fixture_time());
        crawler
    }

    pub fn crawl_calls(&self) -> usize {
        self.crawl_calls.load(Ordering::SeqCst)
    }

    fn publish(&self, mut records: Vec<Record>, at: DateTime<Utc>) {
        for record in &mut records {
            normalize_tags(record);
        }
        self.store
            .publish(Snapshot::new(records, at, FIXTURE_ID_FIELD));
    }
}

#[async_trait]
impl Crawler for MockCrawler {
    fn resource(&self) -> &str {
        &self.resource
    }

    async fn do_crawl(&self, _cancel: &CancellationToken) -> Result<(), AppError> {
        self.crawl_calls.fetch_add(1, Ordering::SeqCst);
        let next = {
            let mut results = self.results.lock().unwrap();
            if results.is_empty() {
                Ok(Vec::new())
            } else {
                results.remove(0)
            }
        };
        self.publish(next?, Utc::now());
        Ok(())
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        self.store.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn fixture_records_follow_index() {
        let records = fixture_records(3);
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[2].get("InstanceId").and_then(Value::as_str),
            Some("i-2")
        );
        assert_eq!(
            records[2].get("PrivateIpAddress").and_then(Value::as_str),
            Some("10.20.30.2")
        );
        assert!(records[2].get("Platform").is_some_and(Value::is_null));
    }

    #[test]
    fn with_records_is_already_crawled() {
        let crawler = MockCrawler::with_records("Mock", fixture_records(2));
        assert_eq!(crawler.count(), 2);
        assert_eq!(crawler.last_crawled(), Some(fixture_time()));
        assert_eq!(crawler.crawl_calls(), 0);
    }
}
