use std::future::Future;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_ec2::Client;
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::types::Instance;
use melkor_core::error::AppError;

/// One page of a `DescribeInstances` listing, reservations already flattened.
#[derive(Debug, Clone, Default)]
pub struct InstancePage {
    pub instances: Vec<Instance>,
    pub next_token: Option<String>,
}

/// The slice of the EC2 API the instances provider needs.
pub trait Ec2Api: Send + Sync + 'static {
    fn describe_instances(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<InstancePage, AppError>> + Send;
}

/// [`Ec2Api`] backed by the AWS SDK.
///
/// Credentials come from the default provider chain (environment, profile,
/// instance metadata).
#[derive(Clone, Debug)]
pub struct SdkEc2Client {
    client: Client,
}

impl SdkEc2Client {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn from_region(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        tracing::debug!(%region, "Loaded AWS configuration");
        Self::new(Client::new(&config))
    }
}

impl Ec2Api for SdkEc2Client {
    async fn describe_instances(&self, next_token: Option<String>) -> Result<InstancePage, AppError> {
        let output = self
            .client
            .describe_instances()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| {
                AppError::ProviderError(format!(
                    "DescribeInstances failed: {}",
                    DisplayErrorContext(e)
                ))
            })?;

        let instances = output
            .reservations()
            .iter()
            .flat_map(|r| r.instances().iter().cloned())
            .collect();

        Ok(InstancePage {
            instances,
            next_token: output.next_token().map(str::to_string),
        })
    }
}
