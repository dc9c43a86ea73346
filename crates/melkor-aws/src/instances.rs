use aws_sdk_ec2::primitives::{DateTime, DateTimeFormat};
use aws_sdk_ec2::types::{
    GroupIdentifier, Instance, InstanceBlockDeviceMapping, InstanceNetworkInterface,
    InstancePrivateIpAddress, Tag,
};
use melkor_core::crawler::SnapshotCrawler;
use melkor_core::error::AppError;
use melkor_core::traits::ResourceProvider;
use melkor_core::value::{Record, Value};
use tokio_util::sync::CancellationToken;

use crate::ec2::{Ec2Api, SdkEc2Client};

pub const RESOURCE: &str = "Instances";
pub const IDENTIFIER_FIELD: &str = "InstanceId";

/// Crawls every EC2 instance visible in the configured region.
pub struct InstancesProvider<C: Ec2Api> {
    client: C,
}

impl<C: Ec2Api> InstancesProvider<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: Ec2Api> ResourceProvider for InstancesProvider<C> {
    fn resource(&self) -> &str {
        RESOURCE
    }

    fn identifier_field(&self) -> &str {
        IDENTIFIER_FIELD
    }

    async fn fetch(&self, cancel: &CancellationToken) -> Result<Vec<Record>, AppError> {
        let mut records = Vec::new();
        let mut next_token = None;
        let mut pages = 0usize;

        loop {
            let page = self.client.describe_instances(next_token.take()).await?;
            pages += 1;
            records.extend(page.instances.iter().map(instance_to_record));

            match page.next_token {
                Some(token) if !token.is_empty() => {
                    if cancel.is_cancelled() {
                        return Err(AppError::Cancelled);
                    }
                    next_token = Some(token);
                }
                _ => break,
            }
        }

        tracing::debug!(%pages, count = records.len(), "Fetched instances");
        Ok(records)
    }
}

/// The "Instances" crawler for `region`, backed by the AWS SDK.
pub async fn instances_crawler(region: &str) -> SnapshotCrawler<InstancesProvider<SdkEc2Client>> {
    let client = SdkEc2Client::from_region(region).await;
    SnapshotCrawler::new(InstancesProvider::new(client))
}

macro_rules! record {
    ($($key:literal => $value:expr),* $(,)?) => {{
        let mut record = Record::new();
        $(record.insert($key.to_string(), Value::from($value));)*
        record
    }};
}

fn timestamp(value: Option<&DateTime>) -> Value {
    value
        .and_then(|t| t.fmt(DateTimeFormat::DateTime).ok())
        .into()
}

fn nested<T>(value: Option<&T>, convert: impl FnOnce(&T) -> Record) -> Value {
    value.map(convert).into()
}

fn list<T>(items: &[T], convert: impl Fn(&T) -> Record) -> Value {
    Value::List(items.iter().map(|item| Value::Map(convert(item))).collect())
}

fn group(g: &GroupIdentifier) -> Record {
    record! {
        "GroupId" => g.group_id(),
        "GroupName" => g.group_name(),
    }
}

fn tag(t: &Tag) -> Record {
    record! {
        "Key" => t.key(),
        "Value" => t.value(),
    }
}

fn block_device(m: &InstanceBlockDeviceMapping) -> Record {
    record! {
        "DeviceName" => m.device_name(),
        "Ebs" => nested(m.ebs(), |ebs| record! {
            "AttachTime" => timestamp(ebs.attach_time()),
            "DeleteOnTermination" => ebs.delete_on_termination(),
            "Status" => ebs.status().map(|s| s.as_str()),
            "VolumeId" => ebs.volume_id(),
        }),
    }
}

fn private_ip(p: &InstancePrivateIpAddress) -> Record {
    record! {
        "Association" => nested(p.association(), |a| record! {
            "IpOwnerId" => a.ip_owner_id(),
            "PublicDnsName" => a.public_dns_name(),
            "PublicIp" => a.public_ip(),
        }),
        "Primary" => p.primary(),
        "PrivateDnsName" => p.private_dns_name(),
        "PrivateIpAddress" => p.private_ip_address(),
    }
}

fn network_interface(n: &InstanceNetworkInterface) -> Record {
    record! {
        "Association" => nested(n.association(), |a| record! {
            "IpOwnerId" => a.ip_owner_id(),
            "PublicDnsName" => a.public_dns_name(),
            "PublicIp" => a.public_ip(),
        }),
        "Attachment" => nested(n.attachment(), |a| record! {
            "AttachTime" => timestamp(a.attach_time()),
            "AttachmentId" => a.attachment_id(),
            "DeleteOnTermination" => a.delete_on_termination(),
            "DeviceIndex" => a.device_index(),
            "Status" => a.status().map(|s| s.as_str()),
        }),
        "Description" => n.description(),
        "Groups" => list(n.groups(), group),
        "Ipv6Addresses" => list(n.ipv6_addresses(), |a| record! {
            "Ipv6Address" => a.ipv6_address(),
        }),
        "MacAddress" => n.mac_address(),
        "NetworkInterfaceId" => n.network_interface_id(),
        "OwnerId" => n.owner_id(),
        "PrivateDnsName" => n.private_dns_name(),
        "PrivateIpAddress" => n.private_ip_address(),
        "PrivateIpAddresses" => list(n.private_ip_addresses(), private_ip),
        "SourceDestCheck" => n.source_dest_check(),
        "Status" => n.status().map(|s| s.as_str()),
        "SubnetId" => n.subnet_id(),
        "VpcId" => n.vpc_id(),
    }
}

/// Convert an SDK instance into a record.
///
/// Never fails: fields the API leaves out become null, lists it leaves out
/// become empty. Enums are rendered as their wire strings and timestamps as
/// RFC 3339.
pub fn instance_to_record(i: &Instance) -> Record {
    record! {
        "AmiLaunchIndex" => i.ami_launch_index(),
        "Architecture" => i.architecture().map(|a| a.as_str()),
        "BlockDeviceMappings" => list(i.block_device_mappings(), block_device),
        "ClientToken" => i.client_token(),
        "EbsOptimized" => i.ebs_optimized(),
        "EnaSupport" => i.ena_support(),
        "Hypervisor" => i.hypervisor().map(|h| h.as_str()),
        "IamInstanceProfile" => nested(i.iam_instance_profile(), |p| record! {
            "Arn" => p.arn(),
            "Id" => p.id(),
        }),
        "ImageId" => i.image_id(),
        "InstanceId" => i.instance_id(),
        "InstanceLifecycle" => i.instance_lifecycle().map(|l| l.as_str()),
        "InstanceType" => i.instance_type().map(|t| t.as_str()),
        "KernelId" => i.kernel_id(),
        "KeyName" => i.key_name(),
        "LaunchTime" => timestamp(i.launch_time()),
        "Monitoring" => nested(i.monitoring(), |m| record! {
            "State" => m.state().map(|s| s.as_str()),
        }),
        "NetworkInterfaces" => list(i.network_interfaces(), network_interface),
        "Placement" => nested(i.placement(), |p| record! {
            "Affinity" => p.affinity(),
            "AvailabilityZone" => p.availability_zone(),
            "GroupName" => p.group_name(),
            "HostId" => p.host_id(),
            "Tenancy" => p.tenancy().map(|t| t.as_str()),
        }),
        "Platform" => i.platform().map(|p| p.as_str()),
        "PrivateDnsName" => i.private_dns_name(),
        "PrivateIpAddress" => i.private_ip_address(),
        "ProductCodes" => list(i.product_codes(), |c| record! {
            "ProductCodeId" => c.product_code_id(),
            "ProductCodeType" => c.product_code_type().map(|t| t.as_str()),
        }),
        "PublicDnsName" => i.public_dns_name(),
        "PublicIpAddress" => i.public_ip_address(),
        "RamdiskId" => i.ramdisk_id(),
        "RootDeviceName" => i.root_device_name(),
        "RootDeviceType" => i.root_device_type().map(|t| t.as_str()),
        "SecurityGroups" => list(i.security_groups(), group),
        "SourceDestCheck" => i.source_dest_check(),
        "SpotInstanceRequestId" => i.spot_instance_request_id(),
        "SriovNetSupport" => i.sriov_net_support(),
        "State" => nested(i.state(), |s| record! {
            "Code" => s.code(),
            "Name" => s.name().map(|n| n.as_str()),
        }),
        "StateReason" => nested(i.state_reason(), |r| record! {
            "Code" => r.code(),
            "Message" => r.message(),
        }),
        "StateTransitionReason" => i.state_transition_reason(),
        "SubnetId" => i.subnet_id(),
        "Tags" => list(i.tags(), tag),
        "VirtualizationType" => i.virtualization_type().map(|t| t.as_str()),
        "VpcId" => i.vpc_id(),
    }
}
