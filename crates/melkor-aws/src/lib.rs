pub mod ec2;
pub mod instances;

pub use ec2::{Ec2Api, InstancePage, SdkEc2Client};
pub use instances::{InstancesProvider, instance_to_record, instances_crawler};
