//! Amazon Resource Names
//!
//! Structured representation of `arn:partition:service:region:account-id:resource`
//! identifiers. ARNs are serialized as plain strings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

const ARN_PREFIX: &str = "arn";

/// A parsed Amazon Resource Name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arn {
    /// Partition (e.g. "aws", "aws-cn")
    pub partition: String,
    /// Service namespace (e.g. "s3", "sqs")
    pub service: String,
    /// Region, empty for global resources such as S3 buckets
    pub region: String,
    /// Account ID, empty for S3 buckets
    pub account_id: String,
    /// Service-specific resource identifier
    pub resource: String,
}

impl Arn {
    /// Create an ARN in the "aws" partition
    pub fn new(
        service: impl Into<String>,
        region: impl Into<String>,
        account_id: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            partition: "aws".to_string(),
            service: service.into(),
            region: region.into(),
            account_id: account_id.into(),
            resource: resource.into(),
        }
    }

    /// The ARN of the bucket as S3 itself knows it.
    ///
    /// Bucket ARNs carry neither a region nor an account ID, while source
    /// specs include both so that clients can be configured for the right
    /// region and requests can assert the expected bucket owner.
    pub fn real_bucket_arn(&self) -> String {
        Arn {
            region: String::new(),
            account_id: String::new(),
            ..self.clone()
        }
        .to_string()
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}",
            ARN_PREFIX, self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}

impl FromStr for Arn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The resource section may itself contain colons
        let sections: Vec<&str> = s.splitn(6, ':').collect();
        if sections.len() != 6 {
            return Err(Error::invalid_arn(format!("not enough sections in {:?}", s)));
        }
        if sections[0] != ARN_PREFIX {
            return Err(Error::invalid_arn(format!("{:?} does not start with 'arn:'", s)));
        }
        if sections[1].is_empty() {
            return Err(Error::invalid_arn(format!("missing partition in {:?}", s)));
        }
        if sections[2].is_empty() {
            return Err(Error::invalid_arn(format!("missing service in {:?}", s)));
        }

        Ok(Self {
            partition: sections[1].to_string(),
            service: sections[2].to_string(),
            region: sections[3].to_string(),
            account_id: sections[4].to_string(),
            resource: sections[5].to_string(),
        })
    }
}

impl Serialize for Arn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Arn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_queue_arn() {
        let arn: Arn = "arn:aws:sqs:us-east-1:111:s3-events_mybucket".parse().unwrap();
        assert_eq!(arn.service, "sqs");
        assert_eq!(arn.region, "us-east-1");
        assert_eq!(arn.account_id, "111");
        assert_eq!(arn.resource, "s3-events_mybucket");
        assert_eq!(arn.to_string(), "arn:aws:sqs:us-east-1:111:s3-events_mybucket");
    }

    #[test]
    fn resource_may_contain_colons() {
        let arn: Arn = "arn:aws:lambda:eu-west-1:222:function:handler".parse().unwrap();
        assert_eq!(arn.resource, "function:handler");
    }

    #[test]
    fn rejects_malformed() {
        assert!("".parse::<Arn>().is_err());
        assert!("arn:aws:sqs".parse::<Arn>().is_err());
        assert!("urn:aws:sqs:us-east-1:111:q".parse::<Arn>().is_err());
        assert!("arn::sqs:us-east-1:111:q".parse::<Arn>().is_err());
    }

    #[test]
    fn real_bucket_arn_drops_region_and_account() {
        let arn = Arn::new("s3", "us-east-1", "111", "mybucket");
        assert_eq!(arn.real_bucket_arn(), "arn:aws:s3:::mybucket");
    }

    #[test]
    fn serde_as_string() {
        let arn = Arn::new("sqs", "us-east-1", "111", "q");
        let json = serde_json::to_string(&arn).unwrap();
        assert_eq!(json, "\"arn:aws:sqs:us-east-1:111:q\"");
        let back: Arn = serde_json::from_str(&json).unwrap();
        assert_eq!(back, arn);
    }
}
