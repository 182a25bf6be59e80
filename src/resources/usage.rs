//! Usage reports for the current project or the whole contract.

use crate::codec::Timestamp;
use crate::request::Request;
use crate::types::UsageInterval;
use crate::{Client, Context, Error, Result};
use serde_json::Value;

/// Whose usage is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageScope {
    /// The project the credentials belong to.
    Project,
    /// Every project of the contract.
    Contract,
}

/// Which resources a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageCategory {
    All,
    Servers,
    DistributedStorages,
    RocketStorages,
    StorageBackups,
    Snapshots,
    Templates,
    IsoImages,
    IpAddresses,
    Loadbalancers,
    PaaSServices,
}

impl UsageCategory {
    fn segment(self) -> Option<&'static str> {
        match self {
            UsageCategory::All => None,
            UsageCategory::Servers => Some("servers"),
            UsageCategory::DistributedStorages => Some("distributed_storages"),
            UsageCategory::RocketStorages => Some("rocket_storages"),
            UsageCategory::StorageBackups => Some("storage_backups"),
            UsageCategory::Snapshots => Some("snapshots"),
            UsageCategory::Templates => Some("templates"),
            UsageCategory::IsoImages => Some("iso_images"),
            UsageCategory::IpAddresses => Some("ip_addresses"),
            UsageCategory::Loadbalancers => Some("load_balancers"),
            UsageCategory::PaaSServices => Some("paas_services"),
        }
    }
}

/// Time range and aggregation of a usage report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageQuery {
    /// Start of the range. Required.
    pub from_time: Timestamp,
    /// End of the range; now when unset.
    pub to_time: Option<Timestamp>,
    /// Leave out resources deleted within the range.
    pub without_deleted: bool,
    /// Split the range into buckets of this size.
    pub interval_variable: Option<UsageInterval>,
}

impl UsageQuery {
    fn params(&self) -> Result<Vec<(String, String)>> {
        if self.from_time.is_zero() {
            return Err(Error::Validation("usage query needs from_time".to_string()));
        }
        let mut params = vec![("from_time".to_string(), self.from_time.to_string())];
        if let Some(to_time) = self.to_time.filter(|t| !t.is_zero()) {
            params.push(("to_time".to_string(), to_time.to_string()));
        }
        if self.without_deleted {
            params.push(("without_deleted".to_string(), "true".to_string()));
        }
        if let Some(interval) = self.interval_variable {
            params.push(("interval_variable".to_string(), interval.to_string()));
        }
        Ok(params)
    }
}

fn usage_path(scope: UsageScope, category: UsageCategory) -> String {
    let root = match scope {
        UsageScope::Project => "/projects",
        UsageScope::Contract => "/contracts",
    };
    match category.segment() {
        Some(segment) => format!("{root}/{segment}/usage"),
        None => format!("{root}/usage"),
    }
}

impl Client {
    /// Fetches a usage report.
    ///
    /// The report is returned as JSON; its shape depends on the category.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gsclient::{Client, Context};
    /// use gsclient::resources::usage::{UsageCategory, UsageQuery, UsageScope};
    /// use gsclient::types::UsageInterval;
    ///
    /// # async fn example(client: Client) -> Result<(), gsclient::Error> {
    /// let query = UsageQuery {
    ///     from_time: "2024-01-01T00:00:00Z".parse().expect("valid timestamp"),
    ///     interval_variable: Some(UsageInterval::Day),
    ///     ..Default::default()
    /// };
    /// let report = client
    ///     .usage(&Context::background(), UsageScope::Project, UsageCategory::Servers, &query)
    ///     .await?;
    /// println!("{report:#}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn usage(
        &self,
        ctx: &Context,
        scope: UsageScope,
        category: UsageCategory,
        query: &UsageQuery,
    ) -> Result<Value> {
        let request = Request::get(usage_path(scope, category)).with_query_params(query.params()?);
        Ok(self.execute::<Value>(ctx, request).await?.into_data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(usage_path(UsageScope::Project, UsageCategory::All), "/projects/usage");
        assert_eq!(
            usage_path(UsageScope::Contract, UsageCategory::Loadbalancers),
            "/contracts/load_balancers/usage"
        );
    }

    #[test]
    fn test_query_params() {
        let query = UsageQuery {
            from_time: "2024-01-01T00:00:00Z".parse().unwrap(),
            to_time: Some("2024-02-01T00:00:00Z".parse().unwrap()),
            without_deleted: true,
            interval_variable: Some(UsageInterval::Month),
        };
        let params = query.params().unwrap();
        assert_eq!(
            params,
            vec![
                ("from_time".to_string(), "2024-01-01T00:00:00Z".to_string()),
                ("to_time".to_string(), "2024-02-01T00:00:00Z".to_string()),
                ("without_deleted".to_string(), "true".to_string()),
                ("interval_variable".to_string(), "M".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_from_time_is_rejected() {
        assert!(matches!(UsageQuery::default().params(), Err(Error::Validation(_))));
    }
}
