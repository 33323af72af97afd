//! Concurrent group loading.
//!
//! One unit of work per group, all four polled together. Each unit probes its
//! group's exemplar table under a bounded wait; the loader returns only once
//! every unit has settled.

use futures::future::join_all;
use tracing::{info, warn};

use super::error::{CatalogError, ExtractError, GroupFailure};
use super::extractor::{CatalogOptions, TableMetadataExtractor};
use super::types::{
    Catalog, GroupInput, GroupKind, OrderedMap, TableMetadata, TableProfile, TableReference,
};
use crate::query::QueryClient;

/// How one group's unit ended.
#[derive(Debug)]
pub struct GroupOutcome {
    pub group: GroupKind,
    pub tables_by_dataset: OrderedMap<TableReference>,
    pub result: Result<TableProfile, ExtractError>,
}

impl GroupOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Settled results for all four groups, in [`GroupKind::ALL`] order.
#[derive(Debug)]
pub struct GroupOutcomes {
    outcomes: Vec<GroupOutcome>,
}

impl GroupOutcomes {
    pub fn get(&self, group: GroupKind) -> &GroupOutcome {
        &self.outcomes[group.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupOutcome> {
        self.outcomes.iter()
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(GroupOutcome::is_ok)
    }

    pub fn failed_groups(&self) -> Vec<GroupKind> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_ok())
            .map(|o| o.group)
            .collect()
    }

    /// The catalog, or every group failure if any unit failed.
    pub fn into_catalog(self) -> Result<Catalog, CatalogError> {
        let (catalog, failures) = self.into_catalog_lenient();
        if failures.is_empty() {
            Ok(catalog)
        } else {
            Err(CatalogError::GroupsFailed(failures))
        }
    }

    /// The catalog with empty metadata standing in for failed groups, plus
    /// the failures that were replaced.
    pub fn into_catalog_lenient(self) -> (Catalog, Vec<GroupFailure>) {
        let mut failures = Vec::new();
        let mut groups = Vec::with_capacity(self.outcomes.len());

        for outcome in self.outcomes {
            let profile = match outcome.result {
                Ok(profile) => profile,
                Err(error) => {
                    failures.push(GroupFailure {
                        group: outcome.group,
                        error,
                    });
                    TableProfile::default()
                }
            };
            groups.push(TableMetadata::from_profile(
                outcome.group,
                outcome.tables_by_dataset,
                profile,
            ));
        }

        (Catalog::from_ordered(groups), failures)
    }
}

/// Builds a [`Catalog`] by loading all four groups concurrently.
///
/// # Example
///
/// ```ignore
/// use dumpcat::catalog::{CatalogOptions, GroupCatalogLoader, GroupInput, GroupKind};
///
/// let loader = GroupCatalogLoader::new(client, CatalogOptions::new("athena"));
/// let input = GroupInput::new(["d1", "d2"]).with_group(GroupKind::MetaData, ["t1", "t2"]);
/// let catalog = loader.load(&input).await?;
/// println!("{:?}", catalog[GroupKind::MetaData].filter_options);
/// ```
pub struct GroupCatalogLoader<C> {
    client: C,
    options: CatalogOptions,
}

impl<C: QueryClient> GroupCatalogLoader<C> {
    pub fn new(client: C, options: CatalogOptions) -> Self {
        Self { client, options }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn options(&self) -> &CatalogOptions {
        &self.options
    }

    /// Load every group and fail if any group failed.
    pub async fn load(&self, input: &GroupInput) -> Result<Catalog, CatalogError> {
        self.load_settled(input).await.into_catalog()
    }

    /// Load every group and hand back each group's own result.
    pub async fn load_settled(&self, input: &GroupInput) -> GroupOutcomes {
        let units = GroupKind::ALL.map(|group| self.load_group(group, input));
        let outcomes = join_all(units).await;

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        info!(
            datasets = input.datasets().len(),
            failed_groups = failed,
            "catalog groups settled"
        );

        GroupOutcomes { outcomes }
    }

    async fn load_group(&self, group: GroupKind, input: &GroupInput) -> GroupOutcome {
        let tables_by_dataset = input.tables_by_dataset(group);
        let exemplar = input.exemplar(group);

        let extractor = TableMetadataExtractor::new(&self.client, &self.options);
        let bound = self.options.group_timeout;
        let result = match tokio::time::timeout(bound, extractor.extract(&exemplar)).await {
            Ok(result) => result,
            Err(_) => Err(ExtractError::Timeout(bound)),
        };

        match &result {
            Ok(profile) => info!(
                %group,
                table = %exemplar,
                columns = profile.column_types.len(),
                string_columns = profile.distinct_values.len(),
                "group loaded"
            ),
            Err(error) => warn!(%group, table = %exemplar, %error, "group failed"),
        }

        GroupOutcome {
            group,
            tables_by_dataset,
            result,
        }
    }
}
