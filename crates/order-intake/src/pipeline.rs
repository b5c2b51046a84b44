//! End-to-end intake: text or structured lines in, order request out

use crate::aggregator::aggregate;
use crate::error::{IntakeError, Result};
use crate::extractor::TextOrderExtractor;
use crate::lines::{CanonicalOrderLine, RawOrderLine};
use crate::request::{OrderRequest, OrderRequestBuilder};
use crate::resolver::CatalogResolver;
use crate::IntakeConfig;
use menu_catalog::{CatalogIndex, CatalogObject};
use tracing::{info, warn};

/// Index a freshly fetched catalog listing.
pub fn build_index(objects: &[CatalogObject]) -> Result<CatalogIndex> {
    Ok(CatalogIndex::build(objects)?)
}

/// Runs extraction, aggregation, resolution and request building.
///
/// Holds no catalog of its own; every call takes the snapshot to resolve
/// against, so concurrent conversations can share one `Arc<CatalogIndex>`.
#[derive(Debug, Clone)]
pub struct OrderIntake {
    extractor: TextOrderExtractor,
    resolver: CatalogResolver,
    builder: Option<OrderRequestBuilder>,
}

impl OrderIntake {
    pub fn new(config: &IntakeConfig) -> Result<Self> {
        let builder = config
            .location_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| OrderRequestBuilder::new(id).with_source_name(config.source_name.clone()));

        Ok(Self {
            extractor: TextOrderExtractor::new(config)?,
            resolver: CatalogResolver::new(config),
            builder,
        })
    }

    pub fn extractor(&self) -> &TextOrderExtractor {
        &self.extractor
    }

    pub fn resolver(&self) -> &CatalogResolver {
        &self.resolver
    }

    /// Extract and merge order lines from conversation text.
    pub fn canonical_lines(&self, text: &str) -> Vec<CanonicalOrderLine> {
        aggregate(&self.extractor.extract(text))
    }

    pub fn prepare_from_text(
        &self,
        text: &str,
        index: &CatalogIndex,
        customer_name: Option<&str>,
    ) -> Result<OrderRequest> {
        let raw = self.extractor.extract(text);
        self.prepare_from_lines(&raw, index, customer_name)
    }

    /// Build a request from lines that are already structured.
    pub fn prepare_from_lines(
        &self,
        raw: &[RawOrderLine],
        index: &CatalogIndex,
        customer_name: Option<&str>,
    ) -> Result<OrderRequest> {
        let builder = self.builder.as_ref().ok_or(IntakeError::MissingLocation)?;

        let lines = aggregate(raw);
        if lines.is_empty() {
            warn!(raw_lines = raw.len(), "nothing to order");
            return Err(IntakeError::EmptyOrder);
        }

        let resolved = self.resolver.resolve_all(&lines, index);
        info!(lines = resolved.len(), "order lines resolved");
        Ok(builder.build(resolved, customer_name))
    }
}
