use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{TripListing, VariantProfile};
use crate::database::DataGateway;
use crate::dto::{AnalyticsQuery, DriverAnalyticsResponse};
use crate::repositories::DriverAnalyticsRepository;
use crate::services::pagination::{fetch_page, PageLimits, PageRequest};
use crate::services::{assembler, strategy_for, AggregationStrategy};
use crate::utils::errors::{driver_not_found, validation_error, AppResult};
use crate::utils::validation::validate_positive_id;

pub struct DriverAnalyticsController {
    repository: DriverAnalyticsRepository,
    aggregation: Box<dyn AggregationStrategy>,
    listing: TripListing,
    limits: PageLimits,
}

impl DriverAnalyticsController {
    pub fn new(gateway: Arc<DataGateway>, profile: VariantProfile, limits: PageLimits) -> Self {
        Self {
            repository: DriverAnalyticsRepository::new(gateway),
            aggregation: strategy_for(profile.aggregation),
            listing: profile.listing,
            limits,
        }
    }

    pub fn listing(&self) -> TripListing {
        self.listing
    }

    pub async fn get_driver_analytics(
        &self,
        raw_driver_id: &str,
        query: &AnalyticsQuery,
    ) -> AppResult<DriverAnalyticsResponse> {
        let driver_id = validate_positive_id(raw_driver_id).map_err(|e| validation_error("driver_id", e))?;

        // Parámetros validados antes de tocar la base de datos
        let page_request = match self.listing {
            TripListing::Keyset => Some(PageRequest::from_query(query, &self.limits)?),
            TripListing::FullHistory => None,
        };

        let aggregate = match self.aggregation.aggregate(&self.repository, driver_id).await? {
            Some(aggregate) => aggregate,
            None => {
                info!("🔍 Conductor {} no encontrado", driver_id);
                return Err(driver_not_found());
            }
        };
        debug!(
            "📊 Conductor {}: {} viajes (agregación {})",
            driver_id,
            aggregate.totals.total_trips,
            self.aggregation.kind()
        );

        match page_request {
            None => {
                let trips = match aggregate.materialized_trips {
                    Some(trips) => trips,
                    None => self.repository.trip_rows(driver_id, None, None).await?,
                };
                Ok(assembler::assemble_full_history(aggregate.driver, &aggregate.totals, trips))
            }
            Some(request) => {
                let page = fetch_page(&self.repository, driver_id, &request).await?;
                Ok(assembler::assemble_page(aggregate.driver, &aggregate.totals, page, request.limit))
            }
        }
    }
}
