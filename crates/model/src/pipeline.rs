//! Pipeline coordinator.

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use hanover_cache::{CacheKey, CacheStats, ComputeCache, Stage};
use hanover_calendar::{CalendarError, RebalanceCalendar, add_months};
use hanover_characs::{CharacteristicRegistry, CharacteristicResolver};
use hanover_primitives::{
    BreakpointSet, Date, DateRange, FactorSeries, RebalancePeriod, SortMode,
};
use hanover_traits::{CharacteristicProvider, DataSource, PanelView, QueryRequest, date_lit};
use polars::prelude::*;
use serde::Serialize;

use crate::{
    AssignmentEngine, AssignmentSet, FactorRequest, ModelError, PortfolioPanel, SortInput,
    aggregate_period, combine_panels,
};

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    /// Table identifier of the price/return panel.
    pub price_table: String,
    /// Table identifier of the annual fundamentals panel.
    pub fundamentals_table: String,
    /// Months of panel history fetched before the requested range, for
    /// lagged characteristics.
    pub lookback_months: i32,
    /// Maximum ready entries in the computation cache.
    pub cache_capacity: usize,
    /// Characteristic supplying formation weights and weight-mass
    /// breakpoint weights.
    pub weight_characteristic: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            price_table: "security_month".to_string(),
            fundamentals_table: "fundamentals_annual".to_string(),
            lookback_months: 60,
            cache_capacity: 256,
            weight_characteristic: "market_equity".to_string(),
        }
    }
}

/// Universe coverage of one rebalancing period, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodCoverage {
    /// The period.
    pub period: RebalancePeriod,
    /// Securities listed at formation.
    pub n_listed: usize,
    /// Securities eligible for assignment.
    pub n_eligible: usize,
    /// Eligible securities inside the breakpoint reference subset.
    pub n_reference: usize,
    /// Whether the period's portfolios are computable.
    pub available: bool,
}

/// Coverage across the periods of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageReport {
    /// Per-period coverage, in period order.
    pub periods: Vec<PeriodCoverage>,
}

impl CoverageReport {
    /// Number of computable periods.
    #[must_use]
    pub fn available_periods(&self) -> usize {
        self.periods.iter().filter(|p| p.available).count()
    }
}

/// The eligible cross-section of one period, aligned by security.
struct CrossSection {
    symbols: Vec<String>,
    weights: Vec<f64>,
    sorts: Vec<SortInput>,
    n_listed: usize,
}

/// Answers factor construction requests against a data source, memoizing
/// every stage boundary in an owned computation cache.
///
/// Requests with identical parameters are answered from the cache; the
/// cache also shares characteristic, breakpoint, and portfolio-return
/// computations across overlapping requests. Shareable across threads by
/// reference; the cache enforces at-most-once computation per key.
pub struct FactorPipeline<S: DataSource> {
    source: S,
    provider: Arc<dyn CharacteristicProvider>,
    cache: ComputeCache,
    config: PipelineConfig,
}

impl<S: DataSource> std::fmt::Debug for FactorPipeline<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactorPipeline")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl<S: DataSource> FactorPipeline<S> {
    /// Create a pipeline over a data source and characteristic provider.
    #[must_use]
    pub fn new(
        source: S,
        provider: Arc<dyn CharacteristicProvider>,
        config: PipelineConfig,
    ) -> Self {
        let cache = ComputeCache::with_capacity(config.cache_capacity);
        Self { source, provider, cache, config }
    }

    /// Create a pipeline with the standard characteristic registry and
    /// default configuration.
    #[must_use]
    pub fn with_default_characteristics(source: S) -> Self {
        Self::new(
            source,
            Arc::new(CharacteristicRegistry::with_defaults()),
            PipelineConfig::default(),
        )
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Cache activity counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Construct a factor series for a request.
    ///
    /// Periods whose reference subset cannot support the sort are marked
    /// unavailable and the series continues; configuration, schema, and
    /// data-source errors abort the request.
    ///
    /// # Errors
    /// See the error taxonomy on [`ModelError`].
    pub fn factor_series(&self, request: &FactorRequest) -> Result<FactorSeries, ModelError> {
        request.validate()?;
        self.check_characteristics(request)?;

        let key = CacheKey::new(Stage::FactorSeries, request)?;
        let series: Arc<FactorSeries> = self.cache.get_or_compute(&key, || {
            let panels = self.panels(request)?;
            Ok::<_, ModelError>(combine_panels(&request.name, &panels, &request.combination))
        })?;
        Ok(series.as_ref().clone())
    }

    /// Per-period portfolio panels for a request, without combining.
    ///
    /// # Errors
    /// As [`Self::factor_series`].
    pub fn portfolio_returns(
        &self,
        request: &FactorRequest,
    ) -> Result<Vec<Arc<PortfolioPanel>>, ModelError> {
        request.validate()?;
        self.check_characteristics(request)?;
        self.panels(request)
    }

    /// Universe coverage per period, for diagnostics.
    ///
    /// # Errors
    /// As [`Self::factor_series`].
    pub fn coverage(&self, request: &FactorRequest) -> Result<CoverageReport, ModelError> {
        request.validate()?;
        self.check_characteristics(request)?;

        let calendar = RebalanceCalendar::new(request.calendar.clone())?;
        let periods = calendar.periods(&request.range)?;
        let (view, view_start) = self.fetch_view(&request.range)?;

        let mut coverage = Vec::with_capacity(periods.len());
        for period in periods {
            let cross = self.cross_section(&view, view_start, &period, request)?;
            let n_reference =
                cross.sorts.first().map_or(0, |s| s.reference.iter().filter(|r| **r).count());

            let available = match self.assignments(&view, view_start, &period, request) {
                Ok(_) => true,
                Err(err) if err.is_recoverable() => false,
                Err(err) => return Err(err),
            };

            coverage.push(PeriodCoverage {
                period,
                n_listed: cross.n_listed,
                n_eligible: cross.symbols.len(),
                n_reference,
                available,
            });
        }

        Ok(CoverageReport { periods: coverage })
    }

    fn check_characteristics(&self, request: &FactorRequest) -> Result<(), ModelError> {
        for sort in &request.sort.characteristics {
            if self.provider.get(&sort.characteristic).is_none() {
                return Err(ModelError::UnknownCharacteristic(sort.characteristic.clone()));
            }
        }
        if self.provider.get(&self.config.weight_characteristic).is_none() {
            return Err(ModelError::UnknownCharacteristic(
                self.config.weight_characteristic.clone(),
            ));
        }
        Ok(())
    }

    fn fetch_view(&self, range: &DateRange) -> Result<(PanelView, Date), ModelError> {
        let view_start = add_months(range.start, -self.config.lookback_months);
        let extended = DateRange::new(view_start, range.end);

        let prices = self
            .source
            .query(&QueryRequest::new(self.config.price_table.as_str(), Vec::new(), extended))?;
        let fundamentals = self.source.query(&QueryRequest::new(
            self.config.fundamentals_table.as_str(),
            Vec::new(),
            extended,
        ))?;

        for required in ["date", "symbol", "asset_returns"] {
            if !prices.get_column_names().iter().any(|c| c.as_str() == required) {
                return Err(ModelError::MissingColumn(required.to_string()));
            }
        }

        Ok((PanelView::new(prices, fundamentals), view_start))
    }

    fn panels(&self, request: &FactorRequest) -> Result<Vec<Arc<PortfolioPanel>>, ModelError> {
        let calendar = RebalanceCalendar::new(request.calendar.clone())?;
        let periods = calendar.periods(&request.range)?;
        let (view, view_start) = self.fetch_view(&request.range)?;

        let mut panels = Vec::with_capacity(periods.len());
        let mut any_dates = false;
        for period in periods {
            let window = self.window_frame(&view, &period, &request.range)?;

            match self.period_panel(&view, view_start, &window, &period, request) {
                Ok(panel) => {
                    any_dates |= !panel.is_empty();
                    panels.push(panel);
                }
                Err(err) if err.is_recoverable() => {
                    let dates = frame_dates(&window)?;
                    any_dates |= !dates.is_empty();
                    panels.push(Arc::new(PortfolioPanel::unavailable(
                        dates,
                        request.sort.cells(),
                    )));
                }
                Err(err) => return Err(err),
            }
        }

        if !any_dates {
            return Err(CalendarError::NoPeriods {
                start: request.range.start,
                end: request.range.end,
            }
            .into());
        }
        Ok(panels)
    }

    fn window_frame(
        &self,
        view: &PanelView,
        period: &RebalancePeriod,
        range: &DateRange,
    ) -> Result<DataFrame, ModelError> {
        let start = period.window_start.max(range.start);
        let end = period.window_end.min(range.end);

        view.prices()
            .filter(col("date").gt_eq(date_lit(start)).and(col("date").lt_eq(date_lit(end))))
            .select([col("date"), col("symbol"), col("asset_returns")])
            .collect()
            .map_err(Into::into)
    }

    fn period_panel(
        &self,
        view: &PanelView,
        view_start: Date,
        window: &DataFrame,
        period: &RebalancePeriod,
        request: &FactorRequest,
    ) -> Result<Arc<PortfolioPanel>, ModelError> {
        let key = CacheKey::new(
            Stage::PortfolioReturns,
            &PanelKeyParams {
                request: StageKeyParams::new(self, request, period, view_start),
                weighting: request.weighting,
                window_start: period.window_start.max(request.range.start),
                window_end: period.window_end.min(request.range.end),
            },
        )?;

        self.cache.get_or_compute(&key, || {
            let set = self.assignments(view, view_start, period, request)?;
            aggregate_period(window, &set, request.weighting)
        })
    }

    fn assignments(
        &self,
        view: &PanelView,
        view_start: Date,
        period: &RebalancePeriod,
        request: &FactorRequest,
    ) -> Result<Arc<AssignmentSet>, ModelError> {
        let key = CacheKey::new(
            Stage::Assignments,
            &StageKeyParams::new(self, request, period, view_start),
        )?;

        self.cache.get_or_compute(&key, || {
            let cross = self.cross_section(view, view_start, period, request)?;
            let engine = AssignmentEngine::new(
                request.sort.mode,
                request.breakpoints.tie_break,
                request.breakpoints.basis,
            );

            let precomputed = if request.sort.mode == SortMode::Orthogonal {
                let mut sets = Vec::with_capacity(cross.sorts.len());
                for (input, sort) in cross.sorts.iter().zip(&request.sort.characteristics) {
                    sets.push(self.breakpoint_set(
                        view_start,
                        period,
                        request,
                        &sort.characteristic,
                        input,
                        &cross.weights,
                    )?);
                }
                Some(sets)
            } else {
                None
            };

            engine.assign(
                *period,
                &cross.symbols,
                &cross.weights,
                &cross.sorts,
                precomputed.as_deref(),
            )
        })
    }

    fn breakpoint_set(
        &self,
        view_start: Date,
        period: &RebalancePeriod,
        request: &FactorRequest,
        characteristic: &str,
        input: &SortInput,
        weights: &[f64],
    ) -> Result<BreakpointSet, ModelError> {
        let key = CacheKey::new(
            Stage::Breakpoints,
            &BreakKeyParams {
                characteristic,
                quantiles: &input.quantiles,
                request: StageKeyParams::new(self, request, period, view_start),
            },
        )?;

        let engine = AssignmentEngine::new(
            request.sort.mode,
            request.breakpoints.tie_break,
            request.breakpoints.basis,
        );
        let cuts: Arc<BreakpointSet> =
            self.cache.get_or_compute(&key, || engine.breakpoints_for(input, weights))?;
        Ok(cuts.as_ref().clone())
    }

    fn cross_section(
        &self,
        view: &PanelView,
        view_start: Date,
        period: &RebalancePeriod,
        request: &FactorRequest,
    ) -> Result<CrossSection, ModelError> {
        let resolver = CharacteristicResolver::new(request.universe.clone());

        let weight_frame = self.resolved(
            view,
            view_start,
            period,
            request,
            &self.config.weight_characteristic,
            &resolver,
        )?;
        let mut sort_frames = Vec::with_capacity(request.sort.characteristics.len());
        for sort in &request.sort.characteristics {
            sort_frames.push(self.resolved(
                view,
                view_start,
                period,
                request,
                &sort.characteristic,
                &resolver,
            )?);
        }

        let weight_rows = frame_rows(&weight_frame)?;
        let n_listed = weight_rows.len();
        let sort_rows: Vec<HashMap<String, ResolvedRow>> = sort_frames
            .iter()
            .map(|frame| frame_rows(frame))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|rows| rows.into_iter().map(|row| (row.symbol.clone(), row)).collect())
            .collect();

        let reference_exchanges: Option<&[String]> =
            request.breakpoints.reference.as_ref().map(|f| f.allowed.as_slice());

        let mut symbols = Vec::new();
        let mut weights = Vec::new();
        let mut reference = Vec::new();
        let mut values: Vec<Vec<f64>> = vec![Vec::new(); sort_rows.len()];

        for row in &weight_rows {
            if !row.eligible {
                continue;
            }
            let Some(weight) = row.value else {
                continue;
            };

            let mut sort_values = Vec::with_capacity(sort_rows.len());
            let mut qualified = true;
            for rows in &sort_rows {
                match rows.get(&row.symbol) {
                    Some(sort_row) if sort_row.eligible => match sort_row.value {
                        Some(value) => sort_values.push(value),
                        None => {
                            qualified = false;
                            break;
                        }
                    },
                    _ => {
                        qualified = false;
                        break;
                    }
                }
            }
            if !qualified {
                continue;
            }

            let in_reference = reference_exchanges.is_none_or(|allowed| {
                row.exchange.as_ref().is_some_and(|exchange| allowed.contains(exchange))
            });

            symbols.push(row.symbol.clone());
            weights.push(weight);
            reference.push(in_reference);
            for (column, value) in values.iter_mut().zip(sort_values) {
                column.push(value);
            }
        }

        let sorts = request
            .sort
            .characteristics
            .iter()
            .zip(values)
            .map(|(sort, column)| SortInput {
                name: sort.characteristic.clone(),
                values: column,
                reference: reference.clone(),
                quantiles: sort.quantiles.clone(),
            })
            .collect();

        Ok(CrossSection { symbols, weights, sorts, n_listed })
    }

    fn resolved(
        &self,
        view: &PanelView,
        view_start: Date,
        period: &RebalancePeriod,
        request: &FactorRequest,
        characteristic: &str,
        resolver: &CharacteristicResolver,
    ) -> Result<Arc<DataFrame>, ModelError> {
        let definition = self
            .provider
            .get(characteristic)
            .ok_or_else(|| ModelError::UnknownCharacteristic(characteristic.to_string()))?;

        let key = CacheKey::new(
            Stage::Characteristics,
            &CharacKeyParams {
                characteristic,
                universe: &request.universe,
                formation: period.formation,
                fiscal_year: period.fiscal_year,
                view_start,
                as_of: request.as_of,
                price_table: &self.config.price_table,
                fundamentals_table: &self.config.fundamentals_table,
            },
        )?;

        self.cache.get_or_compute(&key, || {
            resolver.resolve(definition.as_ref(), view, period).map_err(ModelError::from)
        })
    }
}

/// One row of a resolved characteristic frame.
struct ResolvedRow {
    symbol: String,
    exchange: Option<String>,
    value: Option<f64>,
    eligible: bool,
}

fn frame_rows(frame: &DataFrame) -> Result<Vec<ResolvedRow>, ModelError> {
    let symbols = frame.column("symbol")?.str()?;
    let exchanges = frame.column("exchange")?.str()?;
    let values = frame.column("value")?.f64()?;
    let eligible = frame.column("eligible")?.bool()?;

    let mut rows = Vec::with_capacity(frame.height());
    for i in 0..frame.height() {
        rows.push(ResolvedRow {
            symbol: symbols.get(i).unwrap_or("").to_string(),
            exchange: exchanges.get(i).map(ToString::to_string),
            value: values.get(i).filter(|v| v.is_finite()),
            eligible: eligible.get(i).unwrap_or(false),
        });
    }
    Ok(rows)
}

fn frame_dates(frame: &DataFrame) -> Result<Vec<Date>, ModelError> {
    let column = frame.column("date")?;
    let mut dates = BTreeSet::new();
    for i in 0..frame.height() {
        if let AnyValue::Date(days) = column.get(i)? {
            dates.insert(hanover_primitives::from_epoch_days(days));
        }
    }
    Ok(dates.into_iter().collect())
}

/// Cache key parameters shared by the per-period stages.
#[derive(Serialize)]
struct StageKeyParams<'a> {
    sort: &'a crate::SortSpec,
    breakpoints: &'a crate::BreakpointConfig,
    universe: &'a hanover_primitives::UniverseConfig,
    weight_characteristic: &'a str,
    formation: Date,
    fiscal_year: i32,
    view_start: Date,
    as_of: Option<Date>,
    price_table: &'a str,
    fundamentals_table: &'a str,
}

impl<'a> StageKeyParams<'a> {
    fn new<S: DataSource>(
        pipeline: &'a FactorPipeline<S>,
        request: &'a FactorRequest,
        period: &RebalancePeriod,
        view_start: Date,
    ) -> Self {
        Self {
            sort: &request.sort,
            breakpoints: &request.breakpoints,
            universe: &request.universe,
            weight_characteristic: &pipeline.config.weight_characteristic,
            formation: period.formation,
            fiscal_year: period.fiscal_year,
            view_start,
            as_of: request.as_of,
            price_table: &pipeline.config.price_table,
            fundamentals_table: &pipeline.config.fundamentals_table,
        }
    }
}

#[derive(Serialize)]
struct CharacKeyParams<'a> {
    characteristic: &'a str,
    universe: &'a hanover_primitives::UniverseConfig,
    formation: Date,
    fiscal_year: i32,
    view_start: Date,
    as_of: Option<Date>,
    price_table: &'a str,
    fundamentals_table: &'a str,
}

#[derive(Serialize)]
struct BreakKeyParams<'a> {
    characteristic: &'a str,
    quantiles: &'a [f64],
    request: StageKeyParams<'a>,
}

#[derive(Serialize)]
struct PanelKeyParams<'a> {
    request: StageKeyParams<'a>,
    weighting: hanover_primitives::Weighting,
    window_start: Date,
    window_end: Date,
}
