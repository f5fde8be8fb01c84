//! Fluent builder for constructing a [`Fleet`].

use fleet_core::SimClock;
use fleet_graph::{NavGraph, Router};
use fleet_traffic::TrafficCoordinator;

use crate::{Fleet, FleetConfig, FleetObserver, FleetResult, IdentityStrategy, NoopObserver, SequentialIds};

/// Fluent builder for [`Fleet<R, O>`].
///
/// # Required inputs
///
/// - [`NavGraph`]: usually from [`fleet_graph::load_graph`]
/// - `R: Router`: e.g. [`fleet_graph::BfsRouter`]
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                    |
/// |-------------------|----------------------------|
/// | `.config(c)`      | `FleetConfig::default()`   |
/// | `.identity(s)`    | `SequentialIds` from 0     |
/// | `.observer(o)`    | `NoopObserver`             |
///
/// # Example
///
/// ```rust,ignore
/// let mut fleet = FleetBuilder::new(graph, AStarRouter)
///     .config(config)
///     .observer(EventLogObserver::new(writer))
///     .build()?;
/// ```
pub struct FleetBuilder<R: Router, O: FleetObserver = NoopObserver> {
    graph:    NavGraph,
    router:   R,
    config:   Option<FleetConfig>,
    identity: Option<Box<dyn IdentityStrategy>>,
    observer: O,
}

impl<R: Router> FleetBuilder<R> {
    pub fn new(graph: NavGraph, router: R) -> Self {
        Self { graph, router, config: None, identity: None, observer: NoopObserver }
    }
}

impl<R: Router, O: FleetObserver> FleetBuilder<R, O> {
    pub fn config(mut self, config: FleetConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the id allocator.  Spawning fails with
    /// [`FleetError::DuplicateAgent`][crate::FleetError::DuplicateAgent] if it
    /// ever repeats an id.
    pub fn identity(mut self, strategy: impl IdentityStrategy + 'static) -> Self {
        self.identity = Some(Box::new(strategy));
        self
    }

    pub fn observer<O2: FleetObserver>(self, observer: O2) -> FleetBuilder<R, O2> {
        FleetBuilder {
            graph:    self.graph,
            router:   self.router,
            config:   self.config,
            identity: self.identity,
            observer,
        }
    }

    /// Validate the configuration and assemble the fleet.
    ///
    /// # Errors
    ///
    /// - [`FleetError::Config`][crate::FleetError::Config] if any
    ///   [`FleetConfig`] field is out of range.
    pub fn build(self) -> FleetResult<Fleet<R, O>> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let traffic = TrafficCoordinator::new(config.traffic.clone())?;

        Ok(Fleet {
            params:   config.robot_params(),
            config,
            graph:    self.graph,
            traffic,
            router:   self.router,
            robots:   Default::default(),
            identity: self.identity.unwrap_or_else(|| Box::new(SequentialIds::default())),
            clock:    SimClock::new(),
            observer: self.observer,
        })
    }
}
