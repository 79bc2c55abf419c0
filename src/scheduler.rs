//! Multi-trip scheduling.
//!
//! Drives repeated assignment rounds over the same vehicle pool until every
//! routable order is placed: prepare once, then per round build the model,
//! escalate through the search strategies (falling back to the greedy
//! assigner), emit shipments, and re-prioritize vehicles by accumulated
//! load. The overflow slot exists only in the first round; a round that
//! places nothing ends the loop with the remainder reported unassigned.

use std::collections::HashSet;

use log::{info, warn};

use crate::assemble::assemble_shipment;
use crate::distance::{DistanceResolver, DEFAULT_PROVIDER_THRESHOLD};
use crate::error::AssignmentError;
use crate::greedy::greedy_fallback;
use crate::models::{AssignmentRequest, AssignmentResult, UnassignedOrder, UnassignedReason,
    Vehicle};
use crate::prepare::{prepare_orders, OrderNode};
use crate::solver::{BudgetModel, RoutingModel, SearchEscalator};
use crate::stores::{AddressStore, DistanceCacheStore, RoadDistanceProvider};

/// Tunable parameters of the scheduling loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Service time per stop, in minutes.
    pub service_minutes: f64,
    /// Average travel speed for timing, in km/h.
    pub average_speed_kmh: f64,
    /// Great-circle distance above which the road provider is consulted.
    pub provider_threshold: f64,
    /// Search-strategy time budgets.
    pub budgets: BudgetModel,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            service_minutes: 15.0,
            average_speed_kmh: 30.0,
            provider_threshold: DEFAULT_PROVIDER_THRESHOLD,
            budgets: BudgetModel::default(),
        }
    }
}

/// A vehicle in the round-to-round pool with its accumulated trip time.
struct PoolEntry {
    vehicle: Vehicle,
    assigned_minutes: f64,
}

/// Orchestrates the whole assignment: demand preparation, per-round solving,
/// and shipment assembly across trips.
///
/// # Examples
///
/// ```
/// use fleet_routing::models::{Address, AssignmentRequest, CalcOptions, DeliveryOrder,
///     GeoPoint, OrderLine, Vehicle};
/// use fleet_routing::scheduler::TripScheduler;
/// use fleet_routing::stores::memory::{InMemoryAddressStore, InMemoryDistanceCache,
///     OfflineRoadProvider};
///
/// let addresses: InMemoryAddressStore = [
///     Address::new(1).with_location(GeoPoint::new(0.0, 0.0)),
///     Address::new(2).with_location(GeoPoint::new(0.0, 0.01)),
/// ]
/// .into_iter()
/// .collect();
/// let cache = InMemoryDistanceCache::new();
/// let provider = OfflineRoadProvider;
///
/// let request = AssignmentRequest {
///     vehicles: vec![Vehicle::new(1).with_weight(50.0, 80.0, 100.0)],
///     orders: vec![DeliveryOrder::new(10, 2).with_line(OrderLine::new(1.0, 5.0, 0.0))],
///     depot_address_id: 1,
///     options: CalcOptions::default(),
/// };
///
/// let scheduler = TripScheduler::new(&addresses, &cache, &provider);
/// let result = scheduler.plan(&request).unwrap();
/// assert_eq!(result.shipments.len(), 1);
/// assert!(result.unassigned_orders.is_empty());
/// ```
pub struct TripScheduler<'a, A, C, P> {
    addresses: &'a A,
    cache: &'a C,
    provider: &'a P,
    config: SchedulerConfig,
    escalator: Option<SearchEscalator>,
}

impl<'a, A, C, P> TripScheduler<'a, A, C, P>
where
    A: AddressStore,
    C: DistanceCacheStore,
    P: RoadDistanceProvider,
{
    /// Creates a scheduler over the given collaborators with default
    /// configuration.
    pub fn new(addresses: &'a A, cache: &'a C, provider: &'a P) -> Self {
        Self {
            addresses,
            cache,
            provider,
            config: SchedulerConfig::default(),
            escalator: None,
        }
    }

    /// Replaces the scheduling configuration.
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the search escalator (the default is built per request from
    /// the request's strategy preference).
    pub fn with_escalator(mut self, escalator: SearchEscalator) -> Self {
        self.escalator = Some(escalator);
        self
    }

    /// Runs the full assignment for `request`.
    ///
    /// Every input order ends in exactly one shipment route or exactly once
    /// in the unassigned list. Fatal conditions (unresolvable depot, empty
    /// fleet) abort with an error; everything else degrades.
    pub fn plan(&self, request: &AssignmentRequest) -> Result<AssignmentResult, AssignmentError> {
        if request.orders.is_empty() {
            return Ok(AssignmentResult::default());
        }
        if request.vehicles.is_empty() {
            return Err(AssignmentError::EmptyFleet);
        }

        let prepared = prepare_orders(
            self.addresses,
            &request.orders,
            &request.vehicles,
            request.depot_address_id,
            &request.options.constraints,
        )?;
        let mut unassigned = prepared.rejected;

        let mut resolver = DistanceResolver::new(self.cache, self.provider)
            .with_threshold(self.config.provider_threshold);
        let mut ids: Vec<i64> = prepared.nodes.iter().map(|n| n.address_id).collect();
        ids.sort_unstable();
        ids.dedup();
        resolver.preload(&ids);

        let depot = prepared.nodes[0].clone();
        let mut pending: Vec<OrderNode> = prepared.nodes.into_iter().skip(1).collect();

        let default_escalator = SearchEscalator::new(request.options.strategy)
            .with_budgets(self.config.budgets.clone());
        let escalator = self.escalator.as_ref().unwrap_or(&default_escalator);
        let cost_per_km = request.options.distance_cost_per_km();

        let mut pool: Vec<PoolEntry> = request
            .vehicles
            .iter()
            .cloned()
            .map(|vehicle| PoolEntry {
                vehicle,
                assigned_minutes: 0.0,
            })
            .collect();

        let mut shipments = Vec::new();
        let mut trip: u32 = 1;
        let mut include_overflow = true;

        while !pending.is_empty() {
            let mut nodes = Vec::with_capacity(pending.len() + 1);
            nodes.push(depot.clone());
            nodes.extend(pending.iter().cloned());
            let vehicles: Vec<Vehicle> = pool.iter().map(|p| p.vehicle.clone()).collect();

            let model = RoutingModel::build(
                nodes,
                &vehicles,
                &request.options.constraints,
                include_overflow,
                &mut resolver,
            )?;

            let assignment = match escalator.solve(&model) {
                Some(solution) => solution,
                None => {
                    warn!("trip round {trip}: every search strategy failed");
                    greedy_fallback(&model)
                }
            };

            let mut placed = HashSet::new();
            for (slot_idx, slot) in model.slots.iter().enumerate() {
                let route = &assignment.routes[slot_idx];
                if slot.overflow || route.is_empty() {
                    continue;
                }
                let shipment = assemble_shipment(
                    &model,
                    route,
                    &vehicles[slot_idx],
                    trip,
                    &request.options.constraints,
                    cost_per_km,
                    &self.config,
                );
                pool[slot_idx].assigned_minutes += shipment.total_time;
                for point in &shipment.route {
                    placed.insert(point.order_id);
                }
                shipments.push(shipment);
            }

            if placed.is_empty() {
                warn!(
                    "trip round {trip} placed no orders; reporting {} as unassigned",
                    pending.len()
                );
                unassigned.extend(pending.iter().filter_map(|n| n.order_id).map(|order_id| {
                    UnassignedOrder {
                        order_id,
                        reason: UnassignedReason::NoVehicleAvailable,
                    }
                }));
                break;
            }

            pending.retain(|node| node.order_id.is_some_and(|id| !placed.contains(&id)));
            info!(
                "trip round {trip}: {} orders placed, {} pending",
                placed.len(),
                pending.len()
            );

            // The overflow slot is a first-round device only; later rounds
            // run against the real fleet, least-loaded vehicles first.
            include_overflow = false;
            trip += 1;
            pool.sort_by(|a, b| {
                a.assigned_minutes
                    .partial_cmp(&b.assigned_minutes)
                    .expect("trip time should not be NaN")
            });
        }

        Ok(AssignmentResult {
            shipments,
            unassigned_orders: unassigned,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, CalcOptions, CapacityConstraints, CostKind, CostWeight,
        DeliveryOrder, FillPolicy, GeoPoint, OrderLine, StrategyPreference};
    use crate::stores::memory::{InMemoryAddressStore, InMemoryDistanceCache, OfflineRoadProvider};

    fn addresses() -> InMemoryAddressStore {
        [
            Address::new(1).with_location(GeoPoint::new(0.0, 0.0)),
            Address::new(2).with_location(GeoPoint::new(0.0, 1.0)),
            Address::new(3).with_location(GeoPoint::new(0.0, 2.0)),
            Address::new(4).with_location(GeoPoint::new(1.0, 0.0)),
        ]
        .into_iter()
        .collect()
    }

    fn order(id: i64, address_id: i64, weight: f64) -> DeliveryOrder {
        DeliveryOrder::new(id, address_id).with_line(OrderLine::new(1.0, weight, 0.0))
    }

    fn weight_only(policy: FillPolicy) -> CapacityConstraints {
        CapacityConstraints {
            weight: policy,
            volume: FillPolicy::Disabled,
        }
    }

    fn plan(request: &AssignmentRequest) -> Result<AssignmentResult, AssignmentError> {
        let store = addresses();
        let cache = InMemoryDistanceCache::new();
        let provider = OfflineRoadProvider;
        TripScheduler::new(&store, &cache, &provider).plan(request)
    }

    #[test]
    fn test_single_vehicle_single_trip() {
        // Depot at (0,0); orders at (0,1) and (0,2), weight 5 each; one
        // vehicle with maximum weight 12 and volume disabled.
        let request = AssignmentRequest {
            vehicles: vec![Vehicle::new(1).with_weight(0.0, 0.0, 12.0)],
            orders: vec![order(101, 2, 5.0), order(102, 3, 5.0)],
            depot_address_id: 1,
            options: CalcOptions {
                constraints: weight_only(FillPolicy::Maximum),
                ..CalcOptions::default()
            },
        };
        let result = plan(&request).expect("plans");

        assert_eq!(result.shipments.len(), 1);
        assert!(result.unassigned_orders.is_empty());
        let shipment = &result.shipments[0];
        assert_eq!(shipment.trip, 1);
        assert_eq!(shipment.total_weight, 10.0);
        assert!((shipment.weight_rate - 10.0 / 12.0).abs() < 1e-6);
        // Nearer order first is the cheaper tour.
        let ids: Vec<i64> = shipment.route.iter().map(|p| p.order_id).collect();
        assert_eq!(ids, vec![101, 102]);
    }

    #[test]
    fn test_capacity_forces_second_trip() {
        // Each order fits alone but not together: two trips of one vehicle.
        let request = AssignmentRequest {
            vehicles: vec![Vehicle::new(1).with_weight(0.0, 0.0, 6.0)],
            orders: vec![order(101, 2, 5.0), order(102, 3, 5.0)],
            depot_address_id: 1,
            options: CalcOptions {
                constraints: weight_only(FillPolicy::Maximum),
                ..CalcOptions::default()
            },
        };
        let result = plan(&request).expect("plans");

        assert_eq!(result.shipments.len(), 2);
        assert!(result.unassigned_orders.is_empty());
        let mut trips: Vec<u32> = result.shipments.iter().map(|s| s.trip).collect();
        trips.sort_unstable();
        assert_eq!(trips, vec![1, 2]);
        assert!(result.shipments.iter().all(|s| s.route.len() == 1));
        assert!(result.shipments.iter().all(|s| s.vehicle_id == 1));
    }

    #[test]
    fn test_order_exceeding_fleet_ceiling_is_never_attempted() {
        let request = AssignmentRequest {
            vehicles: vec![Vehicle::new(1).with_weight(0.0, 0.0, 12.0)],
            orders: vec![order(101, 2, 50.0)],
            depot_address_id: 1,
            options: CalcOptions {
                constraints: weight_only(FillPolicy::Maximum),
                ..CalcOptions::default()
            },
        };
        let result = plan(&request).expect("plans");
        assert!(result.shipments.is_empty());
        assert_eq!(result.unassigned_orders.len(), 1);
        assert_eq!(
            result.unassigned_orders[0].reason,
            UnassignedReason::ExceedsCapacity
        );
    }

    #[test]
    fn test_no_single_vehicle_fits_both_dimensions() {
        // Passes the fleet-wide per-dimension ceilings (weight via vehicle
        // 1, volume via vehicle 2) but fits no single vehicle: the round
        // makes no progress and the order is reported unassigned.
        let request = AssignmentRequest {
            vehicles: vec![
                Vehicle::new(1).with_weight(0.0, 0.0, 10.0).with_volume(0.0, 0.0, 1.0),
                Vehicle::new(2).with_weight(0.0, 0.0, 5.0).with_volume(0.0, 0.0, 5.0),
            ],
            orders: vec![DeliveryOrder::new(101, 2)
                .with_line(OrderLine::new(1.0, 8.0, 3.0))],
            depot_address_id: 1,
            options: CalcOptions {
                constraints: CapacityConstraints {
                    weight: FillPolicy::Maximum,
                    volume: FillPolicy::Maximum,
                },
                ..CalcOptions::default()
            },
        };
        let result = plan(&request).expect("plans, degraded");
        assert!(result.shipments.is_empty());
        assert_eq!(result.unassigned_orders.len(), 1);
        assert_eq!(
            result.unassigned_orders[0].reason,
            UnassignedReason::NoVehicleAvailable
        );
    }

    #[test]
    fn test_coverage_invariant() {
        // A mix: one routable order, one with an unknown address, one too
        // heavy for the whole fleet. |orders| == routed + unassigned.
        let request = AssignmentRequest {
            vehicles: vec![Vehicle::new(1).with_weight(0.0, 0.0, 12.0)],
            orders: vec![
                order(101, 2, 5.0),
                order(102, 77, 1.0),
                order(103, 3, 99.0),
            ],
            depot_address_id: 1,
            options: CalcOptions {
                constraints: weight_only(FillPolicy::Maximum),
                ..CalcOptions::default()
            },
        };
        let result = plan(&request).expect("plans");

        let routed: Vec<i64> = result
            .shipments
            .iter()
            .flat_map(|s| s.route.iter().map(|p| p.order_id))
            .collect();
        let unassigned: Vec<i64> = result
            .unassigned_orders
            .iter()
            .map(|u| u.order_id)
            .collect();
        assert_eq!(routed.len() + unassigned.len(), 3);
        for id in [101, 102, 103] {
            let in_routed = routed.iter().filter(|&&r| r == id).count();
            let in_unassigned = unassigned.iter().filter(|&&u| u == id).count();
            assert_eq!(in_routed + in_unassigned, 1, "order {id} appears once");
        }
    }

    #[test]
    fn test_greedy_fallback_still_returns_result() {
        // An empty strategy ladder forces the fallback path.
        let store = addresses();
        let cache = InMemoryDistanceCache::new();
        let provider = OfflineRoadProvider;
        let scheduler = TripScheduler::new(&store, &cache, &provider).with_escalator(
            SearchEscalator::new(StrategyPreference::Automatic).with_ladder(Vec::new()),
        );

        let request = AssignmentRequest {
            vehicles: vec![Vehicle::new(1).with_weight(0.0, 0.0, 12.0)],
            orders: vec![order(101, 2, 5.0), order(102, 3, 5.0)],
            depot_address_id: 1,
            options: CalcOptions {
                constraints: weight_only(FillPolicy::Maximum),
                ..CalcOptions::default()
            },
        };
        let result = scheduler.plan(&request).expect("fallback result");
        assert_eq!(result.shipments.len(), 1);
        let shipment = &result.shipments[0];
        assert_eq!(shipment.route.len(), 2);
        assert_eq!(shipment.total_weight, 10.0);
        assert!(shipment.total_distance > 0.0);
        assert!(shipment.total_time > 0.0);
        assert!(result.unassigned_orders.is_empty());
    }

    #[test]
    fn test_multi_trip_balances_pool() {
        // Three single-order trips across two vehicles of capacity 5.
        let request = AssignmentRequest {
            vehicles: vec![
                Vehicle::new(1).with_weight(0.0, 0.0, 5.0),
                Vehicle::new(2).with_weight(0.0, 0.0, 5.0),
            ],
            orders: vec![order(101, 2, 5.0), order(102, 3, 5.0), order(103, 4, 5.0)],
            depot_address_id: 1,
            options: CalcOptions {
                constraints: weight_only(FillPolicy::Maximum),
                ..CalcOptions::default()
            },
        };
        let result = plan(&request).expect("plans");

        assert_eq!(result.shipments.len(), 3);
        assert!(result.unassigned_orders.is_empty());
        assert!(result.shipments.iter().any(|s| s.trip == 2));
        // Capacity invariant with zero tolerance.
        assert!(result.shipments.iter().all(|s| s.total_weight <= 5.0));
    }

    #[test]
    fn test_empty_orders_short_circuits() {
        let request = AssignmentRequest {
            vehicles: vec![Vehicle::new(1)],
            orders: Vec::new(),
            depot_address_id: 1,
            options: CalcOptions::default(),
        };
        let result = plan(&request).expect("empty result");
        assert!(result.shipments.is_empty());
        assert!(result.unassigned_orders.is_empty());
    }

    #[test]
    fn test_empty_fleet_is_fatal() {
        let request = AssignmentRequest {
            vehicles: Vec::new(),
            orders: vec![order(101, 2, 5.0)],
            depot_address_id: 1,
            options: CalcOptions::default(),
        };
        assert_eq!(plan(&request).unwrap_err(), AssignmentError::EmptyFleet);
    }

    #[test]
    fn test_unknown_depot_is_fatal() {
        let request = AssignmentRequest {
            vehicles: vec![Vehicle::new(1)],
            orders: vec![order(101, 2, 5.0)],
            depot_address_id: 999,
            options: CalcOptions::default(),
        };
        assert_eq!(
            plan(&request).unwrap_err(),
            AssignmentError::DepotNotFound(999)
        );
    }

    #[test]
    fn test_total_cost_from_cost_model() {
        let request = AssignmentRequest {
            vehicles: vec![Vehicle::new(1).with_weight(0.0, 0.0, 12.0)],
            orders: vec![order(101, 2, 5.0)],
            depot_address_id: 1,
            options: CalcOptions {
                costs: vec![CostWeight {
                    kind: CostKind::Distance,
                    value: 3.0,
                }],
                constraints: weight_only(FillPolicy::Maximum),
                ..CalcOptions::default()
            },
        };
        let result = plan(&request).expect("plans");
        let shipment = &result.shipments[0];
        let expected = 3.0 * shipment.total_distance / 1000.0;
        assert!((shipment.total_cost - expected).abs() < 1e-6);
    }
}
