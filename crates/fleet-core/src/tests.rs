//! Unit tests for fleet-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, LaneId, VertexId};

    #[test]
    fn index_roundtrip() {
        let id = VertexId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(VertexId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(AgentId(0) < AgentId(1));
        assert!(LaneId(100) > LaneId(99));
    }

    #[test]
    fn display_prefixes() {
        assert_eq!(AgentId(7).to_string(), "R7");
        assert_eq!(VertexId(3).to_string(), "v3");
        assert_eq!(LaneId(0).to_string(), "L0");
    }
}

#[cfg(test)]
mod geo {
    use crate::Point;

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
        assert_eq!(a.distance(a), 0.0);
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Point::new(0.0, 2.0);
        let b = Point::new(4.0, 6.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Point::new(2.0, 4.0));
    }
}

#[cfg(test)]
mod time {
    use std::time::Duration;

    use crate::{SimClock, SimTime, Tick};

    #[test]
    fn secs_conversion_rounds_to_millis() {
        assert_eq!(SimTime::from_secs_f64(1.5), SimTime(1_500));
        assert_eq!(SimTime::from_secs_f64(0.0004), SimTime(0));
        assert_eq!(SimTime::from_secs_f64(-3.0), SimTime::ZERO);
        assert_eq!(SimTime::from_secs_f64(f64::NAN), SimTime::ZERO);
        assert_eq!(SimTime(2_250).as_secs_f64(), 2.25);
    }

    #[test]
    fn since_saturates() {
        let a = SimTime(1_000);
        let b = SimTime(4_000);
        assert_eq!(b.since(a), Duration::from_secs(3));
        assert_eq!(a.since(b), Duration::ZERO);
    }

    #[test]
    fn clock_advances_tick_and_time() {
        let mut clock = SimClock::new();
        clock.advance(Duration::from_millis(500));
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.tick, Tick(2));
        assert_eq!(clock.now, SimTime(750));
        assert_eq!(clock.last_delta, Duration::from_millis(250));
    }

    #[test]
    fn every_interval() {
        assert!(Tick(10).is_every(5));
        assert!(!Tick(11).is_every(5));
        assert!(!Tick(10).is_every(0));
    }
}

#[cfg(test)]
mod grant {
    use crate::{AgentId, DenyReason, Grant, LaneId, Resource};

    #[test]
    fn denial_accessors() {
        let denied = Grant::Denied(DenyReason::Occupied {
            resource: Resource::Lane(LaneId(1)),
            by:       AgentId(3),
        });
        assert!(denied.is_denied());
        assert_eq!(denied.denial().and_then(|r| r.blocking_agent()), Some(AgentId(3)));
        assert!(Grant::Granted.into_result().is_ok());
        assert!(Grant::Denied(DenyReason::Blocked(LaneId(0))).denial().unwrap().blocking_agent().is_none());
    }
}

#[cfg(test)]
mod state {
    use crate::RobotState;

    #[test]
    fn busy_and_accepting_are_disjoint() {
        for s in [
            RobotState::Idle,
            RobotState::Moving,
            RobotState::Waiting,
            RobotState::Charging,
            RobotState::TaskComplete,
        ] {
            assert!(!(s.is_busy() && s.accepts_task()), "{s}");
        }
        assert!(!RobotState::Charging.accepts_task());
        assert_eq!(RobotState::TaskComplete.to_string(), "task_complete");
    }
}
