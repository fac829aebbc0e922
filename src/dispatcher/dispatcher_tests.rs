/*
 * Unit tests for the dispatcher module
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 *
 * The first group builds a dispatcher without starting its workers and checks the selection and
 * recording rules directly. The scenario tests start real worker threads with a short stop time and
 * poll the elevators until they settle.
 *
 * Tests:
 *  - test_dispatcher_init
 *  - test_publish_direction_reindexes_elevator
 *  - test_rejects_floors_out_of_range
 *  - test_same_floor_request_is_noop
 *  - test_unknown_elevator
 *  - test_no_available_elevator
 *  - test_tie_break_lowest_id
 *  - test_request_records_approach_and_requested_leg
 *  - test_request_to_moving_elevator_is_queued_after_its_plan
 *  - test_concurrent_requests_stay_on_their_elevator
 *  - test_scenario_single_trip
 *  - test_scenario_second_request_after_partial_motion
 *  - test_scenario_short_trip_right_after_long_trip
 *  - test_scenario_reversal
 *  - test_scenario_pickup_above_going_down
 *  - test_scenario_offline_mid_trip
 *  - test_scenario_many_callers
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod dispatcher_tests {
    use crate::config::ElevatorConfig;
    use crate::dispatcher::{Dispatcher, Request};
    use crate::elevator::{ElevatorHandle, Leg, StopPlan};
    use crate::shared::Direction::{Down, Idle, Offline, Up};
    use crate::shared::DispatchError;
    use std::sync::Arc;
    use std::thread::{sleep, Builder};
    use std::time::{Duration, Instant};

    fn test_config(n_elevators: usize) -> ElevatorConfig {
        ElevatorConfig {
            n_elevators,
            n_floors: 10,
            stop_time: 10,
        }
    }

    fn setup_dispatcher(n_elevators: usize) -> Arc<Dispatcher> {
        let (dispatcher, _fsms) = Dispatcher::build(&test_config(n_elevators));
        dispatcher
    }

    fn start_dispatcher(n_elevators: usize) -> Arc<Dispatcher> {
        Dispatcher::start(&test_config(n_elevators)).unwrap()
    }

    fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            sleep(Duration::from_millis(2));
        }
        condition()
    }

    fn settles_at(elevator: &ElevatorHandle, floor: u8) -> bool {
        wait_until(|| elevator.direction() == Idle && elevator.current_floor() == floor)
    }

    fn all_idle(dispatcher: &Dispatcher) -> bool {
        wait_until(|| {
            dispatcher.elevators().iter().all(|elevator| {
                elevator.direction() == Idle && dispatcher.test_plan(elevator.id()).is_empty()
            })
        })
    }

    #[test]
    fn test_dispatcher_init() {
        // Arrange & Act
        let dispatcher = setup_dispatcher(4);

        // Assert
        assert_eq!(dispatcher.elevators().len(), 4);
        for (id, status) in dispatcher.statuses().into_iter().enumerate() {
            assert_eq!(status.id, id);
            assert_eq!(status.current_floor, 0);
            assert_eq!(status.direction, Idle);
        }
        assert_eq!(dispatcher.test_index_members(Up), vec![0, 1, 2, 3]);
        assert_eq!(dispatcher.test_index_members(Down), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_publish_direction_reindexes_elevator() {
        // Arrange
        let dispatcher = setup_dispatcher(2);
        let elevator = dispatcher.elevator(1).unwrap();

        // Act
        elevator.set_direction(Down);
        dispatcher.publish_direction(&elevator);

        // Assert
        assert_eq!(dispatcher.test_index_members(Up), vec![0]);
        assert_eq!(dispatcher.test_index_members(Down), vec![0, 1]);
        assert_eq!(
            dispatcher.submit_request(0, 3).unwrap().unwrap().id(),
            0
        );
    }

    #[test]
    fn test_rejects_floors_out_of_range() {
        let dispatcher = setup_dispatcher(2);

        assert_eq!(
            dispatcher.submit_request(0, 10).unwrap_err(),
            DispatchError::InvalidFloor(10)
        );
        assert_eq!(
            dispatcher.submit_request(12, 3).unwrap_err(),
            DispatchError::InvalidFloor(12)
        );
        assert!(dispatcher.test_plan(0).is_empty());
        assert!(dispatcher.test_plan(1).is_empty());
    }

    #[test]
    fn test_same_floor_request_is_noop() {
        let dispatcher = setup_dispatcher(2);

        let result = Request::new(3, 3).submit(&dispatcher);

        assert_eq!(Request::new(3, 3).direction(), None);
        assert!(matches!(result, Ok(None)));
        assert!(dispatcher.test_plan(0).is_empty());
        assert_eq!(dispatcher.get_elevator_status(0).unwrap().current_floor, 0);
    }

    #[test]
    fn test_unknown_elevator() {
        let dispatcher = setup_dispatcher(2);

        assert_eq!(
            dispatcher.get_elevator_status(2).unwrap_err(),
            DispatchError::UnknownElevator(2)
        );
        assert_eq!(
            dispatcher.set_elevator_operating(7, false).unwrap_err(),
            DispatchError::UnknownElevator(7)
        );
    }

    #[test]
    fn test_no_available_elevator() {
        // Arrange
        let dispatcher = setup_dispatcher(2);
        dispatcher.set_elevator_operating(0, false).unwrap();
        dispatcher.set_elevator_operating(1, false).unwrap();

        // Act
        let up = dispatcher.submit_request(0, 4);
        let down = dispatcher.submit_request(4, 0);

        // Assert: rejected as a whole, nothing recorded
        assert_eq!(up.unwrap_err(), DispatchError::NoAvailableElevator(Up));
        assert_eq!(down.unwrap_err(), DispatchError::NoAvailableElevator(Down));
        assert!(dispatcher.test_plan(0).is_empty());
        assert!(dispatcher.test_plan(1).is_empty());
    }

    #[test]
    fn test_tie_break_lowest_id() {
        // Arrange
        let dispatcher = setup_dispatcher(3);
        dispatcher.elevator(0).unwrap().set_current_floor(6);
        dispatcher.elevator(1).unwrap().set_current_floor(2);
        dispatcher.elevator(2).unwrap().set_current_floor(2);

        // Act
        let equidistant = dispatcher.submit_request(4, 5).unwrap().unwrap();
        let nearest = dispatcher.submit_request(2, 0).unwrap().unwrap();

        // Assert
        assert_eq!(equidistant.id(), 0);
        assert_eq!(nearest.id(), 1);
    }

    #[test]
    fn test_request_records_approach_and_requested_leg() {
        // Arrange
        let dispatcher = setup_dispatcher(1);
        dispatcher.elevator(0).unwrap().set_current_floor(7);

        // Act
        dispatcher.submit_request(2, 5).unwrap();

        // Assert
        let plan = dispatcher.test_plan(0);
        let legs: Vec<&Leg> = plan.legs().collect();
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].direction, Down);
        assert_eq!(legs[0].floors.iter().copied().collect::<Vec<u8>>(), vec![2, 3, 4, 5, 6, 7]);
        assert_eq!(legs[1].direction, Up);
        assert_eq!(legs[1].floors.iter().copied().collect::<Vec<u8>>(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_request_to_moving_elevator_is_queued_after_its_plan() {
        // Arrange: elevator 0 is at floor 3 going up to 8
        let dispatcher = setup_dispatcher(1);
        let elevator = dispatcher.elevator(0).unwrap();
        *dispatcher.registry().plan_mut(0) = StopPlan::test_from_legs(vec![Leg {
            direction: Up,
            floors: (4..=8).collect(),
        }]);
        elevator.set_current_floor(3);
        elevator.set_direction(Up);
        dispatcher.publish_direction(&elevator);

        // Act
        let chosen = dispatcher.submit_request(4, 5).unwrap().unwrap();

        // Assert: the running leg keeps its end and the new trip follows it
        assert_eq!(chosen.id(), 0);
        let plan = dispatcher.test_plan(0);
        let legs: Vec<&Leg> = plan.legs().collect();
        assert_eq!(legs.len(), 3);
        assert_eq!(legs[0].direction, Up);
        assert_eq!(legs[0].floors.iter().copied().collect::<Vec<u8>>(), vec![4, 5, 6, 7, 8]);
        assert_eq!(legs[1].direction, Down);
        assert_eq!(legs[1].floors.iter().copied().collect::<Vec<u8>>(), vec![4, 5, 6, 7, 8]);
        assert_eq!(legs[2].direction, Up);
        assert_eq!(legs[2].floors.iter().copied().collect::<Vec<u8>>(), vec![4, 5]);
        assert_eq!(plan.tail_floor(3), 5);
    }

    #[test]
    fn test_concurrent_requests_stay_on_their_elevator() {
        // Arrange: elevator k waits at floor 3k
        let dispatcher = Dispatcher::build(&ElevatorConfig {
            n_elevators: 4,
            n_floors: 12,
            stop_time: 10,
        })
        .0;
        for id in 0..4 {
            dispatcher.elevator(id).unwrap().set_current_floor(3 * id as u8);
        }

        // Act
        let threads: Vec<_> = (0..4u8)
            .map(|k| {
                let dispatcher = dispatcher.clone();
                Builder::new()
                    .name(format!("caller_{}", k))
                    .spawn(move || dispatcher.submit_request(3 * k, 3 * k + 1).unwrap().unwrap().id())
                    .unwrap()
            })
            .collect();
        let chosen: Vec<usize> = threads.into_iter().map(|t| t.join().unwrap()).collect();

        // Assert
        assert_eq!(chosen, vec![0, 1, 2, 3]);
        for id in 0..4 {
            let plan = dispatcher.test_plan(id);
            let legs: Vec<&Leg> = plan.legs().collect();
            let floor = 3 * id as u8;
            assert_eq!(legs.len(), 1);
            assert_eq!(legs[0].direction, Up);
            assert_eq!(legs[0].floors.iter().copied().collect::<Vec<u8>>(), vec![floor, floor + 1]);
        }
    }

    #[test]
    fn test_scenario_single_trip() {
        // Arrange
        let dispatcher = start_dispatcher(4);

        // Act
        let elevator = dispatcher.submit_request(0, 2).unwrap().unwrap();

        // Assert
        assert!(settles_at(&elevator, 2));
        assert!(dispatcher.test_index_members(Up).contains(&elevator.id()));
        assert!(dispatcher.test_index_members(Down).contains(&elevator.id()));

        // Cleanup
        dispatcher.shutdown();
    }

    #[test]
    fn test_scenario_second_request_after_partial_motion() {
        let dispatcher = start_dispatcher(4);

        dispatcher.submit_request(0, 1).unwrap();
        sleep(Duration::from_millis(15));
        let elevator = dispatcher.submit_request(3, 5).unwrap().unwrap();

        assert!(settles_at(&elevator, 5));

        dispatcher.shutdown();
    }

    #[test]
    fn test_scenario_short_trip_right_after_long_trip() {
        let dispatcher = start_dispatcher(4);

        // The first elevator is still at or leaving floor 0 when the second request comes in
        let first = dispatcher.submit_request(0, 4).unwrap().unwrap();
        let second = dispatcher.submit_request(0, 1).unwrap().unwrap();

        assert!(settles_at(&second, 1));
        if second.id() != first.id() {
            assert!(settles_at(&first, 4));
        }

        dispatcher.shutdown();
    }

    #[test]
    fn test_scenario_reversal() {
        let dispatcher = start_dispatcher(4);

        let first = dispatcher.submit_request(0, 2).unwrap().unwrap();
        assert!(settles_at(&first, 2));
        let second = dispatcher.submit_request(2, 0).unwrap().unwrap();

        assert_eq!(second.id(), first.id());
        assert!(settles_at(&second, 0));

        dispatcher.shutdown();
    }

    #[test]
    fn test_scenario_pickup_above_going_down() {
        let dispatcher = start_dispatcher(4);

        let elevator = dispatcher.submit_request(3, 1).unwrap().unwrap();

        assert!(settles_at(&elevator, 1));

        dispatcher.shutdown();
    }

    #[test]
    fn test_scenario_offline_mid_trip() {
        // Arrange
        let dispatcher = start_dispatcher(2);
        let elevator = dispatcher.submit_request(0, 9).unwrap().unwrap();
        assert!(wait_until(|| elevator.current_floor() >= 2));

        // Act
        dispatcher.set_elevator_operating(elevator.id(), false).unwrap();

        // Assert
        assert!(wait_until(|| elevator.direction() == Offline));
        assert_eq!(elevator.current_floor(), 0);
        assert!(dispatcher.test_plan(elevator.id()).is_empty());
        for _ in 0..3 {
            let chosen = dispatcher.submit_request(0, 1).unwrap().unwrap();
            assert_ne!(chosen.id(), elevator.id());
        }

        // Act: back in service
        dispatcher.set_elevator_operating(elevator.id(), true).unwrap();

        // Assert
        assert!(settles_at(&elevator, 0));
        assert!(dispatcher.test_index_members(Up).contains(&elevator.id()));
        assert!(dispatcher.test_index_members(Down).contains(&elevator.id()));

        dispatcher.shutdown();
    }

    #[test]
    fn test_scenario_many_callers() {
        // Arrange
        let dispatcher = start_dispatcher(4);
        let trips: Vec<(u8, u8)> = vec![(0, 9), (5, 1), (2, 8), (9, 0), (3, 4), (7, 2), (1, 6), (8, 3)];

        // Act
        let threads: Vec<_> = trips
            .chunks(2)
            .map(|chunk| {
                let dispatcher = dispatcher.clone();
                let chunk = chunk.to_vec();
                Builder::new()
                    .name("caller".into())
                    .spawn(move || {
                        for (origin, destination) in chunk {
                            // Busy elevators may leave nobody for a direction; callers retry
                            loop {
                                match dispatcher.submit_request(origin, destination) {
                                    Err(DispatchError::NoAvailableElevator(_)) => {
                                        sleep(Duration::from_millis(5))
                                    }
                                    result => {
                                        assert!(result.unwrap().is_some());
                                        break;
                                    }
                                }
                            }
                            sleep(Duration::from_millis(3));
                        }
                    })
                    .unwrap()
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        // Assert: every worker survived and drained its plan
        assert!(all_idle(&dispatcher));
        assert_eq!(dispatcher.test_index_members(Up), vec![0, 1, 2, 3]);
        assert_eq!(dispatcher.test_index_members(Down), vec![0, 1, 2, 3]);

        dispatcher.shutdown();
    }
}
