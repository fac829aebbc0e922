/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::collections::{BTreeSet, VecDeque};
use std::ops::RangeInclusive;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{Direction, PlanViolation};

/**
 * One direction-consistent segment of an elevator's travel.
 *
 * `direction` is always `Up` or `Down`. `floors` holds every floor the elevator still has to
 * stop at or pass by while travelling in that direction.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leg {
    pub direction: Direction,
    pub floors: BTreeSet<u8>,
}

impl Leg {
    fn new(direction: Direction, floors: RangeInclusive<u8>) -> Leg {
        Leg {
            direction,
            floors: floors.collect(),
        }
    }

    fn end_floor(&self) -> Option<u8> {
        match self.direction {
            Direction::Up => self.floors.last().copied(),
            _ => self.floors.first().copied(),
        }
    }
}

/**
 * The floors an elevator still has to visit, as an ordered queue of legs.
 *
 * The front leg is drained first and completely before the next one is considered, so the
 * insertion order of directions is also the order of travel. Only the dispatcher adds floors and
 * only the owning elevator removes them; both do so under the dispatcher's registry lock.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopPlan {
    legs: VecDeque<Leg>,
}

impl StopPlan {
    pub fn new() -> StopPlan {
        StopPlan::default()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.iter().all(|leg| leg.floors.is_empty())
    }

    pub fn clear(&mut self) {
        self.legs.clear();
    }

    pub fn legs(&self) -> impl Iterator<Item = &Leg> {
        self.legs.iter()
    }

    pub fn directions(&self) -> Vec<Direction> {
        self.legs.iter().map(|leg| leg.direction).collect()
    }

    /// Floor where the plan leaves the elevator, `current` if nothing is planned.
    pub fn tail_floor(&self, current: u8) -> u8 {
        self.legs
            .back()
            .and_then(Leg::end_floor)
            .unwrap_or(current)
    }

    /// Adds every floor from `from` to `to` to the last leg, or to a new leg if the last one
    /// travels the other way. Coinciding floors are a no-op.
    pub fn push_interval(&mut self, from: u8, to: u8) {
        let Some(direction) = Direction::between(from, to) else {
            return;
        };

        match self.legs.back_mut() {
            Some(leg) if leg.direction == direction => leg.floors.extend(floor_range(from, to)),
            _ => self.legs.push_back(Leg::new(direction, floor_range(from, to))),
        }
    }

    #[cfg(test)]
    pub(crate) fn test_from_legs(legs: Vec<Leg>) -> StopPlan {
        StopPlan { legs: legs.into() }
    }

    /**
     * Takes the next floor to stop at, starting from `current`.
     *
     * Exhausted legs are dropped. Within the front leg the nearest floor at or beyond `current` in
     * the leg's direction is removed and returned together with that direction. If the following
     * stop in the leg is more than one floor away, the floors in between are added so the elevator
     * passes them one by one.
     *
     * Returns `Ok(None)` once the plan is drained. A leg holding a floor behind `current` is a
     * broken plan and is reported as a `PlanViolation`.
     */
    pub fn next_stop(&mut self, current: u8) -> Result<Option<(Direction, u8)>, PlanViolation> {
        while let Some(leg) = self.legs.front_mut() {
            let (behind, ahead) = match leg.direction {
                Direction::Up => (
                    leg.floors.first().copied().filter(|floor| *floor < current),
                    leg.floors.range(current..).next().copied(),
                ),
                _ => (
                    leg.floors.last().copied().filter(|floor| *floor > current),
                    leg.floors.range(..=current).next_back().copied(),
                ),
            };

            if let Some(floor) = behind {
                return Err(PlanViolation {
                    direction: leg.direction,
                    current,
                    floor,
                });
            }

            let Some(stop) = ahead else {
                self.legs.pop_front();
                continue;
            };

            leg.floors.remove(&stop);
            let following = match leg.direction {
                Direction::Up => leg.floors.range(stop..).next().copied(),
                _ => leg.floors.range(..stop).next_back().copied(),
            };
            if let Some(next) = following {
                generate_intermediate_floors(&mut leg.floors, stop, next);
            }

            return Ok(Some((leg.direction, stop)));
        }

        Ok(None)
    }
}

fn floor_range(from: u8, to: u8) -> RangeInclusive<u8> {
    from.min(to)..=from.max(to)
}

fn generate_intermediate_floors(floors: &mut BTreeSet<u8>, initial: u8, target: u8) {
    // Adjacent or equal floors have nothing in between
    if initial.abs_diff(target) <= 1 {
        return;
    }

    let (low, high) = (initial.min(target), initial.max(target));
    floors.extend(low + 1..high);
}
