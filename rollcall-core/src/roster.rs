//! The attendee roster of a single event.
//!
//! `Roster` keeps the member list and the denormalized attendee counter in
//! one value. The only mutators are [`Roster::try_add`] and
//! [`Roster::try_remove`], which move both together or leave both
//! untouched, so `count == attendees.len() <= capacity` holds for every
//! reachable value.

use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    capacity: u32,
    attendees: Vec<Uuid>,
    count: u32,
}

/// Why [`Roster::try_add`] refused a user.
///
/// `AlreadyJoined` is reported in preference to `Full` when both hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdmissionRejection {
    #[error("already joined")]
    AlreadyJoined,
    #[error("event full")]
    Full,
}

/// [`Roster::try_remove`] was asked to remove a non-member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("not attending")]
pub struct NotAttending;

/// A roster could not be built, or a capacity change would break it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("capacity must be at least 1")]
    ZeroCapacity,
    #[error("value {0} is out of range")]
    OutOfRange(i64),
    #[error("attendee count {count} does not match {members} members")]
    CountMismatch { count: u32, members: usize },
    #[error("duplicate attendee {0}")]
    DuplicateAttendee(Uuid),
    #[error("attendee count {count} exceeds capacity {capacity}")]
    OverCapacity { count: u32, capacity: u32 },
    #[error("capacity {requested} is below current attendance {count}")]
    CapacityBelowAttendance { requested: u32, count: u32 },
}

impl Roster {
    /// An empty roster.
    pub fn new(capacity: u32) -> Result<Self, RosterError> {
        if capacity == 0 {
            return Err(RosterError::ZeroCapacity);
        }
        Ok(Self {
            capacity,
            attendees: Vec::new(),
            count: 0,
        })
    }

    /// Rebuild a roster from stored parts, checking every invariant.
    pub fn from_parts(capacity: u32, attendees: Vec<Uuid>, count: u32) -> Result<Self, RosterError> {
        if capacity == 0 {
            return Err(RosterError::ZeroCapacity);
        }
        if count as usize != attendees.len() {
            return Err(RosterError::CountMismatch {
                count,
                members: attendees.len(),
            });
        }
        let mut seen = HashSet::with_capacity(attendees.len());
        if let Some(dup) = attendees.iter().find(|a| !seen.insert(**a)) {
            return Err(RosterError::DuplicateAttendee(*dup));
        }
        if count > capacity {
            return Err(RosterError::OverCapacity { count, capacity });
        }
        Ok(Self {
            capacity,
            attendees,
            count,
        })
    }

    /// Admit `user` if they are not a member and a seat is free.
    pub fn try_add(&mut self, user: Uuid) -> Result<(), AdmissionRejection> {
        if self.contains(user) {
            return Err(AdmissionRejection::AlreadyJoined);
        }
        if self.is_full() {
            return Err(AdmissionRejection::Full);
        }
        self.attendees.push(user);
        self.count += 1;
        Ok(())
    }

    /// Release `user`'s seat.
    pub fn try_remove(&mut self, user: Uuid) -> Result<(), NotAttending> {
        let pos = self
            .attendees
            .iter()
            .position(|a| *a == user)
            .ok_or(NotAttending)?;
        self.attendees.remove(pos);
        self.count -= 1;
        Ok(())
    }

    /// Change the capacity; never below the current attendance.
    pub fn try_set_capacity(&mut self, capacity: u32) -> Result<(), RosterError> {
        if capacity == 0 {
            return Err(RosterError::ZeroCapacity);
        }
        if capacity < self.count {
            return Err(RosterError::CapacityBelowAttendance {
                requested: capacity,
                count: self.count,
            });
        }
        self.capacity = capacity;
        Ok(())
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn attendees(&self) -> &[Uuid] {
        &self.attendees
    }

    pub fn contains(&self, user: Uuid) -> bool {
        self.attendees.contains(&user)
    }

    pub fn is_full(&self) -> bool {
        self.count >= self.capacity
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove_move_count_with_members() {
        let mut roster = Roster::new(2).unwrap();
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());

        roster.try_add(a).unwrap();
        roster.try_add(b).unwrap();
        assert_eq!(roster.count(), 2);
        assert_eq!(roster.attendees(), &[a, b]);
        assert!(roster.is_full());

        roster.try_remove(a).unwrap();
        assert_eq!(roster.count(), 1);
        assert_eq!(roster.attendees(), &[b]);
    }

    #[test]
    fn duplicate_join_is_rejected_before_full() {
        let mut roster = Roster::new(1).unwrap();
        let a = Uuid::now_v7();
        roster.try_add(a).unwrap();
        assert_eq!(roster.try_add(a), Err(AdmissionRejection::AlreadyJoined));
        assert_eq!(
            roster.try_add(Uuid::now_v7()),
            Err(AdmissionRejection::Full)
        );
        assert_eq!(roster.count(), 1);
    }

    #[test]
    fn removing_non_member_changes_nothing() {
        let mut roster = Roster::new(3).unwrap();
        let a = Uuid::now_v7();
        roster.try_add(a).unwrap();
        let before = roster.clone();
        assert_eq!(roster.try_remove(Uuid::now_v7()), Err(NotAttending));
        assert_eq!(roster, before);
    }

    #[test]
    fn join_then_leave_restores_roster() {
        let mut roster = Roster::new(3).unwrap();
        roster.try_add(Uuid::now_v7()).unwrap();
        let before = roster.clone();
        let user = Uuid::now_v7();
        roster.try_add(user).unwrap();
        roster.try_remove(user).unwrap();
        assert_eq!(roster, before);
    }

    #[test]
    fn from_parts_checks_invariants() {
        let a = Uuid::now_v7();
        assert_eq!(Roster::from_parts(0, vec![], 0), Err(RosterError::ZeroCapacity));
        assert!(matches!(
            Roster::from_parts(2, vec![a], 2),
            Err(RosterError::CountMismatch { .. })
        ));
        assert_eq!(
            Roster::from_parts(2, vec![a, a], 2),
            Err(RosterError::DuplicateAttendee(a))
        );
        assert!(matches!(
            Roster::from_parts(1, vec![a, Uuid::now_v7()], 2),
            Err(RosterError::OverCapacity { .. })
        ));
        assert!(Roster::from_parts(2, vec![a], 1).is_ok());
    }

    #[test]
    fn capacity_cannot_drop_below_attendance() {
        let mut roster = Roster::new(3).unwrap();
        roster.try_add(Uuid::now_v7()).unwrap();
        roster.try_add(Uuid::now_v7()).unwrap();
        assert!(matches!(
            roster.try_set_capacity(1),
            Err(RosterError::CapacityBelowAttendance { .. })
        ));
        roster.try_set_capacity(2).unwrap();
        assert!(roster.is_full());
    }
}
