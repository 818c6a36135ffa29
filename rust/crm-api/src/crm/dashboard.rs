//! Dashboard rollups: headline counts, follow-up partition, today's meetings.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::{
    Client, Communication, Deal, DealStatus, FollowUp, FollowUpWithClient, Task, TaskStatus,
};

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_clients: u64,
    pub active_deals: u64,
    pub won_deals: u64,
    /// Sum of `value` over active deals; a missing value counts as 0.
    pub pipeline_value: f64,
    pub pending_follow_ups: u64,
    pub pending_tasks: u64,
}

impl DashboardStats {
    #[must_use]
    pub fn compute(
        clients: &[Client],
        deals: &[Deal],
        follow_ups: &[FollowUp],
        tasks: &[Task],
    ) -> Self {
        let active_deals = deals
            .iter()
            .filter(|d| d.status == DealStatus::Active)
            .count() as u64;
        let won_deals = deals.iter().filter(|d| d.status == DealStatus::Won).count() as u64;
        let pipeline_value = deals
            .iter()
            .filter(|d| d.status == DealStatus::Active)
            .map(|d| d.value.unwrap_or(0.0))
            .sum();
        let pending_follow_ups = follow_ups.iter().filter(|f| f.is_pending()).count() as u64;
        let pending_tasks = tasks
            .iter()
            .filter(|t| t.status != TaskStatus::Completed)
            .count() as u64;

        Self {
            total_clients: clients.len() as u64,
            active_deals,
            won_deals,
            pipeline_value,
            pending_follow_ups,
            pending_tasks,
        }
    }
}

/// Pending follow-ups split at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct FollowUpBuckets {
    /// `scheduled_for <= now`, ascending.
    pub overdue: Vec<FollowUpWithClient>,
    /// `scheduled_for > now`, ascending.
    pub upcoming: Vec<FollowUpWithClient>,
}

/// Partition pending follow-ups into overdue and upcoming at `now`.
///
/// A follow-up scheduled exactly at `now` is overdue. Completed rows are
/// dropped. Input order is preserved, which is ascending by schedule when
/// the rows come from a store list read.
#[must_use]
pub fn partition_follow_ups(
    follow_ups: Vec<FollowUpWithClient>,
    now: DateTime<Utc>,
) -> FollowUpBuckets {
    let (overdue, upcoming) = follow_ups
        .into_iter()
        .filter(|f| f.follow_up.is_pending())
        .partition(|f| f.follow_up.scheduled_for <= now);
    FollowUpBuckets { overdue, upcoming }
}

/// Meetings and calls scheduled within the caller's local calendar day.
///
/// The day window is `[00:00:00, 23:59:59.999…]` in the timezone given by
/// `tz_offset_minutes` (minutes east of UTC, e.g. `-300` for EST). Both
/// boundaries are inclusive. Completed rows are excluded; output ascends by
/// `scheduled_at`.
#[must_use]
pub fn todays_meetings(
    communications: Vec<Communication>,
    now: DateTime<Utc>,
    tz_offset_minutes: i32,
) -> Vec<Communication> {
    let offset = Duration::minutes(i64::from(tz_offset_minutes));
    let local_day = (now + offset).date_naive();
    let day_start = local_day.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc() - offset;
    let day_end = day_start + Duration::days(1);

    let mut meetings: Vec<Communication> = communications
        .into_iter()
        .filter(|c| c.kind.is_meeting_like() && c.completed_at.is_none())
        .filter(|c| {
            c.scheduled_at
                .is_some_and(|at| at >= day_start && at < day_end)
        })
        .collect();
    meetings.sort_by_key(|c| c.scheduled_at);
    meetings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CommunicationKind, FollowUpKind};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn client(name: &str) -> Client {
        Client {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            name: name.to_string(),
            email: None,
            phone: None,
            company: None,
            notes: None,
            tags: None,
            last_contact: None,
            created_at: Utc::now(),
        }
    }

    fn deal(status: DealStatus, value: Option<f64>) -> Deal {
        Deal {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            client_id: None,
            title: "d".to_string(),
            description: None,
            value,
            stage_id: None,
            probability: None,
            status,
            expected_close_date: None,
            actual_close_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn follow_up(scheduled_for: DateTime<Utc>, completed: bool) -> FollowUpWithClient {
        FollowUpWithClient {
            follow_up: FollowUp {
                id: Uuid::new_v4(),
                user_id: "u1".to_string(),
                client_id: None,
                kind: FollowUpKind::Reminder,
                title: "f".to_string(),
                description: None,
                scheduled_for,
                completed_at: completed.then(Utc::now),
                ai_suggested: false,
                created_at: Utc::now(),
            },
            client: None,
        }
    }

    fn meeting(
        kind: CommunicationKind,
        scheduled_at: Option<DateTime<Utc>>,
        completed: bool,
    ) -> Communication {
        Communication {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            client_id: None,
            kind,
            subject: None,
            content: None,
            scheduled_at,
            completed_at: completed.then(Utc::now),
            duration_minutes: None,
            participants: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn task(status: TaskStatus) -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            project_id: None,
            client_id: None,
            title: "t".to_string(),
            description: None,
            status,
            priority: None,
            due_date: None,
            assigned_to: None,
            tags: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn stats_sum_only_active_deal_values() {
        let clients: Vec<Client> = (0..5).map(|i| client(&format!("c{i}"))).collect();
        let deals = vec![
            deal(DealStatus::Active, Some(1000.0)),
            deal(DealStatus::Active, Some(2000.0)),
            deal(DealStatus::Active, None),
            deal(DealStatus::Won, Some(9000.0)),
        ];
        let stats = DashboardStats::compute(&clients, &deals, &[], &[]);
        assert_eq!(stats.total_clients, 5);
        assert_eq!(stats.active_deals, 3);
        assert_eq!(stats.won_deals, 1);
        assert!((stats.pipeline_value - 3000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stats_count_pending_work() {
        let follow_ups: Vec<FollowUp> = vec![
            follow_up(Utc::now(), false).follow_up,
            follow_up(Utc::now(), true).follow_up,
        ];
        let tasks = vec![
            task(TaskStatus::New),
            task(TaskStatus::InProgress),
            task(TaskStatus::Completed),
        ];
        let stats = DashboardStats::compute(&[], &[], &follow_ups, &tasks);
        assert_eq!(stats.pending_follow_ups, 1);
        assert_eq!(stats.pending_tasks, 2);
    }

    #[test]
    fn partition_puts_exact_now_in_overdue() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let buckets = partition_follow_ups(
            vec![
                follow_up(now - Duration::hours(1), false),
                follow_up(now, false),
                follow_up(now + Duration::hours(1), false),
                follow_up(now - Duration::days(2), true),
            ],
            now,
        );
        assert_eq!(buckets.overdue.len(), 2);
        assert_eq!(buckets.upcoming.len(), 1);
    }

    #[test]
    fn todays_meetings_filters_by_kind_and_completion() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let in_day = Utc.with_ymd_and_hms(2024, 6, 1, 15, 0, 0).unwrap();
        let meetings = todays_meetings(
            vec![
                meeting(CommunicationKind::Meeting, Some(in_day), false),
                meeting(CommunicationKind::Call, Some(in_day), false),
                meeting(CommunicationKind::Email, Some(in_day), false),
                meeting(CommunicationKind::Meeting, Some(in_day), true),
                meeting(CommunicationKind::Meeting, None, false),
            ],
            now,
            0,
        );
        assert_eq!(meetings.len(), 2);
    }

    #[test]
    fn todays_meetings_honors_timezone_offset() {
        // 01:00 UTC on June 2nd is still June 1st at UTC-5.
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 23, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 2, 1, 0, 0).unwrap();
        let comms = vec![meeting(CommunicationKind::Meeting, Some(late), false)];

        assert!(todays_meetings(comms.clone(), now, 0).is_empty());
        assert_eq!(todays_meetings(comms, now, -300).len(), 1);
    }

    #[test]
    fn todays_meetings_sorts_ascending() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 17, 0, 0).unwrap();
        let meetings = todays_meetings(
            vec![
                meeting(CommunicationKind::Meeting, Some(late), false),
                meeting(CommunicationKind::Call, Some(early), false),
            ],
            now,
            0,
        );
        assert_eq!(meetings[0].scheduled_at, Some(early));
        assert_eq!(meetings[1].scheduled_at, Some(late));
    }
}
