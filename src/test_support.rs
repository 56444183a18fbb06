use crate::models::{SlaRecord, TicketRecord};
use chrono::NaiveDate;

pub fn ticket(id: i64, created: NaiveDate) -> TicketRecord {
    TicketRecord {
        ticket_id: id,
        created_at: created,
        created_timestamp: created.and_hms_opt(9, 0, 0).unwrap(),
        status: "open".to_string(),
        first_solved_at: None,
        ticket_brand: None,
        ticket_channel: None,
        ticket_form: None,
        ticket_group: None,
        ticket_priority: None,
        ticket_type: None,
        submitter_role: None,
        requester_organization: None,
        is_one_touch_resolution: false,
        is_two_touch_resolution: false,
        is_multi_touch_resolution: false,
        first_assignment_to_resolution_calendar_minutes: None,
        requester_wait_time_in_calendar_minutes: None,
        ticket_satisfaction_score: None,
        first_reply_time_calendar_minutes: None,
        last_assignment_to_resolution_calendar_minutes: None,
        final_resolution_calendar_minutes: None,
        assignee_name: None,
    }
}

pub fn sla(event_id: &str, ticket_id: i64, applied: NaiveDate) -> SlaRecord {
    SlaRecord {
        sla_event_id: event_id.to_string(),
        ticket_id,
        sla_policy_name: None,
        metric: None,
        sla_applied_at: applied.and_hms_opt(8, 0, 0).unwrap(),
        target: None,
        in_business_hours: false,
        sla_breach_at: None,
        sla_elapsed_time: None,
        is_active_sla: false,
        is_sla_breach: false,
        ticket_group: None,
        ticket_brand: None,
        ticket_form: None,
        requester_organization: None,
        ticket_channel: None,
    }
}
