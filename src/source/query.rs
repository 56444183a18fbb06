//! Warehouse query text for the two supported SQL dialects.

use crate::models::DatasetKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    BigQuery,
    Snowflake,
}

const TICKET_PROJECTION: &[&str] = &[
    "ticket_id",
    "created_at",
    "cast(created_at as timestamp) as created_timestamp",
    "status",
    "first_solved_at",
    "ticket_brand_name as ticket_brand",
    "created_channel as ticket_channel",
    "ticket_form_name as ticket_form",
    "group_name as ticket_group",
    "priority as ticket_priority",
    "type as ticket_type",
    "submitter_role",
    "requester_organization_name as requester_organization",
    "is_one_touch_resolution",
    "is_two_touch_resolution",
    "is_multi_touch_resolution",
    "first_assignment_to_resolution_calendar_minutes",
    "requester_wait_time_in_calendar_minutes",
    "ticket_satisfaction_score",
    "first_reply_time_calendar_minutes",
    "last_assignment_to_resolution_calendar_minutes",
    "final_resolution_calendar_minutes",
    "assignee_name",
];

const SLA_PROJECTION: &[&str] = &[
    "sla.sla_event_id",
    "sla.ticket_id",
    "sla.sla_policy_name",
    "sla.metric",
    "sla.sla_applied_at",
    "sla.target",
    "sla.in_business_hours",
    "sla.sla_breach_at",
    "sla.sla_elapsed_time",
    "sla.is_active_sla",
    "sla.is_sla_breach",
    "tm.group_name as ticket_group",
    "tm.ticket_brand_name as ticket_brand",
    "tm.ticket_form_name as ticket_form",
    "tm.requester_organization_name as requester_organization",
    "tm.created_channel as ticket_channel",
];

impl Dialect {
    pub fn table(&self, database: &str, schema: &str, table: &str) -> String {
        match self {
            Dialect::BigQuery => format!("`{database}.{schema}.{table}`"),
            Dialect::Snowflake => format!("{database}.{schema}.{table}"),
        }
    }

    pub fn query(&self, kind: DatasetKind, database: &str, schema: &str) -> String {
        match kind {
            DatasetKind::Tickets => format!(
                "select {} from {}",
                TICKET_PROJECTION.join(", "),
                self.table(database, schema, "zendesk__ticket_metrics")
            ),
            DatasetKind::SlaEvents => format!(
                "select {} from {} as sla left join {} as tm on sla.ticket_id = tm.ticket_id",
                SLA_PROJECTION.join(", "),
                self.table(database, schema, "zendesk__sla_policies"),
                self.table(database, schema, "zendesk__ticket_metrics")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bigquery_quotes_the_qualified_table() {
        let sql = Dialect::BigQuery.query(DatasetKind::Tickets, "proj", "zendesk");
        assert!(sql.starts_with("select ticket_id, created_at, cast(created_at as timestamp)"));
        assert!(sql.ends_with("from `proj.zendesk.zendesk__ticket_metrics`"));
        assert!(sql.contains("group_name as ticket_group"));
    }

    #[test]
    fn snowflake_tables_are_bare() {
        let sql = Dialect::Snowflake.query(DatasetKind::Tickets, "ANALYTICS", "ZENDESK");
        assert!(sql.ends_with("from ANALYTICS.ZENDESK.zendesk__ticket_metrics"));
    }

    #[test]
    fn sla_query_left_joins_ticket_metrics() {
        let sql = Dialect::Snowflake.query(DatasetKind::SlaEvents, "db", "sc");
        assert!(sql.contains("from db.sc.zendesk__sla_policies as sla left join db.sc.zendesk__ticket_metrics as tm"));
        assert!(sql.contains("on sla.ticket_id = tm.ticket_id"));
        assert!(sql.contains("tm.created_channel as ticket_channel"));
    }

    #[test]
    fn dialects_differ_only_in_quoting() {
        let bq = Dialect::BigQuery.query(DatasetKind::SlaEvents, "db", "sc");
        let sf = Dialect::Snowflake.query(DatasetKind::SlaEvents, "db", "sc");
        assert_eq!(bq.replace('`', ""), sf);
    }
}
