//! Streams exposed by `tap-marketo` that are forced into incremental mode
//!
//! The tap's own discovery output is not trusted for these streams: whatever
//! it reports, the host sees them as incremental-only with a cursor the tap
//! chooses itself.

use crate::types::SyncMode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Streams that only support incremental sync, in tap catalog order
pub const INCREMENTAL_STREAMS: &[&str] = &[
    "leads",
    "activities_visit_webpage",
    "activities_fill_out_form",
    "activities_click_link",
    "activities_send_email",
    "activities_email_delivered",
    "activities_email_bounced",
    "activities_unsubscribe_email",
    "activities_open_email",
    "activities_click_email",
    "activities_new_lead",
    "activities_change_data_value",
    "activities_change_score",
    "activities_add_to_list",
    "activities_remove_from_list",
    "activities_email_bounced_soft",
    "activities_merge_leads",
    "activities_add_to_opportunity",
    "activities_remove_from_opportunity",
    "activities_update_opportunity",
    "activities_delete_lead",
    "activities_send_alert",
    "activities_send_sales_email",
    "activities_open_sales_email",
    "activities_click_sales_email",
    "activities_receive_sales_email",
    "activities_request_campaign",
    "activities_sales_email_bounced",
    "activities_change_lead_partition",
    "activities_change_revenue_stage",
    "activities_change_revenue_stage_manually",
    "activities_change_status_in_progression",
    "activities_change_segment",
    "activities_call_webhook",
    "activities_sent_forward_to_friend_email",
    "activities_received_forward_to_friend_email",
    "activities_add_to_nurture",
    "activities_change_nurture_track",
    "activities_change_nurture_cadence",
    "activities_change_program_member_data",
    "activities_push_lead_to_marketo",
    "activities_share_content",
    "campaigns",
    "lists",
    "programs",
];

/// Sync-mode information that replaces what discovery reported for a stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncModeOverride {
    /// Sync modes the stream supports
    pub supported_sync_modes: Vec<SyncMode>,

    /// Whether the tap picks the cursor field
    pub source_defined_cursor: bool,

    /// Cursor field path; empty when the tap decides
    pub default_cursor_field: Vec<String>,
}

impl SyncModeOverride {
    /// Incremental-only with a source-defined cursor
    pub fn incremental() -> Self {
        Self {
            supported_sync_modes: vec![SyncMode::Incremental],
            source_defined_cursor: true,
            default_cursor_field: Vec::new(),
        }
    }
}

/// Override table built from [`INCREMENTAL_STREAMS`]
pub fn incremental_overrides() -> HashMap<String, SyncModeOverride> {
    INCREMENTAL_STREAMS
        .iter()
        .map(|name| ((*name).to_string(), SyncModeOverride::incremental()))
        .collect()
}
