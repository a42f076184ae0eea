//! Administrator roster of registered members.

use chrono::{DateTime, Datelike};
use serde::Serialize;

use crate::models::{status_label, Member, MembershipType};
use crate::registration::display_member_id;

const MONTHS_MS: [&str; 12] = [
    "Januari", "Februari", "Mac", "April", "Mei", "Jun", "Julai", "Ogos", "September", "Oktober",
    "November", "Disember",
];

/// Placeholder for a custom field a member left empty or never had.
pub const MISSING_VALUE: &str = "-";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RosterRow {
    pub id: u64,
    pub display_id: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub membership_type: String,
    pub membership_label: String,
    /// One value per entry of [`MemberRoster::custom_columns`]
    pub custom_values: Vec<String>,
    pub registered_on: String,
    pub status: String,
    pub status_label: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MemberRoster {
    pub total: usize,
    pub custom_columns: Vec<String>,
    pub rows: Vec<RosterRow>,
}

/// Build the roster table: newest registrations first, one column per custom label seen.
pub fn build_roster(mut members: Vec<Member>) -> MemberRoster {
    let mut custom_columns: Vec<String> = Vec::new();
    for member in &members {
        for (label, _) in &member.custom_fields {
            if !custom_columns.contains(label) {
                custom_columns.push(label.clone());
            }
        }
    }

    members.sort_by(|a, b| b.registration_date.cmp(&a.registration_date));

    let rows = members
        .into_iter()
        .map(|member| {
            let custom_values = custom_columns
                .iter()
                .map(|column| {
                    member
                        .custom_fields
                        .iter()
                        .rev()
                        .find(|(label, _)| label == column)
                        .map(|(_, value)| value.as_str())
                        .filter(|value| !value.is_empty())
                        .unwrap_or(MISSING_VALUE)
                        .to_string()
                })
                .collect();

            RosterRow {
                id: member.id,
                display_id: display_member_id(member.id),
                membership_label: MembershipType::label_for(&member.membership_type),
                status_label: status_label(&member.status),
                registered_on: format_registration_date(member.registration_date),
                custom_values,
                full_name: member.full_name,
                email: member.email,
                phone_number: member.phone_number,
                membership_type: member.membership_type,
                status: member.status,
            }
        })
        .collect::<Vec<_>>();

    MemberRoster {
        total: rows.len(),
        custom_columns,
        rows,
    }
}

/// Long Malay date (UTC) of a nanosecond timestamp, e.g. "15 Oktober 2026".
pub fn format_registration_date(nanos: i64) -> String {
    let date = DateTime::from_timestamp_nanos(nanos);
    format!(
        "{} {} {}",
        date.day(),
        MONTHS_MS[date.month0() as usize],
        date.year()
    )
}
