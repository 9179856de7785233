//! Trail display formatting
//!
//! Formats trails for terminal output in table and detail views.

use crate::models::{AuditTrail, FormattedValue};
use crate::services::TrailDetail;

const EMPTY: &str = "(empty)";

fn shown(value: &FormattedValue) -> &str {
    value.as_deref().unwrap_or(EMPTY)
}

/// Format a list of trails as a table
pub fn format_trail_list(trails: &[AuditTrail], date_format: &str) -> String {
    if trails.is_empty() {
        return "No audit trails found.".to_string();
    }

    let name_width = trails
        .iter()
        .map(|t| t.display_name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<10}  {:<8}  {:<8}  {:<name_width$}  {}\n",
        "ID",
        "Date",
        "View",
        "Action",
        "Name",
        "By",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<10}  {:-<8}  {:-<8}  {:-<name_width$}  {:-<8}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for trail in trails {
        let by = trail
            .modified_by
            .as_ref()
            .map(|actor| actor.username.as_str())
            .unwrap_or("-");

        output.push_str(&format!(
            "{:<12}  {:<10}  {:<8}  {:<8}  {:<name_width$}  {}\n",
            trail.id.to_string(),
            trail.audit_date.format(date_format).to_string(),
            trail.visibility.to_string(),
            trail.action.to_string(),
            trail.display_name,
            by,
            name_width = name_width,
        ));
    }

    output
}

/// Format one trail with its groups and entries
pub fn format_trail_details(detail: &TrailDetail, date_format: &str) -> String {
    let trail = &detail.trail;
    let mut output = String::new();

    output.push_str(&format!("Trail: {}\n", trail.display_name));
    output.push_str(&format!("  ID:       {}\n", trail.id));
    output.push_str(&format!("  Entity:   {}\n", trail.entity()));
    output.push_str(&format!("  View:     {}\n", trail.visibility));
    output.push_str(&format!("  Action:   {}\n", trail.action));
    output.push_str(&format!(
        "  Date:     {}\n",
        trail.audit_date.format(date_format)
    ));
    if let Some(actor) = &trail.modified_by {
        output.push_str(&format!("  By:       {}\n", actor));
    }

    if !detail.groups.is_empty() {
        let names: Vec<_> = detail.groups.iter().map(|g| g.name.as_str()).collect();
        output.push_str(&format!("  Groups:   {}\n", names.join(", ")));
    }

    if detail.entry_count() == 0 {
        output.push_str("\nNo field changes recorded.\n");
        return output;
    }

    if !detail.fields.is_empty() {
        output.push_str("\nFields:\n");
        for entry in &detail.fields {
            let by = entry
                .modified_by
                .as_ref()
                .map(|actor| format!("  [{}]", actor))
                .unwrap_or_default();
            output.push_str(&format!(
                "  {} {}: {} -> {}{}\n",
                entry.recorded_at.format("%H:%M:%S"),
                entry.field_name,
                shown(&entry.old_value),
                shown(&entry.new_value),
                by,
            ));
        }
    }

    if !detail.multi_fields.is_empty() {
        output.push_str("\nRelations:\n");
        for entry in &detail.multi_fields {
            output.push_str(&format!(
                "  {} {}:",
                entry.recorded_at.format("%H:%M:%S"),
                entry.field_name
            ));
            if !entry.added.is_empty() {
                output.push_str(&format!(" +[{}]", entry.added));
            }
            if !entry.removed.is_empty() {
                output.push_str(&format!(" -[{}]", entry.removed));
            }
            if let Some(actor) = &entry.modified_by {
                output.push_str(&format!("  [{}]", actor));
            }
            output.push('\n');
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Actor, AuditAction, AuditFieldEntry, AuditGroup, AuditMultiFieldEntry, EntityKey,
        TrailKey, Visibility,
    };
    use chrono::NaiveDate;

    fn trail() -> AuditTrail {
        let mut trail = AuditTrail::new(&TrailKey::new(
            Visibility::Admin,
            EntityKey::new("Order", 42),
            AuditAction::Modified,
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        ));
        trail.touch("ORDER(42)", Some(&Actor::new("U1").reference()));
        trail
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_trail_list(&[], "%Y-%m-%d"), "No audit trails found.");
    }

    #[test]
    fn test_list_rows() {
        let output = format_trail_list(&[trail()], "%d/%m/%Y");
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[2].contains("19/10/2026"));
        assert!(lines[2].contains("Admin"));
        assert!(lines[2].contains("Modified"));
        assert!(lines[2].contains("ORDER(42)"));
        assert!(lines[2].ends_with("U1"));
    }

    #[test]
    fn test_details() {
        let trail = trail();
        let detail = TrailDetail {
            groups: vec![AuditGroup::new(trail.id, "workflow")],
            fields: vec![AuditFieldEntry::new(
                trail.id,
                "status",
                Some("pending".into()),
                None,
                None,
            )],
            multi_fields: vec![AuditMultiFieldEntry::new(trail.id, "tags", "red, blue", "", None)],
            trail,
        };

        let output = format_trail_details(&detail, "%Y-%m-%d");
        assert!(output.contains("Entity:   Order#42"));
        assert!(output.contains("Groups:   workflow"));
        assert!(output.contains("status: pending -> (empty)"));
        assert!(output.contains("tags: +[red, blue]\n"));
        assert!(!output.contains("-["));
    }

    #[test]
    fn test_details_without_entries() {
        let detail = TrailDetail {
            trail: trail(),
            groups: Vec::new(),
            fields: Vec::new(),
            multi_fields: Vec::new(),
        };
        assert!(format_trail_details(&detail, "%Y-%m-%d").contains("No field changes recorded."));
    }
}
