use chrono::NaiveTime;

/// Drugs named explicitly before the rest are collapsed into a count.
pub const MAX_LISTED_DRUGS: usize = 3;

/// `"A, B, C and 2 more"`. Empty input yields an empty string.
pub fn summarize_drugs(drug_names: &[String]) -> String {
    let listed = drug_names
        .iter()
        .take(MAX_LISTED_DRUGS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let remaining = drug_names.len().saturating_sub(MAX_LISTED_DRUGS);
    if remaining > 0 {
        format!("{listed} and {remaining} more")
    } else {
        listed
    }
}

/// Text sent to observers when a dose-day is marked taken.
pub fn completion_message(patient_name: &str, drug_names: &[String], at: NaiveTime) -> String {
    let mut message = format!(
        "{patient_name} took their medication.\nTime: {}",
        at.format("%H:%M")
    );
    let drugs = summarize_drugs(drug_names);
    if !drugs.is_empty() {
        message.push_str("\nDrugs: ");
        message.push_str(&drugs);
    }
    message
}
