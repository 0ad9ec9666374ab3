use crate::model::display_date::format_display_date;
use crate::model::patient::PatientSummary;

const RULE_WIDTH: usize = 84;

/// Renders the fixed-width patient list, one string per output line.
pub fn render_patient_table(patients: &[PatientSummary]) -> Vec<String> {
    let rule = "-".repeat(RULE_WIDTH);
    let mut lines = Vec::with_capacity(patients.len() + 4);
    lines.push(rule.clone());
    lines.push(format!(
        "{:<4} {:<30} {:<18} {:<15} {:<12}",
        "ID", "Name", "National ID", "Phone", "Birth Date"
    ));
    lines.push(rule.clone());
    for patient in patients {
        lines.push(format!(
            "{:<4} {:<30} {:<18} {:<15} {:<12}",
            patient.id,
            patient.full_name,
            patient.national_id,
            patient.phone,
            format_display_date(patient.birth_date)
        ));
    }
    lines.push(rule);
    lines
}

#[cfg(test)]
mod tests {
    use super::render_patient_table;
    use crate::model::patient::PatientSummary;
    use chrono::NaiveDate;

    #[test]
    fn rows_are_padded_into_fixed_columns() {
        let lines = render_patient_table(&[PatientSummary {
            id: 3,
            full_name: "Maria Silva".to_string(),
            national_id: "123.456.789-00".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 3, 15).expect("valid date"),
            phone: "(11) 91234-5678".to_string(),
        }]);

        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("ID   Name"));
        assert_eq!(
            lines[3].trim_end(),
            format!(
                "{:<4} {:<30} {:<18} {:<15} 15/03/1990",
                3, "Maria Silva", "123.456.789-00", "(11) 91234-5678"
            )
        );
        assert_eq!(lines[0], lines[4]);
    }
}
