use kurierdb_core::Stamp;

/// One extraction-failure report for the diagnostic log: which field could
/// not be scraped, where, and the raw lines that were searched.
#[derive(Debug, Clone)]
pub struct Report {
    pub stamp: Stamp,
    pub section: String,
    pub field: String,
    pub lines: Vec<String>,
}

impl Report {
    pub(crate) fn new(stamp: &Stamp, section: &str, field: &str, lines: &[String]) -> Self {
        Self {
            stamp: stamp.clone(),
            section: section.to_string(),
            field: field.to_string(),
            lines: lines.to_vec(),
        }
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{}: failed to scrape '{}' inside '{}'",
            self.stamp, self.field, self.section
        )?;
        if self.lines.is_empty() {
            writeln!(f, "(no content inside '{}')", self.section)?;
        } else {
            for (nb, line) in self.lines.iter().enumerate() {
                writeln!(f, "{nb}: {line}")?;
            }
        }
        write!(f, "{}", "-".repeat(60))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn stamp() -> Stamp {
        Stamp {
            courier: "m-134".to_string(),
            date: NaiveDate::from_ymd_opt(2014, 2, 12).unwrap(),
            job_id: "2041699".to_string(),
        }
    }

    #[test]
    fn report_shows_numbered_context_lines() {
        let report = Report::new(
            &stamp(),
            "client",
            "client_id",
            &["Kunde: Acme | 12345".to_string()],
        );
        let text = report.to_string();
        assert!(text.starts_with("2014-02-12-job-2041699: failed to scrape 'client_id'"));
        assert!(text.contains("0: Kunde: Acme | 12345"));
    }

    #[test]
    fn report_notes_empty_sections() {
        let report = Report::new(&stamp(), "header", "type", &[]);
        assert!(report.to_string().contains("no content inside 'header'"));
    }
}
