use crate::models::VolunteerRecord;

/// Each non-empty line is one certification.
pub fn extract_certifications(section: &str) -> Vec<String> {
    section
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// Each blank-line separated block is one volunteer record.
pub fn extract_volunteer(section: &str) -> Vec<VolunteerRecord> {
    let mut records = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in section.lines().map(str::trim).chain(std::iter::once("")) {
        if line.is_empty() {
            if !block.is_empty() {
                records.push(VolunteerRecord {
                    text: block.join("\n"),
                });
                block.clear();
            }
        } else {
            block.push(line);
        }
    }

    records
}
