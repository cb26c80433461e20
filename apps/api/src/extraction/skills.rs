use crate::extraction::experience::strip_bullet;

/// One skill per line. A line ending in `:` opens a category whose name
/// prefixes every following skill until the next category line.
pub fn extract_skills(section: &str) -> Vec<String> {
    let mut skills: Vec<String> = Vec::new();
    let mut category: Option<String> = None;

    for line in section.lines().map(|l| strip_bullet(l.trim())).filter(|l| !l.is_empty()) {
        if let Some(label) = line.strip_suffix(':') {
            let label = label.trim();
            category = (!label.is_empty()).then(|| label.to_string());
            continue;
        }

        let skill = match &category {
            Some(c) => format!("{c}: {line}"),
            None => line.to_string(),
        };
        if !skills.contains(&skill) {
            skills.push(skill);
        }
    }

    skills
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_lines() {
        assert_eq!(extract_skills("Rust\n\nKubernetes\n• Go"), vec!["Rust", "Kubernetes", "Go"]);
    }

    #[test]
    fn test_categories_prefix_until_next_category() {
        let section = "Leadership\nLanguages & Frameworks:\nRust\nTokio\nCloud:\nAWS";
        assert_eq!(
            extract_skills(section),
            vec![
                "Leadership",
                "Languages & Frameworks: Rust",
                "Languages & Frameworks: Tokio",
                "Cloud: AWS"
            ]
        );
    }

    #[test]
    fn test_duplicates_are_removed() {
        assert_eq!(extract_skills("Rust\nRust\nGo"), vec!["Rust", "Go"]);
    }
}
