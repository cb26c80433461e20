use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Submitted,
    Pending,
    Accepted,
    Rejected,
}

impl std::str::FromStr for ApplicationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "submitted" => Ok(ApplicationStatus::Submitted),
            "pending" => Ok(ApplicationStatus::Pending),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(AppError::Validation(format!(
                "Invalid status '{other}', expected submitted, pending, accepted or rejected"
            ))),
        }
    }
}

/// One entry in the local application history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub form_url: String,
    pub company_name: Option<String>,
    pub position_title: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub status: ApplicationStatus,
    pub verification_secs: f64,
    #[serde(default)]
    pub confidence_scores: HashMap<String, f64>,
    pub modifications_made: bool,
    pub attachment: Option<PathBuf>,
}

impl ApplicationRecord {
    /// Inclusive on both ends; `None` leaves that side open.
    pub fn applied_between(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> bool {
        start.map_or(true, |s| self.applied_at >= s) && end.map_or(true, |e| self.applied_at <= e)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn record_at(day: u32) -> ApplicationRecord {
        ApplicationRecord {
            id: Uuid::new_v4(),
            form_url: "https://jobs.example.com/apply".to_string(),
            company_name: None,
            position_title: None,
            applied_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            status: ApplicationStatus::Submitted,
            verification_secs: 12.5,
            confidence_scores: HashMap::new(),
            modifications_made: false,
            attachment: None,
        }
    }

    #[test]
    fn test_status_parsing_is_case_insensitive() {
        assert_eq!("Accepted".parse::<ApplicationStatus>().unwrap(), ApplicationStatus::Accepted);
        assert_eq!(" pending ".parse::<ApplicationStatus>().unwrap(), ApplicationStatus::Pending);
        assert!(matches!(
            "ghosted".parse::<ApplicationStatus>(),
            Err(AppError::Validation(_))
        ));
        assert_eq!(
            serde_json::to_value(ApplicationStatus::Rejected).unwrap(),
            "rejected"
        );
    }

    #[test]
    fn test_applied_between_bounds_are_inclusive() {
        let record = record_at(10);
        let day = |d| Some(Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap());
        assert!(record.applied_between(None, None));
        assert!(record.applied_between(day(10), day(10)));
        assert!(record.applied_between(day(1), None));
        assert!(!record.applied_between(day(11), None));
        assert!(!record.applied_between(None, day(9)));
    }
}
