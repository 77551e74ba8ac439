use serde::{Deserialize, Serialize};

use crate::features::auth::dtos::RegisterRequestDto;
use crate::features::reports::dtos::CreateReportDto;
use crate::features::reports::models::ReportPriority;
use crate::shared::validation::non_empty;

/// `?notice=<code>` on any page
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginPageQuery {
    pub notice: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportsFilterQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub notice: Option<String>,
}

/// Registration form. Echoed back into the page when it is rejected, minus
/// the password.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub full_name: String,
    pub phone: String,
}

impl RegisterForm {
    pub fn to_dto(&self) -> RegisterRequestDto {
        RegisterRequestDto {
            username: Some(self.username.clone()),
            email: Some(self.email.clone()),
            password: Some(self.password.clone()),
            full_name: Some(self.full_name.clone()),
            phone: Some(self.phone.clone()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

/// New report form; every field arrives as text
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportForm {
    pub title: String,
    pub description: String,
    pub location: String,
    pub category_id: String,
    pub priority: String,
    pub latitude: String,
    pub longitude: String,
}

impl ReportForm {
    /// Parse the text fields. Blank required fields stay `None` so
    /// validation names them; blank coordinates are left out.
    pub fn to_dto(&self) -> Result<CreateReportDto, String> {
        let category_id = match non_empty(self.category_id.clone()) {
            Some(id) => Some(
                id.parse::<i64>()
                    .map_err(|_| "Please choose a valid category".to_string())?,
            ),
            None => None,
        };

        let priority = match non_empty(self.priority.clone()) {
            Some(priority) => Some(priority.parse::<ReportPriority>()?),
            None => None,
        };

        Ok(CreateReportDto {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            location: Some(self.location.clone()),
            category_id,
            priority,
            latitude: parse_coordinate(&self.latitude, "Latitude")?,
            longitude: parse_coordinate(&self.longitude, "Longitude")?,
        })
    }
}

fn parse_coordinate(value: &str, name: &str) -> Result<Option<f64>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| format!("{} must be a number", name))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusForm {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;

    fn report_form() -> ReportForm {
        ReportForm {
            title: "Oil slick".into(),
            description: "Oil on the river".into(),
            location: "North bridge".into(),
            category_id: "2".into(),
            priority: "high".into(),
            latitude: " -6.2 ".into(),
            longitude: String::new(),
        }
    }

    #[test]
    fn test_report_form_parses_fields() {
        let dto = report_form().to_dto().unwrap();
        assert_eq!(dto.category_id, Some(2));
        assert_eq!(dto.priority, Some(ReportPriority::High));
        assert_eq!(dto.latitude, Some(-6.2));
        assert_eq!(dto.longitude, None);
    }

    #[test]
    fn test_blank_priority_is_reported_missing() {
        let form = ReportForm {
            priority: "  ".into(),
            ..report_form()
        };
        let dto = form.to_dto().unwrap();
        assert_eq!(dto.priority, None);

        match dto.into_create_report(1) {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Missing required fields: priority")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_report_form_rejects_bad_numbers() {
        let form = ReportForm {
            latitude: "north".into(),
            ..report_form()
        };
        assert_eq!(form.to_dto().unwrap_err(), "Latitude must be a number");

        let form = ReportForm {
            category_id: "water".into(),
            ..report_form()
        };
        assert_eq!(form.to_dto().unwrap_err(), "Please choose a valid category");
    }

    #[test]
    fn test_report_form_rejects_unknown_priority() {
        let form = ReportForm {
            priority: "urgent".into(),
            ..report_form()
        };
        assert!(form.to_dto().unwrap_err().contains("urgent"));
    }

    #[test]
    fn test_register_form_never_echoes_password() {
        let form = RegisterForm {
            username: "river_watch".into(),
            password: "hunter2".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&form).unwrap();
        assert_eq!(value["username"], "river_watch");
        assert!(value.get("password").is_none());
    }
}
