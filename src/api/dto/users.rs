/*
 * Responsibility
 * - User management request DTOs (forwarded to the identity provider's
 *   admin API) and list pagination query
 */
use serde::Deserialize;

const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !looks_like_email(&self.email) {
            return Err("email must be a valid email address");
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err("password must be at least 8 characters");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(email) = &self.email
            && !looks_like_email(email)
        {
            return Err("email must be a valid email address");
        }
        if self.email.is_none() && self.display_name.is_none() {
            return Err("at least one field must be provided");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListUsersQuery {
    pub fn page(&self) -> u32 {
        self.page.filter(|p| *p >= 1).unwrap_or(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.filter(|l| (1..=100).contains(l)).unwrap_or(10)
    }
}

// Shape check only; the identity provider owns real address validation.
fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_valid_email_and_password() {
        let req = CreateUserRequest {
            email: "user@example.com".into(),
            password: "StrongP@ssword123".into(),
            display_name: Some("John Doe".into()),
        };
        assert!(req.validate().is_ok());

        let req = CreateUserRequest {
            email: "not-an-email".into(),
            password: "StrongP@ssword123".into(),
            display_name: None,
        };
        assert!(req.validate().is_err());

        let req = CreateUserRequest {
            email: "user@example.com".into(),
            password: "short".into(),
            display_name: None,
        };
        assert_eq!(req.validate(), Err("password must be at least 8 characters"));
    }

    #[test]
    fn update_requires_at_least_one_field() {
        let req = UpdateUserRequest {
            email: None,
            display_name: None,
        };
        assert!(req.validate().is_err());

        let req = UpdateUserRequest {
            email: None,
            display_name: Some("Jane".into()),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn list_query_clamps_to_defaults() {
        let query = ListUsersQuery {
            page: Some(0),
            limit: Some(500),
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 10);

        let query = ListUsersQuery {
            page: Some(3),
            limit: Some(25),
        };
        assert_eq!(query.page(), 3);
        assert_eq!(query.limit(), 25);
    }
}
