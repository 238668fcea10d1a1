/*
 * Responsibility
 * - POST /api/message request DTO and its validation rules
 */
use serde::Deserialize;

pub const MAX_CONTENT_CHARS: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub content: String,
}

impl MessageRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.content.trim().is_empty() {
            return Err("content must not be empty");
        }
        if self.content.chars().count() > MAX_CONTENT_CHARS {
            return Err("content must be at most 1000 characters");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_normal_content() {
        let req = MessageRequest {
            content: "Hello, world!".into(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_empty_and_whitespace_content() {
        for content in ["", "   "] {
            let req = MessageRequest {
                content: content.into(),
            };
            assert!(req.validate().is_err());
        }
    }

    #[test]
    fn rejects_content_over_limit() {
        let req = MessageRequest {
            content: "x".repeat(MAX_CONTENT_CHARS + 1),
        };
        assert_eq!(
            req.validate(),
            Err("content must be at most 1000 characters")
        );

        let req = MessageRequest {
            content: "x".repeat(MAX_CONTENT_CHARS),
        };
        assert!(req.validate().is_ok());
    }
}
