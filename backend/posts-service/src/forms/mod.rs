/// Form input and validation
///
/// Forms are plain structs deserialized from urlencoded bodies. `clean`
/// returns either the cleaned value or field-level errors; a failed form is
/// rendered back to the client instead of being turned into an error page.
use crate::db::Store;
use crate::error::Result;
use crate::models::{Group, PostDraft};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Field name -> messages, in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(pub BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FormErrors::default();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                out.add(&field.to_string(), message);
            }
        }
        out
    }
}

/// Form state handed to the renderer: submitted data plus errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundForm<F> {
    pub data: F,
    pub errors: FormErrors,
}

impl<F> BoundForm<F> {
    pub fn unbound(data: F) -> Self {
        Self {
            data,
            errors: FormErrors::default(),
        }
    }

    pub fn with_errors(data: F, errors: FormErrors) -> Self {
        Self { data, errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PostForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,
    /// Group id as submitted by the select widget; empty means no group.
    #[serde(default)]
    pub group: Option<String>,
    /// Reference to an image stored by the external blob store.
    #[serde(default)]
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub image: Option<String>,
}

impl PostForm {
    /// Pre-fill the form from an existing post.
    pub fn from_post(text: &str, group_id: Option<i64>, image: Option<&str>) -> Self {
        Self {
            text: text.to_string(),
            group: group_id.map(|id| id.to_string()),
            image: image.map(str::to_string),
        }
    }

    /// Validate and resolve the group choice against the store.
    ///
    /// The outer `Result` carries store failures; the inner one carries the
    /// field errors to show next to the form.
    pub async fn clean(
        &self,
        store: &dyn Store,
    ) -> Result<std::result::Result<PostDraft, FormErrors>> {
        let normalized = PostForm {
            text: self.text.trim().to_string(),
            group: self
                .group
                .as_ref()
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty()),
            image: self
                .image
                .as_ref()
                .map(|i| i.trim().to_string())
                .filter(|i| !i.is_empty()),
        };

        let mut errors = match normalized.validate() {
            Ok(()) => FormErrors::default(),
            Err(e) => FormErrors::from(e),
        };

        let group: Option<Group> = match normalized.group.as_deref() {
            None => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) => {
                    let found = store.find_group(id).await?;
                    if found.is_none() {
                        errors.add("group", INVALID_CHOICE_MESSAGE);
                    }
                    found
                }
                Err(_) => {
                    errors.add("group", INVALID_CHOICE_MESSAGE);
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Ok(Err(errors));
        }

        Ok(Ok(PostDraft {
            text: normalized.text,
            group_id: group.map(|g| g.id),
            image: normalized.image,
        }))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 500,
        message = "Comment text is required and may not exceed 500 characters."
    ))]
    pub text: String,
}

impl CommentForm {
    pub fn clean(&self) -> std::result::Result<String, FormErrors> {
        let normalized = CommentForm {
            text: self.text.trim().to_string(),
        };
        if normalized.text.is_empty() {
            let mut errors = FormErrors::default();
            errors.add("text", REQUIRED_MESSAGE);
            return Err(errors);
        }
        normalized.validate().map_err(FormErrors::from)?;
        Ok(normalized.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::NewGroup;

    async fn store_with_group() -> (MemoryStore, i64) {
        let store = MemoryStore::new();
        let group = store
            .create_group(NewGroup {
                title: "Тестгруппа".into(),
                slug: "test-slug".into(),
                description: String::new(),
            })
            .await
            .unwrap();
        (store, group.id)
    }

    #[actix_web::test]
    async fn post_form_requires_text() {
        let (store, _) = store_with_group().await;
        let form = PostForm {
            text: "   ".into(),
            ..Default::default()
        };
        let errors = form.clean(&store).await.unwrap().unwrap_err();
        assert_eq!(errors.field("text"), [REQUIRED_MESSAGE.to_string()]);
    }

    #[actix_web::test]
    async fn post_form_resolves_group_and_trims_text() {
        let (store, group_id) = store_with_group().await;
        let form = PostForm {
            text: "  Снова тест ".into(),
            group: Some(group_id.to_string()),
            image: Some(String::new()),
        };
        let draft = form.clean(&store).await.unwrap().unwrap();
        assert_eq!(draft.text, "Снова тест");
        assert_eq!(draft.group_id, Some(group_id));
        assert_eq!(draft.image, None);
    }

    #[actix_web::test]
    async fn post_form_empty_group_means_none() {
        let (store, _) = store_with_group().await;
        let form = PostForm {
            text: "text".into(),
            group: Some(String::new()),
            image: None,
        };
        let draft = form.clean(&store).await.unwrap().unwrap();
        assert_eq!(draft.group_id, None);
    }

    #[actix_web::test]
    async fn post_form_rejects_unknown_group() {
        let (store, group_id) = store_with_group().await;
        for raw in [(group_id + 100).to_string(), "abc".to_string()] {
            let form = PostForm {
                text: "text".into(),
                group: Some(raw),
                image: None,
            };
            let errors = form.clean(&store).await.unwrap().unwrap_err();
            assert_eq!(errors.field("group"), [INVALID_CHOICE_MESSAGE.to_string()]);
            assert!(errors.field("text").is_empty());
        }
    }

    #[test]
    fn comment_form_limits_length() {
        let ok = CommentForm {
            text: "ж".repeat(500),
        };
        assert_eq!(ok.clean().unwrap().chars().count(), 500);

        let too_long = CommentForm {
            text: "ж".repeat(501),
        };
        let errors = too_long.clean().unwrap_err();
        assert_eq!(errors.field("text").len(), 1);

        let blank = CommentForm { text: " \n".into() };
        assert_eq!(
            blank.clean().unwrap_err().field("text"),
            [REQUIRED_MESSAGE.to_string()]
        );
    }
}
