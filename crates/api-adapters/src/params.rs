//! Query-string shapes and their validation.
//!
//! The wire format keeps every value stringly-typed the way it arrives;
//! parsing into the service layer's typed parameters happens here so
//! handlers can stay one-expression thin. Multi-valued parameters
//! (`topic_id`, `requested_fields`) arrive comma-separated. Validation
//! failures are aggregated per field rather than reported one at a time.

use std::collections::BTreeSet;

use domains::{CourseKey, ThreadType, ValidationErrors};
use serde::Deserialize;
use services::{
    requests::parse_order_direction, RequestedFields, ThreadListParams, ThreadOrdering, ViewFilter,
};

/// Page-size bounds the adapter enforces on every listing endpoint.
#[derive(Debug, Clone, Copy)]
pub struct PageBounds {
    pub default_size: u32,
    pub max_size: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ThreadListQuery {
    pub course_id: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub topic_id: Option<String>,
    pub text_search: Option<String>,
    pub following: Option<bool>,
    pub author: Option<String>,
    pub thread_type: Option<String>,
    pub flagged: Option<bool>,
    pub view: Option<String>,
    pub order_by: Option<String>,
    pub order_direction: Option<String>,
    pub count_flagged: Option<bool>,
    pub requested_fields: Option<String>,
}

impl ThreadListQuery {
    pub fn parse(self, bounds: PageBounds) -> Result<(CourseKey, ThreadListParams), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let course_id = match self.course_id {
            Some(id) if !id.is_empty() => Some(id),
            _ => {
                errors.add("course_id", "This field is required.");
                None
            }
        };

        let (page, page_size) = parse_page(self.page, self.page_size, bounds, &mut errors);

        let thread_type = self
            .thread_type
            .as_deref()
            .and_then(|raw| collect(parse_thread_type(raw), &mut errors));
        let view = self
            .view
            .as_deref()
            .and_then(|raw| collect(ViewFilter::parse(raw), &mut errors));
        let order_by = self
            .order_by
            .as_deref()
            .and_then(|raw| collect(ThreadOrdering::parse(raw), &mut errors))
            .unwrap_or_default();
        if let Some(raw) = self.order_direction.as_deref() {
            if let Err(err) = parse_order_direction(raw) {
                errors.merge(err);
            }
        }

        let params = ThreadListParams {
            page,
            page_size,
            topic_id_list: split_list(self.topic_id.as_deref()),
            text_search: self.text_search,
            following: self.following.unwrap_or(false),
            author: self.author,
            thread_type,
            flagged: self.flagged,
            view,
            order_by,
            count_flagged: self.count_flagged.unwrap_or(false),
            requested_fields: requested_fields(self.requested_fields.as_deref()),
        };

        errors.into_result()?;
        // course_id is always Some when validation passed.
        Ok((CourseKey::new(course_id.unwrap_or_default()), params))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentListQuery {
    pub thread_id: Option<String>,
    pub endorsed: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub requested_fields: Option<String>,
}

impl CommentListQuery {
    pub fn parse(
        self,
        bounds: PageBounds,
    ) -> Result<(String, Option<bool>, u32, u32, RequestedFields), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let thread_id = match self.thread_id {
            Some(id) if !id.is_empty() => Some(id),
            _ => {
                errors.add("thread_id", "This field is required.");
                None
            }
        };
        let (page, page_size) = parse_page(self.page, self.page_size, bounds, &mut errors);
        let fields = requested_fields(self.requested_fields.as_deref());
        errors.into_result()?;
        Ok((
            thread_id.unwrap_or_default(),
            self.endorsed,
            page,
            page_size,
            fields,
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PagedQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub requested_fields: Option<String>,
}

impl PagedQuery {
    pub fn parse(self, bounds: PageBounds) -> Result<(u32, u32, RequestedFields), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let (page, page_size) = parse_page(self.page, self.page_size, bounds, &mut errors);
        let fields = requested_fields(self.requested_fields.as_deref());
        errors.into_result()?;
        Ok((page, page_size, fields))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TopicsQuery {
    pub topic_id: Option<String>,
}

impl TopicsQuery {
    /// `None` means "all topics"; an explicit list narrows the response.
    pub fn topic_ids(&self) -> Option<BTreeSet<String>> {
        self.topic_id
            .as_deref()
            .map(|raw| split_list(Some(raw)).into_iter().collect())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FieldsQuery {
    pub requested_fields: Option<String>,
}

impl FieldsQuery {
    pub fn parse(&self) -> RequestedFields {
        requested_fields(self.requested_fields.as_deref())
    }
}

fn parse_page(
    page: Option<u32>,
    page_size: Option<u32>,
    bounds: PageBounds,
    errors: &mut ValidationErrors,
) -> (u32, u32) {
    let page = page.unwrap_or(1);
    if page < 1 {
        errors.add("page", "Invalid value.");
    }
    let page_size = page_size.unwrap_or(bounds.default_size);
    if page_size < 1 {
        errors.add("page_size", "Invalid value.");
    }
    (page.max(1), page_size.clamp(1, bounds.max_size))
}

fn parse_thread_type(raw: &str) -> Result<ThreadType, ValidationErrors> {
    match raw {
        "discussion" => Ok(ThreadType::Discussion),
        "question" => Ok(ThreadType::Question),
        other => Err(ValidationErrors::single(
            "thread_type",
            format!("Invalid value. '{other}' must be 'discussion' or 'question'"),
        )),
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn requested_fields(raw: Option<&str>) -> RequestedFields {
    let parts = split_list(raw);
    RequestedFields::parse(parts.iter().map(String::as_str))
}

fn collect<T>(result: Result<T, ValidationErrors>, errors: &mut ValidationErrors) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            errors.merge(err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: PageBounds = PageBounds {
        default_size: 10,
        max_size: 100,
    };

    #[test]
    fn missing_course_id_is_rejected() {
        let query = ThreadListQuery::default();
        let err = query.parse(BOUNDS).unwrap_err();
        assert_eq!(err.messages_for("course_id"), vec!["This field is required."]);
    }

    #[test]
    fn bad_values_are_reported_together() {
        let query = ThreadListQuery {
            course_id: Some("course-v1:x+y+z".to_string()),
            view: Some("starred".to_string()),
            order_by: Some("karma".to_string()),
            order_direction: Some("asc".to_string()),
            ..Default::default()
        };
        let err = query.parse(BOUNDS).unwrap_err();
        let fields: Vec<_> = err.fields().collect();
        assert_eq!(fields, vec!["order_by", "order_direction", "view"]);
    }

    #[test]
    fn page_size_is_clamped_to_the_maximum() {
        let query = ThreadListQuery {
            course_id: Some("course-v1:x+y+z".to_string()),
            page_size: Some(500),
            ..Default::default()
        };
        let (_, params) = query.parse(BOUNDS).unwrap();
        assert_eq!(params.page_size, 100);
    }

    #[test]
    fn topic_ids_split_on_commas() {
        let query = ThreadListQuery {
            course_id: Some("course-v1:x+y+z".to_string()),
            topic_id: Some("a, b,,c".to_string()),
            ..Default::default()
        };
        let (_, params) = query.parse(BOUNDS).unwrap();
        assert_eq!(params.topic_id_list, vec!["a", "b", "c"]);
    }

    #[test]
    fn comment_list_requires_thread_id() {
        let err = CommentListQuery::default().parse(BOUNDS).unwrap_err();
        assert_eq!(err.messages_for("thread_id"), vec!["This field is required."]);
    }
}
