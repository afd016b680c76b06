//! Absolute URL construction for links embedded in responses.

use domains::CourseKey;
use url::Url;

pub const API_ROOT: &str = "/api/discussion/v1";

/// URL of the thread listing, optionally filtered to topics or to followed
/// threads.
pub fn thread_list_url(
    base: &Url,
    course: &CourseKey,
    topic_ids: &[String],
    following: bool,
) -> String {
    let mut url = base.clone();
    url.set_path(&format!("{API_ROOT}/threads"));
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.append_pair("course_id", course.as_str());
        for topic_id in topic_ids {
            query.append_pair("topic_id", topic_id);
        }
        if following {
            query.append_pair("following", "true");
        }
    }
    url.to_string()
}

pub fn topics_url(base: &Url, course: &CourseKey) -> String {
    let mut url = base.clone();
    url.set_path(&format!("{API_ROOT}/course_topics/{}", course.as_str()));
    url.set_query(None);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_list_url_repeats_topic_ids() {
        let base = Url::parse("https://forum.example.com").unwrap();
        let course = CourseKey::new("course-v1:x+y+z");
        let url = thread_list_url(&base, &course, &["t1".into(), "t2".into()], false);
        assert!(url.starts_with("https://forum.example.com/api/discussion/v1/threads?"));
        assert!(url.contains("topic_id=t1"));
        assert!(url.contains("topic_id=t2"));
        assert!(!url.contains("following"));
    }

    #[test]
    fn following_flag_appended_when_set() {
        let base = Url::parse("https://forum.example.com").unwrap();
        let course = CourseKey::new("c");
        let url = thread_list_url(&base, &course, &[], true);
        assert!(url.ends_with("following=true"));
    }
}
