//! Test harness: a [`services::DiscussionService`] wired from the mockall
//! comment-client/profile mocks, the in-memory course and user adapters,
//! and an event sink that records what was published.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use domains::{
    BlackoutWindow, Course, CourseKey, CoursewareTopic, DivisionSettings, EventSink, ForumEvent,
    ForumRole, FreestandingTopic, MockCommentClient, MockProfileStore, Requester, ThreadData,
    ThreadPage,
};
use service_adapters::{InMemoryCourseStore, InMemoryUserDirectory};
use services::DiscussionService;
use url::Url;

pub const COURSE_ID: &str = "course-v1:Test+Forum+2026";
pub const API_BASE: &str = "http://testserver";

pub const LEARNER_ID: &str = "5";
pub const STAFF_ID: &str = "9";

pub fn learner() -> Requester {
    Requester {
        id: LEARNER_ID.to_string(),
        username: "learner".to_string(),
    }
}

pub fn staff() -> Requester {
    Requester {
        id: STAFF_ID.to_string(),
        username: "staff".to_string(),
    }
}

pub fn course_key() -> CourseKey {
    CourseKey::new(COURSE_ID)
}

/// Default course: two courseware units in one category plus a freestanding
/// "general" topic, discussions enabled, no division, no blackouts.
pub fn course() -> Course {
    Course {
        key: course_key(),
        discussion_enabled: true,
        allow_anonymous: false,
        allow_anonymous_to_peers: false,
        blackouts: vec![],
        courseware_topics: vec![
            CoursewareTopic {
                id: "t1".to_string(),
                category: "Week 1".to_string(),
                title: "Unit A".to_string(),
                sort_key: None,
            },
            CoursewareTopic {
                id: "t2".to_string(),
                category: "Week 1".to_string(),
                title: "Unit B".to_string(),
                sort_key: None,
            },
        ],
        freestanding_topics: vec![FreestandingTopic {
            id: "general".to_string(),
            name: "General".to_string(),
            sort_key: None,
        }],
        division: DivisionSettings::default(),
    }
}

pub fn divided_course(divided_topic: &str) -> Course {
    let mut course = course();
    course.division = DivisionSettings {
        enabled: true,
        divided_commentables: HashSet::from([divided_topic.to_string()]),
        always_divide_inline_discussions: false,
    };
    course
}

pub fn course_in_blackout() -> Course {
    let now = chrono::Utc::now();
    let mut course = course();
    course.blackouts = vec![BlackoutWindow {
        start: now - chrono::Duration::hours(1),
        end: now + chrono::Duration::hours(1),
    }];
    course
}

/// A thread in the default course, authored by the learner.
pub fn thread(id: &str) -> ThreadData {
    ThreadData {
        id: id.to_string(),
        course_id: COURSE_ID.to_string(),
        commentable_id: "t1".to_string(),
        user_id: LEARNER_ID.to_string(),
        username: "learner".to_string(),
        title: "A title".to_string(),
        body: "A body".to_string(),
        ..ThreadData::default()
    }
}

pub fn thread_page(threads: Vec<ThreadData>, page: u32, num_pages: u32) -> ThreadPage {
    let thread_count = threads.len() as u64;
    ThreadPage {
        collection: threads,
        page,
        num_pages,
        thread_count,
        corrected_text: None,
    }
}

/// Event sink that records every published event for later assertions.
#[derive(Default)]
pub struct RecordedEvents {
    inner: Mutex<Vec<ForumEvent>>,
}

impl RecordedEvents {
    pub fn all(&self) -> Vec<ForumEvent> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl EventSink for RecordedEvents {
    async fn publish(&self, event: ForumEvent) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

/// Mutable parts of a service under test. Configure the mocks and the
/// in-memory stores, then [`Harness::build`].
pub struct Harness {
    pub courses: InMemoryCourseStore,
    pub users: InMemoryUserDirectory,
    pub client: MockCommentClient,
    pub profiles: MockProfileStore,
}

impl Harness {
    /// Default setup: the standard course with the learner enrolled and the
    /// staff user holding the moderator role.
    pub fn new() -> Self {
        Self::with_course(course())
    }

    pub fn with_course(course: Course) -> Self {
        let key = course.key.clone();
        let courses = InMemoryCourseStore::new()
            .with_course(course)
            .with_enrollment("learner", &key)
            .with_enrollment("staff", &key)
            .with_role("staff", &key, ForumRole::Moderator);
        let users = InMemoryUserDirectory::new()
            .with_user("learner", LEARNER_ID)
            .with_user("staff", STAFF_ID);
        Self {
            courses,
            users,
            client: MockCommentClient::new(),
            profiles: MockProfileStore::new(),
        }
    }

    pub fn build(self) -> (DiscussionService, Arc<RecordedEvents>) {
        let events = Arc::new(RecordedEvents::default());
        let service = DiscussionService::new(
            Arc::new(self.courses),
            Arc::new(self.client),
            Arc::new(self.users),
            Arc::new(self.profiles),
            events.clone(),
            Url::parse(API_BASE).unwrap(),
        );
        (service, events)
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
