//! In-memory course/user backends. Built once at startup (or in a test) and
//! immutable afterwards, so no interior locking is needed.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use domains::{Course, CourseKey, CourseStore, ForumRole, UserDirectory};

#[derive(Default)]
pub struct InMemoryCourseStore {
    courses: HashMap<CourseKey, Course>,
    enrollments: HashSet<(String, CourseKey)>,
    roles: HashMap<(String, CourseKey), HashSet<ForumRole>>,
    groups: HashMap<(String, CourseKey), i64>,
}

impl InMemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_course(mut self, course: Course) -> Self {
        self.courses.insert(course.key.clone(), course);
        self
    }

    pub fn with_enrollment(mut self, username: &str, key: &CourseKey) -> Self {
        self.enrollments.insert((username.to_string(), key.clone()));
        self
    }

    pub fn with_role(mut self, username: &str, key: &CourseKey, role: ForumRole) -> Self {
        self.roles
            .entry((username.to_string(), key.clone()))
            .or_default()
            .insert(role);
        self
    }

    pub fn with_group(mut self, username: &str, key: &CourseKey, group: i64) -> Self {
        self.groups.insert((username.to_string(), key.clone()), group);
        self
    }
}

#[async_trait]
impl CourseStore for InMemoryCourseStore {
    async fn course(&self, key: &CourseKey) -> anyhow::Result<Option<Course>> {
        Ok(self.courses.get(key).cloned())
    }

    async fn has_access(&self, username: &str, key: &CourseKey) -> anyhow::Result<bool> {
        Ok(self
            .enrollments
            .contains(&(username.to_string(), key.clone())))
    }

    async fn user_roles(
        &self,
        username: &str,
        key: &CourseKey,
    ) -> anyhow::Result<HashSet<ForumRole>> {
        Ok(self
            .roles
            .get(&(username.to_string(), key.clone()))
            .cloned()
            .unwrap_or_default())
    }

    async fn group_for_user(
        &self,
        username: &str,
        key: &CourseKey,
    ) -> anyhow::Result<Option<i64>> {
        Ok(self.groups.get(&(username.to_string(), key.clone())).copied())
    }
}

#[derive(Default)]
pub struct InMemoryUserDirectory {
    ids_by_username: HashMap<String, String>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, username: &str, user_id: &str) -> Self {
        self.ids_by_username
            .insert(username.to_string(), user_id.to_string());
        self
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn user_id_for_username(&self, username: &str) -> anyhow::Result<Option<String>> {
        Ok(self.ids_by_username.get(username).cloned())
    }
}
