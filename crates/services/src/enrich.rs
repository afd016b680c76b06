//! Profile-image enrichment: one batch account lookup per response, attached
//! as a per-user sub-object keyed by username.

use std::collections::HashMap;

use domains::{ProfileMap, Result};

use crate::serialize::{CommentView, ThreadView, UserSummary, UserSummaryProfile};
use crate::DiscussionService;

/// A serialized entity that can name the users it involves and carry their
/// profile summaries.
pub(crate) trait ProfileSubject {
    fn collect_usernames(&self, out: &mut Vec<String>);
    fn attach_users(&mut self, profiles: &ProfileMap);
}

fn push_distinct(out: &mut Vec<String>, username: &str) {
    if !username.is_empty() && !out.iter().any(|u| u == username) {
        out.push(username.to_string());
    }
}

fn summaries_for(usernames: &[&str], profiles: &ProfileMap) -> HashMap<String, UserSummary> {
    let mut users = HashMap::new();
    for username in usernames {
        if let Some(profile) = profiles.get(*username) {
            users.insert(
                (*username).to_string(),
                UserSummary {
                    profile: UserSummaryProfile {
                        image: profile.profile_image.clone(),
                    },
                },
            );
        }
    }
    users
}

impl ProfileSubject for ThreadView {
    fn collect_usernames(&self, out: &mut Vec<String>) {
        push_distinct(out, &self.author);
    }

    fn attach_users(&mut self, profiles: &ProfileMap) {
        self.users = Some(summaries_for(&[self.author.as_str()], profiles));
    }
}

impl ProfileSubject for CommentView {
    fn collect_usernames(&self, out: &mut Vec<String>) {
        push_distinct(out, &self.author);
        if self.endorsed {
            if let Some(endorser) = &self.endorsed_by {
                push_distinct(out, endorser);
            }
        }
    }

    fn attach_users(&mut self, profiles: &ProfileMap) {
        let mut involved = vec![self.author.as_str()];
        if self.endorsed {
            if let Some(endorser) = &self.endorsed_by {
                involved.push(endorser.as_str());
            }
        }
        self.users = Some(summaries_for(&involved, profiles));
    }
}

impl DiscussionService {
    /// Fetch profiles for every distinct user across `views` in one batch
    /// call and attach them. No-op when nothing was requested.
    pub(crate) async fn attach_profiles<T: ProfileSubject>(
        &self,
        views: &mut [T],
        include_profile_image: bool,
    ) -> Result<()> {
        if !include_profile_image || views.is_empty() {
            return Ok(());
        }
        let mut usernames = Vec::new();
        for view in views.iter() {
            view.collect_usernames(&mut usernames);
        }
        let profiles = self.profiles.profiles(&usernames).await?;
        for view in views.iter_mut() {
            view.attach_users(&profiles);
        }
        Ok(())
    }
}
