//! In-memory collaborators for service tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::data::media_store::{MediaStore, MediaStoreError};
use crate::data::post_repository::{NewPost, Pagination, PostPatch, PostRepository};
use crate::data::user_repository::{NewUser, RoleCounts, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostDetail};
use crate::domain::user::{Role, User};

#[derive(Clone, Default)]
pub(crate) struct FakeUserRepo {
    users: Arc<Mutex<Vec<UserCredentials>>>,
    fail_lookups: Arc<Mutex<bool>>,
    pub(crate) last_search: Arc<Mutex<Option<Option<String>>>>,
    pub(crate) role_updates: Arc<Mutex<Vec<(i64, Role)>>>,
    pub(crate) deleted: Arc<Mutex<Vec<i64>>>,
}

impl FakeUserRepo {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, username: &str, role: Role, password_hash: &str) -> User {
        let mut users = self.users.lock().expect("users mutex poisoned");
        let id = users.len() as i64 + 1;
        let user = User::new(id, username, role, Utc::now() + Duration::seconds(id))
            .expect("fake user must be valid");
        users.push(UserCredentials {
            user: user.clone(),
            password_hash: password_hash.to_string(),
        });
        user
    }

    pub(crate) fn stored(&self, username: &str) -> Option<UserCredentials> {
        self.users
            .lock()
            .expect("users mutex poisoned")
            .iter()
            .find(|creds| creds.user.username == username)
            .cloned()
    }

    pub(crate) fn fail_lookups(&self) {
        *self.fail_lookups.lock().expect("fail mutex poisoned") = true;
    }
}

#[async_trait]
impl UserRepository for FakeUserRepo {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        Ok(self.insert(&input.username, input.role, &input.password_hash))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        if *self.fail_lookups.lock().expect("fail mutex poisoned") {
            return Err(DomainError::Unexpected("connection reset".to_string()));
        }
        Ok(self.stored(username))
    }

    async fn list_users(&self, search: Option<&str>) -> Result<Vec<User>, DomainError> {
        *self.last_search.lock().expect("search mutex poisoned") = Some(search.map(str::to_string));
        let needle = search.map(str::to_lowercase);
        let mut users: Vec<User> = self
            .users
            .lock()
            .expect("users mutex poisoned")
            .iter()
            .map(|creds| creds.user.clone())
            .filter(|user| match &needle {
                Some(needle) => {
                    user.username.to_lowercase().contains(needle.as_str())
                        || user.role.as_str().contains(needle.as_str())
                }
                None => true,
            })
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn role_counts(&self) -> Result<RoleCounts, DomainError> {
        let users = self.users.lock().expect("users mutex poisoned");
        Ok(RoleCounts {
            total: users.len() as i64,
            admins: users
                .iter()
                .filter(|creds| creds.user.role == Role::Admin)
                .count() as i64,
        })
    }

    async fn update_role(&self, user_id: i64, role: Role) -> Result<Option<User>, DomainError> {
        self.role_updates
            .lock()
            .expect("role updates mutex poisoned")
            .push((user_id, role));
        let mut users = self.users.lock().expect("users mutex poisoned");
        Ok(users
            .iter_mut()
            .find(|creds| creds.user.id == user_id)
            .map(|creds| {
                creds.user.role = role;
                creds.user.clone()
            }))
    }

    async fn delete_user(&self, user_id: i64) -> Result<bool, DomainError> {
        self.deleted
            .lock()
            .expect("deleted mutex poisoned")
            .push(user_id);
        let mut users = self.users.lock().expect("users mutex poisoned");
        let before = users.len();
        users.retain(|creds| creds.user.id != user_id);
        Ok(users.len() < before)
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakePostRepo {
    posts: Arc<Mutex<Vec<Post>>>,
    fail_updates: Arc<Mutex<bool>>,
    fail_deletes: Arc<Mutex<bool>>,
    pub(crate) last_pagination: Arc<Mutex<Option<Pagination>>>,
}

impl FakePostRepo {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, author_id: i64, image: Option<&str>) -> Post {
        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        let id = posts.len() as i64 + 1;
        let post = Post::new(
            id,
            author_id,
            format!("title {id}"),
            format!("content {id}"),
            image.map(str::to_string),
            Utc::now(),
        )
        .expect("fake post must be valid");
        posts.push(post.clone());
        post
    }

    pub(crate) fn stored(&self, id: i64) -> Option<Post> {
        self.posts
            .lock()
            .expect("posts mutex poisoned")
            .iter()
            .find(|post| post.id == id)
            .cloned()
    }

    pub(crate) fn fail_updates(&self) {
        *self.fail_updates.lock().expect("fail mutex poisoned") = true;
    }

    pub(crate) fn fail_deletes(&self) {
        *self.fail_deletes.lock().expect("fail mutex poisoned") = true;
    }

    fn detail(post: &Post) -> PostDetail {
        PostDetail {
            id: post.id,
            author_id: post.author_id,
            author: format!("user_{}", post.author_id),
            title: post.title.clone(),
            content: post.content.clone(),
            image: post.image.clone(),
            created_at: post.created_at,
        }
    }
}

#[async_trait]
impl PostRepository for FakePostRepo {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        let post = Post::new(
            posts.len() as i64 + 1,
            input.author_id,
            input.title,
            input.content,
            input.image,
            Utc::now(),
        )?;
        posts.push(post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.stored(id))
    }

    async fn get_post_detail(&self, id: i64) -> Result<Option<PostDetail>, DomainError> {
        Ok(self.stored(id).as_ref().map(Self::detail))
    }

    async fn update_post(
        &self,
        post_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        if *self.fail_updates.lock().expect("fail mutex poisoned") {
            return Err(DomainError::Unexpected("write pool unavailable".to_string()));
        }
        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        Ok(posts.iter_mut().find(|post| post.id == post_id).map(|post| {
            post.title = patch.title;
            post.content = patch.content;
            post.image = patch.image;
            post.clone()
        }))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        if *self.fail_deletes.lock().expect("fail mutex poisoned") {
            return Err(DomainError::Unexpected("write pool unavailable".to_string()));
        }
        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        let before = posts.len();
        posts.retain(|post| post.id != id);
        Ok(posts.len() < before)
    }

    async fn list_posts(&self, pagination: Pagination) -> Result<Vec<PostDetail>, DomainError> {
        *self
            .last_pagination
            .lock()
            .expect("pagination mutex poisoned") = Some(pagination);
        let posts = self.posts.lock().expect("posts mutex poisoned");
        Ok(posts
            .iter()
            .rev()
            .skip(pagination.offset() as usize)
            .take(pagination.limit as usize)
            .map(Self::detail)
            .collect())
    }

    async fn total_posts(&self) -> Result<i64, DomainError> {
        Ok(self.posts.lock().expect("posts mutex poisoned").len() as i64)
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeMediaStore {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_writes: Arc<Mutex<bool>>,
    fail_removes: Arc<Mutex<bool>>,
}

impl FakeMediaStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn put(&self, file_name: &str, bytes: &[u8]) {
        self.files
            .lock()
            .expect("files mutex poisoned")
            .insert(file_name.to_string(), bytes.to_vec());
    }

    pub(crate) fn contains(&self, file_name: &str) -> bool {
        self.files
            .lock()
            .expect("files mutex poisoned")
            .contains_key(file_name)
    }

    pub(crate) fn len(&self) -> usize {
        self.files.lock().expect("files mutex poisoned").len()
    }

    pub(crate) fn fail_writes(&self) {
        *self.fail_writes.lock().expect("fail mutex poisoned") = true;
    }

    pub(crate) fn fail_removes(&self) {
        *self.fail_removes.lock().expect("fail mutex poisoned") = true;
    }
}

#[async_trait]
impl MediaStore for FakeMediaStore {
    async fn write(&self, file_name: &str, bytes: &[u8]) -> Result<(), MediaStoreError> {
        if *self.fail_writes.lock().expect("fail mutex poisoned") {
            return Err(MediaStoreError::Io {
                name: file_name.to_string(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.put(file_name, bytes);
        Ok(())
    }

    async fn remove(&self, file_name: &str) -> Result<(), MediaStoreError> {
        if *self.fail_removes.lock().expect("fail mutex poisoned") {
            return Err(MediaStoreError::Io {
                name: file_name.to_string(),
                source: std::io::Error::other("permission denied"),
            });
        }
        self.files
            .lock()
            .expect("files mutex poisoned")
            .remove(file_name)
            .map(|_| ())
            .ok_or_else(|| MediaStoreError::NotFound(file_name.to_string()))
    }
}
